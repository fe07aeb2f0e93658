//! Salary catalogue handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::extract::AppJson;
use crate::AppState;
use payscope_common::{
    auth::UserContext,
    compensation::{CreateSalaryInput, JobType},
    db::SalaryFilter,
    errors::{AppError, Result},
    services::{SalaryDetail, SalaryPage, SalarySummary},
};

/// Query string for the catalogue listing
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListSalariesQuery {
    #[validate(length(max = 200))]
    pub company: Option<String>,

    #[validate(length(max = 200))]
    pub designation: Option<String>,

    #[validate(length(max = 200))]
    pub location: Option<String>,

    pub job_type: Option<String>,

    pub offset: Option<u64>,

    pub limit: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ListSalariesQuery {
    fn into_filter(self) -> Result<(SalaryFilter, Option<u64>, Option<u64>)> {
        self.validate()?;

        let job_type = match non_blank(self.job_type) {
            Some(raw) => Some(JobType::parse(&raw).ok_or_else(|| AppError::Validation {
                message: format!("Unknown job type '{}'", raw),
                field: Some("job_type".to_string()),
            })?),
            None => None,
        };

        let filter = SalaryFilter {
            company: non_blank(self.company),
            designation: non_blank(self.designation),
            location: non_blank(self.location),
            job_type,
        };
        Ok((filter, self.offset, self.limit))
    }
}

/// Submit a salary entry
pub async fn create_salary(
    State(state): State<AppState>,
    user: UserContext,
    AppJson(input): AppJson<CreateSalaryInput>,
) -> Result<(StatusCode, Json<SalarySummary>)> {
    let record = state.salaries.create_from_submission(&input).await?;

    tracing::info!(
        salary_id = %record.id,
        user_id = %user.user_id,
        "Salary submitted"
    );

    Ok((StatusCode::CREATED, Json(SalarySummary::from(record))))
}

/// Filtered, paginated catalogue listing
pub async fn list_salaries(
    State(state): State<AppState>,
    Query(query): Query<ListSalariesQuery>,
) -> Result<Json<SalaryPage>> {
    let (filter, offset, limit) = query.into_filter()?;
    let page = state.salaries.list(&filter, offset, limit).await?;
    Ok(Json(page))
}

/// Detail view by id
pub async fn get_salary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalaryDetail>> {
    Ok(Json(state.salaries.detail(id).await?))
}

/// Detail view by SEO path; only the trailing id is used for lookup
pub async fn get_salary_by_slug(
    State(state): State<AppState>,
    Path((company, designation, location, id)): Path<(String, String, String, Uuid)>,
) -> Result<Json<SalaryDetail>> {
    let detail = state.salaries.detail(id).await?;

    let requested = format!("/salaries/{}/{}/{}/{}", company, designation, location, id);
    if requested != detail.url {
        tracing::debug!(requested = %requested, canonical = %detail.url, "Stale salary slug");
    }

    Ok(Json(detail))
}
