//! Salary catalogue operations

use crate::compensation::{
    normalize, BreakdownLabels, CompensationBreakdown, CreateSalaryInput, SalaryView,
};
use crate::db::models::SalaryRecord;
use crate::db::{SalaryFilter, Store, MAX_OFFSET};
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Everything the detail panel shows for one entry
#[derive(Debug, Clone, Serialize)]
pub struct SalaryDetail {
    pub salary: SalaryView,
    pub breakdown: CompensationBreakdown,
    pub labels: BreakdownLabels,
    pub url: String,
}

impl SalaryDetail {
    pub fn from_view(view: SalaryView) -> Self {
        let breakdown = view.breakdown();
        Self {
            labels: breakdown.labels(),
            url: view.canonical_url(),
            breakdown,
            salary: view,
        }
    }
}

/// List entry: the stored row plus where it lives
#[derive(Debug, Clone, Serialize)]
pub struct SalarySummary {
    #[serde(flatten)]
    pub record: SalaryRecord,
    pub url: String,
}

impl From<SalaryRecord> for SalarySummary {
    fn from(record: SalaryRecord) -> Self {
        let url = SalaryView::from(&record).canonical_url();
        Self { record, url }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryPage {
    pub items: Vec<SalarySummary>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn page_size(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[derive(Clone)]
pub struct SalaryService {
    store: Arc<dyn Store>,
}

impl SalaryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Normalize a submission and store it
    pub async fn create_from_submission(&self, input: &CreateSalaryInput) -> Result<SalaryRecord> {
        let salary = match normalize(input) {
            Ok(salary) => salary,
            Err(e) => {
                metrics::record_submission("unknown", false);
                return Err(e);
            }
        };

        let job_type = salary.job_type;
        let record = self.store.insert_salary(salary).await?;

        metrics::record_submission(job_type.as_str(), true);
        tracing::info!(
            salary_id = %record.id,
            company = %record.company_name,
            job_type = job_type.as_str(),
            "Salary submission stored"
        );

        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> Result<SalaryRecord> {
        self.store
            .find_salary(id)
            .await?
            .ok_or_else(|| AppError::SalaryNotFound { id: id.to_string() })
    }

    pub async fn detail(&self, id: Uuid) -> Result<SalaryDetail> {
        let record = self.get(id).await?;
        Ok(SalaryDetail::from_view(SalaryView::from(&record)))
    }

    pub async fn list(
        &self,
        filter: &SalaryFilter,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<SalaryPage> {
        let offset = offset.unwrap_or(0).min(MAX_OFFSET);
        let limit = page_size(limit);

        let (records, total) = self.store.list_salaries(filter, offset, limit).await?;
        tracing::debug!(count = records.len(), total, "Listed salaries");

        Ok(SalaryPage {
            items: records.into_iter().map(SalarySummary::from).collect(),
            total,
            offset,
            limit,
        })
    }
}
