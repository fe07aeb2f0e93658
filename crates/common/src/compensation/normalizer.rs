//! Submission normalizer
//!
//! Turns the raw salary form into the canonical record persisted in the
//! `salaries` table. Required fields are validated; optional numeric
//! fields that fail to parse are normalized rather than rejected.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every manual submission is recorded in
pub const DEFAULT_CURRENCY: &str = "INR";

/// Which form the submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Fulltime,
    Internship,
    University,
}

/// Employment label offered by the university form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Internship")]
    Internship,
}

/// Stored job classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    Internship,
    FullTime,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Internship => "internship",
            JobType::FullTime => "full-time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internship" => Some(JobType::Internship),
            "full-time" => Some(JobType::FullTime),
            _ => None,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a salary row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Manual,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlatform::Manual => "manual",
        }
    }
}

/// Raw salary submission as posted by the form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalaryInput {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub total_compensation: String,
    #[serde(rename = "type")]
    pub submission_type: Option<SubmissionType>,
    pub years_of_experience: Option<String>,
    pub base_salary: Option<String>,
    pub bonus: Option<String>,
    pub stock_compensation: Option<String>,
    pub employment_type: Option<EmploymentType>,
}

/// Canonical record handed to the salary store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSalary {
    pub company_name: String,
    pub designation: String,
    pub location: String,
    pub years_of_experience: Option<f64>,
    pub base_salary: Option<f64>,
    pub bonus: f64,
    pub stock_compensation: f64,
    pub total_compensation: f64,
    pub avg_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
    pub data_points_count: i32,
    pub source_platform: SourcePlatform,
    pub job_type: JobType,
    pub currency: &'static str,
}

/// Parse an optional numeric form field.
///
/// Absent, blank, non-numeric, non-finite and negative input all yield `None`.
pub fn parse_optional_amount(value: Option<&str>) -> Option<f64> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}

/// Resolve the stored job type from the two form discriminators
pub fn resolve_job_type(
    submission_type: Option<SubmissionType>,
    employment_type: Option<EmploymentType>,
) -> JobType {
    if submission_type == Some(SubmissionType::Internship)
        || employment_type == Some(EmploymentType::Internship)
    {
        JobType::Internship
    } else {
        JobType::FullTime
    }
}

/// Validate and normalize a raw submission
pub fn normalize(input: &CreateSalaryInput) -> Result<NewSalary> {
    let company = require(&input.company, "company")?;
    let role = require(&input.role, "role")?;
    let location = require(&input.location, "location")?;
    let total_text = require(&input.total_compensation, "totalCompensation")?;

    let total = total_text
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
        .ok_or_else(|| AppError::InvalidCompensation {
            value: input.total_compensation.clone(),
        })?;

    let years_of_experience = match input.submission_type {
        Some(SubmissionType::Fulltime) => {
            parse_optional_amount(input.years_of_experience.as_deref())
        }
        _ => None,
    };

    Ok(NewSalary {
        company_name: company.to_string(),
        designation: role.to_string(),
        location: location.to_string(),
        years_of_experience,
        base_salary: parse_optional_amount(input.base_salary.as_deref()),
        bonus: parse_optional_amount(input.bonus.as_deref()).unwrap_or(0.0),
        stock_compensation: parse_optional_amount(input.stock_compensation.as_deref())
            .unwrap_or(0.0),
        total_compensation: total,
        avg_salary: total,
        min_salary: total,
        max_salary: total,
        data_points_count: 1,
        source_platform: SourcePlatform::Manual,
        job_type: resolve_job_type(input.submission_type, input.employment_type),
        currency: DEFAULT_CURRENCY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> CreateSalaryInput {
        CreateSalaryInput {
            company: "Foo".into(),
            role: "Bar".into(),
            location: "Pune".into(),
            total_compensation: "1200000".into(),
            submission_type: Some(SubmissionType::Fulltime),
            years_of_experience: Some("3".into()),
            bonus: Some("50000".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_time_submission() {
        let record = normalize(&submission()).unwrap();

        assert_eq!(record.company_name, "Foo");
        assert_eq!(record.designation, "Bar");
        assert_eq!(record.location, "Pune");
        assert_eq!(record.total_compensation, 1_200_000.0);
        assert_eq!(record.avg_salary, 1_200_000.0);
        assert_eq!(record.min_salary, 1_200_000.0);
        assert_eq!(record.max_salary, 1_200_000.0);
        assert_eq!(record.years_of_experience, Some(3.0));
        assert_eq!(record.bonus, 50_000.0);
        assert_eq!(record.stock_compensation, 0.0);
        assert_eq!(record.base_salary, None);
        assert_eq!(record.job_type, JobType::FullTime);
        assert_eq!(record.data_points_count, 1);
        assert_eq!(record.source_platform.as_str(), "manual");
        assert_eq!(record.currency, "INR");
    }

    #[test]
    fn test_missing_fields_in_order() {
        let mut input = submission();
        input.company = String::new();
        input.location = String::new();
        match normalize(&input) {
            Err(AppError::MissingField { field }) => assert_eq!(field, "company"),
            other => panic!("expected missing company, got {:?}", other),
        }

        let mut input = submission();
        input.total_compensation = "   ".into();
        match normalize(&input) {
            Err(AppError::MissingField { field }) => assert_eq!(field, "totalCompensation"),
            other => panic!("expected missing total, got {:?}", other),
        }

        let mut input = submission();
        input.role = String::new();
        assert!(matches!(normalize(&input), Err(AppError::MissingField { .. })));
    }

    #[test]
    fn test_invalid_total_compensation() {
        for bad in ["abc", "0", "-100", "NaN", "inf", "12L"] {
            let mut input = submission();
            input.total_compensation = bad.into();
            assert!(
                matches!(normalize(&input), Err(AppError::InvalidCompensation { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_total_matches_numeric_value() {
        let mut input = submission();
        input.total_compensation = " 1850000.50 ".into();
        let record = normalize(&input).unwrap();
        assert_eq!(record.total_compensation, 1_850_000.5);
    }

    #[test]
    fn test_job_type_resolution() {
        use EmploymentType as E;
        use SubmissionType as S;

        assert_eq!(resolve_job_type(Some(S::Internship), None), JobType::Internship);
        assert_eq!(resolve_job_type(Some(S::University), Some(E::Internship)), JobType::Internship);
        assert_eq!(resolve_job_type(Some(S::Fulltime), Some(E::Internship)), JobType::Internship);
        assert_eq!(resolve_job_type(Some(S::University), Some(E::FullTime)), JobType::FullTime);
        assert_eq!(resolve_job_type(Some(S::Fulltime), None), JobType::FullTime);
        assert_eq!(resolve_job_type(None, None), JobType::FullTime);
    }

    #[test]
    fn test_experience_only_for_full_time_form() {
        let mut input = submission();
        input.submission_type = Some(SubmissionType::Internship);
        assert_eq!(normalize(&input).unwrap().years_of_experience, None);

        input.submission_type = Some(SubmissionType::University);
        assert_eq!(normalize(&input).unwrap().years_of_experience, None);

        input.submission_type = Some(SubmissionType::Fulltime);
        input.years_of_experience = Some("".into());
        assert_eq!(normalize(&input).unwrap().years_of_experience, None);
    }

    #[test]
    fn test_optional_amounts_never_nan() {
        let mut input = submission();
        input.base_salary = Some("lots".into());
        input.bonus = Some("".into());
        input.stock_compensation = Some("-20".into());

        let record = normalize(&input).unwrap();
        assert_eq!(record.base_salary, None);
        assert_eq!(record.bonus, 0.0);
        assert_eq!(record.stock_compensation, 0.0);
    }

    #[test]
    fn test_parse_optional_amount() {
        assert_eq!(parse_optional_amount(None), None);
        assert_eq!(parse_optional_amount(Some("")), None);
        assert_eq!(parse_optional_amount(Some("  ")), None);
        assert_eq!(parse_optional_amount(Some("x1")), None);
        assert_eq!(parse_optional_amount(Some("0")), Some(0.0));
        assert_eq!(parse_optional_amount(Some(" 2.5 ")), Some(2.5));
    }

    #[test]
    fn test_deserialize_form_payload() {
        let input: CreateSalaryInput = serde_json::from_str(
            r#"{
                "company": "Acme",
                "role": "Intern",
                "location": "Delhi",
                "totalCompensation": "40000",
                "type": "university",
                "employmentType": "Internship"
            }"#,
        )
        .unwrap();

        assert_eq!(input.submission_type, Some(SubmissionType::University));
        assert_eq!(input.employment_type, Some(EmploymentType::Internship));
        assert_eq!(normalize(&input).unwrap().job_type, JobType::Internship);
    }
}
