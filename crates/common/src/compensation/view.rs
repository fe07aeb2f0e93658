//! Unified salary view
//!
//! Stored rows name their fields `company_name`/`designation`, while
//! hand-curated listings use `company`/`role`. Both are resolved into a
//! single [`SalaryView`] here so nothing downstream needs to guess.

use serde::{Deserialize, Serialize};

use super::breakdown::CompensationBreakdown;
use super::slug::salary_url;
use crate::db::models::SalaryRecord;

/// Origin of a salary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Row from the `salaries` table
    Stored,
    /// Hand-maintained listing outside the database
    Curated,
}

/// Compensation figures, tagged by pay kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayFigures {
    Stipend {
        stipend_avg: f64,
    },
    Salary {
        total_compensation: Option<f64>,
        avg_salary: Option<f64>,
        base_salary: Option<f64>,
        bonus: Option<f64>,
        stock_compensation: Option<f64>,
    },
}

impl PayFigures {
    /// Pick the pay kind from raw columns; a non-zero stipend marks an internship
    pub fn resolve(
        stipend_avg: Option<f64>,
        total_compensation: Option<f64>,
        avg_salary: Option<f64>,
        base_salary: Option<f64>,
        bonus: Option<f64>,
        stock_compensation: Option<f64>,
    ) -> Self {
        match stipend_avg {
            Some(stipend) if stipend != 0.0 && !stipend.is_nan() => PayFigures::Stipend {
                stipend_avg: stipend,
            },
            _ => PayFigures::Salary {
                total_compensation,
                avg_salary,
                base_salary,
                bonus,
                stock_compensation,
            },
        }
    }
}

/// Listing shape used by curated data sets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CuratedListing {
    pub id: String,
    pub company: String,
    pub role: String,
    pub location: String,
    #[serde(default, alias = "yoe")]
    pub years_of_experience: Option<f64>,
    pub avg_salary: Option<f64>,
    pub stipend_avg: Option<f64>,
    pub base_salary: Option<f64>,
    pub bonus: Option<f64>,
    pub stock_compensation: Option<f64>,
    pub total_compensation: Option<f64>,
    #[serde(default, alias = "reports")]
    pub data_points_count: Option<i32>,
}

/// Salary entry as presented by the detail panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryView {
    pub id: String,
    pub source: EntrySource,
    pub company: String,
    pub designation: String,
    pub location: String,
    pub years_of_experience: Option<f64>,
    pub pay: PayFigures,
    pub upvotes: i32,
    pub downvotes: i32,
    pub data_points_count: Option<i32>,
}

impl SalaryView {
    /// Resolve a curated listing
    pub fn curated(listing: CuratedListing) -> Self {
        Self {
            pay: PayFigures::resolve(
                listing.stipend_avg,
                listing.total_compensation,
                listing.avg_salary,
                listing.base_salary,
                listing.bonus,
                listing.stock_compensation,
            ),
            id: listing.id,
            source: EntrySource::Curated,
            company: listing.company,
            designation: listing.role,
            location: listing.location,
            years_of_experience: listing.years_of_experience,
            upvotes: 0,
            downvotes: 0,
            data_points_count: listing.data_points_count,
        }
    }

    /// SEO-friendly path for this entry
    pub fn canonical_url(&self) -> String {
        salary_url(
            Some(&self.company),
            Some(&self.designation),
            Some(&self.location),
            &self.id,
        )
    }

    pub fn breakdown(&self) -> CompensationBreakdown {
        CompensationBreakdown::from_figures(&self.pay)
    }
}

impl From<&SalaryRecord> for SalaryView {
    fn from(record: &SalaryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            source: EntrySource::Stored,
            company: record.company_name.clone(),
            designation: record.designation.clone(),
            location: record.location.clone(),
            years_of_experience: record.years_of_experience,
            pay: PayFigures::resolve(
                record.stipend_avg,
                record.total_compensation,
                record.avg_salary,
                record.base_salary,
                record.bonus,
                record.stock_compensation,
            ),
            upvotes: record.upvotes,
            downvotes: record.downvotes,
            data_points_count: record.data_points_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_listing_uses_role_naming() {
        let listing: CuratedListing = serde_json::from_str(
            r#"{
                "id": "google-swe-1",
                "company": "Google India",
                "role": "SWE II",
                "location": "Hyderabad",
                "avg_salary": 3500000,
                "yoe": 4,
                "reports": 12
            }"#,
        )
        .unwrap();

        let view = SalaryView::curated(listing);
        assert_eq!(view.source, EntrySource::Curated);
        assert_eq!(view.designation, "SWE II");
        assert_eq!(view.years_of_experience, Some(4.0));
        assert_eq!(view.data_points_count, Some(12));
        assert_eq!(view.canonical_url(), "/salaries/google-india/swe-ii/hyderabad/google-swe-1");
        assert_eq!(view.breakdown().total, 3_500_000.0);
    }

    #[test]
    fn test_stipend_marks_internship() {
        let pay = PayFigures::resolve(Some(40_000.0), Some(1.0), None, None, None, None);
        assert_eq!(pay, PayFigures::Stipend { stipend_avg: 40_000.0 });

        let pay = PayFigures::resolve(Some(0.0), Some(1.0), None, None, None, None);
        assert!(matches!(pay, PayFigures::Salary { .. }));
    }
}
