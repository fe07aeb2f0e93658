//! Compensation domain logic
//!
//! Provides:
//! - Submission normalization into the stored record shape
//! - CTC breakdown for the detail panel
//! - SEO-friendly salary URLs
//! - Rupee formatting helpers

pub mod breakdown;
pub mod currency;
pub mod normalizer;
pub mod slug;
pub mod view;

pub use breakdown::{calculate_breakdown, BreakdownComponent, BreakdownLabels, CompensationBreakdown};
pub use currency::{format_inr, format_inr_compact};
pub use normalizer::{
    normalize, parse_optional_amount, CreateSalaryInput, EmploymentType, JobType, NewSalary,
    SourcePlatform, SubmissionType,
};
pub use slug::{salary_url, slugify};
pub use view::{CuratedListing, EntrySource, PayFigures, SalaryView};
