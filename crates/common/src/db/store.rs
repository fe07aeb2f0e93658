//! Persistence traits consumed by the services
//!
//! [`Repository`](super::Repository) implements them over Postgres and
//! [`MemoryStore`](super::MemoryStore) in memory.

use crate::compensation::{JobType, NewSalary};
use crate::db::models::{Comment, SalaryRecord};
use crate::errors::Result;
use crate::services::comments::{Attachment, CommentSort};
use crate::services::votes::{VoteAction, VoteTally, VoteType};
use async_trait::async_trait;
use uuid::Uuid;

/// Largest offset the stores accept; Postgres OFFSET is a signed bigint
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Optional filters for salary listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryFilter {
    /// Case-insensitive substring of the company name
    pub company: Option<String>,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
}

/// Comment ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub salary_id: Uuid,
    pub user_id: Option<Uuid>,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait SalaryStore: Send + Sync {
    /// Insert a normalized record; returns it with its generated id
    async fn insert_salary(&self, salary: NewSalary) -> Result<SalaryRecord>;

    async fn find_salary(&self, id: Uuid) -> Result<Option<SalaryRecord>>;

    /// Newest first; returns the page and the total match count
    async fn list_salaries(
        &self,
        filter: &SalaryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<SalaryRecord>, u64)>;
}

#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn salary_vote(&self, salary_id: Uuid, user_id: Uuid) -> Result<Option<VoteType>>;

    /// Apply a vote and recompute the salary's counters atomically.
    ///
    /// Fails with `SalaryNotFound` for unknown salaries.
    async fn apply_salary_vote(
        &self,
        salary_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)>;

    /// Same as [`apply_salary_vote`](Self::apply_salary_vote) for comments
    async fn apply_comment_vote(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn list_comments(
        &self,
        salary_id: Uuid,
        sort: CommentSort,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Comment>, u64)>;

    async fn delete_comment(&self, id: Uuid) -> Result<bool>;
}

/// Everything the gateway needs from persistence
#[async_trait]
pub trait Store: SalaryStore + VoteStore + CommentStore {
    /// Check connectivity
    async fn ping(&self) -> Result<()>;
}
