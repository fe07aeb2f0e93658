//! Discussion threads on salary entries

use crate::auth::UserContext;
use crate::db::models::Comment;
use crate::db::{NewComment, Store, MAX_OFFSET};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::services::votes::{VoteTally, VoteType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const MAX_CONTENT_CHARS: usize = 5000;
pub const MAX_ATTACHMENTS: usize = 5;

const ADJECTIVES: &[&str] = &["Curious", "Bright", "Clever", "Savvy", "Smart", "Wise", "Bold"];
const NOUNS: &[&str] = &[
    "Analyst",
    "Engineer",
    "Developer",
    "Professional",
    "Expert",
    "Specialist",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
}

/// File uploaded alongside a comment; the bytes live in object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,

    #[validate(length(min = 1, max = 2048))]
    pub url: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Bytes
    #[serde(default)]
    pub size: u64,
}

/// Attachment with its human-readable size
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    #[serde(flatten)]
    pub attachment: Attachment,
    pub size_label: String,
}

impl From<Attachment> for AttachmentView {
    fn from(attachment: Attachment) -> Self {
        Self {
            size_label: format_file_size(attachment.size),
            attachment,
        }
    }
}

/// Human-readable size, base 1024, at most two decimals
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    // Half rounds up; Display drops trailing zeros
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

/// Thread ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    /// Net score, then newest
    #[default]
    Best,
    /// Upvotes, then newest
    Top,
    Newest,
    Oldest,
}

/// Body of a new comment
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewCommentInput {
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 5), nested)]
    pub attachments: Vec<Attachment>,
}

impl NewCommentInput {
    /// Validated, trimmed content
    fn checked_content(&self) -> Result<String> {
        self.validate()?;

        let content = self.content.trim();
        let chars = content.chars().count();
        if chars == 0 {
            return Err(AppError::MissingField {
                field: "content".to_string(),
            });
        }
        if chars > MAX_CONTENT_CHARS {
            return Err(AppError::Validation {
                message: format!("Comment exceeds {} characters", MAX_CONTENT_CHARS),
                field: Some("content".to_string()),
            });
        }

        Ok(content.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub salary_id: Uuid,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub content: String,
    pub attachments: Vec<AttachmentView>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    /// Whether the viewer wrote it
    pub is_author: bool,
}

impl CommentView {
    fn from_model(comment: Comment, viewer: Option<Uuid>) -> Self {
        // Rows written before attachments were validated may not parse
        let attachments: Vec<Attachment> =
            serde_json::from_value(comment.attachments.clone()).unwrap_or_default();

        Self {
            is_author: viewer.is_some() && comment.user_id == viewer,
            score: comment.score(),
            id: comment.id,
            salary_id: comment.salary_id,
            display_name: comment.display_name,
            photo_url: comment.photo_url,
            content: comment.content,
            attachments: attachments.into_iter().map(AttachmentView::from).collect(),
            upvotes: comment.upvotes,
            downvotes: comment.downvotes,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub has_more: bool,
}

/// Handle such as `SavvyAnalyst417` for commenters without a profile name
pub fn anonymous_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Curious");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Analyst");
    format!("{}{}{}", adjective, noun, rng.gen_range(0..1000))
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add_comment(
        &self,
        salary_id: Uuid,
        author: Option<&UserContext>,
        input: NewCommentInput,
    ) -> Result<CommentView> {
        let content = input.checked_content()?;

        if self.store.find_salary(salary_id).await?.is_none() {
            return Err(AppError::SalaryNotFound {
                id: salary_id.to_string(),
            });
        }

        let display_name = author
            .and_then(UserContext::display_name)
            .unwrap_or_else(|| anonymous_name(&mut rand::thread_rng()));

        let comment = self
            .store
            .insert_comment(NewComment {
                salary_id,
                user_id: author.map(|u| u.user_id),
                display_name,
                photo_url: author.and_then(|u| u.avatar_url.clone()),
                content,
                attachments: input.attachments,
            })
            .await?;

        metrics::record_comment("create");
        tracing::info!(
            comment_id = %comment.id,
            salary_id = %salary_id,
            anonymous = author.is_none(),
            "Comment added"
        );

        Ok(CommentView::from_model(comment, author.map(|u| u.user_id)))
    }

    /// One page of a thread; `page` is 1-based, `per_page` already clamped by the caller
    pub async fn list_comments(
        &self,
        salary_id: Uuid,
        sort: CommentSort,
        page: u64,
        per_page: u64,
        viewer: Option<Uuid>,
    ) -> Result<CommentPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let offset = (page - 1).saturating_mul(per_page).min(MAX_OFFSET);

        let (comments, total) = self
            .store
            .list_comments(salary_id, sort, offset, per_page)
            .await?;

        Ok(CommentPage {
            has_more: offset.saturating_add(comments.len() as u64) < total,
            comments: comments
                .into_iter()
                .map(|c| CommentView::from_model(c, viewer))
                .collect(),
            total,
            page,
            per_page,
        })
    }

    pub async fn vote_on_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        vote_type: VoteType,
    ) -> Result<VoteTally> {
        let (action, tally) = self
            .store
            .apply_comment_vote(comment_id, user_id, vote_type)
            .await?;

        metrics::record_vote("comment", action.label());
        tracing::debug!(comment_id = %comment_id, action = action.label(), "Comment vote applied");

        Ok(tally)
    }

    /// Remove a comment; only its author may do so
    pub async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<()> {
        let not_found = || AppError::CommentNotFound {
            id: comment_id.to_string(),
        };

        let comment = self.store.find_comment(comment_id).await?.ok_or_else(not_found)?;
        if comment.user_id != Some(user_id) {
            return Err(AppError::Forbidden {
                message: "Only the author can delete this comment".to_string(),
            });
        }

        if !self.store.delete_comment(comment_id).await? {
            return Err(not_found());
        }

        metrics::record_comment("delete");
        tracing::info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }
}
