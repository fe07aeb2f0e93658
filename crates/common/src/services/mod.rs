//! Application services
//!
//! Each service owns an `Arc<dyn Store>` and adds validation, metrics and
//! logging around the persistence calls.

pub mod comments;
pub mod salaries;
pub mod votes;

pub use comments::{
    format_file_size, Attachment, AttachmentKind, CommentPage, CommentService, CommentSort,
    CommentView, NewCommentInput,
};
pub use salaries::{SalaryDetail, SalaryPage, SalaryService, SalarySummary};
pub use votes::{resolve_vote, VoteAction, VoteService, VoteTally, VoteType};
