//! SeaORM entity models
//!
//! Database entities for PayScope

mod comment;
mod comment_vote;
mod salary;
mod salary_vote;

pub use salary::{
    Entity as SalaryEntity,
    Model as SalaryRecord,
    ActiveModel as SalaryActiveModel,
    Column as SalaryColumn,
};

pub use salary_vote::{
    Entity as SalaryVoteEntity,
    Model as SalaryVote,
    ActiveModel as SalaryVoteActiveModel,
    Column as SalaryVoteColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use comment_vote::{
    Entity as CommentVoteEntity,
    Model as CommentVote,
    ActiveModel as CommentVoteActiveModel,
    Column as CommentVoteColumn,
};
