//! API handlers module

pub mod comments;
pub mod health;
pub mod salaries;
pub mod votes;
