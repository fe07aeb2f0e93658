//! Salary votes
//!
//! A user holds at most one vote per entry. Voting the same way twice
//! withdraws the vote, voting the other way switches it. The store applies
//! the change and recomputes the aggregate counters in one transaction, so
//! the returned tally is authoritative.

use crate::db::Store;
use crate::errors::Result;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(VoteType::Up),
            "down" => Some(VoteType::Down),
            _ => None,
        }
    }
}

/// Change to apply to a user's vote row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Insert(VoteType),
    Remove,
    Switch { from: VoteType, to: VoteType },
}

impl VoteAction {
    /// The user's vote once the action is applied
    pub fn resulting_vote(&self) -> Option<VoteType> {
        match *self {
            VoteAction::Insert(vote) => Some(vote),
            VoteAction::Remove => None,
            VoteAction::Switch { to, .. } => Some(to),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VoteAction::Insert(_) => "insert",
            VoteAction::Remove => "remove",
            VoteAction::Switch { .. } => "switch",
        }
    }
}

/// Reconcile a requested vote with the one already on record
pub fn resolve_vote(existing: Option<VoteType>, requested: VoteType) -> VoteAction {
    match existing {
        None => VoteAction::Insert(requested),
        Some(current) if current == requested => VoteAction::Remove,
        Some(current) => VoteAction::Switch {
            from: current,
            to: requested,
        },
    }
}

/// Counters after a vote, plus the caller's own vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i32,
    pub downvotes: i32,
    pub user_vote: Option<VoteType>,
}

/// Vote operations on salary entries
#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn Store>,
}

impl VoteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Toggle, switch or cast the user's vote and return the new counters
    pub async fn vote(&self, salary_id: Uuid, user_id: Uuid, vote_type: VoteType) -> Result<VoteTally> {
        let (action, tally) = self
            .store
            .apply_salary_vote(salary_id, user_id, vote_type)
            .await?;

        metrics::record_vote("salary", action.label());
        tracing::info!(
            salary_id = %salary_id,
            user_id = %user_id,
            action = action.label(),
            upvotes = tally.upvotes,
            downvotes = tally.downvotes,
            "Salary vote applied"
        );

        Ok(tally)
    }

    /// The user's current vote on an entry, if any
    pub async fn current_vote(&self, salary_id: Uuid, user_id: Uuid) -> Result<Option<VoteType>> {
        self.store.salary_vote(salary_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::{normalize, CreateSalaryInput, SubmissionType};
    use crate::db::{MemoryStore, SalaryStore};
    use crate::errors::AppError;

    #[test]
    fn test_resolve_vote() {
        assert_eq!(resolve_vote(None, VoteType::Up), VoteAction::Insert(VoteType::Up));
        assert_eq!(resolve_vote(Some(VoteType::Up), VoteType::Up), VoteAction::Remove);
        assert_eq!(
            resolve_vote(Some(VoteType::Up), VoteType::Down),
            VoteAction::Switch {
                from: VoteType::Up,
                to: VoteType::Down
            }
        );
    }

    #[test]
    fn test_resulting_vote() {
        assert_eq!(VoteAction::Remove.resulting_vote(), None);
        assert_eq!(VoteAction::Insert(VoteType::Down).resulting_vote(), Some(VoteType::Down));
        assert_eq!(
            resolve_vote(Some(VoteType::Down), VoteType::Up).resulting_vote(),
            Some(VoteType::Up)
        );
    }

    async fn seeded() -> (Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let record = normalize(&CreateSalaryInput {
            company: "Acme".into(),
            role: "SDE".into(),
            location: "Pune".into(),
            total_compensation: "900000".into(),
            submission_type: Some(SubmissionType::Fulltime),
            ..Default::default()
        })
        .unwrap();
        let id = store.insert_salary(record).await.unwrap().id;
        (store, id)
    }

    #[tokio::test]
    async fn test_vote_lifecycle_returns_authoritative_counts() {
        let (store, salary_id) = seeded().await;
        let service = VoteService::new(store);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let tally = service.vote(salary_id, alice, VoteType::Up).await.unwrap();
        assert_eq!((tally.upvotes, tally.downvotes, tally.user_vote), (1, 0, Some(VoteType::Up)));

        let tally = service.vote(salary_id, bob, VoteType::Up).await.unwrap();
        assert_eq!((tally.upvotes, tally.downvotes), (2, 0));

        let tally = service.vote(salary_id, alice, VoteType::Down).await.unwrap();
        assert_eq!((tally.upvotes, tally.downvotes, tally.user_vote), (1, 1, Some(VoteType::Down)));

        let tally = service.vote(salary_id, alice, VoteType::Down).await.unwrap();
        assert_eq!((tally.upvotes, tally.downvotes, tally.user_vote), (1, 0, None));

        assert_eq!(service.current_vote(salary_id, alice).await.unwrap(), None);
        assert_eq!(service.current_vote(salary_id, bob).await.unwrap(), Some(VoteType::Up));
    }

    #[tokio::test]
    async fn test_vote_on_unknown_salary() {
        let (store, _) = seeded().await;
        let service = VoteService::new(store);

        let err = service
            .vote(Uuid::new_v4(), Uuid::new_v4(), VoteType::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SalaryNotFound { .. }));
    }
}
