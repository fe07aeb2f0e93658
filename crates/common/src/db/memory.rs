//! In-memory store for tests and local runs without Postgres

use crate::compensation::NewSalary;
use crate::db::models::{Comment, SalaryRecord};
use crate::db::store::{CommentStore, NewComment, SalaryFilter, SalaryStore, Store, VoteStore};
use crate::errors::{AppError, Result};
use crate::services::comments::CommentSort;
use crate::services::votes::{resolve_vote, VoteAction, VoteTally, VoteType};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    /// Insertion order
    salaries: Vec<SalaryRecord>,
    salary_votes: HashMap<(Uuid, Uuid), VoteType>,
    comments: Vec<Comment>,
    comment_votes: HashMap<(Uuid, Uuid), VoteType>,
}

/// Apply `requested` to the vote map and recount the target's votes
fn apply(
    votes: &mut HashMap<(Uuid, Uuid), VoteType>,
    target_id: Uuid,
    user_id: Uuid,
    requested: VoteType,
) -> (VoteAction, i32, i32) {
    let key = (target_id, user_id);
    let action = resolve_vote(votes.get(&key).copied(), requested);

    match action.resulting_vote() {
        Some(vote) => votes.insert(key, vote),
        None => votes.remove(&key),
    };

    let count = |wanted: VoteType| {
        votes
            .iter()
            .filter(|((target, _), vote)| *target == target_id && **vote == wanted)
            .count() as i32
    };

    (action, count(VoteType::Up), count(VoteType::Down))
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_deref()
        .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

/// Store backed by a single lock, so each call is atomic
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn build_record(salary: NewSalary) -> SalaryRecord {
    let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();

    SalaryRecord {
        id: Uuid::new_v4(),
        company_name: salary.company_name,
        designation: salary.designation,
        location: salary.location,
        years_of_experience: salary.years_of_experience,
        base_salary: salary.base_salary,
        bonus: Some(salary.bonus),
        stock_compensation: Some(salary.stock_compensation),
        total_compensation: Some(salary.total_compensation),
        avg_salary: Some(salary.avg_salary),
        min_salary: Some(salary.min_salary),
        max_salary: Some(salary.max_salary),
        stipend_avg: None,
        data_points_count: Some(salary.data_points_count),
        source_platform: Some(salary.source_platform.as_str().to_string()),
        job_type: Some(salary.job_type.as_str().to_string()),
        currency: salary.currency.to_string(),
        upvotes: 0,
        downvotes: 0,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl SalaryStore for MemoryStore {
    async fn insert_salary(&self, salary: NewSalary) -> Result<SalaryRecord> {
        let record = build_record(salary);
        self.inner.write().await.salaries.push(record.clone());
        Ok(record)
    }

    async fn find_salary(&self, id: Uuid) -> Result<Option<SalaryRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.salaries.iter().find(|s| s.id == id).cloned())
    }

    async fn list_salaries(
        &self,
        filter: &SalaryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<SalaryRecord>, u64)> {
        let inner = self.inner.read().await;

        // Latest insert first; the stable sort keeps that order for equal timestamps
        let mut matching: Vec<&SalaryRecord> = inner
            .salaries
            .iter()
            .rev()
            .filter(|s| contains_ci(&s.company_name, &filter.company))
            .filter(|s| contains_ci(&s.designation, &filter.designation))
            .filter(|s| contains_ci(&s.location, &filter.location))
            .filter(|s| {
                filter
                    .job_type
                    .map_or(true, |jt| s.job_type.as_deref() == Some(jt.as_str()))
            })
            .collect();
        matching.sort_by_key(|s| Reverse(s.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn salary_vote(&self, salary_id: Uuid, user_id: Uuid) -> Result<Option<VoteType>> {
        let inner = self.inner.read().await;
        Ok(inner.salary_votes.get(&(salary_id, user_id)).copied())
    }

    async fn apply_salary_vote(
        &self,
        salary_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let index = inner
            .salaries
            .iter()
            .position(|s| s.id == salary_id)
            .ok_or_else(|| AppError::SalaryNotFound {
                id: salary_id.to_string(),
            })?;

        let (action, upvotes, downvotes) =
            apply(&mut inner.salary_votes, salary_id, user_id, requested);
        let salary = &mut inner.salaries[index];
        salary.upvotes = upvotes;
        salary.downvotes = downvotes;

        Ok((
            action,
            VoteTally {
                upvotes,
                downvotes,
                user_vote: action.resulting_vote(),
            },
        ))
    }

    async fn apply_comment_vote(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let index = inner
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| AppError::CommentNotFound {
                id: comment_id.to_string(),
            })?;

        let (action, upvotes, downvotes) =
            apply(&mut inner.comment_votes, comment_id, user_id, requested);
        let comment = &mut inner.comments[index];
        comment.upvotes = upvotes;
        comment.downvotes = downvotes;

        Ok((
            action,
            VoteTally {
                upvotes,
                downvotes,
                user_vote: action.resulting_vote(),
            },
        ))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let model = Comment {
            id: Uuid::new_v4(),
            salary_id: comment.salary_id,
            user_id: comment.user_id,
            display_name: comment.display_name,
            photo_url: comment.photo_url,
            content: comment.content,
            attachments: serde_json::to_value(&comment.attachments)?,
            upvotes: 0,
            downvotes: 0,
            created_at: chrono::Utc::now().into(),
        };

        self.inner.write().await.comments.push(model.clone());
        Ok(model)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(
        &self,
        salary_id: Uuid,
        sort: CommentSort,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Comment>, u64)> {
        let inner = self.inner.read().await;
        let thread = inner.comments.iter().filter(|c| c.salary_id == salary_id);

        let mut ordered: Vec<&Comment> = match sort {
            CommentSort::Oldest => thread.collect(),
            _ => thread.rev().collect(),
        };
        match sort {
            CommentSort::Best => ordered.sort_by_key(|c| (Reverse(c.score()), Reverse(c.created_at))),
            CommentSort::Top => ordered.sort_by_key(|c| (Reverse(c.upvotes), Reverse(c.created_at))),
            CommentSort::Newest => ordered.sort_by_key(|c| Reverse(c.created_at)),
            CommentSort::Oldest => ordered.sort_by_key(|c| c.created_at),
        }

        let total = ordered.len() as u64;
        let page = ordered
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.comments.len();
        inner.comments.retain(|c| c.id != id);
        inner.comment_votes.retain(|(comment_id, _), _| *comment_id != id);
        Ok(inner.comments.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_counts_only_target() {
        let mut votes = HashMap::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        apply(&mut votes, a, Uuid::new_v4(), VoteType::Up);
        apply(&mut votes, b, Uuid::new_v4(), VoteType::Up);
        let (action, up, down) = apply(&mut votes, a, Uuid::new_v4(), VoteType::Down);

        assert_eq!(action, VoteAction::Insert(VoteType::Down));
        assert_eq!((up, down), (1, 1));
    }

    #[test]
    fn test_delete_comment_drops_its_votes() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            let comment = store
                .insert_comment(NewComment {
                    salary_id: Uuid::new_v4(),
                    user_id: None,
                    display_name: "BoldExpert12".into(),
                    photo_url: None,
                    content: "hello".into(),
                    attachments: vec![],
                })
                .await
                .unwrap();
            store
                .apply_comment_vote(comment.id, Uuid::new_v4(), VoteType::Up)
                .await
                .unwrap();

            assert!(store.delete_comment(comment.id).await.unwrap());
            assert!(!store.delete_comment(comment.id).await.unwrap());
            assert!(store.inner.read().await.comment_votes.is_empty());
        });
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Acme Corp", &Some("aCME".into())));
        assert!(contains_ci("Acme Corp", &None));
        assert!(!contains_ci("Acme Corp", &Some("globex".into())));
    }
}
