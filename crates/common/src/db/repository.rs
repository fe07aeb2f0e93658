//! Repository pattern for database operations
//!
//! Implements the store traits over Postgres with SeaORM entities and,
//! where the vote counters are involved, raw SQL inside a transaction.

use crate::compensation::NewSalary;
use crate::db::models::*;
use crate::db::store::{CommentStore, NewComment, SalaryFilter, SalaryStore, Store, VoteStore};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::services::comments::CommentSort;
use crate::services::votes::{resolve_vote, VoteAction, VoteTally, VoteType};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    Statement, TransactionTrait,
};
use std::time::Instant;
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

/// Row that carries vote counters
#[derive(Debug, Clone, Copy)]
enum VoteTarget {
    Salary,
    Comment,
}

impl VoteTarget {
    /// (parent table, vote table, foreign key column)
    fn tables(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            VoteTarget::Salary => ("salaries", "salary_votes", "salary_id"),
            VoteTarget::Comment => ("comments", "comment_votes", "comment_id"),
        }
    }

    fn not_found(&self, id: Uuid) -> AppError {
        match self {
            VoteTarget::Salary => AppError::SalaryNotFound { id: id.to_string() },
            VoteTarget::Comment => AppError::CommentNotFound { id: id.to_string() },
        }
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn contains_ci(column: SalaryColumn, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(like_pattern(needle))
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    async fn apply_vote(
        &self,
        target: VoteTarget,
        target_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)> {
        let started = Instant::now();
        let txn = self.write_conn().begin().await?;

        let action = Self::apply_vote_in(&txn, target, target_id, user_id, requested).await?;
        let (upvotes, downvotes) = Self::recount_votes(&txn, target, target_id).await?;

        txn.commit().await?;
        crate::metrics::record_db_query("apply_vote", started.elapsed().as_secs_f64());

        Ok((
            action,
            VoteTally {
                upvotes,
                downvotes,
                user_vote: action.resulting_vote(),
            },
        ))
    }

    async fn apply_vote_in(
        txn: &DatabaseTransaction,
        target: VoteTarget,
        target_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<VoteAction> {
        let (parent, votes, fk) = target.tables();

        // Row lock serializes concurrent voters on the same target
        let locked = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("SELECT id FROM {parent} WHERE id = $1 FOR UPDATE"),
                vec![target_id.into()],
            ))
            .await?;
        if locked.is_none() {
            return Err(target.not_found(target_id));
        }

        let existing = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("SELECT id, vote_type FROM {votes} WHERE {fk} = $1 AND user_id = $2"),
                vec![target_id.into(), user_id.into()],
            ))
            .await?
            .map(|row| -> Result<(Uuid, String)> {
                Ok((row.try_get_by_index::<Uuid>(0)?, row.try_get_by_index::<String>(1)?))
            })
            .transpose()?;

        let current = existing.as_ref().and_then(|(_, t)| VoteType::parse(t));
        let action = resolve_vote(current, requested);

        let stmt = match (action, existing) {
            (VoteAction::Remove, Some((vote_id, _))) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("DELETE FROM {votes} WHERE id = $1"),
                vec![vote_id.into()],
            ),
            // Switch, or an unreadable vote_type being overwritten
            (_, Some((vote_id, _))) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("UPDATE {votes} SET vote_type = $1 WHERE id = $2"),
                vec![requested.as_str().into(), vote_id.into()],
            ),
            (_, None) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!(
                    "INSERT INTO {votes} (id, {fk}, user_id, vote_type, created_at) \
                     VALUES ($1, $2, $3, $4, NOW())"
                ),
                vec![
                    Uuid::new_v4().into(),
                    target_id.into(),
                    user_id.into(),
                    requested.as_str().into(),
                ],
            ),
        };
        txn.execute(stmt).await?;

        Ok(action)
    }

    async fn recount_votes(
        txn: &DatabaseTransaction,
        target: VoteTarget,
        target_id: Uuid,
    ) -> Result<(i32, i32)> {
        let (parent, votes, fk) = target.tables();

        let row = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!(
                    r#"
                    UPDATE {parent} SET
                        upvotes = (SELECT COUNT(*) FROM {votes} WHERE {fk} = $1 AND vote_type = 'up'),
                        downvotes = (SELECT COUNT(*) FROM {votes} WHERE {fk} = $1 AND vote_type = 'down')
                    WHERE id = $1
                    RETURNING upvotes, downvotes
                    "#
                ),
                vec![target_id.into()],
            ))
            .await?
            .ok_or_else(|| target.not_found(target_id))?;

        Ok((row.try_get_by_index::<i32>(0)?, row.try_get_by_index::<i32>(1)?))
    }
}

#[async_trait]
impl SalaryStore for Repository {
    async fn insert_salary(&self, salary: NewSalary) -> Result<SalaryRecord> {
        let now = chrono::Utc::now();

        let record = SalaryActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(salary.company_name),
            designation: Set(salary.designation),
            location: Set(salary.location),
            years_of_experience: Set(salary.years_of_experience),
            base_salary: Set(salary.base_salary),
            bonus: Set(Some(salary.bonus)),
            stock_compensation: Set(Some(salary.stock_compensation)),
            total_compensation: Set(Some(salary.total_compensation)),
            avg_salary: Set(Some(salary.avg_salary)),
            min_salary: Set(Some(salary.min_salary)),
            max_salary: Set(Some(salary.max_salary)),
            stipend_avg: Set(None),
            data_points_count: Set(Some(salary.data_points_count)),
            source_platform: Set(Some(salary.source_platform.as_str().to_string())),
            job_type: Set(Some(salary.job_type.as_str().to_string())),
            currency: Set(salary.currency.to_string()),
            upvotes: Set(0),
            downvotes: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        record.insert(self.write_conn()).await.map_err(Into::into)
    }

    async fn find_salary(&self, id: Uuid) -> Result<Option<SalaryRecord>> {
        SalaryEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_salaries(
        &self,
        filter: &SalaryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<SalaryRecord>, u64)> {
        let started = Instant::now();
        let mut query = SalaryEntity::find();

        if let Some(ref company) = filter.company {
            query = query.filter(contains_ci(SalaryColumn::CompanyName, company));
        }
        if let Some(ref designation) = filter.designation {
            query = query.filter(contains_ci(SalaryColumn::Designation, designation));
        }
        if let Some(ref location) = filter.location {
            query = query.filter(contains_ci(SalaryColumn::Location, location));
        }
        if let Some(job_type) = filter.job_type {
            query = query.filter(SalaryColumn::JobType.eq(job_type.as_str()));
        }

        let total = query.clone().count(self.read_conn()).await?;
        let salaries = query
            .order_by_desc(SalaryColumn::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        crate::metrics::record_db_query("list_salaries", started.elapsed().as_secs_f64());
        Ok((salaries, total))
    }
}

#[async_trait]
impl VoteStore for Repository {
    async fn salary_vote(&self, salary_id: Uuid, user_id: Uuid) -> Result<Option<VoteType>> {
        let vote = SalaryVoteEntity::find()
            .filter(SalaryVoteColumn::SalaryId.eq(salary_id))
            .filter(SalaryVoteColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await?;

        Ok(vote.and_then(|v| VoteType::parse(&v.vote_type)))
    }

    async fn apply_salary_vote(
        &self,
        salary_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)> {
        self.apply_vote(VoteTarget::Salary, salary_id, user_id, requested)
            .await
    }

    async fn apply_comment_vote(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        requested: VoteType,
    ) -> Result<(VoteAction, VoteTally)> {
        self.apply_vote(VoteTarget::Comment, comment_id, user_id, requested)
            .await
    }
}

#[async_trait]
impl CommentStore for Repository {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let attachments = serde_json::to_value(&comment.attachments)?;

        let model = CommentActiveModel {
            id: Set(Uuid::new_v4()),
            salary_id: Set(comment.salary_id),
            user_id: Set(comment.user_id),
            display_name: Set(comment.display_name),
            photo_url: Set(comment.photo_url),
            content: Set(comment.content),
            attachments: Set(attachments),
            upvotes: Set(0),
            downvotes: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        CommentEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn list_comments(
        &self,
        salary_id: Uuid,
        sort: CommentSort,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Comment>, u64)> {
        let query = CommentEntity::find().filter(CommentColumn::SalaryId.eq(salary_id));
        let total = query.clone().count(self.read_conn()).await?;

        let ordered = match sort {
            CommentSort::Best => query
                .order_by(Expr::cust("upvotes - downvotes"), Order::Desc)
                .order_by_desc(CommentColumn::CreatedAt),
            CommentSort::Top => query
                .order_by_desc(CommentColumn::Upvotes)
                .order_by_desc(CommentColumn::CreatedAt),
            CommentSort::Newest => query.order_by_desc(CommentColumn::CreatedAt),
            CommentSort::Oldest => query.order_by_asc(CommentColumn::CreatedAt),
        };

        let comments = ordered
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok((comments, total))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = CommentEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl Store for Repository {
    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_vote_target_tables() {
        assert_eq!(
            VoteTarget::Salary.tables(),
            ("salaries", "salary_votes", "salary_id")
        );
        assert!(matches!(
            VoteTarget::Comment.not_found(Uuid::nil()),
            AppError::CommentNotFound { .. }
        ));
    }
}
