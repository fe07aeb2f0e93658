//! Comment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub salary_id: Uuid,

    /// Null for anonymous comments
    pub user_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub display_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub photo_url: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Array of attachment descriptors
    #[sea_orm(column_type = "JsonBinary")]
    pub attachments: serde_json::Value,

    pub upvotes: i32,

    pub downvotes: i32,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Net score used by the "best" ordering
    pub fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::salary::Entity",
        from = "Column::SalaryId",
        to = "super::salary::Column::Id",
        on_delete = "Cascade"
    )]
    Salary,

    #[sea_orm(has_many = "super::comment_vote::Entity")]
    Votes,
}

impl Related<super::salary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Salary.def()
    }
}

impl Related<super::comment_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
