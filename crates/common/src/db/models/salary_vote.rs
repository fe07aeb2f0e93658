//! Per-user vote on a salary entry

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub salary_id: Uuid,

    pub user_id: Uuid,

    /// "up" or "down"
    #[sea_orm(column_type = "Text")]
    pub vote_type: String,

    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::salary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Salary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
