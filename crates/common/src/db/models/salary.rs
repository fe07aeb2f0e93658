//! Salary entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub company_name: String,

    #[sea_orm(column_type = "Text")]
    pub designation: String,

    #[sea_orm(column_type = "Text")]
    pub location: String,

    pub years_of_experience: Option<f64>,

    pub base_salary: Option<f64>,

    pub bonus: Option<f64>,

    pub stock_compensation: Option<f64>,

    pub total_compensation: Option<f64>,

    pub avg_salary: Option<f64>,

    pub min_salary: Option<f64>,

    pub max_salary: Option<f64>,

    /// Set only for internship rows
    pub stipend_avg: Option<f64>,

    pub data_points_count: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub source_platform: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub job_type: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub currency: String,

    /// Maintained by the vote store, never written directly
    pub upvotes: i32,

    pub downvotes: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::salary_vote::Entity")]
    Votes,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::salary_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
