//! 单表单评估实体
//!
//! 教学评估、师德责任、大学评估和科研生产共用此表。
//! (user_id, category, year) 上的唯一索引保证每人每年至多一次自评；
//! evaluation_sum 为 NULL 表示尚未被系主任/管理员打分。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_forms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub year: i32,
    pub criteria: String,
    pub aspects_sum: i64,
    pub evaluation_criteria: Option<String>,
    pub evaluation_sum: Option<i64>,
    pub scored_by: Option<i64>,
    pub scored_at: Option<i64>,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_form(self) -> crate::models::evaluations::entities::EvaluationForm {
        use crate::models::evaluations::entities::{
            EvaluationCategory, EvaluationForm, ScoringOverlay,
        };
        use chrono::{DateTime, Utc};

        let overlay = match (self.evaluation_criteria, self.evaluation_sum, self.scored_by) {
            (Some(criteria), Some(sum), Some(scorer)) => Some(ScoringOverlay {
                criteria: serde_json::from_str(&criteria).unwrap_or(serde_json::Value::Null),
                evaluation_sum: sum,
                scored_by: scorer,
                scored_at: self
                    .scored_at
                    .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            }),
            _ => None,
        };

        EvaluationForm {
            id: self.id,
            user_id: self.user_id,
            category: self
                .category
                .parse::<EvaluationCategory>()
                .unwrap_or(EvaluationCategory::EvaluationAspects),
            year: self.year,
            criteria: serde_json::from_str(&self.criteria).unwrap_or(serde_json::Value::Null),
            aspects_sum: self.aspects_sum,
            scoring: overlay,
            submitted_at: DateTime::<Utc>::from_timestamp(self.submitted_at, 0).unwrap_or_default(),
        }
    }
}
