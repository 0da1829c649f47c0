//! 多条目评估记录实体
//!
//! 教学负荷、活动记录、会议参与、大学服务和科研产出共用此表，
//! 每人每年允许多条记录。payload 为按类别目录校验后的 JSON 文本。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub year: i32,
    pub payload: String,
    // 科研产出的受控词汇标签，提升为独立列以便 KPI 精确匹配
    pub research_type: Option<String>,
    pub publisher_kind: Option<String>,
    pub created_at: i64,
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
    pub fn into_entry(self) -> crate::models::evaluations::entities::EvaluationEntry {
        use crate::models::evaluations::entities::{
            EvaluationCategory, EvaluationEntry, PublisherKind, ResearchType,
        };
        use chrono::{DateTime, Utc};

        EvaluationEntry {
            id: self.id,
            user_id: self.user_id,
            category: self
                .category
                .parse::<EvaluationCategory>()
                .unwrap_or(EvaluationCategory::ActivityLog),
            year: self.year,
            payload: serde_json::from_str(&self.payload).unwrap_or(serde_json::Value::Null),
            research_type: self
                .research_type
                .and_then(|t| t.parse::<ResearchType>().ok()),
            publisher_kind: self
                .publisher_kind
                .and_then(|k| k.parse::<PublisherKind>().ok()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
