use serde::Deserialize;
use serde_json::{Map, Value};

use super::entities::{EvaluationCategory, PublisherKind, ResearchType};

// 评估提交请求（来自HTTP请求），字段集由类别目录校验
#[derive(Debug, Deserialize)]
pub struct SubmitEvaluationRequest {
    pub fields: Map<String, Value>,
}

// 打分请求（来自HTTP请求），指标集与自评目录一致
#[derive(Debug, Deserialize)]
pub struct ScoreEvaluationRequest {
    pub fields: Map<String, Value>,
}

// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct EvaluationListQuery {
    pub department: Option<String>,
    pub year: Option<i32>,
}

// 档案查询参数
#[derive(Debug, Deserialize)]
pub struct DossierQuery {
    pub year: Option<i32>,
}

// 多条目写入（用于存储层）
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub category: EvaluationCategory,
    pub year: i32,
    pub payload: Value,
    pub research_type: Option<ResearchType>,
    pub publisher_kind: Option<PublisherKind>,
}

// 单表单写入（用于存储层）
#[derive(Debug, Clone)]
pub struct NewForm {
    pub user_id: i64,
    pub category: EvaluationCategory,
    pub year: i32,
    pub criteria: Value,
    pub aspects_sum: i64,
}

// 单表单定位键
#[derive(Debug, Clone, Copy)]
pub struct FormKey {
    pub user_id: i64,
    pub category: EvaluationCategory,
    pub year: i32,
}

// 打分叠加写入（用于存储层）
#[derive(Debug, Clone)]
pub struct ScoringUpdate {
    pub criteria: Value,
    pub evaluation_sum: i64,
    pub scored_by: i64,
}
