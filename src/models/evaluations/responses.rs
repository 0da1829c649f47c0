use serde::Serialize;

use super::entities::{EvaluationEntry, EvaluationForm};
use crate::models::users::entities::User;

// 提交成功响应
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub record_id: i64,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspects_sum: Option<i64>,
}

// 打分成功响应
#[derive(Debug, Serialize)]
pub struct ScoringResponse {
    pub form: EvaluationForm,
}

// 多条目列表响应
#[derive(Debug, Serialize)]
pub struct EvaluationEntryListResponse {
    pub items: Vec<EvaluationEntry>,
}

// 单表单列表响应
#[derive(Debug, Serialize)]
pub struct EvaluationFormListResponse {
    pub items: Vec<EvaluationForm>,
}

// 教师年度档案（所有类别的汇总视图）
#[derive(Debug, Serialize)]
pub struct DossierResponse {
    pub user: User,
    pub year: i32,
    pub forms: Vec<EvaluationForm>,
    pub entries: Vec<EvaluationEntry>,
}
