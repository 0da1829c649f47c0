pub mod dossier;
pub mod list;
pub mod score;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::evaluations::requests::{
    DossierQuery, EvaluationListQuery, ScoreEvaluationRequest, SubmitEvaluationRequest,
};
use crate::storage::Storage;

pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 提交本人评估数据（当前年度）
    pub async fn submit_evaluation(
        &self,
        request: &HttpRequest,
        category: &str,
        req: SubmitEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_evaluation(self, request, category, req).await
    }

    /// 给某教师的自评打分
    pub async fn score_evaluation(
        &self,
        request: &HttpRequest,
        category: &str,
        target_user_id: i64,
        year: Option<i32>,
        req: ScoreEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        score::score_evaluation(self, request, category, target_user_id, year, req).await
    }

    /// 列出可见范围内某类别的记录
    pub async fn list_evaluations(
        &self,
        request: &HttpRequest,
        category: &str,
        query: EvaluationListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_evaluations(self, request, category, query).await
    }

    /// 某教师的年度档案（全类别汇总）
    pub async fn get_dossier(
        &self,
        request: &HttpRequest,
        target_user_id: i64,
        query: DossierQuery,
    ) -> ActixResult<HttpResponse> {
        dossier::get_dossier(self, request, target_user_id, query).await
    }
}

/// 解析路径中的类别段
pub(crate) fn parse_category(
    raw: &str,
) -> Result<crate::models::evaluations::entities::EvaluationCategory, HttpResponse> {
    use crate::models::{ApiResponse, ErrorCode};

    raw.parse().map_err(|_| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UnknownCategory,
            format!("未知的评估类别: {raw}"),
        ))
    })
}
