use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EvaluationService, parse_category};
use crate::middlewares::RequireJWT;
use crate::models::evaluations::catalog::{compute_sum, validate_entry};
use crate::models::evaluations::entities::CategoryKind;
use crate::models::evaluations::requests::{NewEntry, NewForm, SubmitEvaluationRequest};
use crate::models::evaluations::responses::SubmissionResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_evaluation_year;

/// 提交本人评估数据
///
/// 提交永远落在当前年度上；单表单类别由唯一索引保证每年至多一次，
/// 重复提交返回 409。
pub async fn submit_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    category_raw: &str,
    req: SubmitEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let category = match parse_category(category_raw) {
        Ok(category) => category,
        Err(resp) => return Ok(resp),
    };

    let year = current_evaluation_year();

    match category.kind() {
        CategoryKind::SingleForm => {
            // 全有或全无：任何坏指标都在写库前整体拒绝
            let aspects_sum = match compute_sum(category, &req.fields) {
                Ok(sum) => sum,
                Err(e) => return Ok(crate::services::storage_error_response(&e)),
            };

            let form = NewForm {
                user_id: current_user.id,
                category,
                year,
                criteria: serde_json::Value::Object(req.fields),
                aspects_sum,
            };

            match storage.try_insert_form(form).await {
                Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
                    SubmissionResponse {
                        record_id: created.id,
                        year,
                        aspects_sum: Some(created.aspects_sum),
                    },
                    "提交成功",
                ))),
                Err(e) => Ok(crate::services::storage_error_response(&e)),
            }
        }
        CategoryKind::MultiEntry => {
            let validated = match validate_entry(category, &req.fields) {
                Ok(validated) => validated,
                Err(e) => return Ok(crate::services::storage_error_response(&e)),
            };

            let entry = NewEntry {
                user_id: current_user.id,
                category,
                year,
                payload: validated.payload,
                research_type: validated.research_type,
                publisher_kind: validated.publisher_kind,
            };

            match storage.insert_entry(entry).await {
                Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
                    SubmissionResponse {
                        record_id: created.id,
                        year,
                        aspects_sum: None,
                    },
                    "提交成功",
                ))),
                Err(e) => Ok(crate::services::storage_error_response(&e)),
            }
        }
    }
}
