use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{EvaluationService, parse_category};
use crate::middlewares::RequireJWT;
use crate::models::evaluations::catalog::compute_sum;
use crate::models::evaluations::requests::{FormKey, ScoreEvaluationRequest, ScoringUpdate};
use crate::models::evaluations::responses::ScoringResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_evaluation_year;

/// 给某教师的自评打分
///
/// 权限：系主任（限本科室）与管理员。打分指标集与自评目录一致，
/// 合计在服务端重算。每人每类每年至多被打分一次，重复打分返回 409。
pub async fn score_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    category_raw: &str,
    target_user_id: i64,
    year: Option<i32>,
    req: ScoreEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 路由层已有 RequireRole，这里按显式调用者再验一次
    if !matches!(current_user.role, UserRole::Head | UserRole::Admin) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有打分权限",
        )));
    }

    let category = match parse_category(category_raw) {
        Ok(category) => category,
        Err(resp) => return Ok(resp),
    };

    if !category.is_scoreable() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            format!("类别 {category} 不支持打分"),
        )));
    }

    // 打分对象必须存在
    let target = match storage.get_user_by_id(target_user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "用户不存在",
            )));
        }
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };

    // 系主任只能评估本科室成员
    if current_user.role == UserRole::Head && current_user.department != target.department {
        info!(
            "Head {} attempted to score user {} outside their department",
            current_user.id, target.id
        );
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只能评估本科室成员",
        )));
    }

    let evaluation_sum = match compute_sum(category, &req.fields) {
        Ok(sum) => sum,
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };

    let key = FormKey {
        user_id: target.id,
        category,
        year: year.unwrap_or_else(current_evaluation_year),
    };
    let scoring = ScoringUpdate {
        criteria: serde_json::Value::Object(req.fields),
        evaluation_sum,
        scored_by: current_user.id,
    };

    match storage.apply_scoring(key, scoring).await {
        Ok(form) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ScoringResponse { form },
            "打分成功",
        ))),
        Err(e) => Ok(crate::services::storage_error_response(&e)),
    }
}
