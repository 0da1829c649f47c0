use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::requests::DossierQuery;
use crate::models::evaluations::responses::DossierResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_evaluation_year;

/// 某教师的年度档案（全类别汇总视图）
///
/// 可见性：本人、本科室系主任、管理员。
pub async fn get_dossier(
    service: &EvaluationService,
    request: &HttpRequest,
    target_user_id: i64,
    query: DossierQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

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

    let visible = match current_user.role {
        UserRole::Admin => true,
        UserRole::Head => current_user.department == target.department,
        UserRole::User => current_user.id == target.id,
    };
    if !visible {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看该档案的权限",
        )));
    }

    let year = query.year.unwrap_or_else(current_evaluation_year);

    let forms = match storage.list_user_forms(target.id, year).await {
        Ok(forms) => forms,
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };
    let entries = match storage.list_user_entries(target.id, year).await {
        Ok(entries) => entries,
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        DossierResponse {
            user: target,
            year,
            forms,
            entries,
        },
        "查询成功",
    )))
}
