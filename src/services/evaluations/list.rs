use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EvaluationService, parse_category};
use crate::errors::FacultyEvalError;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::CategoryKind;
use crate::models::evaluations::requests::EvaluationListQuery;
use crate::models::evaluations::responses::{
    EvaluationEntryListResponse, EvaluationFormListResponse,
};
use crate::models::scope::{Caller, Scope, resolve_scope};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_evaluation_year;

/// 列出可见范围内某类别的记录
///
/// 范围由角色解析：普通教师只见本人，系主任固定本科室，
/// 管理员可全局或指定科室。
pub async fn list_evaluations(
    service: &EvaluationService,
    request: &HttpRequest,
    category_raw: &str,
    query: EvaluationListQuery,
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

    let caller = Caller::from_user(&current_user);
    let scope = resolve_scope(&caller, query.department.as_deref());

    // 管理员指定的科室必须存在
    if current_user.role == UserRole::Admin
        && let Scope::Department(ref department) = scope
    {
        match storage.department_exists(department).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(crate::services::storage_error_response(
                    &FacultyEvalError::unknown_department(format!("科室不存在: {department}")),
                ));
            }
            Err(e) => return Ok(crate::services::storage_error_response(&e)),
        }
    }

    let year = query.year.unwrap_or_else(current_evaluation_year);

    match category.kind() {
        CategoryKind::SingleForm => match storage.list_forms(&scope, category, year).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                EvaluationFormListResponse { items },
                "查询成功",
            ))),
            Err(e) => Ok(crate::services::storage_error_response(&e)),
        },
        CategoryKind::MultiEntry => match storage.list_entries(&scope, category, year).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                EvaluationEntryListResponse { items },
                "查询成功",
            ))),
            Err(e) => Ok(crate::services::storage_error_response(&e)),
        },
    }
}
