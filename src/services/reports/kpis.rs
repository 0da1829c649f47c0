use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReportService;
use crate::errors::FacultyEvalError;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::requests::EvaluationListQuery;
use crate::models::reports::KpiReport;
use crate::models::scope::{Caller, Scope, resolve_scope};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::current_evaluation_year;

/// 年度 KPI 报表
///
/// 权限：系主任（本科室）与管理员（全局或指定科室）。
/// 原始统计量在一个一致快照内取得，百分比推导是纯函数，
/// 空科室返回 422 而不是除零崩溃。
pub async fn get_kpi_report(
    service: &ReportService,
    request: &HttpRequest,
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

    // 路由层已有 RequireRole，这里按显式调用者再验一次
    if !matches!(current_user.role, UserRole::Head | UserRole::Admin) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看报表的权限",
        )));
    }

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

    let counts = match storage.fetch_kpi_counts(&scope, year).await {
        Ok(counts) => counts,
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };

    match KpiReport::from_counts(scope.label(), year, counts) {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report, "查询成功"))),
        Err(e) => Ok(crate::services::storage_error_response(&e)),
    }
}
