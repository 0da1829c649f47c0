use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::errors::FacultyEvalError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    scope::{Caller, Scope, resolve_scope},
    users::{entities::UserRole, requests::UserListQuery},
};

pub async fn list_users(
    service: &UserService,
    query: crate::models::users::requests::UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 可见范围统一由角色解析，head 的 department 参数不起作用
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

    let list_query = UserListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        role: query.role,
        search: query.search,
    };

    match storage.list_users_with_pagination(&scope, list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(crate::services::storage_error_response(&e)),
    }
}
