use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, responses::UserResponse},
};

pub async fn get_user(
    service: &UserService,
    user_id: i64,
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

    let target = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "用户不存在",
            )));
        }
        Err(e) => return Ok(crate::services::storage_error_response(&e)),
    };

    // 可见性：本人、本科室系主任、管理员
    let visible = match current_user.role {
        UserRole::Admin => true,
        UserRole::Head => current_user.department == target.department,
        UserRole::User => current_user.id == target.id,
    };
    if !visible {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "没有查看该用户的权限",
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user: target }, "查询成功")))
}
