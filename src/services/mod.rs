pub mod auth;
pub mod evaluations;
pub mod reports;
pub mod users;

pub use auth::AuthService;
pub use evaluations::EvaluationService;
pub use reports::ReportService;
pub use users::UserService;

use actix_web::HttpResponse;
use chrono::Datelike;

use crate::errors::FacultyEvalError;
use crate::models::{ApiResponse, ErrorCode};

/// 当前评估年度（UTC）
pub(crate) fn current_evaluation_year() -> i32 {
    chrono::Utc::now().year()
}

/// 把领域错误映射为统一的 HTTP 响应
///
/// 校验与幂等冲突都带具体原因返回给调用方，绝不吞掉后默认成功；
/// 瞬时存储故障返回 503，调用方可重试。
pub(crate) fn storage_error_response(err: &FacultyEvalError) -> HttpResponse {
    let message = err.message().to_string();
    match err {
        FacultyEvalError::Validation(_) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message)),
        FacultyEvalError::DuplicateSubmission(_) => HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::DuplicateSubmission, message),
        ),
        FacultyEvalError::AlreadyScored(_) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::AlreadyScored, message)),
        FacultyEvalError::Forbidden(_) => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::Forbidden, message)),
        FacultyEvalError::UnknownDepartment(_) => HttpResponse::NotFound().json(
            ApiResponse::error_empty(ErrorCode::UnknownDepartment, message),
        ),
        FacultyEvalError::EmptyCohort(_) => HttpResponse::UnprocessableEntity()
            .json(ApiResponse::error_empty(ErrorCode::EmptyCohort, message)),
        FacultyEvalError::NotFound(_) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, message)),
        FacultyEvalError::TransientStore(_) => HttpResponse::ServiceUnavailable().json(
            ApiResponse::error_empty(ErrorCode::ServiceUnavailable, message),
        ),
        _ => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            message,
        )),
    }
}
