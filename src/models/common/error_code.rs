//! API 业务错误码
//!
//! 按 HTTP 状态码分组：4xxyy，yy 为组内序号。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 400 参数/校验
    BadRequest = 40000,
    ValidationFailed = 40001,
    UnknownCategory = 40002,
    UserNameInvalid = 40003,
    UserPasswordInvalid = 40004,

    // 401 认证
    Unauthorized = 40100,
    AuthFailed = 40101,

    // 403 授权
    Forbidden = 40300,

    // 404 资源
    NotFound = 40400,
    UserNotFound = 40401,
    EvaluationNotFound = 40402,
    UnknownDepartment = 40403,

    // 409 幂等冲突
    Conflict = 40900,
    UserAlreadyExists = 40901,
    DuplicateSubmission = 40902,
    AlreadyScored = 40903,

    // 422 聚合
    EmptyCohort = 42200,

    // 5xx 服务端
    InternalServerError = 50000,
    ServiceUnavailable = 50300,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::DuplicateSubmission as i32, 40902);
        assert_eq!(ErrorCode::AlreadyScored as i32, 40903);
        assert_eq!(ErrorCode::EmptyCohort as i32, 42200);
    }
}
