//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_faculty_eval_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum FacultyEvalError {
            $($variant(String),)*
        }

        impl FacultyEvalError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(FacultyEvalError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(FacultyEvalError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(FacultyEvalError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl FacultyEvalError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        FacultyEvalError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_faculty_eval_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    TransientStore("E004", "Transient Store Error"),
    Validation("E005", "Validation Error"),
    DuplicateSubmission("E006", "Duplicate Submission"),
    AlreadyScored("E007", "Already Scored"),
    Forbidden("E008", "Forbidden"),
    UnknownDepartment("E009", "Unknown Department"),
    EmptyCohort("E010", "Empty Cohort"),
    NotFound("E011", "Resource Not Found"),
    Serialization("E012", "Serialization Error"),
    Authentication("E013", "Authentication Error"),
}

impl FacultyEvalError {
    /// 是否可重试（瞬时存储故障），区别于约束冲突等确定性失败
    pub fn is_retryable(&self) -> bool {
        matches!(self, FacultyEvalError::TransientStore(_))
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for FacultyEvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FacultyEvalError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for FacultyEvalError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            // 连接失败属于瞬时错误，调用方可重试；约束冲突在存储层单独映射
            sea_orm::DbErr::Conn(e) => FacultyEvalError::TransientStore(e.to_string()),
            sea_orm::DbErr::ConnectionAcquire(e) => FacultyEvalError::TransientStore(e.to_string()),
            other => FacultyEvalError::DatabaseOperation(other.to_string()),
        }
    }
}

impl From<std::io::Error> for FacultyEvalError {
    fn from(err: std::io::Error) -> Self {
        FacultyEvalError::TransientStore(err.to_string())
    }
}

impl From<serde_json::Error> for FacultyEvalError {
    fn from(err: serde_json::Error) -> Self {
        FacultyEvalError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for FacultyEvalError {
    fn from(err: chrono::ParseError) -> Self {
        FacultyEvalError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FacultyEvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FacultyEvalError::database_config("test").code(), "E001");
        assert_eq!(FacultyEvalError::validation("test").code(), "E005");
        assert_eq!(FacultyEvalError::duplicate_submission("test").code(), "E006");
        assert_eq!(FacultyEvalError::already_scored("test").code(), "E007");
        assert_eq!(FacultyEvalError::empty_cohort("test").code(), "E010");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            FacultyEvalError::duplicate_submission("test").error_type(),
            "Duplicate Submission"
        );
        assert_eq!(
            FacultyEvalError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = FacultyEvalError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FacultyEvalError::transient_store("pool exhausted").is_retryable());
        assert!(!FacultyEvalError::duplicate_submission("dup").is_retryable());
        assert!(!FacultyEvalError::already_scored("scored").is_retryable());
    }

    #[test]
    fn test_format_simple() {
        let err = FacultyEvalError::unknown_department("Radiology");
        let formatted = err.format_simple();
        assert!(formatted.contains("Unknown Department"));
        assert!(formatted.contains("Radiology"));
    }
}
