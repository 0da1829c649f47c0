use serde::Deserialize;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// 用户名
    pub username: String,
    /// 密码
    pub password: String,
    /// 是否记住我
    #[serde(default)]
    pub remember_me: bool,
}

// 用户注册请求，角色固定为普通教师
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub department: String,
}

// 个人资料更新请求（不允许修改角色和所属科室）
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub password: Option<String>,
    pub full_name: Option<String>,
}
