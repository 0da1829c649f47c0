//! 可见范围解析
//!
//! 所有数据读取都必须先把调用者解析为一个 Scope，再把 Scope 作为
//! user_id 上的过滤谓词应用到查询，禁止在单个查询里手写可见性条件。

use serde::Serialize;

use crate::models::users::entities::{User, UserRole};

/// 管理员请求全部科室时使用的哨兵值
pub const ALL_DEPARTMENTS: &str = "All";

/// 显式调用者身份，替代任何形式的会话全局状态
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: i64,
    pub role: UserRole,
    pub department: String,
}

impl Caller {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role.clone(),
            department: user.department.clone(),
        }
    }
}

/// 行可见范围
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Scope {
    /// 仅本人数据
    SelfOnly(i64),
    /// 单个科室的数据
    Department(String),
    /// 全部数据
    Global,
}

impl Scope {
    /// 范围的展示标签（KPI 报表用）
    pub fn label(&self) -> String {
        match self {
            Scope::SelfOnly(id) => format!("user:{id}"),
            Scope::Department(dept) => dept.clone(),
            Scope::Global => ALL_DEPARTMENTS.to_string(),
        }
    }
}

/// 按调用者角色解析可见范围
///
/// - user: 永远只能看到本人数据，请求参数不起作用
/// - head: 永远固定为本人所在科室，请求参数不起作用
/// - admin: 未指定或指定 "All" 时为全局，否则为指定科室
///
/// admin 指定的科室是否存在由服务层查库确认，本函数保持纯函数。
pub fn resolve_scope(caller: &Caller, requested_department: Option<&str>) -> Scope {
    match caller.role {
        UserRole::User => Scope::SelfOnly(caller.id),
        UserRole::Head => Scope::Department(caller.department.clone()),
        UserRole::Admin => match requested_department {
            None => Scope::Global,
            Some(dept) if dept == ALL_DEPARTMENTS || dept.trim().is_empty() => Scope::Global,
            Some(dept) => Scope::Department(dept.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: UserRole) -> Caller {
        Caller {
            id: 7,
            role,
            department: "Cardiology".to_string(),
        }
    }

    #[test]
    fn test_user_is_always_self_only() {
        let c = caller(UserRole::User);
        assert_eq!(resolve_scope(&c, None), Scope::SelfOnly(7));
        // 请求参数不能扩大普通用户的可见范围
        assert_eq!(resolve_scope(&c, Some("Radiology")), Scope::SelfOnly(7));
        assert_eq!(resolve_scope(&c, Some(ALL_DEPARTMENTS)), Scope::SelfOnly(7));
    }

    #[test]
    fn test_head_is_pinned_to_own_department() {
        let c = caller(UserRole::Head);
        assert_eq!(
            resolve_scope(&c, None),
            Scope::Department("Cardiology".to_string())
        );
        // 系主任请求其他科室时仍然固定为本科室
        assert_eq!(
            resolve_scope(&c, Some("Radiology")),
            Scope::Department("Cardiology".to_string())
        );
        assert_eq!(
            resolve_scope(&c, Some(ALL_DEPARTMENTS)),
            Scope::Department("Cardiology".to_string())
        );
    }

    #[test]
    fn test_admin_scopes() {
        let c = caller(UserRole::Admin);
        assert_eq!(resolve_scope(&c, None), Scope::Global);
        assert_eq!(resolve_scope(&c, Some(ALL_DEPARTMENTS)), Scope::Global);
        assert_eq!(resolve_scope(&c, Some("")), Scope::Global);
        assert_eq!(
            resolve_scope(&c, Some("Radiology")),
            Scope::Department("Radiology".to_string())
        );
    }

    #[test]
    fn test_scope_label() {
        assert_eq!(Scope::Global.label(), "All");
        assert_eq!(Scope::Department("Cardiology".into()).label(), "Cardiology");
        assert_eq!(Scope::SelfOnly(3).label(), "user:3");
    }
}
