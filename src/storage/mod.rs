use std::sync::Arc;

use crate::models::{
    evaluations::{
        entities::{EvaluationCategory, EvaluationEntry, EvaluationForm},
        requests::{FormKey, NewEntry, NewForm, ScoringUpdate},
    },
    reports::KpiCounts,
    scope::Scope,
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 在可见范围内列出用户
    async fn list_users_with_pagination(
        &self,
        scope: &Scope,
        query: UserListQuery,
    ) -> Result<UserListResponse>;
    // 更新用户信息（role/department 仅管理操作使用）
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 科室是否存在（至少有一名用户归属）
    async fn department_exists(&self, department: &str) -> Result<bool>;

    /// 评估提交方法
    // 写入多条目记录
    async fn insert_entry(&self, entry: NewEntry) -> Result<EvaluationEntry>;
    // 写入单表单自评；(user_id, category, year) 唯一索引冲突映射为 DuplicateSubmission
    async fn try_insert_form(&self, form: NewForm) -> Result<EvaluationForm>;
    // 施加打分叠加层；条件更新保证并发下至多一次成功，
    // 已打分返回 AlreadyScored，自评不存在返回 NotFound
    async fn apply_scoring(&self, key: FormKey, scoring: ScoringUpdate) -> Result<EvaluationForm>;
    // 获取单表单
    async fn get_form(&self, key: FormKey) -> Result<Option<EvaluationForm>>;
    // 在可见范围内列出单表单
    async fn list_forms(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationForm>>;
    // 在可见范围内列出多条目记录
    async fn list_entries(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationEntry>>;
    // 某教师某年的全部单表单（档案视图）
    async fn list_user_forms(&self, user_id: i64, year: i32) -> Result<Vec<EvaluationForm>>;
    // 某教师某年的全部多条目记录（档案视图）
    async fn list_user_entries(&self, user_id: i64, year: i32) -> Result<Vec<EvaluationEntry>>;

    /// KPI 聚合：一个一致快照内取出全部原始统计量
    async fn fetch_kpi_counts(&self, scope: &Scope, year: i32) -> Result<KpiCounts>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
