//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod evaluations;
mod reports;
mod users;

use crate::config::AppConfig;
use crate::errors::{FacultyEvalError, Result};
use crate::models::scope::Scope;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| FacultyEvalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| FacultyEvalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| FacultyEvalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(FacultyEvalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 把可见范围渲染为 user_id 列上的过滤谓词
///
/// SelfOnly 为直接等值，Department 为 users 表的科室子查询。
/// 所有按 user_id 关联的查询都必须经由此函数应用范围，
/// 不允许在调用点手写可见性条件。
pub(crate) fn scope_condition<C: ColumnTrait>(scope: &Scope, user_id_col: C) -> Condition {
    use crate::entity::users;

    match scope {
        Scope::SelfOnly(user_id) => Condition::all().add(user_id_col.eq(*user_id)),
        Scope::Department(department) => Condition::all().add(
            user_id_col.in_subquery(
                Query::select()
                    .column(users::Column::Id)
                    .from(users::Entity)
                    .and_where(users::Column::Department.eq(department.clone()))
                    .to_owned(),
            ),
        ),
        Scope::Global => Condition::all(),
    }
}

/// 针对 users 表自身的范围谓词（无需子查询）
pub(crate) fn scope_condition_on_users(scope: &Scope) -> Condition {
    use crate::entity::users;

    match scope {
        Scope::SelfOnly(user_id) => Condition::all().add(users::Column::Id.eq(*user_id)),
        Scope::Department(department) => {
            Condition::all().add(users::Column::Department.eq(department.clone()))
        }
        Scope::Global => Condition::all(),
    }
}

// Storage trait 实现
use crate::models::{
    evaluations::{
        entities::{EvaluationCategory, EvaluationEntry, EvaluationForm},
        requests::{FormKey, NewEntry, NewForm, ScoringUpdate},
    },
    reports::KpiCounts,
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn list_users_with_pagination(
        &self,
        scope: &Scope,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(scope, query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn department_exists(&self, department: &str) -> Result<bool> {
        self.department_exists_impl(department).await
    }

    // 评估模块
    async fn insert_entry(&self, entry: NewEntry) -> Result<EvaluationEntry> {
        self.insert_entry_impl(entry).await
    }

    async fn try_insert_form(&self, form: NewForm) -> Result<EvaluationForm> {
        self.try_insert_form_impl(form).await
    }

    async fn apply_scoring(&self, key: FormKey, scoring: ScoringUpdate) -> Result<EvaluationForm> {
        self.apply_scoring_impl(key, scoring).await
    }

    async fn get_form(&self, key: FormKey) -> Result<Option<EvaluationForm>> {
        self.get_form_impl(key).await
    }

    async fn list_forms(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationForm>> {
        self.list_forms_impl(scope, category, year).await
    }

    async fn list_entries(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationEntry>> {
        self.list_entries_impl(scope, category, year).await
    }

    async fn list_user_forms(&self, user_id: i64, year: i32) -> Result<Vec<EvaluationForm>> {
        self.list_user_forms_impl(user_id, year).await
    }

    async fn list_user_entries(&self, user_id: i64, year: i32) -> Result<Vec<EvaluationEntry>> {
        self.list_user_entries_impl(user_id, year).await
    }

    // KPI 模块
    async fn fetch_kpi_counts(&self, scope: &Scope, year: i32) -> Result<KpiCounts> {
        self.fetch_kpi_counts_impl(scope, year).await
    }
}
