//! KPI 原始统计量的采集
//!
//! 所有计数/合计在同一个事务内取得，报表不会被并发写入撕裂。

use super::{SeaOrmStorage, scope_condition, scope_condition_on_users};
use crate::entity::evaluation_entries::{Column as EntryColumn, Entity as EvaluationEntries};
use crate::entity::evaluation_forms::{Column as FormColumn, Entity as EvaluationForms};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{FacultyEvalError, Result};
use crate::models::{
    evaluations::entities::{EvaluationCategory, PublisherKind, ResearchType},
    reports::KpiCounts,
    scope::Scope,
    users::entities::UserRole,
};
use sea_orm::sea_query::Alias;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait, IsolationLevel,
    PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};

impl SeaOrmStorage {
    /// 在一个一致快照内取出 KPI 原始统计量
    pub async fn fetch_kpi_counts_impl(&self, scope: &Scope, year: i32) -> Result<KpiCounts> {
        // SQLite 本身串行化写入，不支持显式隔离级别
        let txn = if self.db.get_database_backend() == DbBackend::Sqlite {
            self.db.begin().await
        } else {
            self.db
                .begin_with_config(Some(IsolationLevel::RepeatableRead), None)
                .await
        }
        .map_err(|e| FacultyEvalError::database_operation(format!("开启报表事务失败: {e}")))?;

        let counts = KpiCounts {
            total_academic_records: self
                .count_entries(&txn, scope, year, EvaluationCategory::AcademicLoad)
                .await?,
            active_contributors: self
                .count_distinct_contributors(&txn, scope, year, EvaluationCategory::ActivityLog)
                .await?,
            denominator_users: self.count_eligible_users(&txn, scope).await?,
            university_service_count: self
                .count_entries(&txn, scope, year, EvaluationCategory::UniversityService)
                .await?,
            conference_research_count: self
                .count_research(&txn, scope, year, PublisherKind::Conference)
                .await?,
            journal_research_count: self
                .count_research(&txn, scope, year, PublisherKind::Journal)
                .await?,
            conference_participants: self
                .count_distinct_contributors(
                    &txn,
                    scope,
                    year,
                    EvaluationCategory::ParticipationConference,
                )
                .await?,
            evaluation_aspects_total: self
                .sum_evaluation(&txn, scope, year, EvaluationCategory::EvaluationAspects)
                .await?,
            university_evaluation_total: self
                .sum_evaluation(&txn, scope, year, EvaluationCategory::UniversityEvaluation)
                .await?,
        };

        txn.commit()
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("提交报表事务失败: {e}")))?;

        Ok(counts)
    }

    /// 某类别的多条目记录数
    async fn count_entries(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        year: i32,
        category: EvaluationCategory,
    ) -> Result<i64> {
        let count = EvaluationEntries::find()
            .filter(EntryColumn::Category.eq(category.to_string()))
            .filter(EntryColumn::Year.eq(year))
            .filter(scope_condition(scope, EntryColumn::UserId))
            .count(txn)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("统计评估记录失败: {e}")))?;

        Ok(count as i64)
    }

    /// 某类别下有记录的教师数（去重）
    async fn count_distinct_contributors(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        year: i32,
        category: EvaluationCategory,
    ) -> Result<i64> {
        let count = EvaluationEntries::find()
            .select_only()
            .column(EntryColumn::UserId)
            .distinct()
            .filter(EntryColumn::Category.eq(category.to_string()))
            .filter(EntryColumn::Year.eq(year))
            .filter(scope_condition(scope, EntryColumn::UserId))
            .count(txn)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("统计参与教师失败: {e}")))?;

        Ok(count as i64)
    }

    /// 范围内非管理员用户数（百分比分母）
    async fn count_eligible_users(&self, txn: &DatabaseTransaction, scope: &Scope) -> Result<i64> {
        let count = Users::find()
            .filter(UserColumn::Role.ne(UserRole::Admin.to_string()))
            .filter(scope_condition_on_users(scope))
            .count(txn)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("统计用户数失败: {e}")))?;

        Ok(count as i64)
    }

    /// research 类型且指定发表渠道的科研产出数（精确标签匹配）
    async fn count_research(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        year: i32,
        publisher_kind: PublisherKind,
    ) -> Result<i64> {
        let count = EvaluationEntries::find()
            .filter(EntryColumn::Category.eq(EvaluationCategory::ScientificResearch.to_string()))
            .filter(EntryColumn::Year.eq(year))
            .filter(EntryColumn::ResearchType.eq(ResearchType::Research.to_string()))
            .filter(EntryColumn::PublisherKind.eq(publisher_kind.to_string()))
            .filter(scope_condition(scope, EntryColumn::UserId))
            .count(txn)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("统计科研产出失败: {e}")))?;

        Ok(count as i64)
    }

    /// 某单表单类别的打分合计（未打分的行不计入）
    async fn sum_evaluation(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        year: i32,
        category: EvaluationCategory,
    ) -> Result<i64> {
        use sea_orm::sea_query::ExprTrait;

        // SUM 在部分后端返回 NUMERIC，显式转回 BIGINT
        let total = EvaluationForms::find()
            .select_only()
            .column_as(
                FormColumn::EvaluationSum.sum().cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(FormColumn::Category.eq(category.to_string()))
            .filter(FormColumn::Year.eq(year))
            .filter(scope_condition(scope, FormColumn::UserId))
            .into_tuple::<Option<i64>>()
            .one(txn)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("合计打分失败: {e}")))?
            .flatten()
            .unwrap_or(0);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::requests::{FormKey, NewEntry, NewForm, ScoringUpdate};
    use crate::models::users::requests::CreateUserRequest;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};
    use serde_json::json;

    async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.expect("connect in-memory sqlite");
        migration::Migrator::up(&db, None)
            .await
            .expect("run migrations");
        SeaOrmStorage { db }
    }

    async fn seed_user(
        storage: &SeaOrmStorage,
        username: &str,
        role: UserRole,
        department: &str,
    ) -> i64 {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.to_string(),
                password: "hash".to_string(),
                role,
                department: department.to_string(),
                full_name: username.to_string(),
            })
            .await
            .expect("create user")
            .id
    }

    async fn seed_research(
        storage: &SeaOrmStorage,
        user: i64,
        publisher_kind: PublisherKind,
        research_type: ResearchType,
    ) {
        storage
            .insert_entry_impl(NewEntry {
                user_id: user,
                category: EvaluationCategory::ScientificResearch,
                year: 2026,
                payload: json!({
                    "output_title": "t",
                    "authors": "a",
                    "publisher": "p",
                    "agency": "g",
                    "publication_year": 2026,
                    "research_type": research_type.as_str(),
                    "publisher_kind": publisher_kind.as_str(),
                }),
                research_type: Some(research_type),
                publisher_kind: Some(publisher_kind),
            })
            .await
            .expect("insert research");
    }

    #[tokio::test]
    async fn test_kpi_counts_scoped_by_department() {
        let storage = memory_storage().await;
        let cardio = seed_user(&storage, "alice", UserRole::User, "Cardiology").await;
        let head = seed_user(&storage, "head1", UserRole::Head, "Cardiology").await;
        let radio = seed_user(&storage, "bob", UserRole::User, "Radiology").await;
        // 管理员不计入分母
        seed_user(&storage, "root", UserRole::Admin, "Medical Education").await;

        // 活动记录：cardio 两条（去重后 1 人），radio 一条
        for title in ["w1", "w2"] {
            storage
                .insert_entry_impl(NewEntry {
                    user_id: cardio,
                    category: EvaluationCategory::ActivityLog,
                    year: 2026,
                    payload: json!({
                        "activity_title": title,
                        "activity_date": "2026-01-10",
                        "duration": "1h",
                        "participation_type": "attendee",
                        "place": "campus",
                    }),
                    research_type: None,
                    publisher_kind: None,
                })
                .await
                .expect("insert activity");
        }
        storage
            .insert_entry_impl(NewEntry {
                user_id: radio,
                category: EvaluationCategory::ActivityLog,
                year: 2026,
                payload: json!({
                    "activity_title": "w3",
                    "activity_date": "2026-01-11",
                    "duration": "1h",
                    "participation_type": "attendee",
                    "place": "campus",
                }),
                research_type: None,
                publisher_kind: None,
            })
            .await
            .expect("insert activity");

        // 科研产出：会议 research、期刊 research、会议 review（最后一个不计）
        seed_research(&storage, cardio, PublisherKind::Conference, ResearchType::Research).await;
        seed_research(&storage, cardio, PublisherKind::Journal, ResearchType::Research).await;
        seed_research(&storage, cardio, PublisherKind::Conference, ResearchType::Review).await;

        let counts = storage
            .fetch_kpi_counts_impl(&Scope::Department("Cardiology".into()), 2026)
            .await
            .expect("fetch counts");

        // 本科室 user + head 两人，管理员与其他科室不计
        assert_eq!(counts.denominator_users, 2);
        assert_eq!(counts.active_contributors, 1);
        assert_eq!(counts.conference_research_count, 1);
        assert_eq!(counts.journal_research_count, 1);
        assert_eq!(counts.total_academic_records, 0);

        let global = storage
            .fetch_kpi_counts_impl(&Scope::Global, 2026)
            .await
            .expect("fetch global counts");
        assert_eq!(global.denominator_users, 3);
        assert_eq!(global.active_contributors, 2);
        let _ = head;
    }

    #[tokio::test]
    async fn test_kpi_sums_only_scored_forms() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice", UserRole::User, "Cardiology").await;
        let bob = seed_user(&storage, "bob", UserRole::User, "Cardiology").await;
        let head = seed_user(&storage, "head1", UserRole::Head, "Cardiology").await;

        let criteria = json!({
            "department_load": 5,
            "workshop_development": 5,
            "program_bank": 5,
            "medical_services": 5,
        });
        for user in [alice, bob] {
            storage
                .try_insert_form_impl(NewForm {
                    user_id: user,
                    category: EvaluationCategory::UniversityEvaluation,
                    year: 2026,
                    criteria: criteria.clone(),
                    aspects_sum: 20,
                })
                .await
                .expect("submission");
        }

        // 只给 alice 打分，bob 的表单不计入合计
        storage
            .apply_scoring_impl(
                FormKey {
                    user_id: alice,
                    category: EvaluationCategory::UniversityEvaluation,
                    year: 2026,
                },
                ScoringUpdate {
                    criteria: criteria.clone(),
                    evaluation_sum: 18,
                    scored_by: head,
                },
            )
            .await
            .expect("scoring");

        let counts = storage
            .fetch_kpi_counts_impl(&Scope::Department("Cardiology".into()), 2026)
            .await
            .expect("fetch counts");
        assert_eq!(counts.university_evaluation_total, 18);
        assert_eq!(counts.evaluation_aspects_total, 0);
    }
}
