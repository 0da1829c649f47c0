//! 评估提交与打分的存储操作
//!
//! 幂等性由存储自身串行化：自评靠 (user_id, category, year) 唯一索引，
//! 打分靠 evaluation_sum IS NULL 的条件更新，应用层不做先查后写。

use super::{SeaOrmStorage, scope_condition};
use crate::entity::evaluation_entries::{
    ActiveModel as EntryActiveModel, Column as EntryColumn, Entity as EvaluationEntries,
};
use crate::entity::evaluation_forms::{
    ActiveModel as FormActiveModel, Column as FormColumn, Entity as EvaluationForms,
};
use crate::errors::{FacultyEvalError, Result};
use crate::models::{
    evaluations::{
        entities::{EvaluationCategory, EvaluationEntry, EvaluationForm},
        requests::{FormKey, NewEntry, NewForm, ScoringUpdate},
    },
    scope::Scope,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 写入多条目记录
    pub async fn insert_entry_impl(&self, entry: NewEntry) -> Result<EvaluationEntry> {
        let now = chrono::Utc::now().timestamp();
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|e| FacultyEvalError::serialization(format!("序列化提交内容失败: {e}")))?;

        let model = EntryActiveModel {
            user_id: Set(entry.user_id),
            category: Set(entry.category.to_string()),
            year: Set(entry.year),
            payload: Set(payload),
            research_type: Set(entry.research_type.map(|t| t.to_string())),
            publisher_kind: Set(entry.publisher_kind.map(|k| k.to_string())),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("创建评估记录失败: {e}")))?;

        Ok(result.into_entry())
    }

    /// 写入单表单自评
    ///
    /// 重复提交不在应用层预查，由唯一索引一次写入裁决。
    pub async fn try_insert_form_impl(&self, form: NewForm) -> Result<EvaluationForm> {
        let now = chrono::Utc::now().timestamp();
        let criteria = serde_json::to_string(&form.criteria)
            .map_err(|e| FacultyEvalError::serialization(format!("序列化自评指标失败: {e}")))?;

        let model = FormActiveModel {
            user_id: Set(form.user_id),
            category: Set(form.category.to_string()),
            year: Set(form.year),
            criteria: Set(criteria),
            aspects_sum: Set(form.aspects_sum),
            submitted_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(result.into_form()),
            Err(e) => {
                if matches!(
                    e.sql_err(),
                    Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                ) {
                    Err(FacultyEvalError::duplicate_submission(format!(
                        "用户 {} 在 {} 年已提交过 {}",
                        form.user_id, form.year, form.category
                    )))
                } else {
                    Err(FacultyEvalError::database_operation(format!(
                        "创建评估表单失败: {e}"
                    )))
                }
            }
        }
    }

    /// 施加打分叠加层
    ///
    /// 单条 UPDATE 带 evaluation_sum IS NULL 条件，并发打分至多一次生效；
    /// 影响行数为零时回读区分 AlreadyScored 与 NotFound。
    pub async fn apply_scoring_impl(
        &self,
        key: FormKey,
        scoring: ScoringUpdate,
    ) -> Result<EvaluationForm> {
        let now = chrono::Utc::now().timestamp();
        let criteria = serde_json::to_string(&scoring.criteria)
            .map_err(|e| FacultyEvalError::serialization(format!("序列化打分指标失败: {e}")))?;

        let result = EvaluationForms::update_many()
            .col_expr(FormColumn::EvaluationCriteria, Expr::value(criteria))
            .col_expr(FormColumn::EvaluationSum, Expr::value(scoring.evaluation_sum))
            .col_expr(FormColumn::ScoredBy, Expr::value(scoring.scored_by))
            .col_expr(FormColumn::ScoredAt, Expr::value(now))
            .filter(FormColumn::UserId.eq(key.user_id))
            .filter(FormColumn::Category.eq(key.category.to_string()))
            .filter(FormColumn::Year.eq(key.year))
            .filter(FormColumn::EvaluationSum.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("写入打分失败: {e}")))?;

        if result.rows_affected == 0 {
            return match self.get_form_impl(key).await? {
                Some(_) => Err(FacultyEvalError::already_scored(format!(
                    "用户 {} 的 {} 在 {} 年已被打分",
                    key.user_id, key.category, key.year
                ))),
                None => Err(FacultyEvalError::not_found(format!(
                    "用户 {} 在 {} 年没有 {} 自评",
                    key.user_id, key.year, key.category
                ))),
            };
        }

        self.get_form_impl(key).await?.ok_or_else(|| {
            FacultyEvalError::database_operation("打分后读取表单失败".to_string())
        })
    }

    /// 获取单表单
    pub async fn get_form_impl(&self, key: FormKey) -> Result<Option<EvaluationForm>> {
        let result = EvaluationForms::find()
            .filter(FormColumn::UserId.eq(key.user_id))
            .filter(FormColumn::Category.eq(key.category.to_string()))
            .filter(FormColumn::Year.eq(key.year))
            .one(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("查询评估表单失败: {e}")))?;

        Ok(result.map(|m| m.into_form()))
    }

    /// 在可见范围内列出单表单
    pub async fn list_forms_impl(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationForm>> {
        let forms = EvaluationForms::find()
            .filter(FormColumn::Category.eq(category.to_string()))
            .filter(FormColumn::Year.eq(year))
            .filter(scope_condition(scope, FormColumn::UserId))
            .order_by_desc(FormColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("查询评估表单失败: {e}")))?;

        Ok(forms.into_iter().map(|m| m.into_form()).collect())
    }

    /// 在可见范围内列出多条目记录
    pub async fn list_entries_impl(
        &self,
        scope: &Scope,
        category: EvaluationCategory,
        year: i32,
    ) -> Result<Vec<EvaluationEntry>> {
        let entries = EvaluationEntries::find()
            .filter(EntryColumn::Category.eq(category.to_string()))
            .filter(EntryColumn::Year.eq(year))
            .filter(scope_condition(scope, EntryColumn::UserId))
            .order_by_desc(EntryColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("查询评估记录失败: {e}")))?;

        Ok(entries.into_iter().map(|m| m.into_entry()).collect())
    }

    /// 某教师某年的全部单表单
    pub async fn list_user_forms_impl(&self, user_id: i64, year: i32) -> Result<Vec<EvaluationForm>> {
        let forms = EvaluationForms::find()
            .filter(FormColumn::UserId.eq(user_id))
            .filter(FormColumn::Year.eq(year))
            .order_by_asc(FormColumn::Category)
            .all(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("查询评估表单失败: {e}")))?;

        Ok(forms.into_iter().map(|m| m.into_form()).collect())
    }

    /// 某教师某年的全部多条目记录
    pub async fn list_user_entries_impl(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<Vec<EvaluationEntry>> {
        let entries = EvaluationEntries::find()
            .filter(EntryColumn::UserId.eq(user_id))
            .filter(EntryColumn::Year.eq(year))
            .order_by_asc(EntryColumn::Category)
            .order_by_desc(EntryColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| FacultyEvalError::database_operation(format!("查询评估记录失败: {e}")))?;

        Ok(entries.into_iter().map(|m| m.into_entry()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scope::Scope;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::CreateUserRequest;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};
    use serde_json::json;

    // 单连接内存库：多个连接会各自拿到独立的 :memory: 数据库
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

    fn ethics_form(user_id: i64, year: i32) -> NewForm {
        NewForm {
            user_id,
            category: EvaluationCategory::EthicsResponsibility,
            year,
            criteria: json!({
                "professional_values": 5,
                "offer_encouragement": 5,
                "respect_leaders": 5,
                "take_responsibility": 5,
                "decent_appearance": 5,
                "punctuality": 5,
                "office_hours": 5,
            }),
            aspects_sum: 35,
        }
    }

    fn scoring(scorer: i64, sum: i64) -> ScoringUpdate {
        ScoringUpdate {
            criteria: json!({
                "professional_values": 6,
                "offer_encouragement": 6,
                "respect_leaders": 6,
                "take_responsibility": 6,
                "decent_appearance": 6,
                "punctuality": 5,
                "office_hours": 5,
            }),
            evaluation_sum: sum,
            scored_by: scorer,
        }
    }

    #[tokio::test]
    async fn test_first_submission_succeeds_second_rejected() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "alice", UserRole::User, "Cardiology").await;

        let form = storage
            .try_insert_form_impl(ethics_form(user, 2026))
            .await
            .expect("first submission");
        assert_eq!(form.aspects_sum, 35);
        assert!(form.scoring.is_none());

        let err = storage
            .try_insert_form_impl(ethics_form(user, 2026))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");

        // 另一年不受影响
        assert!(storage.try_insert_form_impl(ethics_form(user, 2027)).await.is_ok());
    }

    #[tokio::test]
    async fn test_scoring_requires_existing_submission() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "bob", UserRole::User, "Cardiology").await;
        let head = seed_user(&storage, "head1", UserRole::Head, "Cardiology").await;

        let key = FormKey {
            user_id: user,
            category: EvaluationCategory::EthicsResponsibility,
            year: 2026,
        };
        let err = storage
            .apply_scoring_impl(key, scoring(head, 40))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[tokio::test]
    async fn test_second_scoring_rejected() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "carol", UserRole::User, "Cardiology").await;
        let head = seed_user(&storage, "head2", UserRole::Head, "Cardiology").await;

        storage
            .try_insert_form_impl(ethics_form(user, 2026))
            .await
            .expect("submission");

        let key = FormKey {
            user_id: user,
            category: EvaluationCategory::EthicsResponsibility,
            year: 2026,
        };
        let scored = storage
            .apply_scoring_impl(key, scoring(head, 40))
            .await
            .expect("first scoring");
        let overlay = scored.scoring.expect("overlay present");
        assert_eq!(overlay.evaluation_sum, 40);
        assert_eq!(overlay.scored_by, head);

        let err = storage
            .apply_scoring_impl(key, scoring(head, 41))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");

        // 第二次打分没有覆盖第一次的结果
        let unchanged = storage.get_form_impl(key).await.unwrap().unwrap();
        assert_eq!(unchanged.scoring.unwrap().evaluation_sum, 40);
    }

    #[tokio::test]
    async fn test_concurrent_scoring_exactly_one_wins() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "dave", UserRole::User, "Cardiology").await;
        let head = seed_user(&storage, "head3", UserRole::Head, "Cardiology").await;

        storage
            .try_insert_form_impl(ethics_form(user, 2026))
            .await
            .expect("submission");

        let key = FormKey {
            user_id: user,
            category: EvaluationCategory::EthicsResponsibility,
            year: 2026,
        };
        let (left, right) = tokio::join!(
            storage.apply_scoring_impl(key, scoring(head, 40)),
            storage.apply_scoring_impl(key, scoring(head, 41)),
        );

        // 并发打分恰好一个成功，失败的一个必须是 AlreadyScored
        assert!(left.is_ok() != right.is_ok());
        let loser = if left.is_ok() { right } else { left };
        assert_eq!(loser.unwrap_err().code(), "E007");
    }

    #[tokio::test]
    async fn test_scope_visibility_on_listings() {
        let storage = memory_storage().await;
        let cardio = seed_user(&storage, "erin", UserRole::User, "Cardiology").await;
        let radio = seed_user(&storage, "frank", UserRole::User, "Radiology").await;

        for user in [cardio, radio] {
            storage
                .try_insert_form_impl(ethics_form(user, 2026))
                .await
                .expect("submission");
        }

        // 科室范围只见本科室
        let dept_forms = storage
            .list_forms_impl(
                &Scope::Department("Cardiology".into()),
                EvaluationCategory::EthicsResponsibility,
                2026,
            )
            .await
            .unwrap();
        assert_eq!(dept_forms.len(), 1);
        assert_eq!(dept_forms[0].user_id, cardio);

        // 本人范围只见本人
        let self_forms = storage
            .list_forms_impl(
                &Scope::SelfOnly(radio),
                EvaluationCategory::EthicsResponsibility,
                2026,
            )
            .await
            .unwrap();
        assert_eq!(self_forms.len(), 1);
        assert_eq!(self_forms[0].user_id, radio);

        // 全局范围全部可见
        let all_forms = storage
            .list_forms_impl(
                &Scope::Global,
                EvaluationCategory::EthicsResponsibility,
                2026,
            )
            .await
            .unwrap();
        assert_eq!(all_forms.len(), 2);
    }

    #[tokio::test]
    async fn test_multi_entry_allows_repeats() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "grace", UserRole::User, "Cardiology").await;

        for i in 0..3 {
            storage
                .insert_entry_impl(NewEntry {
                    user_id: user,
                    category: EvaluationCategory::ActivityLog,
                    year: 2026,
                    payload: json!({
                        "activity_title": format!("workshop {i}"),
                        "activity_date": "2026-03-01",
                        "duration": "2h",
                        "participation_type": "speaker",
                        "place": "campus",
                    }),
                    research_type: None,
                    publisher_kind: None,
                })
                .await
                .expect("insert entry");
        }

        let entries = storage
            .list_entries_impl(&Scope::SelfOnly(user), EvaluationCategory::ActivityLog, 2026)
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
    }
}
