use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Department).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建多条目评估表（教学负荷、活动、会议参与、大学服务、科研产出）
        manager
            .create_table(
                Table::create()
                    .table(EvaluationEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEntries::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEntries::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEntries::Year)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationEntries::Payload).text().not_null())
                    .col(
                        ColumnDef::new(EvaluationEntries::ResearchType)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEntries::PublisherKind)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEntries::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationEntries::Table, EvaluationEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建单表单评估表（教学评估、师德、大学评估、科研生产）
        manager
            .create_table(
                Table::create()
                    .table(EvaluationForms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationForms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationForms::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationForms::Category)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationForms::Year).integer().not_null())
                    .col(ColumnDef::new(EvaluationForms::Criteria).text().not_null())
                    .col(
                        ColumnDef::new(EvaluationForms::AspectsSum)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationForms::EvaluationCriteria)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationForms::EvaluationSum)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(EvaluationForms::ScoredBy).big_integer().null())
                    .col(ColumnDef::new(EvaluationForms::ScoredAt).big_integer().null())
                    .col(
                        ColumnDef::new(EvaluationForms::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationForms::Table, EvaluationForms::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 用户表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_department")
                    .table(Users::Table)
                    .col(Users::Department)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // 多条目表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_entries_user_id")
                    .table(EvaluationEntries::Table)
                    .col(EvaluationEntries::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_entries_category_year")
                    .table(EvaluationEntries::Table)
                    .col(EvaluationEntries::Category)
                    .col(EvaluationEntries::Year)
                    .to_owned(),
            )
            .await?;

        // 提交防重的唯一索引：每人每类每年至多一条自评表单
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_evaluation_forms_user_category_year")
                    .table(EvaluationForms::Table)
                    .col(EvaluationForms::UserId)
                    .col(EvaluationForms::Category)
                    .col(EvaluationForms::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_forms_category_year")
                    .table(EvaluationForms::Table)
                    .col(EvaluationForms::Category)
                    .col(EvaluationForms::Year)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(EvaluationForms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    Department,
    FullName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EvaluationEntries {
    Table,
    Id,
    UserId,
    Category,
    Year,
    Payload,
    ResearchType,
    PublisherKind,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EvaluationForms {
    Table,
    Id,
    UserId,
    Category,
    Year,
    Criteria,
    AspectsSum,
    EvaluationCriteria,
    EvaluationSum,
    ScoredBy,
    ScoredAt,
    SubmittedAt,
}
