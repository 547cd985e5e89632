use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SessionCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionCodes::SessionId).uuid().not_null())
                    .col(ColumnDef::new(SessionCodes::PresenterId).uuid().not_null())
                    .col(
                        ColumnDef::new(SessionCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SessionCodes::ValidFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionCodes::ValidUntil)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionCodes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SessionCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SessionCodes::Table, SessionCodes::SessionId)
                            .to(ClassSessions::Table, ClassSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SessionCodes::Table)
                    .col(SessionCodes::SessionId)
                    .name("idx_session_codes_session_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SessionCodes {
    Table,
    Id,
    SessionId,
    PresenterId,
    Code,
    ValidFrom,
    ValidUntil,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum ClassSessions {
    Table,
    Id,
}
