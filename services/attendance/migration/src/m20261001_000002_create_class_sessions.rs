use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassSessions::ClassId).uuid().not_null())
                    .col(ColumnDef::new(ClassSessions::Subject).string().not_null())
                    .col(ColumnDef::new(ClassSessions::Room).string())
                    .col(ColumnDef::new(ClassSessions::PresenterId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClassSessions::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSessions::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassSessions::Table, ClassSessions::PresenterId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ClassSessions::Table)
                    .col(ClassSessions::PresenterId)
                    .name("idx_class_sessions_presenter_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ClassSessions {
    Table,
    Id,
    ClassId,
    Subject,
    Room,
    PresenterId,
    StartsAt,
    EndsAt,
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
}
