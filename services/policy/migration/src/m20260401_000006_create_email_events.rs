use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailEvents::AssignmentId).uuid().not_null())
                    .col(ColumnDef::new(EmailEvents::EventType).string().not_null())
                    .col(ColumnDef::new(EmailEvents::ProviderMessageId).string())
                    .col(
                        ColumnDef::new(EmailEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EmailEvents::Table, EmailEvents::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(EmailEvents::Table)
                    .col(EmailEvents::AssignmentId)
                    .name("idx_email_events_assignment_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailEvents {
    Table,
    Id,
    AssignmentId,
    EventType,
    CreatedAt,
    ProviderMessageId,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
}
