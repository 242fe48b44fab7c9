use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Policies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Policies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Policies::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Policies::Title).string().not_null())
                    .col(ColumnDef::new(Policies::BodyMarkdown).text())
                    .col(ColumnDef::new(Policies::FileKey).string())
                    .col(ColumnDef::new(Policies::ContentSha256).string().not_null())
                    .col(ColumnDef::new(Policies::Version).integer().not_null())
                    .col(ColumnDef::new(Policies::DueAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Policies::RequireTypedSignature)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Policies::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Policies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Policies::Table, Policies::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Policies::Table)
                    .col(Policies::WorkspaceId)
                    .name("idx_policies_workspace_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Policies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Policies {
    Table,
    Id,
    WorkspaceId,
    Title,
    BodyMarkdown,
    FileKey,
    ContentSha256,
    Version,
    DueAt,
    RequireTypedSignature,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
