use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Acknowledgments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Acknowledgments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Acknowledgments::AssignmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Acknowledgments::SignerName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Acknowledgments::SignerEmail)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Acknowledgments::TypedSignature).string())
                    .col(ColumnDef::new(Acknowledgments::IpAddress).string_len(45))
                    .col(ColumnDef::new(Acknowledgments::UserAgent).text())
                    .col(
                        ColumnDef::new(Acknowledgments::PolicyVersion)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Acknowledgments::PolicyHashAtAck)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Acknowledgments::AckMethod).string().not_null())
                    .col(
                        ColumnDef::new(Acknowledgments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Acknowledgments::Table, Acknowledgments::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The authoritative race-breaker: concurrent acknowledge calls for the
        // same assignment are resolved here, not by a prior read.
        manager
            .create_index(
                Index::create()
                    .table(Acknowledgments::Table)
                    .col(Acknowledgments::AssignmentId)
                    .unique()
                    .name("idx_acknowledgments_assignment_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Acknowledgments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Acknowledgments {
    Table,
    Id,
    AssignmentId,
    SignerName,
    SignerEmail,
    TypedSignature,
    IpAddress,
    UserAgent,
    PolicyVersion,
    PolicyHashAtAck,
    AckMethod,
    CreatedAt,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
}
