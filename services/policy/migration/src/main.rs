use sea_orm_migration::prelude::*;

mod m20260401_000001_create_users;
mod m20260401_000002_create_policies;
mod m20260401_000003_create_assignments;
mod m20260401_000004_create_acknowledgments;
mod m20260401_000005_create_auth_codes;
mod m20260401_000006_create_email_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_users::Migration),
            Box::new(m20260401_000002_create_policies::Migration),
            Box::new(m20260401_000003_create_assignments::Migration),
            Box::new(m20260401_000004_create_acknowledgments::Migration),
            Box::new(m20260401_000005_create_auth_codes::Migration),
            Box::new(m20260401_000006_create_email_events::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
