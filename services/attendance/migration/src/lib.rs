pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_profiles;
mod m20261001_000002_create_class_sessions;
mod m20261001_000003_create_session_codes;
mod m20261001_000004_create_verification_codes;
mod m20261001_000005_create_attendance_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_profiles::Migration),
            Box::new(m20261001_000002_create_class_sessions::Migration),
            Box::new(m20261001_000003_create_session_codes::Migration),
            Box::new(m20261001_000004_create_verification_codes::Migration),
            Box::new(m20261001_000005_create_attendance_records::Migration),
        ]
    }
}
