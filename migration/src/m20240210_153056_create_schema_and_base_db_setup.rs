use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Every catalog table lives in its own schema, owned by whichever role
        // runs the migrations.
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS exercise_catalog AUTHORIZATION CURRENT_USER;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO exercise_catalog, public;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes every object in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS exercise_catalog CASCADE;")
            .await?;

        Ok(())
    }
}
