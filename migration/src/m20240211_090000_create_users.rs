use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per distinct email that has ever signed in. The unique
        // constraint on email turns a concurrent duplicate first login into an
        // insert conflict that the application resolves with a lookup.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS exercise_catalog.users (
                id SERIAL PRIMARY KEY,
                name VARCHAR(250) NOT NULL,
                email VARCHAR(250) NOT NULL,
                picture TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT users_email_key UNIQUE(email)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS exercise_catalog.users")
            .await?;

        Ok(())
    }
}
