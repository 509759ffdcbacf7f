use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};

pub async fn create(
    db: &impl ConnectionTrait,
    name: String,
    email: String,
    picture: Option<String>,
) -> Result<Model, Error> {
    debug!("New User to be inserted for email: {email}");

    let user_active_model = ActiveModel {
        name: Set(name),
        email: Set(email),
        picture: Set(picture),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Inserts a user, or returns the existing record when another login created
/// one with the same `email` between the caller's lookup and this insert.
///
/// The loser of that race hits the unique constraint on `users.email` and reads
/// back the winner's row instead of failing.
pub async fn create_or_find(
    db: &impl ConnectionTrait,
    name: String,
    email: String,
    picture: Option<String>,
) -> Result<Model, Error> {
    match create(db, name, email.clone(), picture).await {
        Ok(user) => Ok(user),
        Err(e) => find_after_insert_conflict(db, &email, e).await,
    }
}

// Recovers from a failed insert only when it collided with an existing email.
async fn find_after_insert_conflict(
    db: &impl ConnectionTrait,
    email: &str,
    insert_error: Error,
) -> Result<Model, Error> {
    if insert_error.error_kind != EntityApiErrorKind::RecordAlreadyExists {
        return Err(insert_error);
    }

    info!("User with email {email} was created concurrently, reusing it");
    find_by_email(db, email).await?.ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod test {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    fn test_user(id: Id, email: &str) -> Model {
        Model {
            id,
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            picture: Some("https://example.com/ada.png".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_a_single_record() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let user_email = "test@test.com";
        let _ = find_by_email(&db, user_email).await;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "users"."id", "users"."name", "users"."email", "users"."picture", "users"."created_at" FROM "exercise_catalog"."users" WHERE "users"."email" = $1 LIMIT $2"#,
                [user_email.into(), 1u64.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_by_email_returns_none_for_unknown_email() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        assert_eq!(find_by_email(&db, "nobody@example.com").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_record_not_found_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, 42).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn create_or_find_inserts_new_user() -> Result<(), Error> {
        let created = test_user(1, "a@x.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![created.clone()]])
            .into_connection();

        let user = create_or_find(
            &db,
            created.name.clone(),
            created.email.clone(),
            created.picture.clone(),
        )
        .await?;

        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(db.into_transaction_log().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_or_find_surfaces_other_insert_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = create_or_find(&db, "Ada".to_string(), "a@x.com".to_string(), None).await;

        assert_eq!(result.unwrap_err().error_kind, EntityApiErrorKind::SystemError);
    }

    #[tokio::test]
    async fn insert_conflict_reads_back_the_existing_user() -> Result<(), Error> {
        let winner = test_user(7, "a@x.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![winner.clone()]])
            .into_connection();
        let conflict = Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordAlreadyExists,
        };

        let user = find_after_insert_conflict(&db, "a@x.com", conflict).await?;

        assert_eq!(user.id, winner.id);
        assert_eq!(user.email, winner.email);
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "users"."id", "users"."name", "users"."email", "users"."picture", "users"."created_at" FROM "exercise_catalog"."users" WHERE "users"."email" = $1 LIMIT $2"#,
                ["a@x.com".into(), 1u64.into()]
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn insert_conflict_without_existing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();
        let conflict = Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordAlreadyExists,
        };

        let result = find_after_insert_conflict(&db, "a@x.com", conflict).await;

        assert_eq!(result.unwrap_err().error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[tokio::test]
    async fn other_insert_errors_skip_the_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let failure = Error {
            source: None,
            error_kind: EntityApiErrorKind::SystemError,
        };

        let result = find_after_insert_conflict(&db, "a@x.com", failure).await;

        assert_eq!(result.unwrap_err().error_kind, EntityApiErrorKind::SystemError);
        assert!(db.into_transaction_log().is_empty());
    }
}
