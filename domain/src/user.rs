use async_trait::async_trait;
use log::*;
use sea_orm::DatabaseConnection;

use crate::{error::Error, users, Id};

use entity_api::user::{find_by_email, find_by_id};

/// Fields of a local user record created at first login.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// The local user records the login handshake reconciles provider identities
/// against.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Id>, Error>;

    /// Insert a record for `new_user`. When another login created a record
    /// with the same email in the meantime, that record's id is returned.
    async fn create_user(&self, new_user: NewUser) -> Result<Id, Error>;

    async fn get_user(&self, id: Id) -> Result<users::Model, Error>;
}

/// `UserStore` backed by the `users` table.
pub struct DbUserStore<'db> {
    db: &'db DatabaseConnection,
}

impl<'db> DbUserStore<'db> {
    pub fn new(db: &'db DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'db> UserStore for DbUserStore<'db> {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Id>, Error> {
        Ok(find_by_email(self.db, email).await?.map(|user| user.id))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<Id, Error> {
        let user = entity_api::user::create_or_find(
            self.db,
            new_user.name,
            new_user.email,
            new_user.picture,
        )
        .await?;
        debug!("Resolved local user {} for {}", user.id, user.email);
        Ok(user.id)
    }

    async fn get_user(&self, id: Id) -> Result<users::Model, Error> {
        Ok(find_by_id(self.db, id).await?)
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(id: Id, email: &str) -> users::Model {
        users::Model {
            id,
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            picture: None,
            created_at: Default::default(),
        }
    }

    #[tokio::test]
    async fn find_user_by_email_returns_the_id() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user(3, "a@x.com")]])
            .into_connection();

        let store = DbUserStore::new(&db);
        assert_eq!(store.find_user_by_email("a@x.com").await?, Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn create_user_returns_the_new_id() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user(9, "a@x.com")]])
            .into_connection();

        let id = DbUserStore::new(&db)
            .create_user(NewUser {
                name: "Ada Lovelace".to_string(),
                email: "a@x.com".to_string(),
                picture: None,
            })
            .await?;

        assert_eq!(id, 9);
        Ok(())
    }

    #[tokio::test]
    async fn get_user_missing_record_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<users::Model, Vec<users::Model>, _>(vec![vec![]])
            .into_connection();

        let err = DbUserStore::new(&db).get_user(404).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }
}
