//! `PostgreSQL` user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use catalog_core::{Email, UserId};

use super::{PgStore, RepositoryError, UserStore, map_unique_violation};
use crate::models::{NewUser, User};

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            username: row.username,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, username, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, name, created_at
            ",
        )
        .bind(new_user.email.as_str())
        .bind(new_user.username())
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.try_into()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, username, name, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, email, username, name, created_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USERS_MIGRATION: &str = include_str!("../../migrations/20250101000000_create_users.sql");

    #[test]
    fn test_case_folding_happens_only_in_email_parse() {
        // Rust and Postgres case tables differ for some characters, so the
        // schema must not re-check the folding
        assert!(!USERS_MIGRATION.to_lowercase().contains("lower("));

        let email = Email::parse("ΣΟΦΙΑ@Example.com").unwrap();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.as_str().to_owned(),
            username: email.as_str().to_owned(),
            name: "Sofia".to_owned(),
            created_at: Utc::now(),
        };
        let user = User::try_from(row).unwrap();
        assert_eq!(user.email, email);
    }
}
