//! PostgreSQL implementation of UserDirectory.
//!
//! Comparisons use `lower(...)` on the stored column so rows written before
//! normalization was enforced still resolve.

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{Email, User, UserIdentifier, WalletAddress};
use crate::ports::UserDirectory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the UserDirectory port.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    wallet_address: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = |e: String| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user row {}: {}", row.id, e))
        };

        let email = row
            .email
            .as_deref()
            .map(Email::try_new)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;
        let wallet_address = row
            .wallet_address
            .as_deref()
            .map(WalletAddress::try_new)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;

        User::reconstitute(
            UserId::from_uuid(row.id),
            email,
            wallet_address,
            row.is_admin,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        )
        .map_err(|e| corrupt(e.to_string()))
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &UserIdentifier,
    ) -> Result<Option<User>, DomainError> {
        let sql = match identifier {
            UserIdentifier::Wallet(_) => {
                r#"
                SELECT id, email, wallet_address, is_admin, created_at, updated_at
                FROM users
                WHERE lower(wallet_address) = $1
                "#
            }
            UserIdentifier::Email(_) => {
                r#"
                SELECT id, email, wallet_address, is_admin, created_at, updated_at
                FROM users
                WHERE lower(email) = $1
                "#
            }
        };

        let row: Option<UserRow> = sqlx::query_as(sql)
            .bind(identifier.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
            })?;

        row.map(User::try_from).transpose()
    }

    async fn grant_admin(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET is_admin = TRUE, updated_at = now()
            WHERE id = $1 AND is_admin = FALSE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to grant admin: {}", e))
        })?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
            })?;

        match exists {
            Some(_) => Ok(false),
            None => Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("user {}", user_id),
            )),
        }
    }
}
