//! PostgreSQL implementation of MembershipRepository.
//!
//! Provides persistent storage for Membership aggregates using PostgreSQL.
//! The `memberships_stripe_session_id_key` unique index is what makes
//! concurrent webhook deliveries collapse to a single row.

use crate::domain::foundation::{DomainError, ErrorCode, MembershipId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipLevel, MembershipStatus, MembershipTier};
use crate::ports::{InsertResult, MembershipRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the MembershipRepository port.
///
/// Uses sqlx for database operations with connection pooling.
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a new PostgresMembershipRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a membership.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: Uuid,
    tier: String,
    level: String,
    stripe_session_id: String,
    status: String,
    amount_total: Option<i64>,
    currency: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let corrupt =
            |field: &str, e: String| DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", field, e));

        Ok(Membership {
            id: MembershipId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            tier: MembershipTier::try_new(&row.tier).map_err(|e| corrupt("tier", e.to_string()))?,
            level: MembershipLevel::try_new(&row.level)
                .map_err(|e| corrupt("level", e.to_string()))?,
            stripe_session_id: row.stripe_session_id,
            status: row
                .status
                .parse::<MembershipStatus>()
                .map_err(|e| corrupt("status", e.to_string()))?,
            amount_total: row.amount_total,
            currency: row.currency,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, tier, level, stripe_session_id, status,
           amount_total, currency, created_at, updated_at
    FROM memberships
"#;

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", action, e),
    )
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn insert(&self, membership: &Membership) -> Result<InsertResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO memberships (
                id, user_id, tier, level, stripe_session_id, status,
                amount_total, currency, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (stripe_session_id) DO NOTHING
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.user_id.as_uuid())
        .bind(membership.tier.as_str())
        .bind(membership.level.as_str())
        .bind(&membership.stripe_session_id)
        .bind(membership.status.as_str())
        .bind(membership.amount_total)
        .bind(&membership.currency)
        .bind(membership.created_at.as_datetime())
        .bind(membership.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert membership", e))?;

        if result.rows_affected() == 0 {
            return Ok(InsertResult::AlreadyExists);
        }
        Ok(InsertResult::Inserted)
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> =
            sqlx::query_as(&format!("{} WHERE stripe_session_id = $1", SELECT_COLUMNS))
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list memberships", e))?;

        rows.into_iter().map(Membership::try_from).collect()
    }
}
