//! User lookup by wallet address or email.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::{User, UserIdentifier};
use crate::ports::UserDirectory;

/// Resolves `raw` to a user, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// - `ValidationFailed` if `raw` is neither a wallet address nor an email
/// - `UserNotFound` if no user matches
pub async fn find_by_wallet_or_email(
    directory: &dyn UserDirectory,
    raw: &str,
) -> Result<User, DomainError> {
    let identifier = UserIdentifier::parse(raw)?;
    directory
        .find_by_identifier(&identifier)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::UserNotFound,
                format!("No user with {} {}", identifier.kind(), identifier),
            )
        })
}
