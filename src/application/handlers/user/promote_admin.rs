//! PromoteAdmin - Command handler granting the admin flag to a user.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::UserDirectory;

use super::find_user::find_by_wallet_or_email;

/// Command to promote a user, identified by wallet address or email.
#[derive(Debug, Clone)]
pub struct PromoteAdminCommand {
    pub identifier: String,
}

/// Result of a promotion. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoteAdminResult {
    Promoted { user_id: UserId },
    AlreadyAdmin { user_id: UserId },
}

impl PromoteAdminResult {
    pub fn user_id(&self) -> UserId {
        match self {
            PromoteAdminResult::Promoted { user_id }
            | PromoteAdminResult::AlreadyAdmin { user_id } => *user_id,
        }
    }
}

/// Handler for admin promotion.
pub struct PromoteAdminHandler {
    directory: Arc<dyn UserDirectory>,
}

impl PromoteAdminHandler {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, cmd: PromoteAdminCommand) -> Result<PromoteAdminResult, DomainError> {
        // 1. Resolve user
        let user = find_by_wallet_or_email(self.directory.as_ref(), &cmd.identifier).await?;
        let user_id = user.id();

        if user.is_admin() {
            tracing::info!(user_id = %user_id, "User is already an admin");
            return Ok(PromoteAdminResult::AlreadyAdmin { user_id });
        }

        // 2. Set flag; a concurrent promotion reports false
        if self.directory.grant_admin(&user_id).await? {
            tracing::info!(user_id = %user_id, "User promoted to admin");
            Ok(PromoteAdminResult::Promoted { user_id })
        } else {
            Ok(PromoteAdminResult::AlreadyAdmin { user_id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserDirectory;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::user::{Email, User, WalletAddress};

    const WALLET: &str = "0x9999999999999999999999999999999999999999";

    async fn setup() -> (InMemoryUserDirectory, PromoteAdminHandler, UserId) {
        let directory = InMemoryUserDirectory::new();
        let user = User::new(
            Some(Email::try_new("ops@example.com").unwrap()),
            Some(WalletAddress::try_new(WALLET).unwrap()),
        )
        .unwrap();
        let id = user.id();
        directory.add(user).await.unwrap();
        let handler = PromoteAdminHandler::new(Arc::new(directory.clone()));
        (directory, handler, id)
    }

    fn cmd(identifier: &str) -> PromoteAdminCommand {
        PromoteAdminCommand {
            identifier: identifier.to_string(),
        }
    }

    #[tokio::test]
    async fn promotes_regular_user() {
        let (directory, handler, id) = setup().await;

        let result = handler.handle(cmd(WALLET)).await.unwrap();

        assert_eq!(result, PromoteAdminResult::Promoted { user_id: id });
        assert!(directory.get(&id).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn promoting_admin_again_is_noop_success() {
        let (_, handler, id) = setup().await;

        handler.handle(cmd("OPS@example.com")).await.unwrap();
        let again = handler.handle(cmd("ops@EXAMPLE.com")).await.unwrap();

        assert_eq!(again, PromoteAdminResult::AlreadyAdmin { user_id: id });
    }

    #[tokio::test]
    async fn unknown_user_fails() {
        let (_, handler, _) = setup().await;

        let err = handler.handle(cmd("ghost@example.com")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn empty_identifier_fails_validation() {
        let (_, handler, _) = setup().await;

        let err = handler.handle(cmd("   ")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
