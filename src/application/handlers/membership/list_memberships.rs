//! ListMembershipsHandler - Query handler for a user's memberships.

use std::sync::Arc;

use crate::application::handlers::user::find_by_wallet_or_email;
use crate::domain::membership::{Membership, MembershipError};
use crate::domain::user::User;
use crate::ports::{MembershipRepository, UserDirectory};

/// Query for memberships owned by the user behind `identifier`.
#[derive(Debug, Clone)]
pub struct ListMembershipsQuery {
    /// Wallet address or email, any casing.
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct ListMembershipsResult {
    pub user: User,
    /// Newest first.
    pub memberships: Vec<Membership>,
}

pub struct ListMembershipsHandler {
    users: Arc<dyn UserDirectory>,
    memberships: Arc<dyn MembershipRepository>,
}

impl ListMembershipsHandler {
    pub fn new(users: Arc<dyn UserDirectory>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { users, memberships }
    }

    pub async fn handle(
        &self,
        query: ListMembershipsQuery,
    ) -> Result<ListMembershipsResult, MembershipError> {
        let user = find_by_wallet_or_email(self.users.as_ref(), &query.identifier).await?;
        let memberships = self.memberships.list_by_user(&user.id()).await?;
        Ok(ListMembershipsResult { user, memberships })
    }
}
