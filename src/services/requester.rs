use std::sync::Arc;

use crate::auth::AuthUser;
use crate::comment::Author;
use crate::database::{StoreError, UserDirectory};
use crate::types::Role;

const FALLBACK_NAME: &str = "User";

/// Fully resolved caller: token identity completed from the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub role: Role,
    pub is_premium: bool,
}

impl Requester {
    pub fn author(&self) -> Author {
        Author::new(&self.email, self.display_name.clone(), self.photo_url.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone)]
pub struct RequesterResolver {
    users: Arc<dyn UserDirectory>,
}

impl RequesterResolver {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    /// `None` when the identity carries no email
    pub async fn resolve(&self, user: &AuthUser) -> Result<Option<Requester>, StoreError> {
        let email = user.email.trim().to_lowercase();
        if email.is_empty() {
            return Ok(None);
        }

        let profile = self.users.find_user(&email).await?;

        let display_name = profile
            .as_ref()
            .and_then(|p| p.name.clone())
            .filter(|n| !n.trim().is_empty())
            .or_else(|| user.name.clone())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let photo_url = profile
            .as_ref()
            .and_then(|p| p.photo_url.clone())
            .filter(|p| !p.trim().is_empty())
            .or_else(|| user.picture.clone())
            .unwrap_or_default();

        Ok(Some(Requester {
            email,
            display_name,
            photo_url,
            role: profile.as_ref().map(|p| p.role).unwrap_or_default(),
            is_premium: profile.map(|p| p.is_premium).unwrap_or(false),
        }))
    }
}
