use serde::{Deserialize, Serialize};

use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: Role,
    pub is_premium: bool,
}

impl UserProfile {
    pub fn new(email: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            email: email.as_ref().trim().to_lowercase(),
            name: Some(name.into()),
            photo_url: None,
            role: Role::User,
            is_premium: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.role = Role::Admin;
        self
    }

    pub fn premium(mut self) -> Self {
        self.is_premium = true;
        self
    }

    pub fn with_photo(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}
