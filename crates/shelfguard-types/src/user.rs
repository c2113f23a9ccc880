//! user type representing an authenticated licensee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::license::License;

/// unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// an authenticated user and the licenses they hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// unique identifier.
    pub id: UserId,

    /// login name, unique.
    pub name: String,

    /// email address.
    pub email: Option<String>,

    /// inactive users hold no usable licenses.
    pub active: bool,

    /// superusers satisfy every access condition.
    pub superuser: bool,

    /// licenses held by this user, resolved by the policy store.
    #[serde(default)]
    pub licenses: Vec<License>,

    /// when the user was created.
    pub created_at: DateTime<Utc>,

    /// when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// create a new active, unprivileged user with the given name.
    pub fn new(id: UserId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email: None,
            active: true,
            superuser: false,
            licenses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// display label for logs.
    pub fn display_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active_without_licenses() {
        let user = User::new(UserId(7), "reader".to_string());
        assert!(user.active);
        assert!(!user.superuser);
        assert!(user.licenses.is_empty());
        assert_eq!(user.id.to_string(), "7");
    }
}
