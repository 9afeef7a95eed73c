//! Account identity types

use serde::{Deserialize, Serialize};

/// GitHub login of the account whose statistics are computed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct User(String);

impl User {
    /// Creates a new User with the specified login
    pub fn new(login: String) -> Self {
        Self(login)
    }

    /// Get the login as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for User {
    fn from(s: &str) -> Self {
        User::new(s.to_string())
    }
}

impl From<String> for User {
    fn from(s: String) -> Self {
        User::new(s)
    }
}

impl PartialEq<str> for User {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for User {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
