//! User Entity
//!
//! Identity value built per request from authenticated claims or a roster
//! lookup.

use crate::domain::value_object::user_id::{UserId, user_id_for};

/// User identity
///
/// The id is a pure function of the login; two users with the same login are
/// the same user whatever display name they carry.
#[derive(Debug, Clone)]
pub struct User {
    /// Opaque external identifier (SSO handle, e-mail)
    login: String,
    /// Display name
    name: String,
    id: UserId,
}

impl User {
    pub fn new(login: impl Into<String>, name: impl Into<String>) -> Self {
        let login = login.into();
        let id = user_id_for(&login);
        Self {
            login,
            name: name.into(),
            id,
        }
    }

    /// The sentinel used when an asker opts out of attribution.
    pub fn anonymous() -> Self {
        Self {
            login: String::new(),
            name: String::new(),
            id: UserId::unidentified(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unidentified users can be recorded as askers but never vote.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_unidentified()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}
