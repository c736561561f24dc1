//! Roster Port
//!
//! Static login <-> index <-> display name directory. Indexes are 1-based;
//! 0 never names anyone.

use crate::domain::entity::user::User;

pub trait Roster: Send + Sync {
    /// Index of `login`, if it is on the roster
    fn lookup(&self, login: &str) -> Option<usize>;

    /// The user at `index`, if any
    fn reverse_lookup(&self, index: usize) -> Option<User>;

    /// Index for serialized output; unknown logins render as 0
    fn index_of(&self, user: &User) -> usize {
        if user.is_anonymous() {
            return 0;
        }
        self.lookup(user.login()).unwrap_or(0)
    }
}
