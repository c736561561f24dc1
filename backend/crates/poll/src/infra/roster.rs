//! File Roster
//!
//! Roster read from two line-oriented files: one login per line and the
//! matching display name on the same line of the second file. Line `n`
//! (1-based) is roster index `n`.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::entity::user::User;
use crate::domain::roster::Roster;
use crate::error::{PollError, PollResult};

#[derive(Debug, Clone, Default)]
pub struct FileRoster {
    /// `users[i]` has roster index `i + 1`
    users: Vec<User>,
    indexes: HashMap<String, usize>,
}

impl FileRoster {
    /// Build from `(login, name)` pairs in roster order.
    ///
    /// Blank logins keep their index but can't be looked up. A login listed
    /// twice resolves to its first index.
    pub fn from_pairs<I, L, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, N)>,
        L: Into<String>,
        N: Into<String>,
    {
        let users: Vec<User> = pairs
            .into_iter()
            .map(|(login, name)| User::new(login, name))
            .collect();

        let mut indexes = HashMap::with_capacity(users.len());
        for (i, user) in users.iter().enumerate() {
            if !user.is_anonymous() {
                indexes.entry(user.login().to_string()).or_insert(i + 1);
            }
        }

        Self { users, indexes }
    }

    /// Read the logins and names files.
    pub fn load(logins_path: impl AsRef<Path>, names_path: impl AsRef<Path>) -> PollResult<Self> {
        let logins_path = logins_path.as_ref();
        let names_path = names_path.as_ref();

        let logins = read_lines(logins_path)?;
        let names = read_lines(names_path)?;
        if logins.len() != names.len() {
            return Err(PollError::Roster {
                path: names_path.to_path_buf(),
                reason: format!(
                    "{} names for {} logins in {}",
                    names.len(),
                    logins.len(),
                    logins_path.display()
                ),
            });
        }

        let roster = Self::from_pairs(logins.into_iter().zip(names));
        tracing::info!(
            logins = %logins_path.display(),
            size = roster.len(),
            "Roster loaded"
        );
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn read_lines(path: &Path) -> PollResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| PollError::Roster {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

impl Roster for FileRoster {
    fn lookup(&self, login: &str) -> Option<usize> {
        self.indexes.get(login).copied()
    }

    fn reverse_lookup(&self, index: usize) -> Option<User> {
        let user = self.users.get(index.checked_sub(1)?)?;
        (!user.is_anonymous()).then(|| user.clone())
    }
}
