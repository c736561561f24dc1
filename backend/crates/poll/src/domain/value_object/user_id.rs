use kernel::id::Id;
use platform::crypto::content_digest;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;

/// Derive the id for a login.
///
/// An empty login has no identity and maps to the unidentified id, which is
/// what the anonymous sentinel carries.
pub fn user_id_for(login: &str) -> UserId {
    if login.is_empty() {
        UserId::unidentified()
    } else {
        UserId::new(content_digest(login))
    }
}
