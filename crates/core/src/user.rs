//! User identifiers and the storage key convention.

use crate::MAX_UID_LEN;
use crate::error::{Error, Result};

/// Prefix of a user's primary storage key in the `storages` table.
pub const HOME_STORAGE_PREFIX: &str = "home::";

/// Build the storage-accounting key for a user's primary storage.
pub fn home_storage_id(uid: &str) -> String {
    format!("{HOME_STORAGE_PREFIX}{uid}")
}

/// Validate a user identifier.
///
/// The uid ends up as a single path component of the files tree and as part
/// of the `home::<uid>` database key, so this gate also rules out path
/// traversal. Accepted characters match what the platform allows in user
/// names: ASCII alphanumerics plus `_`, `-`, `.` and `@`.
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(Error::InvalidUid("empty".to_string()));
    }
    if uid.len() > MAX_UID_LEN {
        return Err(Error::InvalidUid(format!(
            "longer than {MAX_UID_LEN} characters"
        )));
    }
    if uid == "." || uid.contains("..") {
        return Err(Error::InvalidUid(uid.to_string()));
    }
    if let Some(c) = uid
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '-' | '.' | '@'))
    {
        return Err(Error::InvalidUid(format!(
            "character {c:?} not allowed in {uid:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_storage_id_uses_well_known_prefix() {
        assert_eq!(home_storage_id("alice"), "home::alice");
        assert_eq!(home_storage_id("alice2"), "home::alice2");
    }

    #[test]
    fn validate_uid_accepts_platform_names() {
        for uid in ["alice", "alice2", "a.b-c_d", "user@example.com", "A9"] {
            validate_uid(uid).unwrap_or_else(|e| panic!("{uid}: {e}"));
        }
    }

    #[test]
    fn validate_uid_rejects_traversal_and_separators() {
        for uid in ["", ".", "..", "a..b", "a/b", "a\\b", "../etc", "a b", "naïve"] {
            assert!(validate_uid(uid).is_err(), "expected rejection: {uid:?}");
        }
    }

    #[test]
    fn validate_uid_rejects_overlong() {
        let uid = "a".repeat(MAX_UID_LEN + 1);
        assert!(validate_uid(&uid).is_err());
        let uid = "a".repeat(MAX_UID_LEN);
        assert!(validate_uid(&uid).is_ok());
    }
}
