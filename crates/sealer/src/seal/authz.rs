//! Authorization gate: membership check against the envelope's user list.

use common::ServiceError;

/// Check `caller` against an envelope's authorized-user list.
///
/// Identifiers are opaque and matched verbatim (case-sensitive, no
/// normalisation). An empty list denies every caller: an envelope sealed
/// with no authorized users can never be opened.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] when the caller is absent.
pub fn authorize(caller: &str, authorized_users: &[String]) -> Result<(), ServiceError> {
    if authorized_users.iter().any(|user| user == caller) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn member_is_authorized() {
        assert!(authorize("user1", &users(&["user1", "user2"])).is_ok());
        assert!(authorize("user2", &users(&["user1", "user2"])).is_ok());
    }

    #[test]
    fn duplicate_entries_still_match() {
        assert!(authorize("user1", &users(&["user1", "user1"])).is_ok());
    }

    #[test]
    fn non_member_is_denied() {
        let err = authorize("intruder", &users(&["user1"])).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
    }

    #[test]
    fn empty_list_denies_everyone() {
        assert!(authorize("user1", &[]).is_err());
        assert!(authorize("", &[]).is_err());
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(authorize("User1", &users(&["user1"])).is_err());
    }

    #[test]
    fn match_is_verbatim() {
        assert!(authorize("user1 ", &users(&["user1"])).is_err());
        assert!(authorize("user", &users(&["user1"])).is_err());
    }
}
