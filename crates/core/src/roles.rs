//! Well-known session role name constants.
//!
//! These are the only values that may appear in the `role` claim of a
//! session token.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CITIZEN: &str = "citizen";

/// Returns `true` if `role` is one of the known session roles.
pub fn is_known_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_CITIZEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("citizen"));
        assert!(!is_known_role("creator"));
        assert!(!is_known_role(""));
    }
}
