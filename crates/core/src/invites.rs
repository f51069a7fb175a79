//! Invite token generation and redeemability rules.

use chrono::Duration;
use rand::RngCore;

use crate::error::CoreError;
use crate::hashing::hex_encode;
use crate::types::Timestamp;

/// Random bytes per invite token (hex encoded to 48 characters).
pub const INVITE_TOKEN_BYTES: usize = 24;

/// Lifetime of an invite from creation.
pub const INVITE_EXPIRY_DAYS: i64 = 7;

/// Maximum length of an optional invitee email.
pub const INVITEE_EMAIL_MAX_LEN: usize = 100;

/// Generate a fresh, unguessable invite token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Expiry for an invite created at `created_at`.
pub fn expires_at(created_at: Timestamp) -> Timestamp {
    created_at + Duration::days(INVITE_EXPIRY_DAYS)
}

/// Cheap shape check before hitting the store.
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == INVITE_TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decide whether an existing invite can still be redeemed.
///
/// `AlreadyUsed` wins over `Expired`: a used invite stays used forever.
/// An invite is still valid at exactly `expires_at`.
pub fn check_redeemable(used: bool, expires_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if used {
        return Err(CoreError::AlreadyUsed(
            "This invite has already been used".into(),
        ));
    }
    if now > expires_at {
        return Err(CoreError::Expired("This invite has expired".into()));
    }
    Ok(())
}

/// Validate an optional invitee email.
pub fn validate_invitee_email(email: Option<&str>) -> Result<(), CoreError> {
    match email {
        None => Ok(()),
        Some(e) => crate::users::validate_email(e),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 48);
        assert!(is_well_formed_token(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(!is_well_formed_token(""));
        assert!(!is_well_formed_token("abc"));
        assert!(!is_well_formed_token(&"z".repeat(48)));
    }

    #[test]
    fn expiry_is_seven_days() {
        assert_eq!(expires_at(t0()) - t0(), Duration::days(7));
    }

    #[test]
    fn fresh_invite_is_redeemable() {
        assert!(check_redeemable(false, expires_at(t0()), t0()).is_ok());
        // Boundary instant still counts as valid.
        assert!(check_redeemable(false, expires_at(t0()), expires_at(t0())).is_ok());
    }

    #[test]
    fn used_invite_is_already_used_even_when_expired() {
        let later = t0() + Duration::days(30);
        assert!(matches!(
            check_redeemable(true, expires_at(t0()), later),
            Err(CoreError::AlreadyUsed(_))
        ));
    }

    #[test]
    fn unused_invite_past_expiry_is_expired() {
        let later = expires_at(t0()) + Duration::seconds(1);
        assert!(matches!(
            check_redeemable(false, expires_at(t0()), later),
            Err(CoreError::Expired(_))
        ));
    }

    #[test]
    fn invitee_email_is_optional() {
        assert!(validate_invitee_email(None).is_ok());
        assert!(validate_invitee_email(Some("b@example.com")).is_ok());
        assert!(validate_invitee_email(Some("not-an-email")).is_err());
    }
}
