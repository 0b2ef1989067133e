use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// Confirmation tokens for customers and contractors expire after 7 days.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// 48 alphanumeric characters ≈ 285 bits of entropy.
pub const TOKEN_LENGTH: usize = 48;

/// Generate a cryptographically random, unguessable confirmation token.
pub fn issue_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Expiry timestamp `days` days from now.
pub fn expiry_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

/// True when the token string looks like one we issued. Used by handlers to
/// reject malformed tokens with 400 before any lookup.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_differ_across_calls() {
        let a = issue_token();
        let b = issue_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_length_and_charset() {
        let token = issue_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(is_well_formed(&token));
    }

    #[test]
    fn test_expiry_is_days_from_now() {
        let before = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
        let expiry = expiry_from_now(TOKEN_TTL_DAYS);
        let after = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
        assert!(expiry >= before && expiry <= after);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc def"));
        assert!(!is_well_formed("abc/../def"));
    }
}
