//! Anti-forgery tokens for the result form.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Token length in hex characters.
pub const TOKEN_LEN: usize = 32;

/// A token and when it was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    /// The token value (32 lowercase hex characters).
    pub value: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
}

impl CsrfToken {
    /// A fresh random token.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self {
            value: uuid::Uuid::new_v4().simple().to_string(),
            issued_at: now,
        }
    }

    /// Whether the token is older than `lifetime` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        let lifetime = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(self.issued_at) > lifetime
    }
}

/// The session's token, issuing a new one if it is missing or stale.
pub fn issue(session: &mut SessionState, now: DateTime<Utc>, lifetime: Duration) -> String {
    match &session.csrf {
        Some(token) if !token.is_stale(now, lifetime) => token.value.clone(),
        _ => {
            let token = CsrfToken::generate(now);
            let value = token.value.clone();
            session.csrf = Some(token);
            value
        }
    }
}

/// Whether `candidate` matches the session's live token.
pub fn verify(
    session: &SessionState,
    candidate: Option<&str>,
    now: DateTime<Utc>,
    lifetime: Duration,
) -> bool {
    let (Some(token), Some(candidate)) = (&session.csrf, candidate) else {
        return false;
    };
    !token.is_stale(now, lifetime) && constant_time_eq(token.value.as_bytes(), candidate.as_bytes())
}

/// Byte comparison whose running time does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HOUR: Duration = Duration::from_secs(3_600);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    fn session() -> SessionState {
        SessionState::new("0123456789abcdef", now())
    }

    #[test]
    fn token_shape() {
        let token = CsrfToken::generate(now());
        assert_eq!(token.value.len(), TOKEN_LEN);
        assert!(token.value.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn token_reused_while_fresh() {
        let mut s = session();
        let first = issue(&mut s, now(), HOUR);
        let again = issue(&mut s, now() + chrono::Duration::minutes(59), HOUR);
        assert_eq!(first, again);
        let renewed = issue(&mut s, now() + chrono::Duration::minutes(61), HOUR);
        assert_ne!(first, renewed);
    }

    #[test]
    fn verify_accepts_matching_fresh_token() {
        let mut s = session();
        let token = issue(&mut s, now(), HOUR);
        assert!(verify(&s, Some(&token), now(), HOUR));
    }

    #[test]
    fn verify_rejects_bad_tokens() {
        let mut s = session();
        assert!(!verify(&s, Some("anything"), now(), HOUR));

        let token = issue(&mut s, now(), HOUR);
        assert!(!verify(&s, None, now(), HOUR));
        assert!(!verify(&s, Some(""), now(), HOUR));
        assert!(!verify(&s, Some(&token[..31]), now(), HOUR));
        let mut flipped = token.clone().into_bytes();
        flipped[0] = if flipped[0] == b'a' { b'b' } else { b'a' };
        assert!(!verify(&s, Some(std::str::from_utf8(&flipped).unwrap()), now(), HOUR));

        let late = now() + chrono::Duration::minutes(61);
        assert!(!verify(&s, Some(&token), late, HOUR));
    }
}
