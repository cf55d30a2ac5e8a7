/// CSRF (Cross-Site Request Forgery) protection
///
/// Every session holds one random token. Forms repeat it in a hidden
/// `csrf_token` field and POST handlers compare the two before touching
/// any data.
///
/// Usage in templates:
/// ```html,ignore
/// <form method="post">
///     <input type="hidden" name="csrf_token" value="{{ client.get_csrf_token() }}">
/// </form>
/// ```
///
/// Usage in handlers:
/// ```rust,ignore
/// validate_csrf_token(&session, form.csrf_token())?;
/// ```
use actix_web::{error, Error};
use rand::{distributions::Alphanumeric, Rng};

pub const CSRF_TOKEN_LENGTH: usize = 32;
const CSRF_SESSION_KEY: &str = "csrf_token";

pub fn generate_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns the session's token, creating one on first use.
pub fn get_or_create_csrf_token(session: &actix_session::Session) -> Result<String, Error> {
    match session.get::<String>(CSRF_SESSION_KEY) {
        Ok(Some(token)) => Ok(token),
        _ => {
            let token = generate_csrf_token();
            session
                .insert(CSRF_SESSION_KEY, token.clone())
                .map_err(|_| error::ErrorInternalServerError("Failed to store CSRF token"))?;
            Ok(token)
        }
    }
}

/// Rejects the request with 403 unless `provided_token` matches the session.
pub fn validate_csrf_token(
    session: &actix_session::Session,
    provided_token: &str,
) -> Result<(), Error> {
    let expected_token = session
        .get::<String>(CSRF_SESSION_KEY)
        .map_err(|_| error::ErrorInternalServerError("Failed to get CSRF token"))?
        .ok_or_else(|| error::ErrorForbidden("CSRF token not found in session"))?;

    if !tokens_match(provided_token, &expected_token) {
        log::warn!("CSRF token validation failed");
        return Err(error::ErrorForbidden("Invalid CSRF token"));
    }

    Ok(())
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() || expected.is_empty() {
        return false;
    }

    provided
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_alphanumeric() {
        let token = generate_csrf_token();
        assert_eq!(token.len(), CSRF_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_csrf_token());
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc124", "abc123"));
        assert!(!tokens_match("abc", "abc123"));
        assert!(!tokens_match("", ""));
    }
}
