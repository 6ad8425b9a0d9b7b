// utils/token.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::error::TicketError;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(expires_in_seconds)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Decode an HS256 session token and return the user id it carries.
pub fn decode_token<T: Into<String>>(
    token: T,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(decoded.claims.sub)
}

/// The credential verifier: holds the signing secret it was constructed
/// with and resolves an opaque session token to a staff user id. Every
/// failure mode (missing, malformed, expired, bad signature, non-uuid
/// subject) fails closed as `InvalidCredential`.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        TokenVerifier {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, token: Option<&str>) -> Result<Uuid, TicketError> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            TicketError::InvalidCredential("No session token was provided.".to_string())
        })?;

        let user_id = decode_token(token, self.secret.as_bytes()).map_err(|_| {
            TicketError::InvalidCredential("The session token is not valid.".to_string())
        })?;

        Uuid::parse_str(&user_id).map_err(|_| {
            TicketError::InvalidCredential("The session token is not valid.".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn token_round_trips_the_user_id() {
        let user_id = Uuid::new_v4();
        let token = create_token(&user_id.to_string(), SECRET, 60).unwrap();
        let decoded = decode_token(token, SECRET).unwrap();
        assert_eq!(decoded, user_id.to_string());
    }

    #[test]
    fn verifier_resolves_a_valid_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(&user_id.to_string(), SECRET, 60).unwrap();
        let verifier = TokenVerifier::new("test-secret");
        assert_eq!(verifier.verify(Some(&token)).unwrap(), user_id);
    }

    #[test]
    fn verifier_fails_closed_on_wrong_secret() {
        let token = create_token(&Uuid::new_v4().to_string(), b"other-secret", 60).unwrap();
        let verifier = TokenVerifier::new("test-secret");
        let err = verifier.verify(Some(&token)).unwrap_err();
        assert!(matches!(err, TicketError::InvalidCredential(_)));
    }

    #[test]
    fn verifier_fails_closed_on_missing_token() {
        let verifier = TokenVerifier::new("test-secret");
        assert!(matches!(
            verifier.verify(None),
            Err(TicketError::InvalidCredential(_))
        ));
        assert!(matches!(
            verifier.verify(Some("")),
            Err(TicketError::InvalidCredential(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the decoder's default expiry leeway.
        let token = create_token(&Uuid::new_v4().to_string(), SECRET, -3600).unwrap();
        let verifier = TokenVerifier::new("test-secret");
        assert!(matches!(
            verifier.verify(Some(&token)),
            Err(TicketError::InvalidCredential(_))
        ));
    }
}
