//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use huddle_core::config::AuthConfig;
use huddle_core::error::AppError;

use super::claims::Claims;

/// Validates JWT tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string, checking signature and expiry.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-for-unit-tests".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let (token, _exp) = encoder.generate_token(42, "alice").unwrap();
        let claims = decoder.decode_token(&token).unwrap();

        assert_eq!(claims.user_id(), 42);
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let encoder = JwtEncoder::new(&test_config());
        let decoder = JwtDecoder::new(&AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..Default::default()
        });

        let (token, _) = encoder.generate_token(1, "bob").unwrap();
        assert!(decoder.decode_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let decoder = JwtDecoder::new(&test_config());
        assert!(decoder.decode_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_jti_differs_per_token() {
        let encoder = JwtEncoder::new(&test_config());
        let decoder = JwtDecoder::new(&test_config());

        let (t1, _) = encoder.generate_token(1, "carol").unwrap();
        let (t2, _) = encoder.generate_token(1, "carol").unwrap();

        let c1 = decoder.decode_token(&t1).unwrap();
        let c2 = decoder.decode_token(&t2).unwrap();
        assert_ne!(c1.session_token(), c2.session_token());
    }
}
