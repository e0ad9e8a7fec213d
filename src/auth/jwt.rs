//! # JWT Token Management
//!
//! Access tokens are short-lived HS256 JWTs validated statelessly: no
//! database lookup on the hot path. Claims carry the user id, email and
//! role; nothing secret goes into a token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use super::permissions::{AuthContext, Role};
use super::user::User;

const ISSUER: &str = "comanda";

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            access_ttl: Duration::minutes(15),
        }
    }
}

/// Issues and validates access tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn issue(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.config.access_ttl).timestamp(),
            iss: ISSUER.to_string(),
            aud: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[ISSUER]);
        validation.set_issuer(&[ISSUER]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(data.claims)
    }

    /// Validate a token and build the request identity from its claims.
    pub fn context_from_token(&self, token: &str) -> AuthResult<AuthContext> {
        let claims = self.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedToken)?;

        Ok(AuthContext {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        Utc::now() + self.config.access_ttl
    }
}

/// Token pair returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
}

impl TokenResponse {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: (expires_at - Utc::now()).num_seconds(),
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_ttl: Duration::minutes(15),
        })
    }

    fn user() -> User {
        User::new_with_password(
            "cook@example.com".to_string(),
            "Cook".to_string(),
            Role::Staff,
            "password123",
            &super::super::crypto::PasswordRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let manager = manager();
        let user = user();

        let token = manager.issue(&user).unwrap();
        let ctx = manager.context_from_token(&token).unwrap();

        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.email, "cook@example.com");
        assert_eq!(ctx.role, Role::Staff);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = manager().issue(&user()).unwrap();

        let other = JwtManager::new(JwtConfig {
            secret: "different".to_string(),
            access_ttl: Duration::minutes(15),
        });
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_ttl: Duration::minutes(-5),
        });
        let token = manager.issue(&user()).unwrap();

        assert!(matches!(
            manager.verify(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            manager().verify("not.a.jwt"),
            Err(AuthError::MalformedToken)
        ));
    }
}
