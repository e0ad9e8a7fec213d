//! # Auth Service
//!
//! Signup, login, token refresh, social login and admin user management,
//! composed over the SQLite-backed user and session stores.

use uuid::Uuid;

use crate::db::Db;

use super::crypto::PasswordRules;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtManager, TokenResponse};
use super::permissions::{AuthContext, Role};
use super::session::{self, SessionConfig};
use super::social::{IdentityProvider, ProviderProfile};
use super::user::{self, LoginRequest, SignupRequest, User};

pub struct AuthService {
    db: Db,
    jwt: JwtManager,
    sessions: SessionConfig,
    rules: PasswordRules,
}

impl AuthService {
    pub fn new(db: Db, jwt: JwtManager, sessions: SessionConfig, rules: PasswordRules) -> Self {
        Self {
            db,
            jwt,
            sessions,
            rules,
        }
    }

    /// Register a customer account.
    pub fn signup(&self, request: SignupRequest) -> AuthResult<(User, TokenResponse)> {
        let email = user::normalize_email(&request.email)?;

        self.db.with_tx(|tx| {
            if user::email_exists(tx, &email)? {
                return Err(AuthError::EmailAlreadyExists);
            }

            let account = User::new_with_password(
                email.clone(),
                request.display_name.clone(),
                Role::Customer,
                &request.password,
                &self.rules,
            )?;
            user::insert(tx, &account)?;

            let tokens = self.issue_tokens(tx, &account)?;
            Ok((account, tokens))
        })
    }

    /// Create the first Owner account (CLI bootstrap). Fails if the email
    /// is taken.
    pub fn create_owner(&self, email: &str, password: &str, display_name: &str) -> AuthResult<User> {
        let email = user::normalize_email(email)?;

        self.db.with_tx(|tx| {
            if user::email_exists(tx, &email)? {
                return Err(AuthError::EmailAlreadyExists);
            }
            let account = User::new_with_password(
                email.clone(),
                display_name.to_string(),
                Role::Owner,
                password,
                &self.rules,
            )?;
            user::insert(tx, &account)?;
            Ok(account)
        })
    }

    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, TokenResponse)> {
        let email = user::normalize_email(&request.email).map_err(|_| AuthError::InvalidCredentials)?;

        self.db.with_tx(|tx| {
            let account =
                user::find_by_email(tx, &email)?.ok_or(AuthError::InvalidCredentials)?;

            if !account.verify_password(&request.password)? {
                return Err(AuthError::InvalidCredentials);
            }

            let tokens = self.issue_tokens(tx, &account)?;
            Ok((account, tokens))
        })
    }

    /// Log in (or sign up) through an identity provider token.
    pub async fn login_social<P: IdentityProvider>(
        &self,
        provider: &P,
        access_token: &str,
    ) -> AuthResult<(User, TokenResponse)> {
        let profile = provider.fetch_profile(access_token).await?;
        self.login_with_profile(profile)
    }

    fn login_with_profile(&self, profile: ProviderProfile) -> AuthResult<(User, TokenResponse)> {
        if !profile.email_verified {
            return Err(AuthError::ProviderEmailUnverified);
        }
        let email = user::normalize_email(&profile.email)?;

        self.db.with_tx(|tx| {
            let account = match user::find_by_email(tx, &email)? {
                Some(existing) => existing,
                None => {
                    let display_name = if profile.name.is_empty() {
                        email.clone()
                    } else {
                        profile.name.clone()
                    };
                    let account = User::new_social(email.clone(), display_name)?;
                    user::insert(tx, &account)?;
                    account
                }
            };

            let tokens = self.issue_tokens(tx, &account)?;
            Ok((account, tokens))
        })
    }

    /// Redeem a refresh token for a new token pair.
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        self.db.with_tx(|tx| {
            let (new_session, raw) = session::rotate(tx, &self.sessions, refresh_token)?;
            let account =
                user::find_by_id(tx, new_session.user_id)?.ok_or(AuthError::UserNotFound)?;

            let access = self.jwt.issue(&account)?;
            Ok(TokenResponse::new(access, raw, self.jwt.expiration()))
        })
    }

    pub fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        self.db.with_tx(|tx| {
            let active = session::validate_refresh_token(tx, refresh_token)?;
            session::revoke(tx, active.id)
        })
    }

    /// Validate a bearer token into the request identity. Stateless.
    pub fn validate_access(&self, token: &str) -> AuthResult<AuthContext> {
        self.jwt.context_from_token(token)
    }

    pub fn get_user(&self, id: Uuid) -> AuthResult<User> {
        self.db
            .with_conn(|conn| user::find_by_id(conn, id))?
            .ok_or(AuthError::UserNotFound)
    }

    pub fn list_users(&self) -> AuthResult<Vec<User>> {
        self.db.with_conn(user::list)
    }

    /// Change a user's role and revoke their sessions so stale JWTs age
    /// out within the access TTL.
    pub fn set_role(&self, id: Uuid, role: Role) -> AuthResult<()> {
        self.db.with_tx(|tx| {
            user::set_role(tx, id, role)?;
            session::revoke_all_for_user(tx, id)
        })
    }

    fn issue_tokens(
        &self,
        conn: &rusqlite::Connection,
        account: &User,
    ) -> AuthResult<TokenResponse> {
        let (_, refresh) = session::create(conn, &self.sessions, account.id, None, None)?;
        let access = self.jwt.issue(account)?;
        Ok(TokenResponse::new(access, refresh, self.jwt.expiration()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::auth::social::MockProvider;

    fn service() -> AuthService {
        AuthService::new(
            Db::open_in_memory().unwrap(),
            JwtManager::new(JwtConfig {
                secret: "test-secret".to_string(),
                access_ttl: chrono::Duration::minutes(15),
            }),
            SessionConfig::default(),
            PasswordRules::default(),
        )
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            email: "ana@example.com".to_string(),
            password: "password123".to_string(),
            display_name: "Ana".to_string(),
        }
    }

    #[test]
    fn test_signup_then_login() {
        let service = service();

        let (account, tokens) = service.signup(signup_request()).unwrap();
        assert_eq!(account.role, Role::Customer);
        assert!(!tokens.access_token.is_empty());

        let (again, _) = service
            .login(LoginRequest {
                email: "Ana@Example.com".to_string(),
                password: "password123".to_string(),
            })
            .unwrap();
        assert_eq!(again.id, account.id);
    }

    #[test]
    fn test_duplicate_signup_rejected() {
        let service = service();
        service.signup(signup_request()).unwrap();

        assert!(matches!(
            service.signup(signup_request()),
            Err(AuthError::EmailAlreadyExists)
        ));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let service = service();
        service.signup(signup_request()).unwrap();

        assert!(matches!(
            service.login(LoginRequest {
                email: "ana@example.com".to_string(),
                password: "nope nope nope".to_string(),
            }),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_refresh_rotates_and_old_token_dies() {
        let service = service();
        let (_, tokens) = service.signup(signup_request()).unwrap();

        let refreshed = service.refresh(&tokens.refresh_token).unwrap();
        assert_ne!(refreshed.refresh_token, tokens.refresh_token);

        assert!(service.refresh(&tokens.refresh_token).is_err());
        assert!(service.refresh(&refreshed.refresh_token).is_ok());
    }

    #[test]
    fn test_logout_revokes() {
        let service = service();
        let (_, tokens) = service.signup(signup_request()).unwrap();

        service.logout(&tokens.refresh_token).unwrap();
        assert!(matches!(
            service.refresh(&tokens.refresh_token),
            Err(AuthError::SessionRevoked)
        ));
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let (account, tokens) = service.signup(signup_request()).unwrap();

        let ctx = service.validate_access(&tokens.access_token).unwrap();
        assert_eq!(ctx.user_id, account.id);
        assert_eq!(ctx.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_social_login_creates_customer() {
        let service = service();
        let provider = MockProvider {
            profile: ProviderProfile {
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
                email_verified: true,
            },
            expected_token: "provider-token".to_string(),
        };

        let (account, _) = service
            .login_social(&provider, "provider-token")
            .await
            .unwrap();
        assert_eq!(account.role, Role::Customer);
        assert!(account.email_verified);
        assert!(account.password_hash.is_none());

        // Second login matches the same account.
        let (again, _) = service
            .login_social(&provider, "provider-token")
            .await
            .unwrap();
        assert_eq!(again.id, account.id);
    }

    #[tokio::test]
    async fn test_social_login_requires_verified_email() {
        let service = service();
        let provider = MockProvider {
            profile: ProviderProfile {
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
                email_verified: false,
            },
            expected_token: "provider-token".to_string(),
        };

        assert!(matches!(
            service.login_social(&provider, "provider-token").await,
            Err(AuthError::ProviderEmailUnverified)
        ));
    }

    #[test]
    fn test_set_role_revokes_sessions() {
        let service = service();
        let (account, tokens) = service.signup(signup_request()).unwrap();

        service.set_role(account.id, Role::Staff).unwrap();

        assert_eq!(service.get_user(account.id).unwrap().role, Role::Staff);
        assert!(matches!(
            service.refresh(&tokens.refresh_token),
            Err(AuthError::SessionRevoked)
        ));
    }
}
