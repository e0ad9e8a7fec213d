//! # Social Login
//!
//! Exchanges a provider-issued access token for a local account. The
//! provider is asked for the profile behind the token; a verified email
//! gets an existing account matched or a customer account created.

use serde::Deserialize;

use super::errors::{AuthError, AuthResult};

/// Profile returned by an identity provider for an access token.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// An OAuth identity provider the backend can verify tokens against.
pub trait IdentityProvider {
    fn name(&self) -> &'static str;

    /// Fetch the profile for a provider access token.
    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = AuthResult<ProviderProfile>> + Send;
}

/// Google OAuth2: the token is exchanged at the userinfo endpoint.
#[derive(Clone)]
pub struct GoogleProvider {
    http: reqwest::Client,
    userinfo_url: String,
}

const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

impl GoogleProvider {
    pub fn new() -> Self {
        Self::with_url(GOOGLE_USERINFO_URL.to_string())
    }

    /// Point at a different userinfo endpoint (tests).
    pub fn with_url(userinfo_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            userinfo_url,
        }
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ProviderProfile> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderProfile>()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

/// Fixed-profile provider for tests.
pub struct MockProvider {
    pub profile: ProviderProfile,
    /// Token the mock accepts; anything else errors.
    pub expected_token: String,
}

impl IdentityProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ProviderProfile> {
        if access_token == self.expected_token {
            Ok(self.profile.clone())
        } else {
            Err(AuthError::Provider("token rejected".to_string()))
        }
    }
}
