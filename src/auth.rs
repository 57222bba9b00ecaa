use crate::config;
use crate::types::session::UserInfo;

use base64::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD, decode_config, encode_config};
use jwt_simple::algorithms::MACLike;
use jwt_simple::prelude::{Claims, Duration as JwtDuration, HS256Key, VerificationOptions};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::HashSet;

/// Issues and verifies the HS256 session tokens carried in the session cookie.
#[derive(Debug, Clone)]
pub struct AuthState {
    key: HS256Key,
    issuer: String,
    cookie_name: String,
    token_ttl: time::Duration,
    cookie_secure: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid auth key")]
    InvalidKey,
    #[error("invalid auth token")]
    InvalidToken,
    #[error("auth token missing expiry")]
    MissingExpiry,
    #[error("auth token missing subject")]
    MissingSubject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl AuthState {
    pub fn from_config(config: &config::AppConfig) -> Result<Self, AuthError> {
        let Some(auth) = config.auth.as_ref() else {
            tracing::warn!("no auth key configured, using an ephemeral session key (dev only)");
            return Ok(Self {
                key: HS256Key::generate(),
                issuer: config.app_name.clone(),
                cookie_name: config::DEFAULT_AUTH_COOKIE_NAME.to_string(),
                token_ttl: config::default_auth_token_ttl(),
                cookie_secure: false,
            });
        };

        let key_bytes = decode_key(&auth.key)?;
        Ok(Self {
            key: HS256Key::from_bytes(&key_bytes),
            issuer: config.app_name.clone(),
            cookie_name: auth.cookie_name.clone(),
            token_ttl: auth.token_ttl,
            cookie_secure: auth.cookie_secure,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn issue_token(&self, user: &UserInfo) -> Result<String, AuthError> {
        let ttl_seconds = self.token_ttl.whole_seconds();
        if ttl_seconds <= 0 {
            return Err(AuthError::InvalidToken);
        }
        let custom = SessionClaims {
            email: user.email.clone(),
            name: user.name.clone(),
        };
        let claims = Claims::with_custom_claims(custom, JwtDuration::from_secs(ttl_seconds as u64))
            .with_subject(&user.sub)
            .with_issuer(&self.issuer);
        self.key
            .authenticate(claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.token_ttl.whole_seconds().max(0);
        let mut cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn verify_token(&self, token: &str) -> Result<UserInfo, AuthError> {
        let mut options = VerificationOptions::default();
        let mut issuers = HashSet::new();
        issuers.insert(self.issuer.clone());
        options.allowed_issuers = Some(issuers);

        let claims = self
            .key
            .verify_token::<SessionClaims>(token, Some(options))
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.expires_at.is_none() {
            return Err(AuthError::MissingExpiry);
        }

        let subject = claims.subject.ok_or(AuthError::MissingSubject)?;
        if subject.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(UserInfo {
            sub: subject,
            email: claims.custom.email,
            name: claims.custom.name,
        })
    }
}

fn decode_key(raw: &str) -> Result<Vec<u8>, AuthError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidKey);
    }

    let decoded = decode_config(trimmed, URL_SAFE_NO_PAD)
        .or_else(|_| decode_config(trimmed, STANDARD))
        .or_else(|_| decode_config(trimmed, STANDARD_NO_PAD))
        .map_err(|_| AuthError::InvalidKey)?;

    if decoded.is_empty() {
        return Err(AuthError::InvalidKey);
    }

    Ok(decoded)
}

pub fn generate_auth_key() -> Result<String, AuthError> {
    let mut rng = OsRng;
    generate_auth_key_with_rng(&mut rng)
}

pub(crate) fn generate_auth_key_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    let encoded = encode_config(bytes, URL_SAFE_NO_PAD);
    if encoded.is_empty() {
        return Err(AuthError::InvalidKey);
    }
    Ok(encoded)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for value in dest.iter_mut() {
                *value = 0;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    fn auth_state() -> AuthState {
        let config = config::AppConfig {
            auth: Some(config::AuthConfig {
                key: encode_config(b"session-secret", URL_SAFE_NO_PAD),
                token_ttl: time::Duration::hours(1),
                cookie_name: config::DEFAULT_AUTH_COOKIE_NAME.to_string(),
                cookie_secure: true,
            }),
            ..Default::default()
        };
        AuthState::from_config(&config).expect("auth state")
    }

    #[test]
    fn generate_auth_key_with_rng__should_match_fixture() {
        // Given
        let mut rng = ZeroRng;

        // When
        let key = generate_auth_key_with_rng(&mut rng).expect("auth key");

        // Then
        assert_eq!(key, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn verify_token__should_return_identity_from_issued_token() {
        // Given
        let auth = auth_state();
        let user = UserInfo {
            sub: "user-1".to_string(),
            email: Some("user@example.com".to_string()),
            name: Some("Ada".to_string()),
        };

        // When
        let token = auth.issue_token(&user).expect("issue token");
        let verified = auth.verify_token(&token).expect("verify token");

        // Then
        assert_eq!(verified, user);
    }

    #[test]
    fn verify_token__should_reject_foreign_tokens() {
        let auth = auth_state();
        let other = AuthState::from_config(&config::AppConfig::default()).expect("auth state");
        let token = other
            .issue_token(&UserInfo {
                sub: "user-1".to_string(),
                email: None,
                name: None,
            })
            .expect("issue token");

        assert!(matches!(
            auth.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn session_cookie__should_include_secure_flag_when_configured() {
        let cookie = auth_state().session_cookie("token");

        assert!(cookie.starts_with("wattpush_session=token;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
    }
}
