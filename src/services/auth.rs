//! Authentication service
//!
//! Provides:
//! - Login against the identity store (bcrypt password hashes)
//! - HS256 JWT issuance with capability flags derived from roles
//! - Bearer token checks for mutating routes

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::db::{CreateUser, Database};
use crate::error::ApiError;

/// Role granting the `edit` capability.
pub const EDITOR_ROLE: &str = "USERS";
/// Role granting the `admin` capability.
pub const ADMIN_ROLE: &str = "ADMINS";

// ============================================================================
// JWT Claims
// ============================================================================

/// Who the token was issued to, as returned alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub email: String,
    pub name: String,
    pub id: String,
    pub expires_in: i64,
}

/// `data` claim: the token info plus capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(flatten)]
    pub info: TokenInfo,
    pub edit: bool,
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub data: TokenData,
}

/// Capabilities a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Edit,
    Admin,
}

impl TokenData {
    fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::Edit => self.edit,
            Capability::Admin => self.admin,
        }
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// Response body of `POST /authenticate`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenModel {
    pub token: Option<String>,
    pub info: Option<TokenInfo>,
    pub success: bool,
}

impl TokenModel {
    /// Body returned for any failed login.
    pub fn error_token() -> Self {
        Self {
            token: None,
            info: None,
            success: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("unknown user")]
    UnknownUser,

    #[error("incorrect password")]
    BadPassword,

    #[error("user has no roles")]
    NoRoles,

    #[error(transparent)]
    Store(#[from] ApiError),

    #[error("password hash check failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Decoded HS256 signing secret
    pub secret: Vec<u8>,
    pub issuer: String,
    /// Token lifetime in seconds
    pub token_lifetime: i64,
    /// Clock skew tolerated on validation, in seconds
    pub leeway: u64,
    /// Bcrypt cost for newly hashed passwords
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            secret: STANDARD.decode(&config.jwt_secret)?,
            issuer: config.jwt_issuer.clone(),
            token_lifetime: config.token_lifetime_secs,
            leeway: config.token_leeway_secs,
            bcrypt_cost: DEFAULT_COST,
        })
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service over the identity database
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Check the credentials and issue a token.
    ///
    /// Every role row of the user carries the password hash and each one is
    /// verified.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenModel, LoginError> {
        let rows = self.db.users().find_by_email(email).await?;
        if rows.is_empty() {
            return Err(LoginError::UnknownUser);
        }

        let mut roles = Vec::new();
        for row in &rows {
            if !verify(password, &row.password_hash)? {
                return Err(LoginError::BadPassword);
            }
            if let Some(role) = &row.role_name {
                roles.push(role.as_str());
            }
        }
        if roles.is_empty() {
            return Err(LoginError::NoRoles);
        }

        let user = &rows[0];
        let info = TokenInfo {
            email: email.to_string(),
            name: user.display_name.clone(),
            id: user.user_id.clone(),
            expires_in: self.config.token_lifetime,
        };
        let data = TokenData {
            info: info.clone(),
            edit: roles.contains(&EDITOR_ROLE),
            admin: roles.contains(&ADMIN_ROLE),
        };

        let token = self.issue(data)?;
        tracing::info!(user_id = %info.id, roles = ?roles, "Issued token");

        Ok(TokenModel {
            token: Some(token),
            info: Some(info),
            success: true,
        })
    }

    fn issue(&self, data: TokenData) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: self.config.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now + self.config.token_lifetime,
            data,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.config.secret),
        )
    }

    /// Decode and validate a token
    pub fn decode_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        decode::<Claims>(token, &DecodingKey::from_secret(&self.config.secret), &validation)
            .map(|data| data.claims)
    }

    /// Whether the request carries `Authorization: Bearer <jwt>` granting
    /// `capability`.
    pub fn is_authenticated(&self, headers: &HeaderMap, capability: Capability) -> bool {
        let Some(token) = bearer_token(headers) else {
            return false;
        };
        match self.decode_token(token) {
            Ok(claims) => claims.data.grants(capability),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                false
            }
        }
    }

    /// Hash a password with bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, self.config.bcrypt_cost)
    }

    /// Create or replace an identity user with a freshly hashed password.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        roles: Vec<String>,
    ) -> Result<String, LoginError> {
        let user = CreateUser {
            email: email.to_string(),
            display_name: name.to_string(),
            password_hash: self.hash_password(password)?,
            roles,
        };
        Ok(self.db.users().upsert(&user).await?)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> AuthService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        AuthService::new(
            Database::new(pool),
            AuthConfig {
                secret: b"test-secret".to_vec(),
                issuer: "libapi-test".into(),
                token_lifetime: 36000,
                leeway: 60,
                bcrypt_cost: 4,
            },
        )
    }

    fn data(edit: bool, admin: bool) -> TokenData {
        TokenData {
            info: TokenInfo {
                email: "editor@example.org".into(),
                name: "Editor".into(),
                id: "u1".into(),
                expires_in: 36000,
            },
            edit,
            admin,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_capabilities_follow_flags() {
        let auth = service().await;
        let token = auth.issue(data(true, false)).unwrap();
        let headers = bearer(&token);
        assert!(auth.is_authenticated(&headers, Capability::Edit));
        assert!(!auth.is_authenticated(&headers, Capability::Admin));
    }

    #[tokio::test]
    async fn test_claims_shape() {
        let auth = service().await;
        let token = auth.issue(data(false, true)).unwrap();
        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.iss, "libapi-test");
        assert_eq!(claims.exp - claims.iat, 36000);
        assert_eq!(claims.nbf, claims.iat);

        let json = serde_json::to_value(&claims.data).unwrap();
        assert_eq!(json["expiresIn"], 36000);
        assert_eq!(json["admin"], true);
    }

    #[tokio::test]
    async fn test_rejects_missing_or_foreign_tokens() {
        let auth = service().await;
        assert!(!auth.is_authenticated(&HeaderMap::new(), Capability::Edit));
        assert!(!auth.is_authenticated(&bearer("not-a-jwt"), Capability::Edit));

        let mut other = service().await;
        other.config.secret = b"another-secret".to_vec();
        let token = other.issue(data(true, true)).unwrap();
        assert!(!auth.is_authenticated(&bearer(&token), Capability::Edit));
    }

    #[test]
    fn test_error_token_shape() {
        let json = serde_json::to_value(TokenModel::error_token()).unwrap();
        assert_eq!(json, serde_json::json!({"token": null, "info": null, "success": false}));
    }
}
