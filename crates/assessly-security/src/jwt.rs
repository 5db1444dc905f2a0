//! JWT token handling
//!
//! Access tokens are minted by Supabase Auth (HS256, shared project secret).
//! This service only issues tokens for tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use assessly_shared::config::SupabaseSettings;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    /// Postgres role the token maps to (`authenticated`, `service_role`, ...).
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    /// `full_name`, then `name`, from the user metadata Supabase stores at sign-up.
    pub fn full_name(&self) -> Option<String> {
        ["full_name", "name"]
            .iter()
            .filter_map(|key| self.user_metadata.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// `app_metadata.platform_admin`. Only the service role can write app
    /// metadata, so users cannot grant it to themselves.
    pub fn is_platform_admin(&self) -> bool {
        self.app_metadata
            .get("platform_admin")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .get("avatar_url")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
}

impl JwtService {
    pub fn new(secret: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: audience.to_string(),
        }
    }

    pub fn from_settings(settings: &SupabaseSettings) -> Self {
        Self::new(&settings.jwt_secret, &settings.jwt_audience)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.leeway = 30;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }

    pub fn issue_token(
        &self,
        user_id: &Uuid,
        email: Option<&str>,
        user_metadata: Value,
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        self.issue_token_with_app_metadata(
            user_id,
            email,
            user_metadata,
            Value::Object(Default::default()),
            ttl_seconds,
        )
    }

    pub fn issue_token_with_app_metadata(
        &self,
        user_id: &Uuid,
        email: Option<&str>,
        user_metadata: Value,
        app_metadata: Value,
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
            user_metadata,
            app_metadata,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new("test-secret", "authenticated");
        let user_id = Uuid::new_v4();
        let token = service
            .issue_token(&user_id, Some("ana@example.com"), json!({"full_name": "Ana"}), 60)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert_eq!(claims.full_name().as_deref(), Some("Ana"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret", "authenticated");
        let token = service
            .issue_token(&Uuid::new_v4(), None, Value::Null, -3600)
            .unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_or_audience_rejected() {
        let issuer = JwtService::new("secret-a", "authenticated");
        let token = issuer.issue_token(&Uuid::new_v4(), None, Value::Null, 60).unwrap();

        let other_secret = JwtService::new("secret-b", "authenticated");
        assert!(matches!(
            other_secret.validate_token(&token),
            Err(JwtError::ValidationError(_))
        ));

        let other_audience = JwtService::new("secret-a", "anon");
        assert!(other_audience.validate_token(&token).is_err());
    }

    #[test]
    fn test_full_name_falls_back_to_name() {
        let claims = Claims {
            sub: "x".into(),
            aud: "authenticated".into(),
            iat: 0,
            exp: 0,
            email: None,
            role: None,
            user_metadata: json!({"full_name": "  ", "name": "Bo"}),
            app_metadata: Value::Null,
        };
        assert_eq!(claims.full_name().as_deref(), Some("Bo"));
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_platform_admin_comes_from_app_metadata() {
        let service = JwtService::new("test-secret", "authenticated");
        let user_id = Uuid::new_v4();

        let operator = service
            .issue_token_with_app_metadata(
                &user_id,
                None,
                Value::Null,
                json!({"provider": "email", "platform_admin": true}),
                60,
            )
            .unwrap();
        assert!(service.validate_token(&operator).unwrap().is_platform_admin());

        // User-editable metadata does not count
        let self_claimed = service
            .issue_token(&user_id, None, json!({"platform_admin": true}), 60)
            .unwrap();
        assert!(!service.validate_token(&self_claimed).unwrap().is_platform_admin());
    }
}
