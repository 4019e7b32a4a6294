use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // auth subject, e.g. "auth0|64f..."
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Auth0 sends either a string or an array here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

/// Authenticated caller, stored in request extensions by `AuthMiddleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub sub: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Sign a token for `sub`; used by local tooling and tests.
    pub fn generate_token(&self, sub: &str, expires_in_secs: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        let claims = Claims {
            sub: sub.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone().map(serde_json::Value::String),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.issuer {
            Some(iss) => validation.set_issuer(&[iss]),
            None => validation.iss = None,
        }
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        if claims.sub.is_empty() {
            return Err(AppError::AuthError("Token has no subject".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(issuer: Option<&str>, audience: Option<&str>) -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: issuer.map(str::to_string),
            audience: audience.map(str::to_string),
        }
    }

    #[test]
    fn test_generate_and_verify() {
        let jwt = JwtService::new(&config(None, None));
        let token = jwt.generate_token("auth0|user-1", 3600).unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "auth0|user-1");
    }

    #[test]
    fn test_rejects_expired_token() {
        let jwt = JwtService::new(&config(None, None));
        let token = jwt.generate_token("auth0|user-1", -3600).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let signer = JwtService::new(&config(None, None));
        let verifier = JwtService::new(&JwtConfig {
            secret: "other-secret".to_string(),
            issuer: None,
            audience: None,
        });
        let token = signer.generate_token("auth0|user-1", 3600).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_checks_issuer_and_audience() {
        let expected = JwtService::new(&config(Some("https://dobeu.auth0.com/"), Some("dobeu-api")));
        let foreign = JwtService::new(&config(Some("https://evil.example/"), Some("dobeu-api")));

        let good = expected.generate_token("auth0|a", 3600).unwrap();
        assert!(expected.verify_token(&good).is_ok());

        let bad = foreign.generate_token("auth0|a", 3600).unwrap();
        assert!(expected.verify_token(&bad).is_err());
    }

    #[test]
    fn test_accepts_audience_array() {
        let jwt = JwtService::new(&config(None, Some("dobeu-api")));
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "auth0|a",
            "iat": now,
            "exp": now + 600,
            "aud": ["dobeu-api", "https://dobeu.us.auth0.com/userinfo"],
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(jwt.verify_token(&token).unwrap().sub, "auth0|a");
    }
}
