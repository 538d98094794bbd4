use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: &str, name: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let email = email.trim().to_lowercase();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: email.clone(),
            email,
            name,
            picture: None,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }
}

/// Authenticated caller, as established by the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    /// Lowercased
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email.trim().to_lowercase(),
            name: claims.name.filter(|n| !n.trim().is_empty()),
            picture: claims.picture.filter(|p| !p.trim().is_empty()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.email.trim().is_empty() {
        return Err(JwtError::InvalidToken("missing email claim".to_string()));
    }
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_identity() {
        let claims = Claims::new("Reader@Example.com", Some("Reader".into()), 1).with_picture("https://img/r.png");
        let token = generate_jwt(&claims, "secret").unwrap();
        let user = AuthUser::from(decode_jwt(&token, "secret").unwrap());

        assert_eq!(user.email, "reader@example.com");
        assert_eq!(user.name.as_deref(), Some("Reader"));
        assert_eq!(user.picture.as_deref(), Some("https://img/r.png"));
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let claims = Claims::new("a@b.io", None, 1);
        let token = generate_jwt(&claims, "secret").unwrap();
        assert!(matches!(decode_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));

        let mut expired = Claims::new("a@b.io", None, 1);
        expired.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&expired, "secret").unwrap();
        assert!(decode_jwt(&token, "secret").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new("a@b.io", None, 1);
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}
