use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the `SID` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    /// `admin`, `tutor` or `student`.
    pub role: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(sub: impl Into<String>, role: impl Into<String>, ttl: chrono::Duration) -> Self {
        Self {
            sub: sub.into(),
            role: role.into(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: &UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}
