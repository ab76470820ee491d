use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload of a Fritter access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, username: impl Into<String>, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            username: username.into(),
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The signed-in user behind a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            token_id: claims.jti,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_claims_are_not_expired() {
        let claims = Claims::new(Uuid::new_v4(), "alice", 60);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn negative_duration_is_expired() {
        let claims = Claims::new(Uuid::new_v4(), "alice", -10);
        assert!(claims.is_expired());
    }

    #[test]
    fn auth_user_keeps_identity() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "bob", 60);
        let jti = claims.jti;
        let user = AuthUser::from(claims);
        assert_eq!(user.id, id);
        assert_eq!(user.username, "bob");
        assert_eq!(user.token_id, jti);
    }
}
