use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{
    model::user::UserAccount,
    models::{Claims, TokenType},
};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

fn claims_for(user_id: u64, username: &str, role: u8, employee_id: Option<u64>, ttl: usize, token_type: TokenType) -> Claims {
    Claims {
        user_id,
        sub: username.to_string(),
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn generate_access_token(user: &UserAccount, secret: &str, ttl: usize) -> Result<String, Error> {
    let claims = claims_for(user.id, &user.username, user.role.id(), user.employee_id, ttl, TokenType::Access);
    sign(&claims, secret)
}

/// Re-issues tokens for the identity carried by an existing refresh token.
pub fn reissue(claims: &Claims, token_type: TokenType, secret: &str, ttl: usize) -> Result<(String, Claims), Error> {
    let fresh = claims_for(claims.user_id, &claims.sub, claims.role, claims.employee_id, ttl, token_type);
    Ok((sign(&fresh, secret)?, fresh))
}

pub fn generate_refresh_token(user: &UserAccount, secret: &str, ttl: usize) -> Result<(String, Claims), Error> {
    let claims = claims_for(user.id, &user.username, user.role.id(), user.employee_id, ttl, TokenType::Refresh);
    Ok((sign(&claims, secret)?, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn account() -> UserAccount {
        UserAccount {
            id: 7,
            username: "ayesha".into(),
            password_hash: String::new(),
            role: Role::Hod,
            employee_id: Some(1),
            is_active: true,
            version: 0,
        }
    }

    #[test]
    fn access_token_round_trips_identity() {
        let token = generate_access_token(&account(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Hod.id());
        assert_eq!(claims.employee_id, Some(1));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = generate_refresh_token(&account(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn reissue_gets_a_new_jti() {
        let (_, claims) = generate_refresh_token(&account(), "secret", 60).unwrap();
        let (_, fresh) = reissue(&claims, TokenType::Refresh, "secret", 60).unwrap();
        assert_ne!(claims.jti, fresh.jti);
        assert_eq!(fresh.sub, "ayesha");
    }
}
