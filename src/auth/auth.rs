use crate::config::Config;
use crate::workflow::Actor;
use crate::{auth::jwt::verify_token, model::role::Role, models::TokenType};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ));
            }
        };

        match AuthUser::from_access_token(token, &config.jwt_secret) {
            Ok(user) => ready(Ok(user)),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
        }
    }
}

impl AuthUser {
    /// Decodes an access token; refresh tokens and unknown roles are refused.
    pub fn from_access_token(token: &str, secret: &str) -> Result<Self, String> {
        let claims = verify_token(token, secret)?;
        if claims.token_type != TokenType::Access {
            return Err("Access token required".to_string());
        }
        let role = Role::from_id(claims.role).ok_or_else(|| "Invalid role".to_string())?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        })
    }

    /// Identity passed into workflow commands.
    pub fn actor(&self) -> Actor {
        Actor::new(self.username.as_str(), self.role, self.employee_id)
    }
}
