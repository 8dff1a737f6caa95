use crate::auth::auth::AuthUser;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use serde_json::json;
use tracing::{debug, warn};

/// Resolves the bearer access token on every protected request and stores the
/// caller as an `AuthUser` in the request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let caller = bearer_token(req.headers())
        .and_then(|token| AuthUser::from_access_token(token, &config.jwt_secret));

    match caller {
        Ok(user) => {
            debug!(user_id = user.user_id, role = %user.role, path = %req.path(), "Authenticated request");
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(reason) => {
            warn!(path = %req.path(), reason = %reason, "Rejected request");
            let resp = HttpResponse::Unauthorized().json(json!({ "error": "unauthorized", "message": reason }));
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| "Invalid Authorization header encoding".to_string())?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header must start with Bearer".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{peer, service, test_app};
    use crate::auth::jwt::generate_refresh_token;
    use crate::model::{role::Role, user::UserAccount};
    use actix_web::{http::StatusCode, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    fn account() -> UserAccount {
        UserAccount {
            id: 3,
            username: "nadia".into(),
            password_hash: String::new(),
            role: Role::Finance,
            employee_id: None,
            is_active: true,
            version: 0,
        }
    }

    #[rstest]
    #[case(None, "Missing Authorization header")]
    #[case(Some("Token abc"), "Authorization header must start with Bearer")]
    fn header_shape_is_checked(#[case] header: Option<&str>, #[case] reason: &str) {
        let mut headers = HeaderMap::new();
        if let Some(value) = header {
            headers.insert(AUTHORIZATION, value.parse().unwrap());
        }
        assert_eq!(bearer_token(&headers).unwrap_err(), reason);
    }

    #[test]
    fn refresh_token_cannot_authenticate() {
        let config = Config::for_tests();
        let (token, _) = generate_refresh_token(&account(), &config.jwt_secret, 60).unwrap();
        assert_eq!(
            AuthUser::from_access_token(&token, &config.jwt_secret).unwrap_err(),
            "Access token required"
        );
    }

    #[actix_web::test]
    async fn rejection_body_names_the_reason() {
        let service = service();
        let app = test_app!(service);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(("Authorization", "Token abc"))
            .peer_addr(peer())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "Authorization header must start with Bearer");
    }
}
