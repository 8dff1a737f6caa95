use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, reissue, verify_token},
        password::verify_password,
    },
    config::Config,
    error::HrError,
    models::{LoginReqDto, LoginResponse, TokenType, UserReq},
    service::HrService,
    utils::refresh_tokens::RefreshTokens,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// User registration handler (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "User registered successfully", "id": 2
        })),
        (status = 400, description = "Invalid username or password"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn register(
    auth: AuthUser,
    service: web::Data<HrService>,
    user: web::Json<UserReq>,
) -> Result<HttpResponse, HrError> {
    let user = user.into_inner();
    let account = service.register_user(&auth.actor(), &user.username, &user.password, user.role, user.employee_id)?;

    info!(user_id = account.id, role = %account.role, by = %auth.username, "User registered");
    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "id": account.id
    })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token pair issued", body = LoginResponse),
        (status = 400, description = "Username or password required"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(service, config, tokens, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    service: web::Data<HrService>,
    config: web::Data<Config>,
    tokens: web::Data<RefreshTokens>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    // 2️⃣ Fetch user
    let account = match service.find_user(&user.username) {
        Some(account) if account.is_active => {
            debug!(user_id = account.id, "User found");
            account
        }
        _ => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &account.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    // 4️⃣ Issue tokens
    let access_token = generate_access_token(&account, &config.jwt_secret, config.access_token_ttl);
    let refresh = generate_refresh_token(&account, &config.jwt_secret, config.refresh_token_ttl);
    let (access_token, (refresh_token, refresh_claims)) = match (access_token, refresh) {
        (Ok(access), Ok(refresh)) => (access, refresh),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Failed to sign tokens");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 5️⃣ Store refresh token
    debug!(user_id = account.id, jti = %refresh_claims.jti, "Storing refresh token");
    tokens.issue(&refresh_claims.jti, account.id).await;

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

/// Rotates a refresh token: the presented one is consumed and a new pair is issued.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Missing, invalid or already used refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    config: web::Data<Config>,
    tokens: web::Data<RefreshTokens>,
) -> impl Responder {
    let token = match bearer(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // 🔍 consume the presented token; a second use fails here
    let user_id = match tokens.consume(&claims.jti).await {
        Some(user_id) if user_id == claims.user_id => user_id,
        _ => {
            info!(user_id = claims.user_id, "Refresh token reuse or revoked token");
            return HttpResponse::Unauthorized().finish();
        }
    };

    // 🔄 issue new pair
    let refresh = reissue(&claims, TokenType::Refresh, &config.jwt_secret, config.refresh_token_ttl);
    let access = reissue(&claims, TokenType::Access, &config.jwt_secret, config.access_token_ttl);
    let ((new_refresh_token, new_claims), (access_token, _)) = match (refresh, access) {
        (Ok(refresh), Ok(access)) => (refresh, access),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Failed to sign tokens");
            return HttpResponse::InternalServerError().finish();
        }
    };
    tokens.issue(&new_claims.jti, user_id).await;

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token: new_refresh_token,
    })
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Refresh token revoked (idempotent)")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    tokens: web::Data<RefreshTokens>,
) -> impl Responder {
    // 1️⃣ only a valid refresh token revokes anything
    let claims = match bearer(&req).map(|t| verify_token(t, &config.jwt_secret)) {
        Some(Ok(c)) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    // 2️⃣ revoke (idempotent)
    tokens.revoke(&claims.jti).await;

    // 3️⃣ success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}

/// Identity carried by the access token
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = Object, example = json!({
            "user_id": 1, "username": "admin", "role": "admin", "employee_id": null
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "username": auth.username,
        "role": auth.role,
        "employee_id": auth.employee_id,
    }))
}
