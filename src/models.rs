use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({
    "username": "ayesha",
    "password": "s3cret-pass",
    "role": "employee",
    "employee_id": 1
}))]
pub struct UserReq {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Links the account to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "username": "admin", "password": "change-me-now" }))]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
