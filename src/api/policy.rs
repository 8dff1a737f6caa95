use crate::auth::auth::AuthUser;
use crate::error::HrError;
use crate::model::policy_document::{self, PolicyCategory};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PolicyQuery {
    pub category: Option<PolicyCategory>,
}

#[utoipa::path(
    get,
    path = "/api/v1/policies",
    params(PolicyQuery),
    responses((status = 200, description = "Policy documents", body = [PolicyDocument])),
    security(("bearer_auth" = [])),
    tag = "Policy"
)]
pub async fn list_policies(_auth: AuthUser, query: web::Query<PolicyQuery>) -> impl Responder {
    HttpResponse::Ok().json(policy_document::list(query.category))
}

#[utoipa::path(
    get,
    path = "/api/v1/policies/{id}",
    params(("id" = u32, Path, description = "Policy document ID")),
    responses(
        (status = 200, description = "Policy document", body = PolicyDocument),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Policy"
)]
pub async fn get_policy(_auth: AuthUser, path: web::Path<u32>) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let document = policy_document::find(id).ok_or(HrError::NotFound {
        kind: "Policy document",
        id: id.into(),
    })?;
    Ok(HttpResponse::Ok().json(document))
}
