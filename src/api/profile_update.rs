use crate::api::{Pagination, ReviewBody, promotion::StatusQuery};
use crate::auth::auth::AuthUser;
use crate::service::HrService;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "changes": { "email": "ayesha.karim@university.edu" },
    "note": "New institutional address"
}))]
pub struct ProfileUpdateBody {
    /// Top-level employee fields to replace once approved
    #[schema(value_type = Object)]
    pub changes: Value,
    pub note: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/profile-update",
    request_body = ProfileUpdateBody,
    responses(
        (status = 201, description = "Change request submitted", body = ProfileUpdateRequest),
        (status = 400, description = "HR-only or unknown field")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn submit_profile_update(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<ProfileUpdateBody>,
) -> actix_web::Result<impl Responder> {
    let ProfileUpdateBody { changes, note } = payload.into_inner();
    let request = service.submit_profile_update(&auth.actor(), changes, note)?;
    Ok(HttpResponse::Created().json(request))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile-update/{id}/review",
    params(("id" = u64, Path, description = "Change request ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Decision recorded; approval applies the changes", body = ProfileUpdateRequest),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "Already resolved or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn review_profile_update(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<ReviewBody>,
) -> actix_web::Result<impl Responder> {
    let ReviewBody {
        decision,
        comment,
        expected_version,
    } = payload.into_inner();
    let request =
        service.review_profile_update(&auth.actor(), path.into_inner(), decision, comment, expected_version)?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile-update",
    params(StatusQuery, Pagination),
    responses((status = 200, description = "Paginated change requests", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_profile_updates(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<StatusQuery>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let requests = service.list_profile_updates(&auth.actor(), query.status)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(requests)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, peer, service, test_app};
    use crate::model::role::Role;
    use crate::service::test_support::AYESHA;
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn salary_cannot_be_self_served() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/profile-update")
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .set_json(json!({ "changes": { "salary_base": 1.0 } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
