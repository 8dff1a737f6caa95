use crate::api::Pagination;
use crate::auth::auth::AuthUser;
use crate::service::{HrService, NewPams, PamsFilter, PamsResubmission};
use crate::workflow::pams::PamsReview;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "action": "confirm",
    "levels": { "teaching": "exceeds" },
    "comments": "Strong year",
    "meeting_date": "2026-04-15",
    "expected_version": 0
}))]
pub struct PamsReviewBody {
    #[serde(flatten)]
    pub review: PamsReview,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PamsResubmitBody {
    #[serde(flatten)]
    pub resubmission: PamsResubmission,
    pub expected_version: Option<u64>,
}

/* =========================
Submit appraisal
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/pams",
    request_body = NewPams,
    responses(
        (status = 201, description = "Appraisal submitted", body = PamsSubmission),
        (status = 400, description = "Missing workload or period"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already submitted for this period")
    ),
    security(("bearer_auth" = [])),
    tag = "PAMS"
)]
pub async fn submit_pams(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewPams>,
) -> actix_web::Result<impl Responder> {
    let submission = service.submit_pams(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(submission))
}

/* =========================
Confirm or return (reviewer chain)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/pams/{id}/review",
    params(("id" = u64, Path, description = "Appraisal ID")),
    request_body = PamsReviewBody,
    responses(
        (status = 200, description = "Review recorded", body = PamsSubmission),
        (status = 404, description = "Appraisal not found"),
        (status = 409, description = "Not this role's turn, bad meeting date or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "PAMS"
)]
pub async fn review_pams(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<PamsReviewBody>,
) -> actix_web::Result<impl Responder> {
    let PamsReviewBody {
        review,
        expected_version,
    } = payload.into_inner();
    let submission = service.review_pams(&auth.actor(), path.into_inner(), review, expected_version)?;
    Ok(HttpResponse::Ok().json(submission))
}

#[utoipa::path(
    put,
    path = "/api/v1/pams/{id}/resubmit",
    params(("id" = u64, Path, description = "Appraisal ID")),
    request_body = PamsResubmitBody,
    responses(
        (status = 200, description = "Appraisal resubmitted", body = PamsSubmission),
        (status = 409, description = "Only a returned appraisal can be resubmitted by its owner")
    ),
    security(("bearer_auth" = [])),
    tag = "PAMS"
)]
pub async fn resubmit_pams(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<PamsResubmitBody>,
) -> actix_web::Result<impl Responder> {
    let PamsResubmitBody {
        resubmission,
        expected_version,
    } = payload.into_inner();
    let submission = service.resubmit_pams(&auth.actor(), path.into_inner(), resubmission, expected_version)?;
    Ok(HttpResponse::Ok().json(submission))
}

#[utoipa::path(
    get,
    path = "/api/v1/pams/{id}",
    params(("id" = u64, Path, description = "Appraisal ID")),
    responses(
        (status = 200, description = "Appraisal", body = PamsSubmission),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Appraisal not found")
    ),
    security(("bearer_auth" = [])),
    tag = "PAMS"
)]
pub async fn get_pams(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let submission = service.get_pams(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(submission))
}

#[utoipa::path(
    get,
    path = "/api/v1/pams",
    params(PamsFilter, Pagination),
    responses(
        (status = 200, description = "Paginated appraisal list", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "PAMS"
)]
pub async fn list_pams(
    auth: AuthUser,
    service: web::Data<HrService>,
    filter: web::Query<PamsFilter>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let submissions = service.list_pams(&auth.actor(), &filter)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(submissions)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, peer, service, test_app};
    use crate::model::role::Role;
    use crate::service::test_support::{AYESHA, RAFIQ};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn hod_confirm_needs_a_meeting_date() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/pams")
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .set_json(json!({
                "period": "2025-2026",
                "workload": { "teaching": "CSE101", "research": "2 papers" }
            }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["status"], "submitted");
        let id = created["id"].as_u64().expect("pams id");

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/pams/{}/review", id))
            .insert_header(("Authorization", bearer(Role::Hod, Some(RAFIQ))))
            .peer_addr(peer())
            .set_json(json!({ "action": "confirm" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/pams/{}/review", id))
            .insert_header(("Authorization", bearer(Role::Hod, Some(RAFIQ))))
            .peer_addr(peer())
            .set_json(json!({ "action": "confirm", "meeting_date": "2026-03-20", "expected_version": 0 }))
            .to_request();
        let confirmed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(confirmed["status"], "hod-confirmed");
    }
}
