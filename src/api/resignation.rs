use crate::api::{Pagination, attachment};
use crate::auth::auth::AuthUser;
use crate::model::resignation::{ExitSurvey, HandoverStatus, ResignationStatus};
use crate::service::{HrService, NewResignation};
use crate::workflow::resignation::ResignationAction;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "action": "approve",
    "comment": "Approved; exit interview on the 25th",
    "expected_version": 0
}))]
pub struct ResignationDecision {
    pub action: ResignationAction,
    pub comment: Option<String>,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HandoverBody {
    pub handover_status: HandoverStatus,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ResignationQuery {
    pub status: Option<ResignationStatus>,
}

/* =========================
Submit resignation
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/resignation",
    request_body = NewResignation,
    responses(
        (status = 201, description = "Resignation submitted", body = Resignation),
        (status = 400, description = "Reason too short or last day in the past"),
        (status = 409, description = "An open resignation already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn submit_resignation(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewResignation>,
) -> actix_web::Result<impl Responder> {
    let resignation = service.submit_resignation(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(resignation))
}

/// Approve, reject or complete (HR/Admin) or withdraw (owner).
#[utoipa::path(
    put,
    path = "/api/v1/resignation/{id}/decision",
    params(("id" = u64, Path, description = "Resignation ID")),
    request_body = ResignationDecision,
    responses(
        (status = 200, description = "Status changed", body = Resignation),
        (status = 404, description = "Resignation not found"),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn decide_resignation(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<ResignationDecision>,
) -> actix_web::Result<impl Responder> {
    let ResignationDecision {
        action,
        comment,
        expected_version,
    } = payload.into_inner();
    let resignation =
        service.decide_resignation(&auth.actor(), path.into_inner(), action, comment, expected_version)?;
    Ok(HttpResponse::Ok().json(resignation))
}

#[utoipa::path(
    put,
    path = "/api/v1/resignation/{id}/exit-survey",
    params(("id" = u64, Path, description = "Resignation ID")),
    request_body = ExitSurvey,
    responses(
        (status = 200, description = "Survey attached", body = Resignation),
        (status = 400, description = "Rating out of range")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn submit_exit_survey(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<ExitSurvey>,
) -> actix_web::Result<impl Responder> {
    let resignation = service.submit_exit_survey(&auth.actor(), path.into_inner(), payload.into_inner())?;
    Ok(HttpResponse::Ok().json(resignation))
}

#[utoipa::path(
    put,
    path = "/api/v1/resignation/{id}/handover",
    params(("id" = u64, Path, description = "Resignation ID")),
    request_body = HandoverBody,
    responses(
        (status = 200, description = "Handover status updated", body = Resignation),
        (status = 409, description = "Not permitted")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn set_handover(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<HandoverBody>,
) -> actix_web::Result<impl Responder> {
    let resignation = service.set_handover(&auth.actor(), path.into_inner(), payload.handover_status)?;
    Ok(HttpResponse::Ok().json(resignation))
}

#[utoipa::path(
    get,
    path = "/api/v1/resignation/{id}",
    params(("id" = u64, Path, description = "Resignation ID")),
    responses(
        (status = 200, description = "Resignation", body = Resignation),
        (status = 404, description = "Resignation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn get_resignation(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let resignation = service.get_resignation(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(resignation))
}

#[utoipa::path(
    get,
    path = "/api/v1/resignation",
    params(ResignationQuery, Pagination),
    responses((status = 200, description = "Paginated resignations", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn list_resignations(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<ResignationQuery>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let resignations = service.list_resignations(&auth.actor(), query.status)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(resignations)))
}

/// Printable HTML resignation form, filled from the employee's latest resignation.
#[utoipa::path(
    get,
    path = "/api/v1/resignation/form/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "HTML document", content_type = "text/html", body = String),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Resignation"
)]
pub async fn resignation_form(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let form = service.resignation_form(&auth.actor(), path.into_inner())?;
    Ok(attachment("text/html; charset=utf-8", &form.file_name, form.html))
}
