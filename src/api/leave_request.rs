use crate::api::{Pagination, ReviewBody};
use crate::auth::auth::AuthUser;
use crate::service::{HrService, LeaveFilter, NewLeave};
use actix_web::{HttpResponse, Responder, web};
use tracing::info;

/* =========================
Create leave request
========================= */
/// Submits a leave request for the caller's own employee profile.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = NewLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an existing request"),
        (status = 422, description = "Not eligible or insufficient balance")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewLeave>,
) -> actix_web::Result<impl Responder> {
    let leave = service.submit_leave(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Review leave (current chain step)
========================= */
/// Approve or reject the current step of the leave's approval chain.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/review",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to review")
    ),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Decision recorded", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not this role's step, chain closed or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn review_leave(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<ReviewBody>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let ReviewBody {
        decision,
        comment,
        expected_version,
    } = payload.into_inner();

    let leave = service.review_leave(&auth.actor(), leave_id, decision, comment, expected_version)?;
    info!(leave_id, decision = %decision, status = %leave.status, "Leave reviewed via API");
    Ok(HttpResponse::Ok().json(leave))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave = service.get_leave(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Leave list; employees only ever see their own requests.
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter, Pagination),
    responses(
        (status = 200, description = "Paginated leave list", body = Object, example = json!({
            "data": [{
                "id": 1,
                "employee_id": 1,
                "leave_type": "casual",
                "start_date": "2026-03-10",
                "end_date": "2026-03-12",
                "days": 3.0,
                "status": "Pending"
            }],
            "page": 1,
            "per_page": 20,
            "total": 1
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<HrService>,
    filter: web::Query<LeaveFilter>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let leaves = service.list_leaves(&auth.actor(), &filter)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(leaves)))
}
