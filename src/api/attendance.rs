use crate::api::{Pagination, ReviewBody, attachment};
use crate::auth::auth::AuthUser;
use crate::model::{approval::RequestStatus, attendance::Attendance};
use crate::service::{AttendanceFilter, CorrectionFilter, HrService, MarkAttendance, NewCorrection};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

/// HR/Admin override of an already resolved correction.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "Approved",
    "reason": "Gate log confirms arrival at 08:55",
    "expected_version": 2
}))]
pub struct OverrideBody {
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
}

/* =========================
Check-in / check-out (self service)
========================= */
/// Check in for today; arriving after office start plus grace marks the day late.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already checked in today")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(auth: AuthUser, service: web::Data<HrService>) -> actix_web::Result<impl Responder> {
    let record = service.check_in(&auth.actor())?;
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No check-in today or already checked out")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(auth: AuthUser, service: web::Data<HrService>) -> actix_web::Result<impl Responder> {
    let record = service.check_out(&auth.actor())?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter, Pagination),
    responses(
        (status = 200, description = "Paginated attendance records", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    service: web::Data<HrService>,
    filter: web::Query<AttendanceFilter>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let records = service.list_attendance(&auth.actor(), &filter)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(records)))
}

/// HR/Admin sets the status of any past or current day.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/mark",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Day recorded", body = Attendance),
        (status = 400, description = "Date is in the future"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let record = service.mark_attendance(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Attendance corrections
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/attendance/corrections",
    request_body = NewCorrection,
    responses(
        (status = 201, description = "Correction submitted", body = AttendanceCorrection),
        (status = 400, description = "Bad request"),
        (status = 409, description = "A correction for that day is already pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn submit_correction(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewCorrection>,
) -> actix_web::Result<impl Responder> {
    let correction = service.submit_correction(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(correction))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/corrections",
    params(CorrectionFilter, Pagination),
    responses(
        (status = 200, description = "Paginated corrections", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_corrections(
    auth: AuthUser,
    service: web::Data<HrService>,
    filter: web::Query<CorrectionFilter>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let corrections = service.list_corrections(&auth.actor(), &filter)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(corrections)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/corrections/{id}",
    params(("id" = u64, Path, description = "Correction ID")),
    responses(
        (status = 200, description = "Correction", body = AttendanceCorrection),
        (status = 404, description = "Correction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_correction(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let correction = service.get_correction(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(correction))
}

#[utoipa::path(
    put,
    path = "/api/v1/attendance/corrections/{id}/review",
    params(("id" = u64, Path, description = "Correction ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Correction resolved", body = AttendanceCorrection),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already resolved or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn review_correction(
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
    let correction =
        service.review_correction(&auth.actor(), path.into_inner(), decision, comment, expected_version)?;
    Ok(HttpResponse::Ok().json(correction))
}

#[utoipa::path(
    put,
    path = "/api/v1/attendance/corrections/{id}/override",
    params(("id" = u64, Path, description = "Correction ID")),
    request_body = OverrideBody,
    responses(
        (status = 200, description = "Decision overridden", body = AttendanceCorrection),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "Reason missing, still pending or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn override_correction(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<OverrideBody>,
) -> actix_web::Result<impl Responder> {
    let OverrideBody {
        status,
        reason,
        expected_version,
    } = payload.into_inner();
    let correction =
        service.override_correction(&auth.actor(), path.into_inner(), status, reason, expected_version)?;
    Ok(HttpResponse::Ok().json(correction))
}

/// CSV download of the filtered corrections.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/corrections/export",
    params(CorrectionFilter),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn export_corrections(
    auth: AuthUser,
    service: web::Data<HrService>,
    filter: web::Query<CorrectionFilter>,
) -> actix_web::Result<impl Responder> {
    let csv = service.export_corrections_csv(&auth.actor(), &filter)?;
    Ok(attachment("text/csv; charset=utf-8", "attendance_corrections.csv", csv))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, peer, service, test_app};
    use crate::model::role::Role;
    use crate::service::test_support::AYESHA;
    use actix_web::{http::StatusCode, http::header, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn export_is_a_csv_attachment() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/corrections")
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .set_json(json!({
                "date": "2026-02-10",
                "requested_status": "present",
                "reason": "Biometric device was down"
            }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["status"], "Pending");

        let req = test::TestRequest::get()
            .uri("/api/v1/attendance/corrections/export?status=Pending")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("attendance_corrections.csv"));
        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(text.starts_with("\"Employee ID\",\"Employee Name\""));
        assert_eq!(text.lines().count(), 2);
    }

    #[actix_web::test]
    async fn employee_cannot_export() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::get()
            .uri("/api/v1/attendance/corrections/export")
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
