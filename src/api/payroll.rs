use crate::api::Pagination;
use crate::auth::auth::AuthUser;
use crate::model::payroll::PayrollSettings;
use crate::service::HrService;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    /// Any day inside the payroll month
    #[schema(example = "2026-02-01", format = "date", value_type = String)]
    pub month: NaiveDate,
}

/* =========================
Compute payroll (preview)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/payroll/compute",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Items for every active employee", body = [PayrollItem]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn compute_payroll(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let items = service.compute_payroll(&auth.actor(), query.month)?;
    Ok(HttpResponse::Ok().json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/payslip/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID"), PayrollQuery),
    responses(
        (status = 200, description = "Posted item, or a live computation if the month is not posted", body = PayrollItem),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payslip(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let item = service.payslip(&auth.actor(), path.into_inner(), query.month)?;
    Ok(HttpResponse::Ok().json(item))
}

/* =========================
Post payroll run
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/payroll/runs",
    request_body = PayrollQuery,
    responses(
        (status = 201, description = "Run posted; items are frozen", body = PayrollRun),
        (status = 400, description = "Future month"),
        (status = 409, description = "Month already posted")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn post_payroll_run(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let run = service.post_payroll_run(&auth.actor(), payload.month)?;
    Ok(HttpResponse::Created().json(run))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs",
    params(Pagination),
    responses((status = 200, description = "Paginated payroll runs", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll_runs(
    auth: AuthUser,
    service: web::Data<HrService>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let runs = service.list_payroll_runs(&auth.actor())?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(runs)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/settings",
    responses((status = 200, description = "Current settings", body = PayrollSettings)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_settings(auth: AuthUser, service: web::Data<HrService>) -> actix_web::Result<impl Responder> {
    let settings = service.payroll_settings(&auth.actor())?;
    Ok(HttpResponse::Ok().json(settings))
}

#[utoipa::path(
    put,
    path = "/api/v1/payroll/settings",
    request_body = PayrollSettings,
    responses(
        (status = 200, description = "Settings replaced", body = PayrollSettings),
        (status = 400, description = "Percentage out of range or zero divisor"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_settings(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<PayrollSettings>,
) -> actix_web::Result<impl Responder> {
    let settings = service.update_payroll_settings(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Ok().json(settings))
}
