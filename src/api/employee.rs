use crate::api::{Page, Pagination};
use crate::auth::auth::AuthUser;
use crate::model::{
    employee::{Employee, ProfileSection},
    provident_fund::LoanType,
};
use crate::service::{HrService, LeaveBalances, NewEmployee};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Filter by department name
    #[schema(example = "Computer Science")]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PfEligibilityQuery {
    pub loan_type: LoanType,
    #[schema(example = 50000.0)]
    pub amount: f64,
}

/* =========================
Create employee (HR/Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body(
        content = NewEmployee,
        description = "Employee payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Employee code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee = service.create_employee(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(employee))
}

/* =========================
List employees
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(EmployeeQuery, Pagination),
    responses(
        (status = 200, description = "Paginated employee list", body = Object, example = json!({
            "data": [{ "id": 1, "code": "EMP-001", "name": "Ayesha Rahman", "department": "Computer Science" }],
            "page": 1,
            "per_page": 20,
            "total": 1
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<EmployeeQuery>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let employees = service.list_employees(&auth.actor(), query.department.as_deref())?;
    let page: Page<Employee> = page.into_inner().paginate(employees);
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee profile", body = Employee),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee = service.get_employee(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Shallow merge: top-level fields in the body replace the stored ones.
#[utoipa::path(
    patch,
    path = "/api/v1/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body(content = Object, example = json!({
        "designation": "Associate Professor",
        "salary_base": 110000.0
    })),
    responses(
        (status = 200, description = "Updated employee", body = Employee),
        (status = 400, description = "Invalid or immutable field"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee = service.update_employee(&auth.actor(), path.into_inner(), &payload)?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}/leave-balance",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Remaining days per leave type; null means uncapped", body = Object, example = json!({
            "annual": 20.0, "casual": 7.0, "sick": 14.0, "medical": 30.0, "maternity": 120.0, "unpaid": null
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn leave_balance(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let balances: LeaveBalances = service.leave_balances(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(balances))
}

#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}/eligibility/maternity",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Eligibility verdict", body = Verdict),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn maternity_eligibility(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let verdict = service.maternity_eligibility(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(verdict))
}

#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}/eligibility/provident-fund",
    params(("id" = u64, Path, description = "Employee ID"), PfEligibilityQuery),
    responses(
        (status = 200, description = "Eligibility verdict", body = Verdict),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn pf_eligibility(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
    query: web::Query<PfEligibilityQuery>,
) -> actix_web::Result<impl Responder> {
    let verdict = service.pf_eligibility(&auth.actor(), path.into_inner(), query.loan_type, query.amount)?;
    Ok(HttpResponse::Ok().json(verdict))
}

/* =========================
Profile records (nested collections)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}/records/{section}",
    params(
        ("id" = u64, Path, description = "Employee ID"),
        ("section" = ProfileSection, Path, description = "Record collection")
    ),
    responses(
        (status = 200, description = "Records in the section", body = Object),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_records(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<(u64, ProfileSection)>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, section) = path.into_inner();
    let records = service.list_records(&auth.actor(), employee_id, section)?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    post,
    path = "/api/v1/employee/{id}/records/{section}",
    params(
        ("id" = u64, Path, description = "Employee ID"),
        ("section" = ProfileSection, Path, description = "Record collection")
    ),
    request_body(content = Object, example = json!({
        "title": "Federated learning on edge devices",
        "venue": "IEEE Access",
        "year": 2025
    })),
    responses(
        (status = 201, description = "Record added", body = Object),
        (status = 400, description = "Invalid record"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn add_record(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<(u64, ProfileSection)>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, section) = path.into_inner();
    let record = service.add_record(&auth.actor(), employee_id, section, &payload)?;
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    put,
    path = "/api/v1/employee/{id}/records/{section}/{record_id}",
    params(
        ("id" = u64, Path, description = "Employee ID"),
        ("section" = ProfileSection, Path, description = "Record collection"),
        ("record_id" = u64, Path, description = "Record ID within the section")
    ),
    request_body(content = Object),
    responses(
        (status = 200, description = "Record replaced", body = Object),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_record(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<(u64, ProfileSection, u64)>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, section, record_id) = path.into_inner();
    let record = service.update_record(&auth.actor(), employee_id, section, record_id, &payload)?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employee/{id}/records/{section}/{record_id}",
    params(
        ("id" = u64, Path, description = "Employee ID"),
        ("section" = ProfileSection, Path, description = "Record collection"),
        ("record_id" = u64, Path, description = "Record ID within the section")
    ),
    responses(
        (status = 200, description = "Record removed", body = Object, example = json!({
            "message": "Record removed"
        })),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn remove_record(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<(u64, ProfileSection, u64)>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, section, record_id) = path.into_inner();
    service.remove_record(&auth.actor(), employee_id, section, record_id)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Record removed" })))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, peer, service, test_app};
    use crate::model::role::Role;
    use crate::service::test_support::{AYESHA, RAFIQ};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn employee_cannot_read_a_colleague() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/employee/{}", RAFIQ))
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn hr_lists_with_pagination_envelope() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::get()
            .uri("/api/v1/employee?page=1&per_page=2")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .peer_addr(peer())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["per_page"], 2);
        assert_eq!(body["total"], 3);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn owner_adds_a_publication() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/employee/{}/records/publications", AYESHA))
            .insert_header(("Authorization", bearer(Role::Employee, Some(AYESHA))))
            .peer_addr(peer())
            .set_json(json!({ "title": "Edge learning", "venue": "IEEE Access", "year": 2025 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::get()
            .uri("/api/v1/employee")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
