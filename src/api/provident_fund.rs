use crate::api::{Pagination, ReviewBody, promotion::StatusQuery};
use crate::auth::auth::AuthUser;
use crate::service::{HrService, NewPfRequest};
use actix_web::{HttpResponse, Responder, web};

/* =========================
CECPF loan / withdrawal
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/provident-fund",
    request_body = NewPfRequest,
    responses(
        (status = 201, description = "Request submitted", body = PfRequest),
        (status = 400, description = "Bad request"),
        (status = 422, description = "Not eligible (service length, age or balance)")
    ),
    security(("bearer_auth" = [])),
    tag = "Provident Fund"
)]
pub async fn submit_pf_request(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewPfRequest>,
) -> actix_web::Result<impl Responder> {
    let request = service.submit_pf_request(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(request))
}

/// Finance/Admin decision; approval debits the employee's fund balance.
#[utoipa::path(
    put,
    path = "/api/v1/provident-fund/{id}/review",
    params(("id" = u64, Path, description = "Request ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Decision recorded", body = PfRequest),
        (status = 403, description = "Finance/Admin only"),
        (status = 409, description = "Already resolved or stale version"),
        (status = 422, description = "Balance no longer covers the amount")
    ),
    security(("bearer_auth" = [])),
    tag = "Provident Fund"
)]
pub async fn review_pf_request(
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
    let request = service.review_pf_request(&auth.actor(), path.into_inner(), decision, comment, expected_version)?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/provident-fund/{id}",
    params(("id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = PfRequest),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Provident Fund"
)]
pub async fn get_pf_request(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = service.get_pf_request(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/provident-fund",
    params(StatusQuery, Pagination),
    responses((status = 200, description = "Paginated requests", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Provident Fund"
)]
pub async fn list_pf_requests(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<StatusQuery>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let requests = service.list_pf_requests(&auth.actor(), query.status)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(requests)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{bearer, peer, service, test_app};
    use crate::model::role::Role;
    use crate::service::test_support::{JUNIOR, RAFIQ};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn junior_staff_are_ineligible() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/provident-fund")
            .insert_header(("Authorization", bearer(Role::Employee, Some(JUNIOR))))
            .peer_addr(peer())
            .set_json(json!({ "loan_type": "Refundable", "amount": 10000.0, "purpose": "Medical bills" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "ineligible");
    }

    #[actix_web::test]
    async fn finance_approves_and_balance_drops() {
        let service = service();
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/provident-fund")
            .insert_header(("Authorization", bearer(Role::Employee, Some(RAFIQ))))
            .peer_addr(peer())
            .set_json(json!({ "loan_type": "Refundable", "amount": 30000.0, "purpose": "House repair" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_u64().expect("request id");

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/provident-fund/{}/review", id))
            .insert_header(("Authorization", bearer(Role::Finance, None)))
            .peer_addr(peer())
            .set_json(json!({ "decision": "approve" }))
            .to_request();
        let reviewed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reviewed["status"], "Approved");

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/employee/{}", RAFIQ))
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .peer_addr(peer())
            .to_request();
        let employee: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(employee["pf_balance"], 70000.0);
    }
}
