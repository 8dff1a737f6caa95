use crate::api::{Pagination, ReviewBody};
use crate::auth::auth::AuthUser;
use crate::model::approval::RequestStatus;
use crate::service::{HrService, NewPromotion};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StatusQuery {
    pub status: Option<RequestStatus>,
}

#[utoipa::path(
    post,
    path = "/api/v1/promotion",
    request_body = NewPromotion,
    responses(
        (status = 201, description = "Promotion request filed", body = PromotionRequest),
        (status = 400, description = "Justification too short or same designation"),
        (status = 409, description = "A request is already pending for this employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotion"
)]
pub async fn submit_promotion(
    auth: AuthUser,
    service: web::Data<HrService>,
    payload: web::Json<NewPromotion>,
) -> actix_web::Result<impl Responder> {
    let request = service.submit_promotion(&auth.actor(), payload.into_inner())?;
    Ok(HttpResponse::Created().json(request))
}

#[utoipa::path(
    put,
    path = "/api/v1/promotion/{id}/review",
    params(("id" = u64, Path, description = "Promotion request ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Decision recorded", body = PromotionRequest),
        (status = 409, description = "Not this role's step or stale version")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotion"
)]
pub async fn review_promotion(
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
    let request = service.review_promotion(&auth.actor(), path.into_inner(), decision, comment, expected_version)?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/promotion/{id}",
    params(("id" = u64, Path, description = "Promotion request ID")),
    responses(
        (status = 200, description = "Promotion request", body = PromotionRequest),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotion"
)]
pub async fn get_promotion(
    auth: AuthUser,
    service: web::Data<HrService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = service.get_promotion(&auth.actor(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/promotion",
    params(StatusQuery, Pagination),
    responses((status = 200, description = "Paginated promotion requests", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Promotion"
)]
pub async fn list_promotions(
    auth: AuthUser,
    service: web::Data<HrService>,
    query: web::Query<StatusQuery>,
    page: web::Query<Pagination>,
) -> actix_web::Result<impl Responder> {
    let requests = service.list_promotions(&auth.actor(), query.status)?;
    Ok(HttpResponse::Ok().json(page.into_inner().paginate(requests)))
}
