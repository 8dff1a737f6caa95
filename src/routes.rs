use crate::{
    api::{
        attendance, employee, leave_request, pams, payroll, policy, profile_update, promotion, provident_fund,
        resignation,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(web::resource("/users").route(web::post().to(handlers::register)))
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::patch().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee)),
                    )
                    .service(web::resource("/{id}/leave-balance").route(web::get().to(employee::leave_balance)))
                    .service(
                        web::resource("/{id}/eligibility/maternity")
                            .route(web::get().to(employee::maternity_eligibility)),
                    )
                    .service(
                        web::resource("/{id}/eligibility/provident-fund")
                            .route(web::get().to(employee::pf_eligibility)),
                    )
                    // /employee/{id}/records/{section}
                    .service(
                        web::resource("/{id}/records/{section}")
                            .route(web::get().to(employee::list_records))
                            .route(web::post().to(employee::add_record)),
                    )
                    .service(
                        web::resource("/{id}/records/{section}/{record_id}")
                            .route(web::put().to(employee::update_record))
                            .route(web::delete().to(employee::remove_record)),
                    ),
            )
            .service(
                web::scope("/profile-update")
                    .service(
                        web::resource("")
                            .route(web::get().to(profile_update::list_profile_updates))
                            .route(web::post().to(profile_update::submit_profile_update)),
                    )
                    .service(
                        web::resource("/{id}/review").route(web::put().to(profile_update::review_profile_update)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/review
                    .service(web::resource("/{id}/review").route(web::put().to(leave_request::review_leave))),
            )
            .service(
                web::scope("/pams")
                    .service(
                        web::resource("")
                            .route(web::get().to(pams::list_pams))
                            .route(web::post().to(pams::submit_pams)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(pams::get_pams)))
                    .service(web::resource("/{id}/review").route(web::put().to(pams::review_pams)))
                    .service(web::resource("/{id}/resubmit").route(web::put().to(pams::resubmit_pams))),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::put().to(attendance::check_out))
                            .route(web::post().to(attendance::check_in)),
                    )
                    .service(web::resource("/mark").route(web::post().to(attendance::mark_attendance)))
                    .service(
                        web::resource("/corrections")
                            .route(web::get().to(attendance::list_corrections))
                            .route(web::post().to(attendance::submit_correction)),
                    )
                    // before /corrections/{id} so "export" is not read as an id
                    .service(
                        web::resource("/corrections/export").route(web::get().to(attendance::export_corrections)),
                    )
                    .service(web::resource("/corrections/{id}").route(web::get().to(attendance::get_correction)))
                    .service(
                        web::resource("/corrections/{id}/review")
                            .route(web::put().to(attendance::review_correction)),
                    )
                    .service(
                        web::resource("/corrections/{id}/override")
                            .route(web::put().to(attendance::override_correction)),
                    ),
            )
            .service(
                web::scope("/resignation")
                    .service(
                        web::resource("")
                            .route(web::get().to(resignation::list_resignations))
                            .route(web::post().to(resignation::submit_resignation)),
                    )
                    .service(
                        web::resource("/form/{employee_id}").route(web::get().to(resignation::resignation_form)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(resignation::get_resignation)))
                    .service(
                        web::resource("/{id}/decision").route(web::put().to(resignation::decide_resignation)),
                    )
                    .service(
                        web::resource("/{id}/exit-survey").route(web::put().to(resignation::submit_exit_survey)),
                    )
                    .service(web::resource("/{id}/handover").route(web::put().to(resignation::set_handover))),
            )
            .service(
                web::scope("/promotion")
                    .service(
                        web::resource("")
                            .route(web::get().to(promotion::list_promotions))
                            .route(web::post().to(promotion::submit_promotion)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(promotion::get_promotion)))
                    .service(web::resource("/{id}/review").route(web::put().to(promotion::review_promotion))),
            )
            .service(
                web::scope("/provident-fund")
                    .service(
                        web::resource("")
                            .route(web::get().to(provident_fund::list_pf_requests))
                            .route(web::post().to(provident_fund::submit_pf_request)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(provident_fund::get_pf_request)))
                    .service(
                        web::resource("/{id}/review").route(web::put().to(provident_fund::review_pf_request)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    .service(web::resource("/compute").route(web::get().to(payroll::compute_payroll)))
                    .service(web::resource("/payslip/{employee_id}").route(web::get().to(payroll::payslip)))
                    .service(
                        web::resource("/runs")
                            .route(web::get().to(payroll::list_payroll_runs))
                            .route(web::post().to(payroll::post_payroll_run)),
                    )
                    .service(
                        web::resource("/settings")
                            .route(web::get().to(payroll::get_settings))
                            .route(web::put().to(payroll::update_settings)),
                    ),
            )
            .service(
                web::scope("/policies")
                    .service(web::resource("").route(web::get().to(policy::list_policies)))
                    .service(web::resource("/{id}").route(web::get().to(policy::get_policy))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days, single use)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair; the old refresh token is spent

#[cfg(test)]
mod tests {
    use crate::api::test_support::{peer, service, test_app};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn login_refresh_rotates_and_old_token_dies() {
        let service = service();
        service
            .seed_admin("admin", "correct horse battery")
            .expect("seed admin");
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": "admin", "password": "correct horse battery" }))
            .to_request();
        let tokens: Value = test::call_and_read_body_json(&app, req).await;
        let refresh = tokens["refresh_token"].as_str().expect("refresh token").to_string();

        let refresh_req = || {
            test::TestRequest::post()
                .uri("/auth/refresh")
                .insert_header(("Authorization", format!("Bearer {}", refresh)))
                .peer_addr(peer())
                .to_request()
        };
        let resp = test::call_service(&app, refresh_req()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, refresh_req()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let service = service();
        service.seed_admin("admin", "correct horse battery").expect("seed admin");
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": "admin", "password": "nope-nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_token_is_not_an_access_token() {
        let service = service();
        service.seed_admin("admin", "correct horse battery").expect("seed admin");
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": "admin", "password": "correct horse battery" }))
            .to_request();
        let tokens: Value = test::call_and_read_body_json(&app, req).await;
        let refresh = tokens["refresh_token"].as_str().expect("refresh token");

        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header(("Authorization", format!("Bearer {}", refresh)))
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
