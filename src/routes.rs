use crate::{
    api::{leave_request, working_days},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    middleware::{Condition, from_fn},
    web,
};
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
        // only fails for a zero period or burst, both excluded above
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Mounts the API under `config.api_prefix`. Rate limiting keys on the peer
/// address, so it is switched off where requests have none (tests).
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, rate_limited: bool) {
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));
    let actions_limiter = Arc::new(build_limiter(config.rate_actions_per_min));
    let state_changing = || Condition::new(rate_limited, actions_limiter.clone());

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Condition::new(rate_limited, api_limiter)) // rate limiting
            .service(web::resource("/working-days").route(web::post().to(working_days::working_days)))
            .service(web::resource("/holidays/{year}").route(web::get().to(working_days::holidays)))
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // fixed paths before /leave/{id}
                    .service(web::resource("/mine").route(web::get().to(leave_request::my_leave)))
                    .service(web::resource("/to-process").route(web::get().to(leave_request::to_process)))
                    .service(web::resource("/history").route(web::get().to(leave_request::history)))
                    .service(web::resource("/balance").route(web::get().to(leave_request::balance)))
                    .service(web::resource("/statuses").route(web::get().to(leave_request::statuses)))
                    .service(web::resource("/categories").route(web::get().to(leave_request::categories)))
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::patch().to(leave_request::amend_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    // /leave/{id}/confirm-days
                    .service(
                        web::resource("/{id}/confirm-days")
                            .wrap(state_changing())
                            .route(web::post().to(leave_request::confirm_days)),
                    )
                    // /leave/{id}/actions
                    .service(
                        web::resource("/{id}/actions")
                            .wrap(state_changing())
                            .route(web::post().to(leave_request::leave_action)),
                    ),
            ),
    );
}
