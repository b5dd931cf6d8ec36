use crate::{
    api::{balance, leave_request, leave_type},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let apply_limiter = Arc::new(build_limiter(config.rate_apply_per_min));
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter) // rate limiting
            .service(
                web::scope("/leave-type")
                    // /leave-type
                    .service(
                        web::resource("")
                            .route(web::post().to(leave_type::create_leave_type))
                            .route(web::get().to(leave_type::leave_type_list)),
                    )
                    // /leave-type/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(leave_type::get_leave_type)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave (the apply resource gets its own, tighter limiter)
                    .service(
                        web::resource("")
                            .wrap(apply_limiter.clone())
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::apply_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/withdraw
                    .service(
                        web::resource("/{id}/withdraw")
                            .route(web::put().to(leave_request::withdraw_leave)),
                    ),
            )
            .service(
                web::scope("/balance")
                    // /balance
                    .service(web::resource("").route(web::get().to(balance::list_balances))),
            ),
    );
}

// APPLY
//  ├─ validate every touched period
//  └─ debit buckets + create pending request (one transaction)

// REJECT / WITHDRAW
//  └─ replay the stored split
//       └─ credit buckets + flip status (one transaction)
