use crate::{
    api::{corporate, report, response::ApiError},
    config::Config,
};
use actix_files::Files;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Per-IP limiter; zero is clamped so the builder always succeeds
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("rate limit values are clamped to non-zero");
        Governor::new(&cfg)
    }

    // Malformed query strings get the same envelope as missing parameters
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/corporates").route(web::get().to(corporate::list_corporates)))
            .service(web::resource("/factories").route(web::get().to(corporate::list_factories)))
            .service(web::resource("/months").route(web::get().to(corporate::list_months)))
            .service(web::resource("/corporate-data").route(web::get().to(corporate::corporate_data)))
            .service(
                web::resource("/corporate-data-params")
                    .wrap(build_limiter(config.rate_report_per_min))
                    .route(web::get().to(report::generate_report)),
            ),
    );

    // Generated reports, read-only
    cfg.service(Files::new(&config.reports_url_prefix, &config.reports_dir));
}
