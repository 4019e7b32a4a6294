use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use dobeu_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{ResendService, TwilioService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{JwtService, RandomCodeGenerator, RateLimiter, SystemClock},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt);
    let clock = Arc::new(SystemClock);

    let twilio_service = TwilioService::new(config.twilio.clone());
    if !twilio_service.is_configured() {
        log::warn!("Twilio credentials missing; verification SMS will fail");
    }
    let resend_service = ResendService::new(config.resend.clone());

    let limiter = RateLimiter::new(&config.rate_limit, clock.clone());

    let verification_service = VerificationService::new(
        pool.clone(),
        Arc::new(twilio_service),
        Arc::new(RandomCodeGenerator),
        clock.clone(),
    );
    let profile_service = ProfileService::new(pool.clone());
    let form_service = FormService::new(
        pool.clone(),
        limiter.clone(),
        Arc::new(resend_service),
        clock.clone(),
    );

    tasks::spawn_all(
        verification_service.clone(),
        limiter.clone(),
        config.maintenance.interval_secs,
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let trusted_proxies = handlers::TrustedProxies(config.server.trusted_proxies.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(handlers::json_config())
            .app_data(web::Data::new(trusted_proxies.clone()))
            .app_data(web::Data::new(verification_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(form_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::verification_config)
                    .configure(handlers::forms_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
