use sea_orm::Database;
use tracing::info;

use iels_core::config::Config;
use iels_core::tracing::init_tracing;
use iels_identity::config::IdentityConfig;
use iels_identity::infra::mailer::AppMailer;
use iels_identity::router::build_router;
use iels_identity::state::AppState;
use iels_identity::usecase::code::CodeHasher;
use iels_identity::usecase::retention::PurgeExpiredOtpsUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = IdentityConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let hasher = CodeHasher::new(&config.otp_secret).expect("invalid OTP_SECRET");
    let mailer = AppMailer::from_config(&config).expect("invalid mail configuration");
    if matches!(mailer, AppMailer::Log(_)) {
        info!("SMTP_HOST not set, codes will be logged instead of emailed");
    }

    let state = AppState {
        db,
        mailer,
        hasher,
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
    };

    let purge = PurgeExpiredOtpsUseCase {
        otps: state.otp_repo(),
        retention: chrono::Duration::hours(i64::from(config.otp_retention_hours)),
    };
    tokio::spawn(purge.run(std::time::Duration::from_secs(
        config.otp_purge_interval_secs.get(),
    )));

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.identity_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("identity service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
