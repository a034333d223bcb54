use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::{CalComClient, CalendarProvider, ReconciliationJob};
use auth_cell::services::{SmsSender, TwilioSmsClient};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareLink Clinic API server");

    let config = Arc::new(AppConfig::from_env());

    if !config.is_sms_configured() {
        warn!("Twilio is not configured; OTPs will be stored but not delivered");
    }
    if !config.is_calendar_configured() {
        warn!("Cal.com is not configured; booking will fail with CAL_COM_ERROR");
    }

    let supabase = Arc::new(SupabaseClient::new(&config));
    let sms: Arc<dyn SmsSender> = Arc::new(TwilioSmsClient::new(&config));
    let calendar: Arc<dyn CalendarProvider> = Arc::new(CalComClient::new(&config));

    if config.reconcile_interval_secs > 0 && config.is_calendar_configured() {
        let job = Arc::new(ReconciliationJob::new(supabase.clone(), calendar.clone()));
        job.spawn(config.reconcile_interval_secs);
        info!(
            "Calendar reconciliation every {}s",
            config.reconcile_interval_secs
        );
    }

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(router::Services {
        config: config.clone(),
        supabase,
        sms,
        calendar,
    })
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
    )
    .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
