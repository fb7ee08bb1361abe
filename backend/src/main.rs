use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evently_backend::{
    config::{mask_secret, Config},
    db::create_pool,
    repositories::{PgEventRepository, PgUserRepository},
    routes::build_router,
    services::{
        AuthService, AuthSettings, FoursquareClient, InMemoryRevocationStore, OrangeSmsClient,
    },
    state::AppState,
    utils::{
        email::{EmailDispatcher, SmtpMailer},
        Argon2Hasher, Clock, SystemClock, TokenIssuer,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evently_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        reset_token_expiration_hours = config.reset_token_expiration_hours,
        production_mode = config.production_mode,
        smtp_host = %config.smtp.host,
        smtp_password = %mask_secret(&config.smtp.password),
        places_api_key = %mask_secret(&config.places.api_key),
        sms_token_auth = %mask_secret(&config.sms.token_auth),
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mailer = SmtpMailer::new(&config.smtp, &config.frontend_url)?;
    let auth = AuthService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(InMemoryRevocationStore::new()),
        Arc::new(Argon2Hasher),
        TokenIssuer::new(&config.jwt_secret, Arc::clone(&clock)),
        clock,
        EmailDispatcher::new(Arc::new(mailer)),
        AuthSettings::from(&config),
    );

    let places = FoursquareClient::new(&config.places)?;
    let sms = OrangeSmsClient::new(&config.sms)?;
    let port = config.port;

    let state = AppState::new(
        config,
        auth,
        Arc::new(PgEventRepository::new(pool)),
        Arc::new(places),
        Arc::new(sms),
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
