use comptoir_api::api;
use comptoir_api::config::Config;
use comptoir_api::infrastructure::database;
use comptoir_api::state::{AppState, Repositories};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,comptoir_api=debug")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let repositories = match &config.database {
        Some(database_config) => {
            let pool = database::connect(database_config)
                .await
                .expect("Failed to connect to database");
            database::migrate(&pool)
                .await
                .expect("Failed to run database migrations");
            Repositories::postgres(pool)
        }
        None => Repositories::in_memory(),
    };

    let addr = config.bind_addr;
    let app = api::router(AppState::new(repositories, config));

    // Start server
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
