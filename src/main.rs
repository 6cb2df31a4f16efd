use axum::{routing::get, Router};
use delivery_core::{app_error::AppError, config::Config, db::Database, model::AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载环境变量
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("loaded {:?}", config);

    // 连接数据库
    let db = Database::connect(&config).await?;

    let url = format!("0.0.0.0:{}", config.port);
    let app_state = AppState::new(config, db);

    let app = Router::new()
        .route("/", get(index_handler))
        .with_state(app_state);

    let listener = TcpListener::bind(&url).await?;

    tracing::debug!("listen at {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler() -> Result<(), AppError> {
    Ok(())
}
