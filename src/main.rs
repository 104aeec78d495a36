use dc_audit_report::{api, logging, AppConfig};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 配置加载失败时退回默认值, 日志初始化后再告警
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);
    if let Some(e) = config_error {
        warn!("Failed to load configuration, using defaults: {}", e);
    }
    info!("Starting server with config: {:?}", config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = api::AppState::new(config);

    let app = api::router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/datasets?file_name=  - upload inventory CSV");
    info!("  GET    /api/datasets/:id         - dataset summary");
    info!("  DELETE /api/datasets/:id         - drop dataset");
    info!("  POST   /api/datasets/:id/report  - audit worksheet PDF");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
