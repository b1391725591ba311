use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use graz_eats::config::{GatewayBackend, Settings};
use graz_eats::core::{Lexicon, Pipeline};
use graz_eats::routes::{self, AppState};
use graz_eats::services::{DatasetGateway, PostgresGateway, RepositoryGateway};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

async fn build_gateway(settings: &Settings) -> std::io::Result<Arc<dyn RepositoryGateway>> {
    match settings.gateway.backend {
        GatewayBackend::Dataset => {
            let gateway = DatasetGateway::load(&settings.gateway.dataset_path)
                .map_err(|e| io_error("Failed to load restaurant dataset", e))?;
            Ok(Arc::new(gateway))
        }
        GatewayBackend::Postgres => {
            let url = settings
                .gateway
                .database_url
                .as_deref()
                .ok_or_else(|| io_error("Configuration error", "gateway.database_url is not set"))?;
            let max_conn = settings.gateway.max_connections.unwrap_or(10);
            let min_conn = settings.gateway.min_connections.unwrap_or(1);

            let gateway = PostgresGateway::connect(url, max_conn, min_conn)
                .await
                .map_err(|e| io_error("Failed to connect to PostgreSQL", e))?;

            info!("PostgreSQL gateway initialized (max: {} connections)", max_conn);
            Ok(Arc::new(gateway))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings);

    info!("Starting Graz Eats search service...");

    let lexicon = match &settings.lexicon.path {
        Some(path) => Lexicon::load(path),
        None => Lexicon::builtin(),
    }
    .map_err(|e| io_error("Failed to load lexicon", e))?;

    info!("Lexicon loaded (version {})", lexicon.version().unwrap_or("unversioned"));

    let gateway = build_gateway(&settings).await?;

    let options = settings
        .to_pipeline_options()
        .map_err(|e| io_error("Configuration error", e))?;
    let weights = settings.weights();

    info!("Pipeline initialized with weights: {:?}, options: {:?}", weights, options);

    let app_state = AppState {
        pipeline: Pipeline::new(Arc::new(lexicon), gateway, weights, options),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
