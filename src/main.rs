use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use thoughtsort::api::middleware::ApiKeyAuth;
use thoughtsort::assistant::Assistant;
use thoughtsort::cli::{commands::{Cli, Commands}, run_cli};
use thoughtsort::config::AppConfig;
use thoughtsort::db;
use thoughtsort::llm::ProviderFactory;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli.command, &config).await {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting Thought Sort server...");

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let llm_provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("No settings for LLM provider '{}' in {}", config.llm.provider, cli.config);
            std::process::exit(1);
        }
    };
    let assistant = Assistant::new(llm_provider, config.assistant.clone());

    let host = config.server.host.clone();
    let port = config.server.port;

    info!(provider = assistant.provider_name(), "Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(assistant.clone()))
            .route("/health", web::get().to(health))
            .wrap(ApiKeyAuth)
            .configure(thoughtsort::api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
