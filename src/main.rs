use tracing::{error, info};

use filerepo::{Config, FileRepository, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.apply_env_overrides() {
        eprintln!("{e}");
        eprintln!("Keeping port {}.", config.server.port);
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = filerepo::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filerepo::logging::init_console_only(&config.logging.level);
    }

    info!("filerepo - Sandboxed File Repository");

    let repo = match FileRepository::open(&config.storage) {
        Ok(repo) => repo,
        Err(e) => {
            error!("Failed to open storage root {}: {}", config.storage.root, e);
            std::process::exit(1);
        }
    };
    info!("Storage root: {}", repo.root().path().display());

    let server = match WebServer::new(&config, repo) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
