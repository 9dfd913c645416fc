use std::process::ExitCode;

use tracing::{error, info};

use kairan::board::PostRepository;
use kairan::{AttachmentStore, Config, Database, UserRepository};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = kairan::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        kairan::logging::init_console_only(&config.logging.level);
    }

    info!("Kairan - circulation board");

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Startup failed");
            eprintln!("Startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> kairan::Result<()> {
    let db = Database::open(&config.database).await?;

    let users = UserRepository::new(db.pool());
    let seeded = users.seed_defaults(&config.seed).await?;
    if seeded > 0 {
        info!(seeded, "Created default accounts");
    }

    let storage = AttachmentStore::from_config(&config.files)?;

    info!(
        users = users.count().await?,
        posts = PostRepository::new(db.pool()).count().await?,
        storage = %storage.base_path().display(),
        default_category = %config.board.default_category,
        "Board ready"
    );

    db.close().await;
    Ok(())
}
