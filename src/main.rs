use clap::Parser;
use std::process::ExitCode;

use bitwire::commands;
use bitwire::config::{CliArgs, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();

    let config = match Config::from_args(&args).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(commands::EXIT_FAILURE);
        }
    };

    init_logging(&config);

    if config.mode == bitwire::Mode::Sandbox {
        tracing::info!("Running in sandbox mode");
    } else {
        tracing::info!("Running in production mode");
    }

    match commands::run(&config, &args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command `{}` failed: {:#}", args.command.name(), e);
            eprintln!("{}", commands::user_message(&e));
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

/// Initialize logging on stderr; RUST_LOG overrides the configured level
fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
