use clap::Parser;

use stream_overlay::cli::{self, Args, Command};
use stream_overlay::config::Config;

/// Load .env file. Existing environment variables are not overridden.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}

/// Load config. An explicit --config path must exist; the default path
/// falls back to built-in settings.
fn load_config(args: &Args) -> Config {
    let cfg = if let Some(path) = &args.config {
        match Config::load_from_explicit(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Config::default()
            }
        }
    };
    cfg.with_overrides(args.api_url.as_deref())
}

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    load_env();
    init_logging();

    let args = Args::parse();
    let config = load_config(&args);

    let store = || exit_on_error(cli::build_store(&config));

    match args.command.unwrap_or(Command::Console) {
        Command::Status => exit_on_error(cli::show_status(&store()).await),
        Command::Start { rtsp_url } => exit_on_error(cli::start_stream(&store(), &rtsp_url).await),
        Command::Stop => exit_on_error(cli::stop_stream(&store()).await),
        Command::Overlays { action } => {
            exit_on_error(cli::handle_overlay_action(&store(), action).await)
        }
        Command::Render {
            filter,
            width,
            height,
        } => exit_on_error(cli::render(&store(), filter, width, height).await),
        Command::Console => cli::run_console(store(), &config).await,
        Command::Config { action } => exit_on_error(cli::handle_config_action(
            action,
            &config,
            args.config.as_deref(),
        )),
    }
}
