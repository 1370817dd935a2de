//! Lexicon Server
//!
//! Vocabulary flashcards over HTTP: a JSON API for words and review sessions
//! plus the embedded web UI.
//!
//! Words are scheduled on a fixed interval table (1, 2, 4, 7, 15, 30 days).
//! A correct answer moves a word one stage up, a miss one stage down.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use lexicon_core::Storage;
use lexicon_server::{api, ServerConfig};

/// Command-line overrides on top of the environment
#[derive(Debug, Default)]
struct Args {
    host: Option<String>,
    port: Option<String>,
    data_dir: Option<PathBuf>,
    review_batch: Option<String>,
    no_ui: bool,
    open: bool,
}

fn usage_error(message: &str) -> ! {
    eprintln!("error: {}", message);
    eprintln!("Usage: lexicon-server [OPTIONS]");
    eprintln!("Try 'lexicon-server --help' for more information.");
    std::process::exit(1);
}

/// Parse command-line arguments.
/// Exits the process if `--help` or `--version` is requested.
fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args::default();
    let mut i = 1;

    // Accepts both `--flag value` and `--flag=value`
    let value_for = |flag: &str, i: &mut usize| -> String {
        let current = &argv[*i];
        if let Some(v) = current.strip_prefix(&format!("{}=", flag)) {
            if v.is_empty() {
                usage_error(&format!("{} requires a value", flag));
            }
            return v.to_string();
        }
        *i += 1;
        match argv.get(*i) {
            Some(v) => v.clone(),
            None => usage_error(&format!("{} requires a value", flag)),
        }
    };

    while i < argv.len() {
        let arg = argv[i].clone();
        let flag = arg.split('=').next().unwrap_or("");
        match flag {
            "--help" | "-h" => {
                println!("Lexicon Server v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Vocabulary flashcards with interval-table spaced repetition.");
                println!();
                println!("USAGE:");
                println!("    lexicon-server [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help                Print help information");
                println!("    -V, --version             Print version information");
                println!("    --host <ADDR>             Bind address (default 127.0.0.1)");
                println!("    --port <PORT>             Bind port (default 3000)");
                println!("    --data-dir <PATH>         Directory holding lexicon.db");
                println!("    --review-batch <N>        Words per review session (default 20)");
                println!("    --no-ui                   Serve the API only");
                println!("    --open                    Open the web UI in a browser");
                println!();
                println!("ENVIRONMENT:");
                println!("    LEXICON_HOST, LEXICON_PORT | PORT, LEXICON_DB_PATH | DB_PATH,");
                println!("    LEXICON_REVIEW_BATCH, LEXICON_STATIC");
                println!("    LEXICON_LOG_FORMAT       'json' for JSON log lines");
                println!("    RUST_LOG                 Log level filter (e.g., debug, info, warn)");
                println!();
                println!("EXAMPLES:");
                println!("    lexicon-server");
                println!("    lexicon-server --port 8080 --data-dir ./data");
                println!("    RUST_LOG=debug lexicon-server");
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("lexicon-server {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--host" => args.host = Some(value_for("--host", &mut i)),
            "--port" => args.port = Some(value_for("--port", &mut i)),
            "--data-dir" => args.data_dir = Some(PathBuf::from(value_for("--data-dir", &mut i))),
            "--review-batch" => args.review_batch = Some(value_for("--review-batch", &mut i)),
            "--no-ui" => args.no_ui = true,
            "--open" => args.open = true,
            _ => usage_error(&format!("unknown argument '{}'", arg)),
        }
        i += 1;
    }

    args
}

fn build_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::from_env()?;

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = &args.port {
        config.port = port
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value '{}' for --port", port))?;
    }
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(batch) = &args.review_batch {
        config.set_review_batch("--review-batch", batch)?;
    }
    if args.no_ui {
        config.static_enabled = false;
    }

    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let json = std::env::var("LEXICON_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first (before logging init, so --help/--version work cleanly)
    let args = parse_args();

    init_logging();

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Lexicon Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let storage = match Storage::new(config.db_path.clone()) {
        Ok(s) => {
            info!(path = %s.path().display(), "Storage initialized");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    api::serve(config, storage, args.open).await?;
    Ok(())
}
