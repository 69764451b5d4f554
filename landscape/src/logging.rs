//! Logging bootstrap driven by environment variables named after the binary.
//!
//! For a binary called `landscape`:
//! - `LANDSCAPE_LOG_LEVEL`: debug | info | warn | error | off (plus short aliases); default off.
//! - `LANDSCAPE_LOG_STREAM`: stderr (default) | stdout | file (`landscape-<pid>.log`).
//! - `LANDSCAPE_DOTENV`: path of a `.env` file to load before flags are parsed.
//!
//! `RUST_LOG` directives, if set, refine the level.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// `my-app` -> `MY_APP`.
fn env_prefix() -> String {
    let name = std::env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    name.to_uppercase().replace('-', "_")
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "debug" | "dbg" | "d" | "trace" | "trc" | "t" => Some(LevelFilter::DEBUG),
        "informational" | "info" | "inf" | "i" => Some(LevelFilter::INFO),
        "warning" | "warn" | "wrn" | "w" => Some(LevelFilter::WARN),
        "error" | "err" | "e" | "fatal" | "ftl" | "f" => Some(LevelFilter::ERROR),
        "off" | "none" | "null" | "nil" | "no" | "n" => Some(LevelFilter::OFF),
        _ => None,
    }
}

fn make_writer(stream: Option<&str>, prefix: &str) -> BoxMakeWriter {
    match stream.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("stdout" | "output" | "out" | "o") => BoxMakeWriter::new(std::io::stdout),
        Some("file") => {
            let filename = format!("{}-{}.log", prefix.to_lowercase(), std::process::id());
            match File::create(&filename) {
                Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
                Err(_) => BoxMakeWriter::new(std::io::stderr),
            }
        }
        _ => BoxMakeWriter::new(std::io::stderr),
    }
}

/// Install the global subscriber, then load the optional `.env` file.
pub fn init() {
    let prefix = env_prefix();
    let level = std::env::var(format!("{}_LOG_LEVEL", prefix))
        .ok()
        .and_then(|l| parse_level(&l))
        .unwrap_or(LevelFilter::OFF);
    let stream = std::env::var(format!("{}_LOG_STREAM", prefix)).ok();

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer(stream.as_deref(), &prefix))
        .with_file(true)
        .with_line_number(true)
        .try_init();

    if let Ok(dotenv) = std::env::var(format!("{}_DOTENV", prefix)) {
        tracing::info!(path = %dotenv, "loading .env file");
        match dotenvy::from_path(&dotenv) {
            Ok(()) => tracing::info!(path = %dotenv, "successfully loaded .env file"),
            Err(e) => tracing::error!(error = %e, "error loading .env file"),
        }
    }
}
