//! File logging. The terminal belongs to the TUI, so everything goes to
//! `<data_dir>/logs/daodash.log`.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, Layer};

pub const LOG_FILE: &str = "daodash.log";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Logger(#[from] TryInitError),
}

fn targets_filter(trace: bool) -> Targets {
    Targets::new()
        .with_default(Level::WARN)
        .with_target("alloy_transport", Level::INFO)
        .with_target("alloy_provider", Level::INFO)
        .with_target("daodash", if trace { Level::TRACE } else { Level::DEBUG })
}

pub fn logs_path<P>(base_path: P) -> PathBuf
where
    P: AsRef<Path>,
{
    base_path.as_ref().join("logs")
}

pub fn init<P>(base_path: P) -> Result<PathBuf, Error>
where
    P: AsRef<Path>,
{
    let path = logs_path(base_path);
    std::fs::create_dir_all(&path)?;

    let file_appender = tracing_appender::rolling::never(&path, LOG_FILE);
    let writer = BoxMakeWriter::new(file_appender);
    let file_log = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(false);

    let trace: bool = env::var("DAODASH_TRACE") == Ok(String::from("true"));
    tracing_subscriber::registry()
        .with(file_log.with_filter(targets_filter(trace)))
        .try_init()?;

    Ok(path.join(LOG_FILE))
}
