// server/src/telemetry.rs

use crate::config::LogFormat;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(format: LogFormat, default_filter: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  let installed = match format {
    LogFormat::Json => builder.json().try_init(),
    LogFormat::Text => builder.try_init(),
  };
  if let Err(err) = installed {
    eprintln!("tracing subscriber already installed: {}", err);
  }
}

/// Log format from `LOG_FORMAT`, read before the full config so config errors get logged too.
pub fn log_format_from_env() -> LogFormat {
  std::env::var("LOG_FORMAT")
    .ok()
    .and_then(|raw| raw.parse().ok())
    .unwrap_or(LogFormat::Text)
}
