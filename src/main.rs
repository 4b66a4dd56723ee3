//! Binary entry point for the stickerfix CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Rewrite public/js/stickers.js in place
//! stickerfix
//!
//! # Preview the change as a unified diff
//! stickerfix path/to/stickers.js --dry-run
//! ```

use std::io;
use std::process::ExitCode;

use clap::Parser;

use stickerfix::cli::{run, Cli, LogLevel};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    let code = run(&cli, &mut io::stdout(), &mut io::stderr());
    ExitCode::from(code)
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
