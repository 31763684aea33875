use anyhow::Result;
use tracing_subscriber::EnvFilter;
use voxmeter_runtime::Config;

use crate::args::{Cli, Commands};
use crate::handlers;

pub fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level.as_filter()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let color = config.report.color && !cli.no_color;

    match cli.command {
        Commands::Report { log, format } => handlers::report::run(&log, format, color),
        Commands::Watch {
            path,
            poll_interval_ms,
        } => {
            let poll_ms = poll_interval_ms.unwrap_or(config.watch.poll_interval_ms);
            handlers::watch::run(path, poll_ms, color)
        }
        Commands::Export {
            log,
            format,
            output,
        } => handlers::export::run(&log, format, output.as_deref()),
    }
}
