use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use gitform::cli::{self, Cli};
use gitform::ui::output;

/// `GITFORM_LOG` wins; otherwise `--debug` enables debug logs for this crate.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env("GITFORM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if debug { "gitform=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
