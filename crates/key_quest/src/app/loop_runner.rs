use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.sprites_dir, app.scene) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    info!("exit_clean");
    ExitCode::SUCCESS
}
