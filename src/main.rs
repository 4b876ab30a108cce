use std::process::ExitCode;

use model_viewer::{run, ViewerConfig, ViewerError};

fn main() -> ExitCode {
    let config = match ViewerConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        // help and version exit 0, bad arguments exit 2
        Err(ViewerError::Usage(e)) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match pollster::block_on(run(false, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("viewer failed: {e}");
            ExitCode::FAILURE
        }
    }
}
