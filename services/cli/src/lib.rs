mod cli;
mod commands;
mod infra;

use attachment_scoring::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
