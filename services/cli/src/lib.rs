mod cli;
mod demo;
mod render;

use idris::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
