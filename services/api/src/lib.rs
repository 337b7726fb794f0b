mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use karma_passport::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
