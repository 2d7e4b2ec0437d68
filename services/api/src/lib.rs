mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use msh3::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
