use log::{error, info};
use quiz_session_server::{
    config::ServerConfig, error::QuizError, handlers::connection_handler::handle_connection,
    loggers::file_logger::init_file_logger, models::quiz::QuestionBank,
};
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();

    if let Err(error) = init_file_logger(&config.log_dir) {
        eprintln!("Failed to start logger: {}", error);
        return ExitCode::FAILURE;
    }
    info!("App started!");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("Server stopped: {}", error);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), QuizError> {
    let bank = match &config.pack_path {
        Some(path) => QuestionBank::load(path)?,
        None => QuestionBank::default(),
    };
    info!("Serving \"{}\" ({} questions)", bank.name(), bank.len());
    let bank = Arc::new(bank);

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Listening on: {}", &config.addr);

    while let Ok((stream, addr)) = listener.accept().await {
        tokio::spawn(handle_connection(bank.clone(), stream, addr));
    }

    Ok(())
}
