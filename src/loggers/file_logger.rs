use chrono::Utc;
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

use crate::error::QuizError;

const LOG_PATTERN: &str = "{d(%H:%M:%S)(utc)} {l} - {m}{n}";

/// Logs to `<log_dir>/<utc date>.log` and to stdout.
pub fn init_file_logger(log_dir: &Path) -> Result<(), QuizError> {
    let current_date = Utc::now().date_naive().to_string();
    let path = log_dir.join(format!("{}.log", current_date));

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&path)?;
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stdout")
                .build(LevelFilter::Info),
        )
        .map_err(|error| QuizError::Logger(error.to_string()))?;

    log4rs::init_config(config).map_err(|error| QuizError::Logger(error.to_string()))?;
    info!("File logger initialized at {}", path.display());

    Ok(())
}
