pub mod config;
pub mod error;
pub mod export;
pub mod helpers;
pub mod session;

pub mod handlers {
    pub mod command_handler;
    pub mod connection_handler;
}

pub mod loggers {
    pub mod file_logger;
}

pub mod models {
    pub mod communication;
    pub mod quiz;
}
