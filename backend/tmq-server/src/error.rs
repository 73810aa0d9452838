use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] tmq_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] tmq_db::DbError),

    #[error("Broker client error: {0}")]
    Broker(#[from] tmq_broker::BrokerError),

    #[error("Engine error: {0}")]
    Engine(#[from] tmq_engine::EngineError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Metrics exporter error: {message}")]
    Metrics { message: String },
}

pub type Result<T> = std::result::Result<T, ServerError>;
