use thiserror::Error;

pub type TwinResult<T> = Result<T, TwinError>;

#[derive(Error, Debug)]
pub enum TwinError {
    #[error("config error: {0}")]
    Config(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("anomaly model not trained")]
    ModelNotTrained,

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
