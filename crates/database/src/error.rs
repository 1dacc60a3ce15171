use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to the database")]
    ConnectionError(#[from] sqlx::Error),
    #[error("Database migration failed: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Database operation failed")]
    OperationFailed(sqlx::Error),
    #[error("A user with email {0} already exists")]
    EmailTaken(String),
    #[error("Stored row failed to decode: {0}")]
    Decode(#[from] core_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
