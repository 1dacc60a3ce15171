use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown trade direction: {0}")]
    UnknownDirection(String),

    #[error("unknown trade status: {0}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, Error>;
