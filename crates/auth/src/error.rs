use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub type Result<T> = std::result::Result<T, Error>;
