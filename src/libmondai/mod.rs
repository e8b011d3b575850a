use thiserror::Error;

pub mod archive;
pub mod db;
pub mod question;
pub mod session;
pub mod store;

#[derive(Debug, Error)]
pub enum Error {
    #[error("question file is not a list of questions")]
    InvalidFormat,
    #[error("question {0} does not exist")]
    OutOfBounds(usize),
    #[error("cannot delete the only remaining question")]
    SoleQuestion,
    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("cannot serialize questions: {0}")]
    Serialize(#[from] serde_json::Error),
}
