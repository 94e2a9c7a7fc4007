use std::path::PathBuf;

use thiserror::Error;

/// Why an import file name could not be turned into a path.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No file name given")]
    Empty,

    #[error("File name {0:?} is not a plain file name")]
    InvalidName(String),

    #[error("File {0} does not exist")]
    NotFound(PathBuf),
}
