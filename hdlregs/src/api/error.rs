use std::path;

use crate::error::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    NotImplemented(#[from] NotImplementedError),
    #[error("cannot derive a module name from path {0:?}, please name the module explicitly")]
    UnknownModuleName(path::PathBuf),
    #[error(transparent)]
    Hdlregs(#[from] crate::error::Error),
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::Hdlregs(err.into())
    }
}

#[derive(Error, Debug, Clone)]
pub enum NotImplementedError {
    #[error("unsupported source format for path {0:?}, only TOML files are supported")]
    UnsupportedSourceFormat(path::PathBuf),
}
