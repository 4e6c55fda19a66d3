use std::path::{Path, PathBuf};

pub mod config;
pub mod models;

pub use crate::{
    config::{LoadConfig, Settings},
    models::{AuthKey, Credentials, Pet, PetFilter, PetList},
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("[{file}] {err}")]
    WithSource { file: PathBuf, err: Box<Self> },
    #[error("config error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("validation errors: {0}")]
    Validation(#[from] ::validator::ValidationErrors),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown pet filter '{0}', expected '' or 'my_pets'")]
    UnknownFilter(String),
}

impl Error {
    pub fn with_source(
        self,
        file: impl AsRef<Path>,
    ) -> Self {
        Self::WithSource {
            file: file.as_ref().to_path_buf(),
            err: Box::new(self),
        }
    }

    pub fn from_with_source_init<E: Into<Error>>(file: impl AsRef<Path>) -> impl FnOnce(E) -> Self {
        |err| err.into().with_source(file)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
