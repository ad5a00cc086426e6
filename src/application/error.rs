use std::io;

use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to read message from `{path}`: {source}")]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    pub fn input(path: impl Into<String>, source: io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }
}
