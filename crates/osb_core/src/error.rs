use thiserror::Error;

/// Failure channel of [`crate::Broker::provision`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("instance already exists")]
    AlreadyExists,
    #[error("instance limit for this service has been reached")]
    LimitReached,
    #[error("{0}")]
    Other(String),
}

/// Failure channel of [`crate::Broker::deprovision`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeprovisionError {
    #[error("instance does not exist")]
    DoesNotExist,
    #[error("{0}")]
    Other(String),
}

/// Failure channel of [`crate::Broker::bind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("instance does not exist")]
    InstanceDoesNotExist,
    #[error("binding already exists")]
    BindingAlreadyExists,
    #[error("{0}")]
    Other(String),
}

/// Failure channel of [`crate::Broker::unbind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnbindError {
    #[error("instance does not exist")]
    InstanceDoesNotExist,
    #[error("binding does not exist")]
    BindingDoesNotExist,
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog io: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog: {0}")]
    Invalid(String),
}
