use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record key {key} does not match its id {id}")]
    IdMismatch { key: String, id: String },
    #[error("canonical variable {id} has an empty label")]
    EmptyLabel { id: String },
    #[error("delta entry {key} does not belong to {dataset}:{native_id}")]
    DeltaKeyMismatch {
        key: String,
        dataset: String,
        native_id: String,
    },
    #[error("dataset id {dataset} must not contain ':'")]
    DatasetSeparator { dataset: String },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
