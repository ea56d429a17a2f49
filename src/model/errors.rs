use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Invalid entity identifier `{value}` (expected an absolute IRI or `_:label`)")]
    InvalidIdentifier { value: String },
}
