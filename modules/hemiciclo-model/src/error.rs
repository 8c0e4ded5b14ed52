use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unparsable proposal payload: {0}")]
    Unparsable(String),

    #[error("Proposal record has no title")]
    MissingTitle,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
