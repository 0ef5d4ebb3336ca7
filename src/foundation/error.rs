use std::path::PathBuf;

pub type QuoteResult<T> = Result<T, QuoteError>;

#[derive(thiserror::Error, Debug)]
pub enum QuoteError {
    #[error("command has no quoted message")]
    MissingQuote,

    #[error("avatar fetch error: {0}")]
    AvatarFetch(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("persist error: failed to write '{}': {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuoteError {
    pub fn avatar_fetch(msg: impl Into<String>) -> Self {
        Self::AvatarFetch(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborts a pipeline invocation. Avatar failures never do.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AvatarFetch(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
