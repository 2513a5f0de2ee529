/// Convenience result type used across slidereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by parsing, synthesis and encoding APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// The container could not be opened or an entry could not be read.
    #[error("archive error: {0}")]
    Archive(String),

    /// A part was not well-formed XML or lacked the expected structure.
    #[error("xml error: {0}")]
    Xml(String),

    /// Invalid caller-provided configuration or timeline data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors reported by the encoding engine (spawn, IO, non-zero exit).
    #[error("engine error: {0}")]
    Engine(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A full document parse failed; `source` carries the root cause.
    #[error("file could not be processed: {source}")]
    Parse {
        /// Root cause of the failure.
        source: Box<ReelError>,
    },

    /// An encode call failed; `source` carries the root cause.
    #[error("encode failed: {source}")]
    Encode {
        /// Root cause of the failure.
        source: Box<ReelError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Build a [`ReelError::Xml`] value.
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Wrap `self` as the cause of a failed document parse.
    pub fn into_parse(self) -> Self {
        match self {
            already @ Self::Parse { .. } => already,
            other => Self::Parse {
                source: Box::new(other),
            },
        }
    }

    /// Wrap `self` as the cause of a failed encode.
    pub fn into_encode(self) -> Self {
        match self {
            already @ Self::Encode { .. } => already,
            other => Self::Encode {
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
