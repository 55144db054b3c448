use std::path::PathBuf;

/// Errors surfaced by renderer setup, asset preparation and frame submission.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer initialization failed: {0}")]
    Initialization(String),
    #[error("failed to load resource {path:?}: {message}")]
    Resource { path: PathBuf, message: String },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    pub(crate) fn init(message: impl Into<String>) -> Self {
        Self::Initialization(message.into())
    }

    pub(crate) fn resource(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Turns the result of a popped error scope into an initialization error.
    pub(crate) fn check_scope(stage: &str, error: Option<wgpu::Error>) -> Result<()> {
        match error {
            Some(err) => Err(Self::init(format!("{stage}: {err}"))),
            None => Ok(()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_is_ok() {
        assert!(RenderError::check_scope("pipelines", None).is_ok());
    }

    #[test]
    fn validation_error_becomes_initialization() {
        let error = wgpu::Error::Validation {
            source: Box::new(std::io::Error::other("unknown identifier `lights`")),
            description: "unknown identifier `lights`".into(),
        };
        let err = RenderError::check_scope("pipelines", Some(error)).unwrap_err();
        match err {
            RenderError::Initialization(message) => assert!(message.starts_with("pipelines: ")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
