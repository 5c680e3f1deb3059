use axum::http::StatusCode;
use image::ImageError;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use std::{error, fmt, io};
use tokio::task::JoinError;

/// One violated rule on one query parameter.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failure while producing an image for an already validated request.
#[derive(Debug)]
pub enum RenderError {
    /// Asset file does not exist under the content root
    MissingAsset(PathBuf),
    /// Asset file exists but could not be read
    UnreadableAsset { path: PathBuf, source: io::Error },
    /// Asset bytes are not a decodable image
    Decode { path: PathBuf, source: ImageError },
    Encode(ImageError),
    /// Strongpoint is not in the request's map catalog entry
    UnknownStrongpoint { map: String, name: String },
    /// No render slot or no result within the limit
    TimedOut(Duration),
    /// Render task panicked or was cancelled
    Worker(JoinError),
}

impl RenderError {
    pub fn from_io(path: PathBuf, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            RenderError::MissingAsset(path)
        } else {
            RenderError::UnreadableAsset { path, source: err }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RenderError::TimedOut(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JoinError> for RenderError {
    fn from(err: JoinError) -> Self {
        RenderError::Worker(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingAsset(path) => write!(f, "missing asset: {}", path.display()),
            RenderError::UnreadableAsset { path, source } => {
                write!(f, "failed to read asset {}: {}", path.display(), source)
            }
            RenderError::Decode { path, source } => {
                write!(f, "failed to decode asset {}: {}", path.display(), source)
            }
            RenderError::Encode(e) => write!(f, "image encoding error: {}", e),
            RenderError::UnknownStrongpoint { map, name } => {
                write!(f, "{} is not a strongpoint of {}", name, map)
            }
            RenderError::TimedOut(limit) => write!(f, "render exceeded {:?}", limit),
            RenderError::Worker(e) => write!(f, "render task failed: {}", e),
        }
    }
}

impl error::Error for RenderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RenderError::UnreadableAsset { source, .. } => Some(source),
            RenderError::Decode { source, .. } => Some(source),
            RenderError::Encode(e) => Some(e),
            RenderError::Worker(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_asset() {
        let err = RenderError::from_io(
            PathBuf::from("hll_maps/Foy.png"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RenderError::MissingAsset(ref p) if p.ends_with("Foy.png")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn other_io_errors_are_unreadable() {
        let err = RenderError::from_io(
            PathBuf::from("colors/red.png"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, RenderError::UnreadableAsset { .. }));
    }

    #[test]
    fn timeout_is_service_unavailable() {
        let err = RenderError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "render exceeded 30s");
    }
}
