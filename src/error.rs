use image::ImageError;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Everything that can go wrong while serving a diff or mask request
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Missing image data")]
    MissingImage,

    #[error("Images must have the same dimensions")]
    ShapeMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },

    #[error("threshold must be an integer in [0, 255], got {0}")]
    InvalidThreshold(i64),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn invalid_polygon(msg: impl Into<String>) -> Self {
        Self::InvalidPolygon(msg.into())
    }

    pub fn invalid_canvas(msg: impl Into<String>) -> Self {
        Self::InvalidCanvas(msg.into())
    }

    /// Whether the failure was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImage
                | Self::ShapeMismatch { .. }
                | Self::InvalidThreshold(_)
                | Self::Decode(_)
                | Self::InvalidPolygon(_)
                | Self::InvalidCanvas(_)
        )
    }
}

impl From<base64::DecodeError> for ServiceError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(format!("invalid base64: {err}"))
    }
}

impl From<ImageError> for ServiceError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::IoError(e) => Self::Io(e),
            ImageError::Encoding(e) => Self::Encode(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}
