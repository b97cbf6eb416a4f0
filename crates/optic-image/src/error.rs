use std::fmt;

#[derive(Debug)]
pub enum ImageError {
    Encode(String),
    InvalidQuality(f32),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Encode(msg) => write!(f, "encode error: {msg}"),
            ImageError::InvalidQuality(q) => {
                write!(f, "quality {q} out of range (expected 0.0 to 1.0)")
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Encode(err.to_string())
    }
}
