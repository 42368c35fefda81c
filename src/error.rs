#[derive(Debug)]
pub enum Error {
    InvalidStride { stride: usize, min: usize },
    BufferTooSmall { needed: usize, actual: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidStride { stride, min } => {
                write!(f, "Row stride {} is shorter than a row of pixels ({} bytes)", stride, min)
            }
            Error::BufferTooSmall { needed, actual } => {
                write!(f, "Pixel buffer too small: need {} bytes, got {}", needed, actual)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
