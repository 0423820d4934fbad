use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated cascade data: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("bad pixel buffer shape ({width}x{height}, stride {stride}): {reason}")]
    BufferShape {
        width: u32,
        height: u32,
        stride: u32,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
