//! Error taxonomy (spec §7): parsing and dispatch never abort on
//! malformed input, but a handful of operations that cross process or
//! filesystem boundaries can genuinely fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VtError {
    #[error("pty channel closed")]
    ChannelClosed,

    #[error("pty spawn failed: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("config load/save failed: {0}")]
    Config(#[from] serde_json::Error),

    #[error("config file I/O failed: {0}")]
    ConfigIo(std::io::Error),

    #[error("sixel decode failed: {0}")]
    Sixel(String),

    #[error("resize to non-positive size {0}x{1}")]
    InvalidSize(i32, i32),
}

pub type Result<T> = std::result::Result<T, VtError>;
