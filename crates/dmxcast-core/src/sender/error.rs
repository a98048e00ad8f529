use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid Art-Net target {target}: {message}")]
    InvalidTarget { target: String, message: String },
    #[error("socket setup failed: {0}")]
    Socket(#[source] std::io::Error),
    #[error("UDP send failed after {attempts} attempts: {source}")]
    Io {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },
}
