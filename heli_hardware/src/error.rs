use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("serial open failed: {0}")]
    Open(String),
    #[error("serial read timeout")]
    Timeout,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serialport::Error> for LinkError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::Io(kind) => LinkError::Io(kind.into()),
            _ => LinkError::Open(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
