use std::fmt;

#[derive(Debug)]
pub enum IcoForgeError {
    InvalidConfiguration(String),
    Document(String),
    InvalidDimensions,
    MalformedPath(String),
    UnsupportedPathCommand(char),
    Raster(String),
    Io(std::io::Error),
}

impl fmt::Display for IcoForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcoForgeError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            IcoForgeError::Document(message) => write!(f, "document error: {}", message),
            IcoForgeError::InvalidDimensions => {
                write!(f, "document has a non-positive logical size")
            }
            IcoForgeError::MalformedPath(message) => {
                write!(f, "malformed path data: {}", message)
            }
            IcoForgeError::UnsupportedPathCommand(cmd) => {
                write!(f, "unsupported path command: {}", cmd)
            }
            IcoForgeError::Raster(message) => write!(f, "raster error: {}", message),
            IcoForgeError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for IcoForgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IcoForgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IcoForgeError {
    fn from(value: std::io::Error) -> Self {
        IcoForgeError::Io(value)
    }
}
