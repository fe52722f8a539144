use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The display target does not exist: {0}")]
    TargetNotFound(String),

    #[error("The display target must be an element (handle {0})")]
    NotAnElement(u64),

    #[error("Not initialized: {0}")]
    Uninitialized(&'static str),

    #[error("Lane {index} out of range ({lanes} lanes)")]
    LaneOutOfRange { index: usize, lanes: usize },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert_and_keep_their_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "IO error: config.toml");
    }

    #[test]
    fn test_lane_out_of_range_message() {
        let err = Error::LaneOutOfRange { index: 4, lanes: 3 };
        assert_eq!(err.to_string(), "Lane 4 out of range (3 lanes)");
    }
}
