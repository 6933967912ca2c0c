use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreecatError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Cannot open output file {path}: {source}")]
    OutputUnwritable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for TreecatError {
    fn user_message(&self) -> String {
        match self {
            TreecatError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            TreecatError::OutputUnwritable { path, source } => {
                format!("Cannot open output file {}: {}", path, source)
            }
            TreecatError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            TreecatError::Pattern { pattern, message } => {
                format!("Invalid exclude pattern '{}': {}", pattern, message)
            }
            TreecatError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TreecatError::InvalidPath { .. } => Some(
                "Check that the root path exists and is a directory you can read.".to_string(),
            ),
            TreecatError::OutputUnwritable { .. } => Some(
                "Make sure the parent directory of the output file exists and is writable, or pick a different path with --output.".to_string(),
            ),
            TreecatError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string(),
            ),
            TreecatError::Pattern { .. } => Some(
                "Exclude patterns are regular expressions; escape literal dots, e.g. '.*\\.log'.".to_string(),
            ),
            TreecatError::Io { .. } => Some(
                "Ensure you have the necessary read/write permissions for the paths involved.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for TreecatError {
    fn from(error: toml::de::Error) -> Self {
        TreecatError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreecatError>;

/// Read failures that degrade to an inline `[Could not read file: ...]`
/// marker instead of aborting the run. Anything outside this set (disk
/// failure, out of memory, ...) stays fatal.
pub fn is_recoverable_read_error(error: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        error.kind(),
        // File vanished between the walk and the read.
        ErrorKind::NotFound
            | ErrorKind::PermissionDenied
            // Non-UTF-8 content surfaces as InvalidData from read_to_string.
            | ErrorKind::InvalidData
    )
}
