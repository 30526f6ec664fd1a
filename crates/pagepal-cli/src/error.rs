//! CLI-specific error types and exit-code mapping.

use pagepal_core::{ErrorKind, SettingsError};
use pagepal_voice::VoiceError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or input problem.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speech generation or playback failed.
    #[error("{message}")]
    Speech { message: String, kind: ErrorKind },
}

impl CliError {
    /// Map error to an exit code, following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Speech { kind, .. } => match kind {
                ErrorKind::Auth => 77, // EX_NOPERM
                _ => 1,
            },
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::EmptyInput => Self::Arguments(err.to_string()),
            other => {
                let raw = other.to_string();
                let kind = ErrorKind::classify(&raw);
                let message = match kind {
                    ErrorKind::Api => raw,
                    _ => kind.user_message(&raw),
                };
                Self::Speech { message, kind }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::from(SettingsError::MalformedOpenAiKey).exit_code(), 78);
    }

    #[test]
    fn test_voice_errors_are_classified() {
        let err = CliError::from(VoiceError::Generation("Incorrect API key (status 401)".into()));
        assert_eq!(err.exit_code(), 77);
        assert_eq!(err.to_string(), "Authentication failed. Please check your API key.");

        let err = CliError::from(VoiceError::Generation("model overloaded (status 500)".into()));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("model overloaded"));

        assert_eq!(CliError::from(VoiceError::EmptyInput).exit_code(), 2);
    }
}
