//! Error types for the installer engine

use std::path::PathBuf;
use std::time::Duration;

use devsetup_core::domain::job::JobStatus;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by installer operations
#[derive(Debug, Error)]
pub enum InstallError {
    /// Malformed or empty batch request
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown tool, job or batch id
    #[error("not found: {0}")]
    NotFound(String),

    /// The install script could not be launched at all
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// The script ran but exited unsuccessfully
    #[error("script exited with {}: {}", exit_label(.code), .stderr.trim())]
    ScriptFailure { code: Option<i32>, stderr: String },

    /// The script exceeded the configured timeout and was killed
    #[error("script timed out after {0:?}")]
    TimedOut(Duration),

    /// Reading the child's output failed after it was spawned
    #[error("I/O error while running script: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure to launch an install script
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("install script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("install script is not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot access install script {}: {source}", .path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch interpreter '{interpreter}': {source}")]
    Interpreter {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by job store and tool catalog implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("tool {0} not found")]
    ToolNotFound(i64),

    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failure_message() {
        let err = InstallError::ScriptFailure {
            code: Some(100),
            stderr: "E: Unable to locate package foo\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "script exited with code 100: E: Unable to locate package foo"
        );
    }

    #[test]
    fn test_script_failure_without_code() {
        let err = InstallError::ScriptFailure {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_spawn_error_is_transparent() {
        let err: InstallError = SpawnError::ScriptNotFound(PathBuf::from("/nope.sh")).into();
        assert_eq!(err.to_string(), "install script not found: /nope.sh");
    }
}
