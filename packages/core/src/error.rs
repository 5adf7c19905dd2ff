//! Unified error types for the usbmount-core library.
//!
//! Uses SNAFU for context-rich error handling, especially useful when the same
//! underlying error type (like `std::io::Error`) appears in different contexts.

use snafu::{ResultExt, Snafu};
use std::path::PathBuf;

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all core library operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Device discovery backend could not be initialized or queried.
    ///
    /// This is the only fatal condition during inventory building; gaps in
    /// individual candidate records are skipped, not reported.
    #[snafu(display("device discovery failed: {source}"))]
    Discovery { source: std::io::Error },

    /// Failed to execute a system command.
    #[snafu(display("failed to execute command '{command}'"))]
    CommandExecution {
        command: String,
        source: std::io::Error,
    },

    /// Command executed but returned non-zero exit code.
    #[snafu(display("command '{command}' exited with code {code}: {stderr}"))]
    CommandExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Failed to read the kernel mount table.
    #[snafu(display("failed to read mount table"))]
    MountTableRead { source: std::io::Error },

    /// Mount point directory creation failed.
    #[snafu(display("failed to create mount point directory at {}", path.display()))]
    MountPointCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Mount point directory removal failed.
    #[snafu(display("failed to remove mount point directory at {}", path.display()))]
    MountPointRemoval {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Partition is already mounted at its mount point.
    #[snafu(display("{node} is already mounted at {}", mount_point.display()))]
    AlreadyMounted { node: String, mount_point: PathBuf },
}

impl Error {
    /// Maps the error to a process exit code.
    ///
    /// Backend command exit codes pass through unchanged, OS errors surface
    /// their errno, and an already-mounted target reports EBUSY.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandExit { code, .. } => *code,
            Error::AlreadyMounted { .. } => nix::libc::EBUSY,
            Error::Discovery { source }
            | Error::CommandExecution { source, .. }
            | Error::MountTableRead { source }
            | Error::MountPointCreation { source, .. }
            | Error::MountPointRemoval { source, .. } => source.raw_os_error().unwrap_or(1),
        }
    }
}

/// Extension trait for adding context to io::Error results.
pub trait IoResultExt<T> {
    /// Add context for discovery backend errors.
    fn discovery_context(self) -> Result<T>;

    /// Add context for command execution errors.
    fn command_context(self, command: impl Into<String>) -> Result<T>;

    /// Add context for mount table read errors.
    fn mount_table_context(self) -> Result<T>;

    /// Add context for mount point creation errors.
    fn mount_point_context(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Add context for mount point removal errors.
    fn mount_point_removal_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn discovery_context(self) -> Result<T> {
        self.context(DiscoverySnafu)
    }

    fn command_context(self, command: impl Into<String>) -> Result<T> {
        self.context(CommandExecutionSnafu {
            command: command.into(),
        })
    }

    fn mount_table_context(self) -> Result<T> {
        self.context(MountTableReadSnafu)
    }

    fn mount_point_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.context(MountPointCreationSnafu { path: path.into() })
    }

    fn mount_point_removal_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.context(MountPointRemovalSnafu { path: path.into() })
    }
}
