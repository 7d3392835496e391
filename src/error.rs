//! Error types for hookrun operations.

use thiserror::Error;

/// A specialized `Result` type for hookrun operations.
pub type HookResult<T> = Result<T, HookError>;

/// Exit code used when an external tool could not be started at all.
pub const TOOL_UNAVAILABLE_EXIT_CODE: i32 = 127;

/// Errors that can occur while installing hooks or running checks.
#[derive(Debug, Error)]
pub enum HookError {
    /// The working tree has changes that are not staged.
    #[error(
        "working tree has unstaged changes; stage them with `git add` or stash them with \
         `git stash` and try again"
    )]
    DirtyWorkingTree {
        /// Exit code of the diff check.
        code: i32,
    },

    /// The formatter reported unformatted code (or could not run).
    #[error(
        "formatting check failed; run `cargo fmt` to fix it (if rustfmt is not installed, \
         install it with `rustup component add rustfmt`)"
    )]
    FormatCheckFailed {
        /// Exit code of the formatter.
        code: i32,
    },

    /// The compile check failed.
    #[error("compilation failed; fix the errors reported above and try again")]
    CompileFailed {
        /// Exit code of the compiler.
        code: i32,
    },

    /// The test suite failed.
    #[error("tests failed")]
    TestsFailed {
        /// Exit code of the test runner.
        code: i32,
    },

    /// A required external tool could not be started.
    #[error("could not run `{program}`: {reason}; make sure it is installed and on PATH")]
    ToolUnavailable {
        /// The program that failed to start.
        program: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The directory is not the root of a git repository.
    #[error("not a git repository: {path}: {reason}")]
    NotARepository {
        /// The directory that was inspected.
        path: String,
        /// The reason it was rejected.
        reason: String,
    },

    /// Failed to write (or back up) a hook file.
    #[error("hook write failed for {path}: {reason}")]
    HookWriteFailed {
        /// The hook file that couldn't be written.
        path: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The hook name is not one hookrun manages.
    #[error("unknown hook `{name}` (expected one of: pre-commit, pre-push)")]
    UnknownHook {
        /// The name that was given.
        name: String,
    },
}

impl HookError {
    /// The process exit code this error should terminate with.
    ///
    /// Failed checks propagate the exit code of the failing command; it is
    /// never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirtyWorkingTree { code }
            | Self::FormatCheckFailed { code }
            | Self::CompileFailed { code }
            | Self::TestsFailed { code } => {
                if *code == 0 {
                    1
                } else {
                    *code
                }
            }
            Self::ToolUnavailable { .. } => TOOL_UNAVAILABLE_EXIT_CODE,
            Self::NotARepository { .. } | Self::HookWriteFailed { .. } | Self::UnknownHook { .. } => {
                1
            }
        }
    }
}
