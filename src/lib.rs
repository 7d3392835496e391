#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::missing_safety_doc)]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod hooks;
pub mod installer;
pub mod logging;
pub mod repo;
pub mod runner;

pub use crate::error::{
    HookError,
    HookResult,
};
pub use crate::hooks::HookKind;
pub use crate::installer::{
    HookInstaller,
    HookState,
    InstallOutcome,
    InstalledHook,
    launcher_script,
};
pub use crate::runner::{
    Check,
    CommandOutput,
    CommandRunner,
    CommandStatus,
    HookRunner,
    SystemCommandRunner,
    ToolCommand,
};
