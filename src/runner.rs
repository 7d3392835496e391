//! Fail-fast check pipeline executed by the hooks.
//!
//! [`HookRunner`] runs the checks of a [`HookKind`] in order through a
//! [`CommandRunner`] and stops at the first one that fails. The external
//! tools are only ever observed through their exit codes; their own output
//! goes straight to the user's terminal.

use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::{
    Command,
    Stdio,
};

use tracing::debug;

use crate::error::{
    HookError,
    HookResult,
};
use crate::hooks::HookKind;

/// An external command: a program and its fixed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program looked up on `PATH`.
    pub program: &'static str,
    /// Arguments passed verbatim.
    pub args: &'static [&'static str],
}

impl ToolCommand {
    /// The command as it would be typed in a shell.
    pub fn display(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How an external command terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    /// A status with the given exit code.
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The exit code to report for a failure; signals map to 1.
    pub fn failure_code(&self) -> i32 {
        match self.code {
            Some(0) | None => 1,
            Some(code) => code,
        }
    }
}

/// Captured result of a command run for its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// How the command terminated.
    pub status: CommandStatus,
    /// Standard output, lossily decoded.
    pub stdout: String,
}

/// Runs external commands on behalf of the pipeline.
///
/// The system implementation is [`SystemCommandRunner`]; tests substitute a
/// recording implementation.
pub trait CommandRunner {
    /// Runs `command` in `dir` with inherited stdio and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ToolUnavailable`] if the program cannot be
    /// started.
    fn status(&mut self, command: &ToolCommand, dir: &Path) -> HookResult<CommandStatus>;

    /// Runs `command` in `dir` and captures its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ToolUnavailable`] if the program cannot be
    /// started.
    fn output(&mut self, command: &ToolCommand, dir: &Path) -> HookResult<CommandOutput>;
}

/// Runs commands with [`std::process::Command`], blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    fn command(command: &ToolCommand, dir: &Path) -> Command {
        let mut cmd = Command::new(command.program);
        cmd.args(command.args).current_dir(dir);
        cmd
    }

    fn unavailable(command: &ToolCommand, err: io::Error) -> HookError {
        HookError::ToolUnavailable {
            program: command.program.to_string(),
            reason: err.to_string(),
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn status(&mut self, command: &ToolCommand, dir: &Path) -> HookResult<CommandStatus> {
        debug!(command = %command.display(), dir = %dir.display(), "running");
        let status = Self::command(command, dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| Self::unavailable(command, e))?;
        debug!(command = %command.display(), code = ?status.code(), "finished");
        Ok(CommandStatus {
            code: status.code(),
        })
    }

    fn output(&mut self, command: &ToolCommand, dir: &Path) -> HookResult<CommandOutput> {
        debug!(command = %command.display(), dir = %dir.display(), "capturing");
        let output = Self::command(command, dir)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| Self::unavailable(command, e))?;
        Ok(CommandOutput {
            status: CommandStatus {
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// One step of the check pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// No unstaged changes in the working tree.
    CleanWorkingTree,
    /// Code is formatted.
    Format,
    /// Code compiles.
    Compile,
    /// Tests pass.
    Test,
}

impl Check {
    /// The full pipeline, in execution order.
    pub const PIPELINE: [Check; 4] = [
        Check::CleanWorkingTree,
        Check::Format,
        Check::Compile,
        Check::Test,
    ];

    /// The external command backing this check.
    pub fn command(self) -> ToolCommand {
        match self {
            Self::CleanWorkingTree => ToolCommand {
                program: "git",
                args: &["diff", "--quiet"],
            },
            Self::Format => ToolCommand {
                program: "cargo",
                args: &["fmt", "--all", "--", "--check"],
            },
            Self::Compile => ToolCommand {
                program: "cargo",
                args: &["check", "--all-targets"],
            },
            Self::Test => ToolCommand {
                program: "cargo",
                args: &["test"],
            },
        }
    }

    /// Progress line printed before the check starts.
    pub fn progress_message(self) -> &'static str {
        match self {
            Self::CleanWorkingTree => "Checking for unstaged changes...",
            Self::Format => "Checking formatting...",
            Self::Compile => "Checking that the code compiles...",
            Self::Test => "Running tests...",
        }
    }

    fn failure(self, code: i32) -> HookError {
        match self {
            Self::CleanWorkingTree => HookError::DirtyWorkingTree { code },
            Self::Format => HookError::FormatCheckFailed { code },
            Self::Compile => HookError::CompileFailed { code },
            Self::Test => HookError::TestsFailed { code },
        }
    }
}

/// Runs the checks of a hook in a repository.
pub struct HookRunner<R> {
    root: PathBuf,
    commands: R,
}

impl<R: CommandRunner> HookRunner<R> {
    /// Creates a runner executing commands in `root` through `commands`.
    pub fn new(root: impl Into<PathBuf>, commands: R) -> Self {
        Self {
            root: root.into(),
            commands,
        }
    }

    /// Runs the checks of `hook`, printing progress to stdout.
    ///
    /// # Errors
    ///
    /// See [`run_with_writer`](Self::run_with_writer).
    pub fn run(&mut self, hook: HookKind) -> HookResult<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.run_with_writer(hook, &mut handle)
    }

    /// Runs the checks of `hook`, writing progress lines to `out`.
    ///
    /// Stops at the first failing check; later checks are never started.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing check, or
    /// [`HookError::ToolUnavailable`] if a tool could not be started.
    pub fn run_with_writer<W: Write>(&mut self, hook: HookKind, out: &mut W) -> HookResult<()> {
        for &check in hook.checks() {
            // Progress output is best effort.
            writeln!(out, "{}", check.progress_message()).ok();
            out.flush().ok();
            let status = self.commands.status(&check.command(), &self.root)?;
            if !status.success() {
                debug!(%hook, ?check, code = ?status.code, "check failed");
                return Err(check.failure(status.failure_code()));
            }
        }
        writeln!(out, "✓ All {} checks passed", hook).ok();
        Ok(())
    }

    /// Consumes the runner, returning its command runner.
    pub fn into_commands(self) -> R {
        self.commands
    }
}
