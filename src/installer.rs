//! Hook installation.
//!
//! This module provides [`HookInstaller`], which writes a small launcher into
//! each managed git hook. The launcher re-runs the installer before handing
//! over to `hookrun run <hook>`, so the hook files heal themselves whenever
//! the launcher text changes.

use std::fs;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use tracing::{
    info,
    warn,
};

use crate::error::{
    HookError,
    HookResult,
};
use crate::hooks::HookKind;

/// Command the launchers invoke; must be on `PATH` when git runs the hook.
pub const LAUNCHER_PROGRAM: &str = "hookrun";

/// Mode given to installed hook files.
pub const HOOK_MODE: u32 = 0o755;

/// Returns the exact content written into the hook file for `hook`.
///
/// # Examples
///
/// ```rust
/// use hookrun::{HookKind, launcher_script};
///
/// let script = launcher_script(HookKind::PrePush);
/// assert_eq!(
///     script,
///     "#!/bin/sh\nhookrun --quiet install\nexec hookrun run pre-push \"$@\"\n"
/// );
/// ```
pub fn launcher_script(hook: HookKind) -> String {
    format!(
        "#!/bin/sh\n{LAUNCHER_PROGRAM} --quiet install\nexec {LAUNCHER_PROGRAM} run {hook} \"$@\"\n"
    )
}

/// Whether `content` consists only of hookrun launcher lines: an optional
/// interpreter line, `hookrun [flags] install`, and
/// `exec hookrun run <hook> ["$@"]`. Any other line makes it foreign.
fn is_launcher(content: &str) -> bool {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable();
    if lines.peek().is_some_and(|line| line.starts_with("#!")) {
        lines.next();
    }
    let mut runs = 0;
    for line in lines {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [program, flags @ .., "install"]
                if *program == LAUNCHER_PROGRAM && flags.iter().all(|f| f.starts_with('-')) => {}
            ["exec", program, "run", hook] | ["exec", program, "run", hook, "\"$@\""]
                if *program == LAUNCHER_PROGRAM && hook.parse::<HookKind>().is_ok() =>
            {
                runs += 1;
            }
            _ => return false,
        }
    }
    runs == 1
}

/// What installing a single hook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No hook file existed.
    Created,
    /// The hook already held the current launcher; it was rewritten as is.
    Unchanged,
    /// An older launcher was replaced by the current one.
    Updated,
    /// Foreign hook content was overwritten after being copied to `backup`.
    Replaced {
        /// Where the previous content was saved.
        backup: PathBuf,
    },
}

/// Result of installing one hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledHook {
    /// The hook that was installed.
    pub hook: HookKind,
    /// The hook file.
    pub path: PathBuf,
    /// What happened to the previous content.
    pub outcome: InstallOutcome,
}

/// Installation state of a hook file, as reported by `hookrun status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// No hook file exists.
    Missing,
    /// The file holds the current launcher and is executable.
    Installed,
    /// The file holds the current launcher but is not executable.
    NotExecutable,
    /// The file holds something other than the current launcher.
    Stale,
    /// The hook path exists but cannot be read (permissions, a directory).
    Unreadable,
}

/// Writes hook launchers into a repository's `.git/hooks` directory.
///
/// Installing overwrites whatever the hook files contained before. Content
/// that was not written by hookrun is first copied to `<hook>.backup` and a
/// warning is logged.
///
/// # Examples
///
/// ```rust,no_run
/// use hookrun::HookInstaller;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for installed in HookInstaller::for_repo(".").install()? {
///     println!("{} -> {:?}", installed.path.display(), installed.outcome);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HookInstaller {
    hooks_dir: PathBuf,
}

impl HookInstaller {
    /// Creates an installer for the repository rooted at `root`.
    pub fn for_repo(root: impl AsRef<Path>) -> Self {
        Self {
            hooks_dir: root.as_ref().join(".git").join("hooks"),
        }
    }

    /// The directory hook files are written to.
    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    /// The path of the hook file for `hook`.
    pub fn hook_path(&self, hook: HookKind) -> PathBuf {
        self.hooks_dir.join(hook.name())
    }

    /// Installs every managed hook.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::HookWriteFailed`] on the first hook that cannot
    /// be written; hooks before it stay installed.
    pub fn install(&self) -> HookResult<Vec<InstalledHook>> {
        HookKind::ALL
            .into_iter()
            .map(|hook| self.install_hook(hook))
            .collect()
    }

    /// Installs a single hook, creating the hooks directory if needed.
    ///
    /// The launcher is written to a temporary file next to the hook and
    /// renamed over it, so a shell still executing the old hook is not
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::HookWriteFailed`] if the directory, backup or
    /// hook file cannot be written.
    pub fn install_hook(&self, hook: HookKind) -> HookResult<InstalledHook> {
        let path = self.hook_path(hook);
        let write_failed = |e: std::io::Error| HookError::HookWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        let launcher = launcher_script(hook);

        fs::create_dir_all(&self.hooks_dir).map_err(write_failed)?;

        let outcome = match fs::read(&path) {
            Ok(previous) if previous == launcher.as_bytes() => InstallOutcome::Unchanged,
            Ok(previous) if previous.is_empty() => InstallOutcome::Created,
            Ok(previous) if is_launcher(&String::from_utf8_lossy(&previous)) => {
                InstallOutcome::Updated
            }
            Ok(_) => {
                let backup = self.backup_path(hook);
                // Copies the mode too, so an executable hook stays executable.
                fs::copy(&path, &backup).map_err(write_failed)?;
                warn!(
                    hook = %hook,
                    backup = %backup.display(),
                    "overwriting existing hook; previous content saved to backup"
                );
                InstallOutcome::Replaced { backup }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => InstallOutcome::Created,
            Err(e) => return Err(write_failed(e)),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", hook.name()))
            .tempfile_in(&self.hooks_dir)
            .map_err(write_failed)?;
        temp.write_all(launcher.as_bytes()).map_err(write_failed)?;
        make_executable(temp.as_file()).map_err(write_failed)?;
        temp.persist(&path).map_err(|e| write_failed(e.error))?;

        info!(hook = %hook, path = %path.display(), ?outcome, "installed hook");
        Ok(InstalledHook {
            hook,
            path,
            outcome,
        })
    }

    /// Reports whether `hook` is installed as expected.
    pub fn state(&self, hook: HookKind) -> HookState {
        let path = self.hook_path(hook);
        match fs::read(&path) {
            Ok(content) if content == launcher_script(hook).as_bytes() => {
                if is_executable(&path) {
                    HookState::Installed
                } else {
                    HookState::NotExecutable
                }
            }
            Ok(_) => HookState::Stale,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HookState::Missing,
            Err(e) => {
                warn!(hook = %hook, path = %path.display(), error = %e, "cannot read hook");
                HookState::Unreadable
            }
        }
    }

    fn backup_path(&self, hook: HookKind) -> PathBuf {
        let base = self.hooks_dir.join(format!("{}.backup", hook.name()));
        if !base.exists() {
            return base;
        }
        (1u32..)
            .map(|n| self.hooks_dir.join(format!("{}.backup.{n}", hook.name())))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }
}

#[cfg(unix)]
fn make_executable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(HOOK_MODE))
}

#[cfg(not(unix))]
fn make_executable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
