//! Repository root resolution.

use std::path::{
    Path,
    PathBuf,
};

use tracing::debug;

use crate::error::{
    HookError,
    HookResult,
};
use crate::runner::{
    CommandRunner,
    ToolCommand,
};

const SHOW_TOPLEVEL: ToolCommand = ToolCommand {
    program: "git",
    args: &["rev-parse", "--show-toplevel"],
};

/// Finds the root of the git repository containing `start`.
///
/// Asks git first. When git is missing or does not recognize the
/// repository, the ancestors of `start` are searched for a `.git`
/// directory instead. The result is validated with [`validate_root`].
///
/// # Errors
///
/// Returns [`HookError::NotARepository`] if no repository root is found.
pub fn discover_root<R: CommandRunner>(start: &Path, commands: &mut R) -> HookResult<PathBuf> {
    match commands.output(&SHOW_TOPLEVEL, start) {
        Ok(output) if output.status.success() => {
            let toplevel = output.stdout.trim();
            if !toplevel.is_empty() {
                return validate_root(Path::new(toplevel));
            }
        }
        Ok(output) => debug!(code = ?output.status.code, "git did not report a toplevel"),
        Err(err) => debug!(%err, "git unavailable"),
    }
    let root = start
        .ancestors()
        .find(|dir| dir.join(".git").is_dir())
        .ok_or_else(|| HookError::NotARepository {
            path: start.display().to_string(),
            reason: "no .git directory found here or in any parent directory".to_string(),
        })?;
    validate_root(root)
}

/// Checks that `root` holds a `.git` directory and returns it.
///
/// # Errors
///
/// Returns [`HookError::NotARepository`] if `root/.git` is missing or is
/// not a directory (linked worktrees and submodules use a `.git` file).
pub fn validate_root(root: &Path) -> HookResult<PathBuf> {
    let git_dir = root.join(".git");
    if git_dir.is_dir() {
        return Ok(root.to_path_buf());
    }
    let reason = if git_dir.exists() {
        ".git is not a directory (worktrees and submodules are not supported)"
    } else {
        "no .git directory"
    };
    Err(HookError::NotARepository {
        path: root.display().to_string(),
        reason: reason.to_string(),
    })
}
