//! The git hooks hookrun manages.

use std::fmt;
use std::str::FromStr;

use crate::error::HookError;
use crate::runner::Check;

/// A git hook managed by hookrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs before `git commit` records a commit.
    PreCommit,
    /// Runs before `git push` sends anything to the remote.
    PrePush,
}

impl HookKind {
    /// Every managed hook, in installation order.
    pub const ALL: [HookKind; 2] = [HookKind::PreCommit, HookKind::PrePush];

    /// The file name git looks for in `.git/hooks`.
    pub fn name(self) -> &'static str {
        match self {
            Self::PreCommit => "pre-commit",
            Self::PrePush => "pre-push",
        }
    }

    /// The checks this hook runs, in order.
    ///
    /// Both hooks run the full pipeline.
    pub fn checks(self) -> &'static [Check] {
        match self {
            Self::PreCommit | Self::PrePush => &Check::PIPELINE,
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookKind {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.name() == s)
            .ok_or_else(|| HookError::UnknownHook {
                name: s.to_string(),
            })
    }
}
