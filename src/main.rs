use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use anyhow::{
    Context,
    Result,
};
use clap::{
    Parser,
    Subcommand,
};
use hookrun::{
    HookError,
    HookInstaller,
    HookKind,
    HookRunner,
    HookState,
    InstallOutcome,
    SystemCommandRunner,
};

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Install the hook launchers into .git/hooks (overwrites existing hooks)
    Install,
    /// Run the checks for a hook (this is what the launchers call)
    Run {
        /// Hook to run the checks for (pre-commit or pre-push)
        hook: HookKind,
        /// Arguments git passes to the hook; ignored
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        git_args: Vec<String>,
    },
    /// Show whether each hook is installed
    Status,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hookrun",
    version,
    about = "Install self-healing git hooks that run fmt, check and test"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Repository root (default: discovered from the current directory)
    #[arg(short = 'C', long, global = true)]
    repo: Option<PathBuf>,
    /// More diagnostic output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only print errors and warnings about replaced hooks
    #[arg(short, long, global = true)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = <Cli as clap::Parser>::parse();
    hookrun::logging::init(cli.verbose, cli.quiet);
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("✗ {:#}", err);
            let code = err
                .downcast_ref::<HookError>()
                .map_or(1, HookError::exit_code);
            ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1))
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let root = resolve_root(cli.repo.as_deref())?;
    match cli.command {
        Commands::Install => install(&root, cli.quiet),
        Commands::Run { hook, git_args: _ } => run(&root, hook),
        Commands::Status => status(&root),
    }
}

fn resolve_root(repo: Option<&Path>) -> Result<PathBuf> {
    let root = match repo {
        Some(dir) => hookrun::repo::validate_root(dir)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            hookrun::repo::discover_root(&cwd, &mut SystemCommandRunner)?
        }
    };
    Ok(root)
}

fn install(root: &Path, quiet: bool) -> Result<()> {
    let installer = HookInstaller::for_repo(root);
    let installed = installer
        .install()
        .with_context(|| format!("Failed to install hooks in {}", installer.hooks_dir().display()))?;
    for hook in installed {
        match hook.outcome {
            InstallOutcome::Replaced { backup } => {
                println!(
                    "✓ Installed {} hook at {} (previous hook saved to {})",
                    hook.hook,
                    hook.path.display(),
                    backup.display()
                );
            }
            _ if quiet => {}
            InstallOutcome::Created => {
                println!("✓ Installed {} hook at {}", hook.hook, hook.path.display());
            }
            InstallOutcome::Updated => {
                println!("✓ Updated {} hook at {}", hook.hook, hook.path.display());
            }
            InstallOutcome::Unchanged => {
                println!("✓ {} hook is up to date", hook.hook);
            }
        }
    }
    Ok(())
}

fn run(root: &Path, hook: HookKind) -> Result<()> {
    HookRunner::new(root, SystemCommandRunner).run(hook)?;
    Ok(())
}

fn status(root: &Path) -> Result<()> {
    let installer = HookInstaller::for_repo(root);
    let mut missing = Vec::new();
    for hook in HookKind::ALL {
        let state = installer.state(hook);
        let label = match state {
            HookState::Installed => "installed",
            HookState::NotExecutable => "not executable",
            HookState::Stale => "stale (not the hookrun launcher)",
            HookState::Missing => "missing",
            HookState::Unreadable => "unreadable (check permissions)",
        };
        let icon = if state == HookState::Installed { "✓" } else { "✗" };
        println!("{} {}: {}", icon, hook, label);
        if state != HookState::Installed {
            missing.push(hook.name());
        }
    }
    if !missing.is_empty() {
        anyhow::bail!(
            "{} not installed; run `hookrun install`",
            missing.join(", ")
        );
    }
    Ok(())
}
