//! Integration tests for hook installation.

use std::fs;
use std::path::Path;

use hookrun::{
    HookInstaller,
    HookKind,
    HookState,
    InstallOutcome,
    launcher_script,
};
use tempfile::TempDir;

fn fake_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    tmp
}

#[cfg(unix)]
fn assert_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755, "{} should be executable", path.display());
}

#[cfg(not(unix))]
fn assert_executable(path: &Path) {
    assert!(path.is_file());
}

#[test]
fn installs_exact_launcher_for_each_hook() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());

    let installed = installer.install().unwrap();
    assert_eq!(installed.len(), 2);

    for hook in HookKind::ALL {
        let path = repo.path().join(".git/hooks").join(hook.name());
        assert_eq!(fs::read_to_string(&path).unwrap(), launcher_script(hook));
        assert_executable(&path);
        assert_eq!(installer.state(hook), HookState::Installed);
    }
    assert!(
        installed
            .iter()
            .all(|h| h.outcome == InstallOutcome::Created)
    );
}

#[test]
fn installing_twice_is_byte_identical() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());

    installer.install().unwrap();
    let first: Vec<Vec<u8>> = HookKind::ALL
        .iter()
        .map(|h| fs::read(installer.hook_path(*h)).unwrap())
        .collect();

    let again = installer.install().unwrap();
    let second: Vec<Vec<u8>> = HookKind::ALL
        .iter()
        .map(|h| fs::read(installer.hook_path(*h)).unwrap())
        .collect();

    assert_eq!(first, second);
    assert!(again.iter().all(|h| h.outcome == InstallOutcome::Unchanged));
    for hook in HookKind::ALL {
        assert_executable(&installer.hook_path(hook));
    }
}

#[test]
fn installing_twice_creates_no_extra_files() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    installer.install().unwrap();
    installer.install().unwrap();

    let mut names: Vec<String> = fs::read_dir(installer.hooks_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["pre-commit", "pre-push"]);
}

#[test]
fn foreign_hook_is_backed_up_then_overwritten() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    fs::create_dir_all(installer.hooks_dir()).unwrap();
    let custom = "#!/bin/sh\nnpm run lint\n";
    fs::write(installer.hook_path(HookKind::PreCommit), custom).unwrap();

    let installed = installer.install_hook(HookKind::PreCommit).unwrap();

    let InstallOutcome::Replaced { backup } = installed.outcome else {
        panic!("expected a replaced hook, got {:?}", installed.outcome);
    };
    assert_eq!(fs::read_to_string(&backup).unwrap(), custom);
    assert_eq!(
        fs::read_to_string(installer.hook_path(HookKind::PreCommit)).unwrap(),
        launcher_script(HookKind::PreCommit)
    );
}

#[test]
fn custom_steps_before_launcher_line_are_backed_up() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    fs::create_dir_all(installer.hooks_dir()).unwrap();
    let custom = "#!/bin/sh\n./scripts/check-secrets.sh || exit 1\nexec hookrun run pre-commit \"$@\"\n";
    fs::write(installer.hook_path(HookKind::PreCommit), custom).unwrap();

    let installed = installer.install_hook(HookKind::PreCommit).unwrap();

    let InstallOutcome::Replaced { backup } = installed.outcome else {
        panic!("expected a replaced hook, got {:?}", installed.outcome);
    };
    assert_eq!(fs::read_to_string(&backup).unwrap(), custom);
}

#[cfg(unix)]
#[test]
fn backup_keeps_executable_bit() {
    use std::os::unix::fs::PermissionsExt;

    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    fs::create_dir_all(installer.hooks_dir()).unwrap();
    let hook = installer.hook_path(HookKind::PrePush);
    fs::write(&hook, "#!/bin/sh\nmake lint\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

    let installed = installer.install_hook(HookKind::PrePush).unwrap();

    let InstallOutcome::Replaced { backup } = installed.outcome else {
        panic!("expected a replaced hook, got {:?}", installed.outcome);
    };
    assert_executable(&backup);
}

#[cfg(unix)]
#[test]
fn non_executable_hook_is_reported_and_repaired() {
    use std::os::unix::fs::PermissionsExt;

    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    installer.install().unwrap();
    let hook = installer.hook_path(HookKind::PreCommit);
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(installer.state(HookKind::PreCommit), HookState::NotExecutable);

    let installed = installer.install_hook(HookKind::PreCommit).unwrap();
    assert_eq!(installed.outcome, InstallOutcome::Unchanged);
    assert_executable(&hook);
    assert_eq!(installer.state(HookKind::PreCommit), HookState::Installed);
}

#[test]
fn older_launcher_is_updated_without_backup() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    fs::create_dir_all(installer.hooks_dir()).unwrap();
    fs::write(
        installer.hook_path(HookKind::PrePush),
        "#!/bin/sh\nhookrun install\nexec hookrun run pre-push\n",
    )
    .unwrap();

    let installed = installer.install_hook(HookKind::PrePush).unwrap();

    assert_eq!(installed.outcome, InstallOutcome::Updated);
    assert!(!installer.hooks_dir().join("pre-push.backup").exists());
}

#[test]
fn creates_missing_hooks_directory() {
    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    assert!(!installer.hooks_dir().exists());

    installer.install().unwrap();

    assert!(installer.hooks_dir().is_dir());
}

#[cfg(unix)]
#[test]
fn unwritable_hooks_directory_fails() {
    use std::os::unix::fs::PermissionsExt;

    let repo = fake_repo();
    let installer = HookInstaller::for_repo(repo.path());
    fs::create_dir_all(installer.hooks_dir()).unwrap();
    fs::set_permissions(installer.hooks_dir(), fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions.
    let probe = installer.hooks_dir().join(".probe");
    if fs::write(&probe, "").is_ok() {
        fs::remove_file(&probe).unwrap();
        return;
    }

    let err = installer.install().unwrap_err();
    assert!(matches!(err, hookrun::HookError::HookWriteFailed { .. }));
    assert_ne!(err.exit_code(), 0);

    fs::set_permissions(installer.hooks_dir(), fs::Permissions::from_mode(0o755)).unwrap();
}
