//! Concrete provisioning steps
//!
//! Every step here shells out to the tool that owns its concern (package
//! manager, git, stow, chsh) or touches the filesystem directly, and
//! reports through [`stepwise::Step`].

use std::path::Path;

pub mod backup_existing;
pub mod command;
pub mod packages;
pub mod preconditions;
pub mod shell;
pub mod stow;
pub mod submodules;
pub mod symlink;

pub use backup_existing::BackupExisting;
pub use command::ShellCommand;
pub use packages::PackageInstall;
pub use preconditions::{CommandAvailable, DotfilesPresent, NotRoot};
pub use shell::LoginShell;
pub use stow::StowGroup;
pub use submodules::GitSubmodules;
pub use symlink::Symlink;

/// Show a home-relative path as `~/...`
fn tilde(path: &Path) -> String {
    if path.is_absolute() {
        path.display().to_string()
    } else {
        format!("~/{}", path.display())
    }
}

/// Show an absolute path with the home prefix replaced by `~`
fn display_home(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rel) => tilde(rel),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilde() {
        assert_eq!(tilde(Path::new(".zshrc")), "~/.zshrc");
        assert_eq!(tilde(Path::new("/etc/zshrc")), "/etc/zshrc");
    }

    #[test]
    fn test_display_home() {
        let home = Path::new("/home/me");
        assert_eq!(
            display_home(Path::new("/home/me/.dotfiles/zsh/.zshrc"), home),
            "~/.dotfiles/zsh/.zshrc"
        );
        assert_eq!(display_home(Path::new("/opt/x"), home), "/opt/x");
    }
}
