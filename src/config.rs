//! dotstrap configuration
//!
//! Every section is optional; a missing file or section falls back to the
//! built-in defaults, which describe the stock Arch + zsh + tmux setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use stepwise::OnFailure;

use crate::paths;

/// The unified dotstrap configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dotfiles: DotfilesConfig,
    pub packages: PackagesConfig,
    pub aur: AurConfig,
    pub stow: Vec<StowConfig>,
    pub shell: ShellConfig,
    pub links: Vec<LinkConfig>,
    pub commands: Vec<CommandConfig>,
    pub backup: BackupConfig,
    pub steps: StepsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dotfiles: DotfilesConfig::default(),
            packages: PackagesConfig::default(),
            aur: AurConfig::default(),
            stow: ["tmux", "nvim", "git"]
                .into_iter()
                .map(StowConfig::named)
                .collect(),
            shell: ShellConfig::default(),
            links: Vec::new(),
            commands: Vec::new(),
            backup: BackupConfig::default(),
            steps: StepsConfig::default(),
        }
    }
}

impl Config {
    /// Load config from `path`, or the default location when `None`
    ///
    /// A missing file yields the built-in defaults. An explicitly named
    /// file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (paths::config_file()?, false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML format")?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.packages.validate("packages")?;
        PackagesConfig::from(&self.aur).validate("aur")?;

        let mut groups = HashSet::new();
        for stow in &self.stow {
            if stow.group.is_empty() {
                anyhow::bail!("[[stow]] group cannot be empty");
            }
            if !groups.insert(&stow.group) {
                anyhow::bail!("Duplicate stow group: {}", stow.group);
            }
        }

        for link in &self.links {
            if link.name.is_empty() || link.source.is_empty() || link.target.is_empty() {
                anyhow::bail!("[[links]] entries need name, source and target");
            }
        }

        for command in &self.commands {
            if command.name.is_empty() || command.apply.trim().is_empty() {
                anyhow::bail!("[[commands]] entries need a name and an apply command");
            }
        }

        Ok(())
    }

    /// Expanded dotfiles directory
    pub fn dotfiles_dir(&self) -> PathBuf {
        paths::expand(&self.dotfiles.path)
    }

    /// Expanded backup root, falling back to the state directory
    pub fn backup_dir(&self) -> Result<PathBuf> {
        match &self.backup.dir {
            Some(dir) => Ok(paths::expand(dir)),
            None => paths::backups_dir(),
        }
    }
}

/// Where the dotfiles live and which submodules they need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DotfilesConfig {
    pub path: String,
    /// Submodule paths relative to the dotfiles dir; empty means "read
    /// `.gitmodules`"
    pub submodules: Vec<String>,
    pub git: String,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            path: "~/.dotfiles".to_string(),
            submodules: Vec::new(),
            git: "git".to_string(),
        }
    }
}

/// A package list plus the commands that install and query it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackagesConfig {
    pub enabled: bool,
    /// Install argv; package names are appended
    pub install: Vec<String>,
    /// Query argv; one package name is appended, exit 0 means installed
    pub query: Vec<String>,
    pub names: Vec<String>,
}

impl PackagesConfig {
    fn validate(&self, section: &str) -> Result<()> {
        if self.enabled && !self.names.is_empty() {
            if self.install.is_empty() {
                anyhow::bail!("[{section}] install command cannot be empty");
            }
            if self.query.is_empty() {
                anyhow::bail!("[{section}] query command cannot be empty");
            }
        }
        Ok(())
    }

    /// Whether this list contributes a step to the plan
    pub fn is_active(&self) -> bool {
        self.enabled && !self.names.is_empty()
    }

    /// Program used to install, for display
    pub fn manager(&self) -> &str {
        let mut argv = self.install.iter().map(String::as_str);
        match argv.next() {
            Some("sudo") => argv.next().unwrap_or("sudo"),
            Some(first) => first,
            None => "?",
        }
    }
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            install: argv(&["sudo", "pacman", "-S", "--needed", "--noconfirm"]),
            query: argv(&["pacman", "-Q"]),
            names: argv(&[
                "git", "zsh", "tmux", "stow", "neovim", "ripgrep", "fd", "fzf", "bat", "eza",
                "zoxide", "htop", "curl", "wget", "unzip", "base-devel",
            ]),
        }
    }
}

/// Same shape as `[packages]`, defaulting to the AUR helper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AurConfig {
    pub enabled: bool,
    pub install: Vec<String>,
    pub query: Vec<String>,
    pub names: Vec<String>,
}

impl Default for AurConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            install: argv(&["yay", "-S", "--needed", "--noconfirm"]),
            query: argv(&["yay", "-Q"]),
            names: argv(&["nerd-fonts-jetbrains-mono"]),
        }
    }
}

impl From<&AurConfig> for PackagesConfig {
    fn from(aur: &AurConfig) -> Self {
        Self {
            enabled: aur.enabled,
            install: aur.install.clone(),
            query: aur.query.clone(),
            names: aur.names.clone(),
        }
    }
}

/// One stow package directory inside the dotfiles tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StowConfig {
    pub group: String,
    #[serde(default)]
    pub target: Option<String>,
}

impl StowConfig {
    fn named(group: &str) -> Self {
        Self {
            group: group.to_string(),
            target: None,
        }
    }
}

/// Login shell and its rc file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell name (looked up on PATH) or absolute path; empty disables
    pub login: String,
    /// Rc file relative to home
    pub rc_file: String,
    /// Rc file source relative to the dotfiles dir
    pub rc_source: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            login: "zsh".to_string(),
            rc_file: ".zshrc".to_string(),
            rc_source: "zsh/.zshrc".to_string(),
        }
    }
}

/// An extra native symlink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    pub name: String,
    /// Relative to the dotfiles dir
    pub source: String,
    /// Relative to home
    pub target: String,
}

/// A free-form shell step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Exit 0 means satisfied; without one the step always runs
    #[serde(default)]
    pub check: Option<String>,
    pub apply: String,
    #[serde(default = "default_true")]
    pub confirm: bool,
    #[serde(default)]
    pub on_failure: OnFailure,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BackupConfig {
    pub dir: Option<String>,
}

/// Plan-wide step selection and policy overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepsConfig {
    pub only: Vec<String>,
    pub skip: Vec<String>,
    pub policy: BTreeMap<String, PolicyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    pub confirm: Option<bool>,
    pub on_failure: Option<OnFailure>,
}

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
