use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::{Context, paths, ui};

/// Write the built-in defaults so they can be edited
pub fn run(ctx: &Context, force: bool) -> Result<()> {
    let path = match &ctx.config {
        Some(p) => p.clone(),
        None => paths::config_file()?,
    };
    write_defaults(&path, force)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_defaults_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dotstrap/config.toml");

        write_defaults(&path, false).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[shell]\nlogin = \"fish\"\n").unwrap();

        let err = write_defaults(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(fs::read_to_string(&path).unwrap().contains("fish"));

        write_defaults(&path, true).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }
}
