pub mod apply;
pub mod backups;
pub mod init_config;
pub mod last;
pub mod list;
pub mod status;

use anyhow::Result;
use stepwise::{RunOptions, RunPlan, parse_list};

use crate::Context;
use crate::config::Config;
use crate::{paths, plan};

fn load_config(ctx: &Context) -> Result<Config> {
    Config::load(ctx.config.as_deref())
}

/// Build the plan, narrowed by `--only`/`--skip` or else `[steps]` defaults
fn selected_plan(config: &Config, only: Option<&str>, skip: Option<&str>) -> Result<RunPlan> {
    let pick = |cli: Option<&str>, configured: &[String]| {
        let list = parse_list(cli);
        if list.is_empty() {
            configured.to_vec()
        } else {
            list
        }
    };

    let plan = plan::build(config, plan::current_user().as_deref())?;
    Ok(plan.select(
        &pick(only, &config.steps.only),
        &pick(skip, &config.steps.skip),
    )?)
}

fn run_options(config: &Config) -> Result<RunOptions> {
    Ok(RunOptions::new(
        paths::home_dir()?,
        config.dotfiles_dir(),
        config.backup_dir()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_lists_override_config() {
        let mut config = Config::default();
        config.steps.skip = vec!["install-aur-packages".into()];

        let plan = selected_plan(&config, None, None).unwrap();
        assert!(!plan.names().contains(&"install-aur-packages"));

        let plan = selected_plan(&config, None, Some("stow-git")).unwrap();
        assert!(plan.names().contains(&"install-aur-packages"));
        assert!(!plan.names().contains(&"stow-git"));
    }

    #[test]
    fn test_only_keeps_preconditions() {
        let plan =
            selected_plan(&Config::default(), Some("symlink-zsh-config"), None).unwrap();
        assert_eq!(plan.names(), ["symlink-zsh-config"]);
        assert_eq!(plan.preconditions().len(), 3);
    }

    #[test]
    fn test_unknown_step_is_error() {
        let err = selected_plan(&Config::default(), Some("install-pakages"), None).unwrap_err();
        assert!(err.to_string().contains("install-pakages"));
    }
}
