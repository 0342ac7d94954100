//! Config command implementation.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, path: &Path, quiet: bool) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load(path);
            let content = toml::to_string_pretty(&config)?;
            if !path.exists() && !quiet {
                println!("# {} not found, showing defaults", path.display());
                println!("# Write a starter file with: airsim config init");
            }
            print!("{}", content);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file {} already exists. Pass --force to overwrite it.",
                    path.display()
                );
            }
            Config::starter().save(path)?;
            if !quiet {
                println!("Wrote starter config to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_config(ConfigAction::Init { force: false }, &path, true).unwrap();
        assert_eq!(Config::load(&path), Config::starter());

        std::fs::write(&path, "no_color = true\n").unwrap();
        let err = cmd_config(ConfigAction::Init { force: false }, &path, true).unwrap_err();
        assert!(err.to_string().contains("--force"));

        cmd_config(ConfigAction::Init { force: true }, &path, true).unwrap();
        assert_eq!(Config::load(&path), Config::starter());
    }
}
