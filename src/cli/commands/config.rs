//! Effective configuration commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Validate this YAML file instead of showing the effective configuration
    #[arg(long)]
    pub validate: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub source: String,
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config).unwrap_or_default();
        format!("# {}\n{}", self.source, yaml.trim_end())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    let out = match args.validate {
        Some(path) => {
            let config = ConfigLoader::load_from_file(&path)
                .with_context(|| format!("Invalid configuration file {}", path.display()))?;
            ConfigOutput {
                source: format!("{} is valid", path.display()),
                config,
            }
        }
        None => ConfigOutput {
            source: "effective configuration".to_string(),
            config: config.clone(),
        },
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_human_output_is_yaml() {
        let out = ConfigOutput {
            source: "effective configuration".to_string(),
            config: Config::default(),
        };
        let human = out.to_human();
        assert!(human.starts_with("# effective configuration"));
        assert!(human.contains("default_package: essentiel"));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  end_warning_percent: 120").unwrap();

        let result = execute(
            ConfigArgs {
                validate: Some(file.path().to_path_buf()),
            },
            &Config::default(),
            true,
        )
        .await;
        assert!(result.is_err());
    }
}
