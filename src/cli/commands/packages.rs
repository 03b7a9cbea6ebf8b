//! Package catalog commands.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Package;

#[derive(Args, Debug)]
pub struct PackagesArgs {
    /// Show the phases and category quotas of this package
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackageListOutput {
    pub packages: Vec<Package>,
    pub total: usize,
}

impl CommandOutput for PackageListOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} package(s):", self.total)];
        lines.push(TableFormatter::new().format_packages(&self.packages));
        lines.push("★ phase ends with a satisfaction survey".to_string());
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct PackageDetailOutput {
    pub package: Package,
    pub total_questions: u32,
    pub total_minutes: u32,
}

impl CommandOutput for PackageDetailOutput {
    fn to_human(&self) -> String {
        [
            format!("Package: {} ({})", self.package.name, self.package.id),
            format!(
                "Questions: {}   Duration: {} min",
                self.total_questions, self.total_minutes
            ),
            TableFormatter::new().format_phases(&self.package),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: PackagesArgs, json_mode: bool) -> Result<()> {
    match args.id {
        None => {
            let packages = Package::catalog();
            let out = PackageListOutput {
                total: packages.len(),
                packages,
            };
            output(&out, json_mode);
        }
        Some(id) => {
            let package = Package::by_id(&id)?;
            let out = PackageDetailOutput {
                total_questions: package.total_target(),
                total_minutes: package.total_minutes(),
                package,
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_package_is_an_error() {
        let err = execute(
            PackagesArgs {
                id: Some("inconnu".to_string()),
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("inconnu"));
    }

    #[test]
    fn test_detail_json_has_totals() {
        let package = Package::by_id("approfondi").unwrap();
        let out = PackageDetailOutput {
            total_questions: package.total_target(),
            total_minutes: package.total_minutes(),
            package,
        };
        let json = out.to_json();
        assert_eq!(json["total_questions"], 60);
        assert_eq!(json["package"]["id"], "approfondi");
    }
}
