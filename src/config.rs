use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coverage::CheckConfig;

/// Threshold used by the config file when a module leaves one unset
pub const SHARED_DEFAULT_THRESHOLD: i32 = 70;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Values shared by every module in the file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub total_threshold: Option<i32>,
    #[serde(default)]
    pub file_threshold: Option<i32>,
    #[serde(default)]
    pub fail_under_threshold: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    /// Display name used in the report header
    pub name: String,
    /// Path to the Kover XML report, `$VAR` and `~` are expanded
    pub report: String,
    #[serde(default)]
    pub total_threshold: Option<i32>,
    #[serde(default)]
    pub file_threshold: Option<i32>,
    #[serde(default)]
    pub fail_under_threshold: Option<bool>,
}

/// A module with its thresholds resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub name: String,
    pub report: PathBuf,
    pub check: CheckConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.modules.is_empty() {
            anyhow::bail!("No modules defined. Add at least one [[modules]] entry.");
        }

        for (i, module) in self.modules.iter().enumerate() {
            if module.name.trim().is_empty() {
                anyhow::bail!("Module #{} has an empty name", i + 1);
            }
            if module.report.trim().is_empty() {
                anyhow::bail!("Module '{}' has an empty report path", module.name);
            }
        }

        Ok(())
    }

    /// Resolve every module's thresholds once, relative to `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> Result<Vec<ResolvedModule>> {
        self.modules
            .iter()
            .map(|module| {
                let expanded = shellexpand::full(&module.report).with_context(|| {
                    format!("Failed to expand report path for '{}'", module.name)
                })?;

                Ok(ResolvedModule {
                    name: module.name.clone(),
                    report: base_dir.join(&*expanded),
                    check: CheckConfig {
                        total_threshold: module
                            .total_threshold
                            .or(self.defaults.total_threshold)
                            .unwrap_or(SHARED_DEFAULT_THRESHOLD),
                        file_threshold: module
                            .file_threshold
                            .or(self.defaults.file_threshold)
                            .unwrap_or(SHARED_DEFAULT_THRESHOLD),
                        fail_under_threshold: module
                            .fail_under_threshold
                            .or(self.defaults.fail_under_threshold)
                            .unwrap_or(true),
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[defaults]
file_threshold = 80

[[modules]]
name = "App"
report = "app/build/reports/kover/report.xml"

[[modules]]
name = "Core"
report = "core/report.xml"
total_threshold = 95
fail_under_threshold = false
"#;

        let config = Config::from_toml(toml_content).unwrap();
        let modules = config.resolve(Path::new("/repo")).unwrap();

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "App");
        assert_eq!(
            modules[0].report,
            PathBuf::from("/repo/app/build/reports/kover/report.xml")
        );
        assert_eq!(
            modules[0].check,
            CheckConfig {
                total_threshold: 70,
                file_threshold: 80,
                fail_under_threshold: true,
            }
        );
        assert_eq!(
            modules[1].check,
            CheckConfig {
                total_threshold: 95,
                file_threshold: 80,
                fail_under_threshold: false,
            }
        );
    }

    #[test]
    fn test_absolute_report_path_is_kept() {
        let config = Config::from_toml(
            r#"
[[modules]]
name = "App"
report = "/abs/report.xml"
"#,
        )
        .unwrap();

        let modules = config.resolve(Path::new("/repo")).unwrap();
        assert_eq!(modules[0].report, PathBuf::from("/abs/report.xml"));
    }

    #[test]
    fn test_validate_rejects_empty_config() {
        assert!(Config::from_toml("").is_err());
        assert!(Config::from_toml("[[modules]]\nname = \"App\"\nreport = \"\"\n").is_err());
        assert!(Config::from_toml("[[modules]]\nname = \" \"\nreport = \"r.xml\"\n").is_err());
    }
}
