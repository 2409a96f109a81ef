use crate::resource::{DirectoryResourceStore, ResourceChain};
use crate::template::{TemplateResolver, TeraEngine};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE_DIR: &str = "templates";
const ENV_TEMPLATE_DIRS: &str = "ARTIFACT_GEN_TEMPLATE_DIRS";
const ENV_AUTOESCAPE: &str = "ARTIFACT_GEN_AUTOESCAPE";

/// Where templates come from and how they are compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Directories searched in order for template resources
    pub template_dirs: Vec<PathBuf>,
    pub autoescape: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec![PathBuf::from(DEFAULT_TEMPLATE_DIR)],
            autoescape: false,
        }
    }
}

impl GeneratorConfig {
    /// Defaults, overlaid by an optional config file, overlaid by environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_config = match config_file {
            Some(path) => load_config_file(path)?,
            None => PartialConfig::default(),
        };
        let env_config = PartialConfig::from_env()?;
        Ok(Self::merge(env_config, file_config))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::merge(PartialConfig::from_env()?, PartialConfig::default()))
    }

    fn merge(primary: PartialConfig, fallback: PartialConfig) -> Self {
        let defaults = Self::default();

        let template_dirs = primary
            .template_dirs
            .or(fallback.template_dirs)
            .map(|dirs| {
                dirs.into_iter()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or(defaults.template_dirs);

        let autoescape = primary
            .autoescape
            .or(fallback.autoescape)
            .unwrap_or(defaults.autoescape);

        Self {
            template_dirs,
            autoescape,
        }
    }

    pub fn ensure_template_dirs(&self) -> Result<()> {
        for dir in &self.template_dirs {
            anyhow::ensure!(dir.exists(), "template directory {:?} does not exist", dir);
            anyhow::ensure!(dir.is_dir(), "template directory {:?} is not a directory", dir);
        }
        Ok(())
    }

    /// Build the process-wide resolver over the configured template directories.
    pub fn build_resolver(&self) -> Result<TemplateResolver> {
        self.ensure_template_dirs()?;

        let mut chain = ResourceChain::new();
        for dir in &self.template_dirs {
            chain.push(DirectoryResourceStore::new(dir));
        }
        let engine = TeraEngine::new().with_autoescape(self.autoescape);

        tracing::info!(
            template_dirs = ?self.template_dirs,
            autoescape = self.autoescape,
            "template resolver configured"
        );
        Ok(TemplateResolver::new(chain, engine))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    template_dirs: Option<Vec<PathBuf>>,
    autoescape: Option<bool>,
}

impl PartialConfig {
    fn from_env() -> Result<Self> {
        let template_dirs = env::var_os(ENV_TEMPLATE_DIRS)
            .filter(|value| !value.is_empty())
            .map(|value| env::split_paths(&value).collect());

        let autoescape = match env::var(ENV_AUTOESCAPE) {
            Ok(value) => Some(parse_bool(&value).with_context(|| {
                format!("invalid {ENV_AUTOESCAPE} value {value:?}")
            })?),
            Err(_) => None,
        };

        Ok(Self {
            template_dirs,
            autoescape,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut parsed: PartialConfig = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };

    // Relative template directories are relative to the config file.
    if let (Some(dirs), Some(base)) = (parsed.template_dirs.as_mut(), path.parent()) {
        for dir in dirs.iter_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
    Ok(parsed)
}
