//! Pipeline configuration stored at `ci.toml` in the project root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Pipeline configuration (TOML).
///
/// CI environments override dependency sources here (e.g. to point at a
/// mirror) or rename the layout directories; missing fields default to the
/// stock upstream layout, so the file itself is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory under the project root that holds external dependencies.
    pub external_dir: String,

    /// Per-project build-output directory name.
    pub build_dir: String,

    /// Loader repository.
    pub loader: DepSource,

    /// Device-tools repository (mock driver sources and generator).
    pub tools: DepSource,

    /// Test-framework repository, pinned to a release.
    pub test_framework: DepSource,
}

/// Where one external repository is cloned from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepSource {
    pub url: String,
    /// Tag to check out after cloning, when a release is pinned.
    pub tag: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            external_dir: "external".to_string(),
            build_dir: "build".to_string(),
            loader: DepSource {
                url: "https://github.com/layerkit/loader.git".to_string(),
                tag: None,
            },
            tools: DepSource {
                url: "https://github.com/layerkit/device-tools.git".to_string(),
                tag: None,
            },
            test_framework: DepSource {
                url: "https://github.com/google/googletest.git".to_string(),
                tag: Some("release-1.8.1".to_string()),
            },
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.external_dir.trim().is_empty() {
            return Err(anyhow!("external_dir must be a non-empty directory name"));
        }
        if self.build_dir.trim().is_empty() {
            return Err(anyhow!("build_dir must be a non-empty directory name"));
        }
        for (name, source) in [
            ("loader", &self.loader),
            ("tools", &self.tools),
            ("test_framework", &self.test_framework),
        ] {
            if source.url.trim().is_empty() {
                return Err(anyhow!("{name}.url must be non-empty"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PipelineConfig::default()`.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        let cfg = PipelineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PipelineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
