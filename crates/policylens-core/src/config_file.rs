use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::vocabulary::RiskVocabulary;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub analysis: Option<AnalysisConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Replaces the built-in risk vocabulary when set.
    pub risk_terms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Run `clean_text` over extracted PDF text (default true).
    pub clean: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    /// `"text"` or `"json"`.
    pub format: Option<String>,
}

impl ConfigFile {
    /// Risk vocabulary from `[analysis] risk_terms`, or the built-in list.
    pub fn risk_vocabulary(&self) -> RiskVocabulary {
        match self.analysis.as_ref().and_then(|a| a.risk_terms.as_ref()) {
            Some(terms) => RiskVocabulary::new(terms.iter().cloned()),
            None => RiskVocabulary::default(),
        }
    }

    pub fn clean_extracted_text(&self) -> bool {
        self.extraction
            .as_ref()
            .and_then(|e| e.clean)
            .unwrap_or(true)
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.extraction.as_ref().and_then(|e| e.timeout_secs)
    }

    pub fn color(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.color)
    }

    pub fn format(&self) -> Option<&str> {
        self.display.as_ref().and_then(|d| d.format.as_deref())
    }
}

/// Platform config directory path: `<config_dir>/policylens/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("policylens").join("config.toml"))
}

/// Load config by cascading CWD `.policylens.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".policylens.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        analysis: Some(AnalysisConfig {
            risk_terms: overlay
                .analysis
                .as_ref()
                .and_then(|a| a.risk_terms.clone())
                .or_else(|| base.analysis.as_ref().and_then(|a| a.risk_terms.clone())),
        }),
        extraction: Some(ExtractionConfig {
            clean: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.clean)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.clean)),
            timeout_secs: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.timeout_secs)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.timeout_secs)),
        }),
        display: Some(DisplayConfig {
            color: overlay
                .display
                .as_ref()
                .and_then(|d| d.color)
                .or_else(|| base.display.as_ref().and_then(|d| d.color)),
            format: overlay
                .display
                .as_ref()
                .and_then(|d| d.format.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.format.clone())),
        }),
    }
}
