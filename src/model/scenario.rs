//! Scenario documents
//!
//! Scenarios load from JSON or YAML, either as a full document
//! (`name`, `description`, `steps`) or as a bare list of steps.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Step;
use crate::common::{Error, Result};

/// One ordered step list executed against one driver instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Full(Scenario),
    Steps(Vec<Step>),
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    Yaml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps,
        }
    }

    /// Load a scenario file, inferring the format from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let format = ScenarioFormat::from_path(path).ok_or_else(|| Error::ScenarioParse {
            path: display.clone(),
            message: "expected a .json, .yaml or .yml file".to_string(),
        })?;
        let content = std::fs::read_to_string(path).map_err(|e| Error::ScenarioParse {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let fallback = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scenario");
        Self::parse(&content, format, fallback).map_err(|message| Error::ScenarioParse {
            path: display,
            message,
        })
    }

    /// Parse scenario text; bare step lists are named `fallback_name`
    pub fn parse(
        content: &str,
        format: ScenarioFormat,
        fallback_name: &str,
    ) -> std::result::Result<Self, String> {
        let file: ScenarioFile = match format {
            ScenarioFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
            ScenarioFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        };
        Ok(match file {
            ScenarioFile::Full(scenario) => scenario,
            ScenarioFile::Steps(steps) => Scenario::new(fallback_name, steps),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActionKind;
    use std::io::Write;

    #[test]
    fn test_parse_full_yaml_document() {
        let yaml = r#"
name: login
description: Sign in with valid credentials
steps:
  - action: NAVIGATE
    url: https://example.com/login
  - name: Submit
    action: CLICK
    target: { by: id, value: submit }
"#;
        let scenario = Scenario::parse(yaml, ScenarioFormat::Yaml, "unused").unwrap();
        assert_eq!(scenario.name, "login");
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[1].kind(), ActionKind::Click);
    }

    #[test]
    fn test_parse_bare_step_list() {
        let json = r#"[{"action": "REFRESH_WINDOW"}, {"action": "BACK_WINDOW"}]"#;
        let scenario = Scenario::parse(json, ScenarioFormat::Json, "history").unwrap();
        assert_eq!(scenario.name, "history");
        assert_eq!(scenario.steps.len(), 2);
    }

    #[test]
    fn test_from_path_errors_are_configuration_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"action": "NOPE"}}]"#).unwrap();
        let err = Scenario::from_path(file.path()).unwrap_err();
        assert!(matches!(err, Error::ScenarioParse { .. }));
        assert!(err.is_fatal());

        let err = Scenario::from_path(Path::new("steps.txt")).unwrap_err();
        assert!(matches!(err, Error::ScenarioParse { .. }));
    }

    #[test]
    fn test_from_path_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout.yml");
        std::fs::write(&path, "- action: CLOSE_WINDOW\n").unwrap();
        let scenario = Scenario::from_path(&path).unwrap();
        assert_eq!(scenario.name, "checkout");
    }
}
