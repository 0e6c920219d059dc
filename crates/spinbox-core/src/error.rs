use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpinboxError {
    #[error("unknown component '{0}'; run 'spinbox profiles' to see available components")]
    UnknownComponent(String),

    #[error("unknown profile '{0}'; run 'spinbox profiles' to list profiles")]
    UnknownProfile(String),

    #[error("unknown requirements template '{0}'")]
    UnknownTemplate(String),

    #[error("no components requested: pass component flags or --profile")]
    EmptyRequest,

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error("failed to parse {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("project already exists at {0}: use 'spinbox add' to extend it")]
    ProjectExists(PathBuf),

    #[error("target directory not found: {0}")]
    TargetNotFound(PathBuf),

    #[error("unknown config key '{0}'")]
    UnknownConfigKey(String),

    #[error("invalid value '{value}' for config key '{key}': {reason}")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("home directory not found: set HOME or SPINBOX_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SpinboxError {
    /// True for errors raised while validating a request, before any file I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SpinboxError::UnknownComponent(_)
                | SpinboxError::UnknownProfile(_)
                | SpinboxError::UnknownTemplate(_)
                | SpinboxError::EmptyRequest
        )
    }
}

pub type Result<T> = std::result::Result<T, SpinboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_component_names_the_component() {
        let err = SpinboxError::UnknownComponent("django".to_string());
        assert!(err.to_string().contains("'django'"));
        assert!(err.is_configuration());
    }

    #[test]
    fn manifest_parse_names_the_file() {
        let err = SpinboxError::ManifestParse {
            path: PathBuf::from("proj/package.json"),
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse proj/package.json: expected value at line 1 column 1"
        );
        assert!(!err.is_configuration());
    }
}
