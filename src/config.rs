use std::path::PathBuf;
use std::time::Duration;

/// Default time budget for one provider call (10 seconds).
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Explicit project root; discovered from the working directory when unset.
    pub project_root: Option<PathBuf>,
    /// Directory holding `rules/` and `workflows/`; defaults to
    /// `<project root>/.context`.
    pub content_dir: Option<PathBuf>,
    pub provider_timeout: Duration,
    pub scope_working_directory: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            content_dir: None,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            scope_working_directory: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `PROJECT_CONTEXT_ROOT` (optional): project root directory
    /// - `PROJECT_CONTEXT_CONTENT_DIR` (optional): rules/workflows directory
    /// - `PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS` (optional, default 10): max seconds per provider call
    /// - `PROJECT_CONTEXT_SCOPE_CWD` (optional, default true): switch the working
    ///   directory to the project root during `session/init-context`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider_timeout_secs = match non_empty("PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS") {
            Some(val) => match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err("PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS must be a positive integer".to_string())
                }
            },
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        let scope_working_directory = match non_empty("PROJECT_CONTEXT_SCOPE_CWD") {
            Some(val) => match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err("PROJECT_CONTEXT_SCOPE_CWD must be true or false".to_string()),
            },
            None => true,
        };

        Ok(Self {
            project_root: non_empty("PROJECT_CONTEXT_ROOT").map(PathBuf::from),
            content_dir: non_empty("PROJECT_CONTEXT_CONTENT_DIR").map(PathBuf::from),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            scope_working_directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.project_root, None);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert!(config.scope_working_directory);
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PROJECT_CONTEXT_ROOT", "/work/app"),
            ("PROJECT_CONTEXT_CONTENT_DIR", "/opt/rules"),
            ("PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS", "3"),
            ("PROJECT_CONTEXT_SCOPE_CWD", "false"),
        ]))
        .unwrap();
        assert_eq!(config.project_root, Some(PathBuf::from("/work/app")));
        assert_eq!(config.content_dir, Some(PathBuf::from("/opt/rules")));
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
        assert!(!config.scope_working_directory);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PROJECT_CONTEXT_PROVIDER_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PROJECT_CONTEXT_SCOPE_CWD", "maybe")])).is_err());
    }
}
