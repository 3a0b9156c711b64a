use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::{InvocationMode, ToolRunner};
use crate::error::{LibrarianError, Result};

pub const CONFIG_ENV: &str = "LIBRARIAN_CONFIG";
pub const DEFAULT_CONFIG: &str = "librarian.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarianConfig {
    pub bind_addr: String,
    pub tool_dir: PathBuf,
    pub tool_name: String,
    /// Working directory of the tool; the image is written here.
    pub work_dir: PathBuf,
    pub image_name: String,
    pub shell_compat: bool,
    pub echo_diagnostics: bool,
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            tool_dir: PathBuf::from("."),
            tool_name: "lookup.py".to_string(),
            work_dir: PathBuf::from("."),
            image_name: "librarian.png".to_string(),
            shell_compat: false,
            echo_diagnostics: true,
        }
    }
}

impl LibrarianConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(raw).map_err(|err| LibrarianError::Config(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Loads the file named by `LIBRARIAN_CONFIG` and applies env overrides.
    pub fn load_from_env() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
        let mut cfg = Self::load(Path::new(&path))?;
        cfg.apply_overrides(|key| env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LIBRARIAN_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("LIBRARIAN_TOOL_DIR") {
            self.tool_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("LIBRARIAN_TOOL_NAME") {
            self.tool_name = value;
        }
        if let Some(value) = lookup("LIBRARIAN_WORK_DIR") {
            self.work_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("LIBRARIAN_SHELL_COMPAT") {
            self.shell_compat = parse_bool(&value);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tool_name.trim().is_empty() {
            return Err(LibrarianError::Config("tool_name must not be empty".into()));
        }
        // Route capture syntax would shadow every path, so it is refused too.
        let reserved = ['/', '\\', ':', '*', '{', '}'];
        if self.image_name.is_empty() || self.image_name.contains(reserved) {
            return Err(LibrarianError::Config(format!(
                "image_name must be a bare file name, got {:?}",
                self.image_name
            )));
        }
        Ok(())
    }

    pub fn invocation_mode(&self) -> InvocationMode {
        if self.shell_compat {
            InvocationMode::Shell
        } else {
            InvocationMode::Direct
        }
    }

    pub fn runner(&self) -> ToolRunner {
        ToolRunner::new(self.invocation_mode()).with_work_dir(&self.work_dir)
    }

    pub fn image_path(&self) -> PathBuf {
        self.work_dir.join(&self.image_name)
    }
}

pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LibrarianConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, LibrarianConfig::default());
        assert_eq!(cfg.invocation_mode(), InvocationMode::Direct);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = LibrarianConfig::from_toml_str(
            "tool_dir = \"/srv/buildtest\"\nshell_compat = true\n",
        )
        .unwrap();
        assert_eq!(cfg.tool_dir, PathBuf::from("/srv/buildtest"));
        assert_eq!(cfg.tool_name, "lookup.py");
        assert_eq!(cfg.invocation_mode(), InvocationMode::Shell);
        assert!(cfg.echo_diagnostics);
    }

    #[test]
    fn rejects_image_paths() {
        let err = LibrarianConfig::from_toml_str("image_name = \"../etc/passwd\"").unwrap_err();
        assert!(matches!(err, LibrarianError::Config(_)));
        assert!(LibrarianConfig::from_toml_str("tool_name = \"\"").is_err());
    }

    #[test]
    fn rejects_image_names_that_route_as_captures() {
        for name in [":image", "*rest", "{image}", "graph:1.png"] {
            let toml = format!("image_name = \"{name}\"");
            let err = LibrarianConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, LibrarianError::Config(_)), "{name} accepted");
        }
        assert!(LibrarianConfig::from_toml_str("image_name = \"graph-1.png\"").is_ok());
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("LIBRARIAN_TOOL_NAME", "lookup.sh"),
            ("LIBRARIAN_SHELL_COMPAT", "yes"),
            ("LIBRARIAN_WORK_DIR", "/var/www/buildtest"),
        ]
        .into_iter()
        .collect();
        let mut cfg = LibrarianConfig::default();
        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.tool_name, "lookup.sh");
        assert!(cfg.shell_compat);
        assert_eq!(
            cfg.image_path(),
            PathBuf::from("/var/www/buildtest/librarian.png")
        );
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("ON"));
        assert!(parse_bool(" 1 "));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }
}
