//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "shoplens";
const PROJECT_FILES: [&str; 2] = ["shoplens.toml", ".shoplens.toml"];
const ENV_PREFIX: &str = "SHOPLENS_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `SHOPLENS_<SECTION>__<KEY>` (e.g. `SHOPLENS_BACKEND__BASE_URL`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./shoplens.toml` or `./.shoplens.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/shoplens/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers only, rooted at `project_dir`.
    fn figment(global: Option<&Path>, project_dir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/shoplens/config.toml if set,
    /// otherwise falls back to the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] Environment: {}<SECTION>__<KEY>", ENV_PREFIX);

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./shoplens.toml or ./.shoplens.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("shoplens"));
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[backend]\nbase_url = \"http://global:1\"\ntimeout_seconds = 10\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("shoplens.toml"),
            "[backend]\nbase_url = \"http://project:2\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[output]\ncolor = false\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&global), dir.path(), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.backend.base_url, "http://project:2");
        assert_eq!(config.backend.timeout_seconds, 10);
        assert!(!config.output.color);
        assert!(config.progress.show_progress);
    }

    #[test]
    fn test_hidden_project_file_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".shoplens.toml"),
            "[auth]\ntoken_env = \"OTHER_TOKEN\"\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, dir.path(), None)
            .extract()
            .unwrap();
        assert_eq!(config.auth.token_env, "OTHER_TOKEN");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("broken.toml");
        fs::write(&explicit, "[backend\nbase_url = 1").unwrap();

        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, dir.path(), Some(&explicit)).extract();
        assert!(result.is_err());
    }
}
