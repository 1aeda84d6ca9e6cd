//! Loader for Skimmer configuration with YAML + environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML files in the order
//! they were added, `SKIMMER__SECTION__KEY` environment variables. String
//! values then get `${VAR}` expansion, and the well-known variables
//! `OPENAI_API_KEY`, `BRAVE_API_KEY` and `SHOW_BROWSER` fill in what is still
//! unset.
//!
//! ```yaml
//! llm:
//!   ollama: { endpoint: "http://localhost:11434", model: "llama3.2" }
//!   openai: { model: "gpt-4.1-nano", auth_token: "${OPENAI_API_KEY}" }
//! search:
//!   brave: { auth_token: "${BRAVE_API_KEY}" }
//! browser: { webdriver_url: "http://localhost:9515", show_browser: false }
//! pipeline: { max_results: 4, settle_delay_ms: 1000, empty_page_policy: keep_title }
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skimmer_drivers::skimmer_browser::options::BrowserSettings;
use skimmer_llm::LlmSettings;
use skimmer_pipeline::PipelineSettings;
use skimmer_web::BraveSettings;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "skimmer.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub brave: BraveSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkimmerConfig {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub browser: BrowserSettings,
    pub pipeline: PipelineSettings,
}

/// `1`, `true` and `True` enable a flag.
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw, "1" | "true" | "True")
}

/// Load `.env` from the working directory or a parent, if present.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fill credentials and the window flag from their conventional variables.
fn apply_well_known_env(cfg: &mut SkimmerConfig) {
    let unset = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

    if unset(&cfg.llm.openai.auth_token) {
        cfg.llm.openai.auth_token = non_empty_env("OPENAI_API_KEY");
    }
    if unset(&cfg.search.brave.auth_token) {
        cfg.search.brave.auth_token = non_empty_env("BRAVE_API_KEY");
    }
    if std::env::var("SHOW_BROWSER").is_ok_and(|v| is_truthy(&v)) {
        cfg.browser.show_browser = true;
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SkimmerConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SkimmerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SkimmerConfigLoader {
    /// Start from built-in defaults.
    ///
    /// ```
    /// use skimmer_config::SkimmerConfigLoader;
    ///
    /// let config = SkimmerConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.pipeline.max_results, 4);
    /// assert_eq!(config.llm.ollama.model, "llama3.2");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use skimmer_config::SkimmerConfigLoader;
    /// use skimmer_pipeline::EmptyPagePolicy;
    ///
    /// let cfg = SkimmerConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// pipeline:
    ///   max_results: 2
    ///   empty_page_policy: skip
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.pipeline.max_results, 2);
    /// assert_eq!(cfg.pipeline.empty_page_policy, EmptyPagePolicy::Skip);
    /// assert_eq!(cfg.pipeline.max_search_attempts, 3);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use skimmer_config::SkimmerConfigLoader;
    ///
    /// unsafe { std::env::set_var("SKIMMER_DOC_TOKEN", "injected-from-env"); }
    ///
    /// let config = SkimmerConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// search:
    ///   brave:
    ///     auth_token: "${SKIMMER_DOC_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.search.brave.auth_token.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.search.brave.endpoint, "https://api.search.brave.com/");
    ///
    /// unsafe { std::env::remove_var("SKIMMER_DOC_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<SkimmerConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SKIMMER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        let mut typed: SkimmerConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        apply_well_known_env(&mut typed);

        Ok(typed)
    }
}
