//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stuffies_commerce::cart::default_cart_key;
use stuffies_data::DEFAULT_BASE_URL;

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["stuffies.toml", ".stuffies.toml", "stuffies.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Problems that make the config unusable.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.storage.dir.trim().is_empty() {
            errors.push("storage.dir must not be empty".to_string());
        }
        if self.storage.cart_key.trim().is_empty() {
            errors.push("storage.cart_key must not be empty".to_string());
        }
        if self.catalog.source == Backend::File && self.catalog.file.trim().is_empty() {
            errors.push("catalog.file must not be empty".to_string());
        }
        if self.checkout.sink == Backend::File && self.checkout.outbox_dir.trim().is_empty() {
            errors.push("checkout.outbox_dir must not be empty".to_string());
        }
        if self.uses_api()
            && !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            errors.push(format!("api.base_url '{}' must be an http(s) URL", self.api.base_url));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.filter).is_err() {
            errors.push(format!("logging.filter '{}' is not a valid filter", self.logging.filter));
        }
        errors
    }

    /// Whether any command talks to the backend.
    pub fn uses_api(&self) -> bool {
        self.catalog.source == Backend::Api || self.checkout.sink == Backend::Api
    }
}

/// Where catalog data comes from and where orders go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local JSON files.
    #[default]
    File,
    /// The storefront API at `api.base_url`.
    Api,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Api => "api",
        }
    }
}

/// Storefront backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Extra attempts for failed reads. Orders are never resent.
    #[serde(default)]
    pub retries: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retries: 0,
        }
    }
}

/// Where the cart and session live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the key-value store.
    #[serde(default = "default_store_dir")]
    pub dir: String,

    /// Key the cart is kept under.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_store_dir() -> String {
    ".stuffies/store".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            cart_key: default_cart_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: Backend,

    /// Catalog JSON: an array of products or a `{ "content": [...] }` page.
    #[serde(default = "default_catalog_file")]
    pub file: String,
}

fn default_catalog_file() -> String {
    "catalog.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: Backend::File,
            file: default_catalog_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Also where `orders` reads history from.
    #[serde(default)]
    pub sink: Backend,

    /// Directory placed orders are written to.
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
}

fn default_outbox_dir() -> String {
    ".stuffies/outbox".to_string()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            sink: Backend::File,
            outbox_dir: default_outbox_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Generate a default stuffies.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Stuffies storefront configuration

[storage]
dir = "{dir}"
cart_key = "{key}"

[api]
base_url = "{base_url}"
# Extra attempts for failed reads
retries = 0

[catalog]
# "file" or "api"
source = "file"
file = "{catalog}"

[checkout]
# "file" writes orders to outbox_dir, "api" posts them to the backend
sink = "file"
outbox_dir = "{outbox}"

[logging]
# Overridden by RUST_LOG
filter = "{filter}"
"#,
        dir = default_store_dir(),
        key = default_cart_key(),
        base_url = default_base_url(),
        catalog = default_catalog_file(),
        outbox = default_outbox_dir(),
        filter = default_filter(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.errors().is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CliConfig = toml::from_str("[catalog]\nfile = \"data/productos.json\"\n").unwrap();
        assert_eq!(config.catalog.file, "data/productos.json");
        assert_eq!(config.storage.cart_key, "stuffies:cart");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_api_backend() {
        let config: CliConfig = toml::from_str(
            "[api]\nbase_url = \"https://tienda.example\"\nretries = 2\n[catalog]\nsource = \"api\"\n",
        )
        .unwrap();
        assert_eq!(config.catalog.source, Backend::Api);
        assert_eq!(config.checkout.sink, Backend::File);
        assert_eq!(config.api.retries, 2);
        assert!(config.uses_api());
        assert!(config.errors().is_empty());

        let mut bad = config.clone();
        bad.api.base_url = "tienda.example".into();
        assert_eq!(bad.errors().len(), 1);

        // Only checked when something uses it.
        let mut unused = CliConfig::default();
        unused.api.base_url = "tienda.example".into();
        assert!(unused.errors().is_empty());
    }

    #[test]
    fn test_errors() {
        let mut config = CliConfig::default();
        config.storage.dir = " ".into();
        config.logging.filter = "stuffies=loud".into();
        assert_eq!(config.errors().len(), 2);
    }
}
