//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use stuffies_cache::{Cache, Session};
use stuffies_commerce::cart::CartStore;
use stuffies_data::{ApiClient, HttpCatalog, HttpOrders, RetryPolicy};

use crate::backend::{Catalog, Orders};
use crate::config::{Backend, CliConfig, CONFIG_NAMES};
use crate::local::{FileCatalog, Outbox};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: CliConfig,
    /// File the config came from, `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found
    /// walking up from the working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            None => match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(config_path.to_str()?) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "ignoring config"),
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Paths in the config are relative to the config file's directory,
    /// or to the working directory when there is no config file.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            return path;
        }
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        base.join(path)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    fn cache(&self) -> Result<Cache> {
        let dir = self.store_dir();
        Cache::open_dir(&dir).with_context(|| format!("Failed to open store at {}", dir.display()))
    }

    pub fn cart_store(&self) -> Result<CartStore> {
        Ok(CartStore::with_key(self.cache()?, self.config.storage.cart_key.clone()))
    }

    pub fn session(&self) -> Result<Session> {
        Ok(Session::new(self.cache()?))
    }

    /// Backend client carrying the stored session's token.
    pub fn api_client(&self) -> Result<ApiClient> {
        let api = &self.config.api;
        let retry = match api.retries {
            0 => RetryPolicy::none(),
            n => RetryPolicy::new(n),
        };
        Ok(ApiClient::native(api.base_url.clone())
            .with_session(self.session()?)
            .with_retry(retry))
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Ok(match self.config.catalog.source {
            Backend::File => Catalog::File(FileCatalog::new(self.resolve_path(&self.config.catalog.file))),
            Backend::Api => Catalog::Api(
                HttpCatalog::new(self.api_client()?),
                self.config.api.base_url.clone(),
            ),
        })
    }

    pub fn orders(&self) -> Result<Orders> {
        Ok(match self.config.checkout.sink {
            Backend::File => {
                Orders::Outbox(Outbox::new(self.resolve_path(&self.config.checkout.outbox_dir)))
            }
            Backend::Api => Orders::Api(
                HttpOrders::new(self.api_client()?),
                self.config.api.base_url.clone(),
            ),
        })
    }
}
