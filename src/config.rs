//! Layered configuration and the atomic redirect policy snapshot.

use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::redirect::domain::{DomainPolicy, ProtectedDomain};
use crate::redirect::engine::RedirectPolicy;
use crate::redirect::scheme::is_secure_scheme;
use crate::redirect::url::TargetUrl;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub redirect: RedirectConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9091
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Operator-supplied redirect authorization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Root domains whose subdomains are trusted redirect targets.
    pub protected_domains: Vec<String>,
    /// The portal's own "already authenticated" page, used as the deny
    /// fallback. Must itself satisfy the scheme policy.
    pub landing_url: String,
}

impl AppConfig {
    /// Load configuration from the layered file sources and `PORTAL_*`
    /// environment overrides, then validate it.
    ///
    /// Invalid entries fail here, at load time, never at request time.
    pub fn load() -> Result<Self> {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = env::var("PORTAL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let mut builder = config::Config::builder();

        let base_config = Path::new(&config_dir).join("base.toml");
        if base_config.exists() {
            builder = builder.add_source(File::from(base_config));
        }

        let env_config = Path::new(&config_dir).join(format!("{environment}.toml"));
        if env_config.exists() {
            builder = builder.add_source(File::from(env_config));
        }

        let local_config = Path::new(&config_dir).join("local.toml");
        if local_config.exists() {
            builder = builder.add_source(File::from(local_config));
        }

        builder = builder.add_source(
            Environment::with_prefix("PORTAL")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }
        self.redirect.build_policy().map(|_| ())
    }
}

impl RedirectConfig {
    /// Construct the immutable policy snapshot, rejecting invalid entries.
    pub fn build_policy(&self) -> Result<RedirectPolicy> {
        if self.protected_domains.is_empty() {
            bail!("At least one protected domain must be configured");
        }

        let mut domains = Vec::with_capacity(self.protected_domains.len());
        for entry in &self.protected_domains {
            let domain = ProtectedDomain::new(entry)
                .with_context(|| format!("Invalid protected domain {entry:?}"))?;
            domains.push(domain);
        }

        let landing = TargetUrl::parse(&self.landing_url)
            .map_err(|e| anyhow::anyhow!("Invalid landing URL {:?}: {e}", self.landing_url))?;
        if !is_secure_scheme(landing.scheme()) {
            bail!(
                "Landing URL {:?} must use the {} scheme",
                self.landing_url,
                crate::redirect::scheme::SECURE_SCHEME
            );
        }

        Ok(RedirectPolicy {
            domains: DomainPolicy::new(domains),
            landing,
        })
    }
}

/// Process-wide handle to the current [`RedirectPolicy`] snapshot.
///
/// Readers take a cheap `Arc` clone; reload validates a complete new
/// configuration and swaps the pointer in one step, so concurrent
/// authorizations see either the old snapshot or the new one, never a
/// partially updated domain set.
#[derive(Clone)]
pub struct PolicyStore {
    current: Arc<RwLock<Arc<RedirectPolicy>>>,
    version: Arc<AtomicU64>,
}

impl PolicyStore {
    pub fn new(policy: RedirectPolicy) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(policy))),
            version: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn snapshot(&self) -> Arc<RedirectPolicy> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Validate `config` and atomically swap in the resulting snapshot.
    ///
    /// On validation failure the running snapshot is left untouched.
    pub fn reload_from(&self, config: &RedirectConfig) -> Result<u64> {
        let policy = Arc::new(config.build_policy()?);
        match self.current.write() {
            Ok(mut guard) => *guard = policy,
            Err(poisoned) => *poisoned.into_inner() = policy,
        }
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(version, "Redirect policy reloaded");
        Ok(version)
    }
}
