use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) db: Option<Arc<modkit_db::DbHandle>>,
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: Arc<modkit_db::DbHandle>) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    /// Scope the built context to a module; the registry does this per phase.
    pub fn for_module(mut self, name: &str) -> Self {
        self.inner.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    pub(crate) fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn db(&self) -> Option<Arc<modkit_db::DbHandle>> {
        self.db.clone()
    }

    /// Like [`ModuleCtx::db`] but fails when the runtime was started without a database.
    pub fn db_required(&self) -> anyhow::Result<Arc<modkit_db::DbHandle>> {
        self.db.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "module '{}' requires a database but none is configured",
                self.current_module().unwrap_or("<unscoped>")
            )
        })
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Lenient: deserialize the module's section into `T`, falling back to
    /// `T::default()` when the section is missing or does not parse.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let (Some(name), Some(p)) = (&self.module_name, &self.config_provider) else {
            return T::default();
        };
        let Some(raw) = p.get_module_config(name) else {
            return T::default();
        };
        match serde_json::from_value::<T>(raw.clone()) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "invalid module config, using defaults");
                T::default()
            }
        }
    }

    /// Strict: deserialize the module's section into `T` or report why not.
    pub fn module_config_required<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let name = self
            .module_name
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("context is not scoped to a module"))?;
        let prov = self
            .config_provider
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no ConfigProvider"))?;
        let val = prov
            .get_module_config(name)
            .ok_or_else(|| anyhow::anyhow!("missing module config: {name}"))?;
        serde_json::from_value(val.clone()).map_err(|e| anyhow::anyhow!("invalid {name} config: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct SampleCfg {
        enabled: bool,
        limit: u32,
    }

    fn ctx_with(name: &str, value: serde_json::Value) -> ModuleCtx {
        let mut m = HashMap::new();
        m.insert(name.to_string(), value);
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(MapProvider(m)))
            .for_module(name)
            .build()
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with("sample", serde_json::json!({"enabled": true, "limit": 5}));
        let cfg: SampleCfg = ctx.module_config();
        assert_eq!(cfg, SampleCfg { enabled: true, limit: 5 });
    }

    #[test]
    fn module_config_falls_back_to_default() {
        let ctx = ctx_with("sample", serde_json::json!({"limit": "not-a-number"}));
        let cfg: SampleCfg = ctx.module_config();
        assert_eq!(cfg, SampleCfg::default());

        let unscoped = ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert_eq!(unscoped.module_config::<SampleCfg>(), SampleCfg::default());
    }

    #[test]
    fn module_config_required_reports_missing_section() {
        let ctx = ctx_with("other", serde_json::json!({}));
        let scoped = ctx.for_module("sample");
        let err = scoped.module_config_required::<SampleCfg>().unwrap_err();
        assert!(err.to_string().contains("missing module config: sample"));
    }

    #[test]
    fn db_required_errors_without_database() {
        let ctx = ModuleCtxBuilder::new(CancellationToken::new())
            .for_module("health_profile")
            .build();
        assert!(ctx.db().is_none());
        let err = ctx.db_required().unwrap_err();
        assert!(err.to_string().contains("health_profile"));
    }
}
