use axum::Router;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{
    DbModule, Module, OpenApiRegistry, RestHostModule, RestfulModule, StatefulModule,
};

/// Everything a module brings to the runtime. Built by each module crate's
/// `register` function and handed to [`RegistryBuilder::add`].
pub struct ModuleDescriptor {
    name: &'static str,
    deps: &'static [&'static str],
    core: Arc<dyn Module>,
    rest: Option<Arc<dyn RestfulModule>>,
    rest_host: Option<Arc<dyn RestHostModule>>,
    db: Option<Arc<dyn DbModule>>,
    stateful: Option<Arc<dyn StatefulModule>>,
}

impl ModuleDescriptor {
    pub fn new(name: &'static str, deps: &'static [&'static str], core: Arc<dyn Module>) -> Self {
        Self {
            name,
            deps,
            core,
            rest: None,
            rest_host: None,
            db: None,
            stateful: None,
        }
    }

    pub fn with_rest(mut self, m: Arc<dyn RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn with_rest_host(mut self, m: Arc<dyn RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn with_db(mut self, m: Arc<dyn DbModule>) -> Self {
        self.db = Some(m);
        self
    }

    pub fn with_stateful(mut self, m: Arc<dyn StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn deps(&self) -> &'static [&'static str] {
        self.deps
    }

    pub fn core(&self) -> &Arc<dyn Module> {
        &self.core
    }
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_db", &self.db.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Collects descriptors; names must be unique.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<ModuleDescriptor>,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn add(&mut self, desc: ModuleDescriptor) {
        if self.entries.iter().any(|e| e.name == desc.name) {
            self.errors
                .push(format!("Module '{}' is already registered", desc.name));
            return;
        }
        self.entries.push(desc);
    }

    /// Validate dependencies and order modules so every dependency precedes
    /// its dependents. Independent modules keep registration order.
    pub fn build_topo_sorted(self) -> Result<ModuleRegistry, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::InvalidRegistryConfiguration {
                errors: self.errors,
            });
        }

        let hosts: Vec<&'static str> = self
            .entries
            .iter()
            .filter(|e| e.rest_host.is_some())
            .map(|e| e.name)
            .collect();
        if hosts.len() > 1 {
            return Err(RegistryError::MultipleRestHosts { hosts });
        }

        let idx: HashMap<&'static str, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name, i))
            .collect();

        // edge dep -> dependent
        let mut adj = vec![Vec::<usize>::new(); self.entries.len()];
        for (u, e) in self.entries.iter().enumerate() {
            for &d in e.deps {
                let v = *idx.get(d).ok_or_else(|| RegistryError::UnknownDependency {
                    module: e.name.to_string(),
                    depends_on: d.to_string(),
                })?;
                adj[v].push(u);
            }
        }

        let names: Vec<&'static str> = self.entries.iter().map(|e| e.name).collect();
        if let Some(path) = find_cycle(&names, &adj) {
            return Err(RegistryError::CycleDetected { path });
        }

        let mut indeg = vec![0usize; names.len()];
        for targets in &adj {
            for &t in targets {
                indeg[t] += 1;
            }
        }
        let mut queue: VecDeque<usize> = (0..names.len()).filter(|&i| indeg[i] == 0).collect();
        let mut order = Vec::with_capacity(names.len());
        while let Some(u) = queue.pop_front() {
            order.push(u);
            for &w in &adj[u] {
                indeg[w] -= 1;
                if indeg[w] == 0 {
                    queue.push_back(w);
                }
            }
        }

        let mut slots: Vec<Option<ModuleDescriptor>> = self.entries.into_iter().map(Some).collect();
        let modules: Vec<ModuleDescriptor> =
            order.into_iter().filter_map(|i| slots[i].take()).collect();

        tracing::info!(
            modules = ?modules.iter().map(|e| e.name).collect::<Vec<_>>(),
            "Module dependency order resolved (topo)"
        );

        Ok(ModuleRegistry { modules })
    }
}

/// Depth-first search for a back edge; returns the closed cycle path.
fn find_cycle(names: &[&'static str], adj: &[Vec<usize>]) -> Option<Vec<&'static str>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    fn visit(
        node: usize,
        adj: &[Vec<usize>],
        marks: &mut [Mark],
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        marks[node] = Mark::OnPath;
        path.push(node);
        for &next in &adj[node] {
            match marks[next] {
                Mark::OnPath => {
                    let start = path.iter().position(|&n| n == next)?;
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(c) = visit(next, adj, marks, path) {
                        return Some(c);
                    }
                }
                Mark::Done => {}
            }
        }
        path.pop();
        marks[node] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; names.len()];
    let mut path = Vec::new();
    for i in 0..names.len() {
        if marks[i] == Mark::Unvisited {
            if let Some(cycle) = visit(i, adj, &mut marks, &mut path) {
                return Some(cycle.into_iter().map(|i| names[i]).collect());
            }
        }
    }
    None
}

/// Topologically sorted modules, driven phase by phase by the runner.
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn get_module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.core.clone())
    }

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(dbm) = &e.db {
                tracing::debug!(module = e.name, "running migrations");
                dbm.migrate(db)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Host prepare → every REST provider in topo order → host finalize.
    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let Some(host_entry) = self.modules.iter().find(|e| e.rest_host.is_some()) else {
            return if self.modules.iter().any(|e| e.rest.is_some()) {
                Err(RegistryError::RestRequiresHost)
            } else {
                Ok(router)
            };
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Err(RegistryError::RestRequiresHost);
        };
        let host_ctx = base_ctx.clone().for_module(host_entry.name);
        let openapi: &dyn OpenApiRegistry = host.as_registry();

        router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_entry.name,
                source,
            })?;

        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest.register_rest(&ctx, router, openapi).map_err(|source| {
                    RegistryError::RestRegister {
                        module: e.name,
                        source,
                    }
                })?;
            }
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_entry.name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Stops in reverse order; failures are logged and do not abort the phase.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("initialization failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("DB migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host module '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host module '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("modules with REST routes found, but no REST host module is registered")]
    RestRequiresHost,
    #[error("multiple REST host modules registered: {}", hosts.join(", "))]
    MultipleRestHosts { hosts: Vec<&'static str> },
    #[error("module '{module}' depends on unknown '{depends_on}'")]
    UnknownDependency { module: String, depends_on: String },
    #[error("cyclic dependency detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },
    #[error("invalid registry configuration:\n{errors:#?}")]
    InvalidRegistryConfiguration { errors: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleCtxBuilder;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct Noop;

    #[async_trait::async_trait]
    impl Module for Noop {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct NullRegistry;
    impl OpenApiRegistry for NullRegistry {
        fn register_document(&self, _doc: utoipa::openapi::OpenApi) {}
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct Host(NullRegistry);
    impl RestHostModule for Host {
        fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            Ok(router.route("/health", axum::routing::get(|| async { "ok" })))
        }
        fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            Ok(router)
        }
        fn as_registry(&self) -> &dyn OpenApiRegistry {
            &self.0
        }
    }

    struct Ping;
    impl RestfulModule for Ping {
        fn register_rest(
            &self,
            _ctx: &ModuleCtx,
            router: Router,
            _openapi: &dyn OpenApiRegistry,
        ) -> anyhow::Result<Router> {
            Ok(router.route("/ping", axum::routing::get(|| async { "pong" })))
        }
    }

    fn core(name: &'static str, deps: &'static [&'static str]) -> ModuleDescriptor {
        ModuleDescriptor::new(name, deps, Arc::new(Noop))
    }

    fn order(reg: &ModuleRegistry) -> Vec<&'static str> {
        reg.modules().iter().map(|m| m.name()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let mut b = RegistryBuilder::default();
        b.add(core("health_profile", &["api_ingress"]));
        b.add(core("care_guidance", &["api_ingress"]));
        b.add(core("api_ingress", &[]));

        let reg = b.build_topo_sorted().unwrap();
        assert_eq!(
            order(&reg),
            vec!["api_ingress", "health_profile", "care_guidance"]
        );
    }

    #[test]
    fn unknown_dependency_is_reported() {
        let mut b = RegistryBuilder::default();
        b.add(core("health_profile", &["missing"]));
        match b.build_topo_sorted().unwrap_err() {
            RegistryError::UnknownDependency { module, depends_on } => {
                assert_eq!(module, "health_profile");
                assert_eq!(depends_on, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cycle_path_names_only_the_cycle() {
        let mut b = RegistryBuilder::default();
        b.add(core("a", &["b"]));
        b.add(core("b", &["c"]));
        b.add(core("c", &["a"]));
        b.add(core("d", &[]));

        let err = b.build_topo_sorted().unwrap_err();
        let RegistryError::CycleDetected { path } = &err else {
            panic!("expected CycleDetected, got {err:?}");
        };
        for n in ["a", "b", "c"] {
            assert!(path.contains(&n));
        }
        assert!(!path.contains(&"d"));
        assert_eq!(path.first(), path.last());
        assert!(err.to_string().contains("->"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut b = RegistryBuilder::default();
        b.add(core("a", &[]));
        b.add(core("a", &[]));
        match b.build_topo_sorted().unwrap_err() {
            RegistryError::InvalidRegistryConfiguration { errors } => {
                assert!(errors.iter().any(|e| e.contains("already registered")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn second_rest_host_is_rejected() {
        let mut b = RegistryBuilder::default();
        b.add(core("h1", &[]).with_rest_host(Arc::new(Host(NullRegistry))));
        b.add(core("h2", &[]).with_rest_host(Arc::new(Host(NullRegistry))));
        assert!(matches!(
            b.build_topo_sorted().unwrap_err(),
            RegistryError::MultipleRestHosts { .. }
        ));
    }

    #[test]
    fn rest_without_host_fails() {
        let mut b = RegistryBuilder::default();
        b.add(core("svc", &[]).with_rest(Arc::new(Ping)));
        let reg = b.build_topo_sorted().unwrap();
        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert!(matches!(
            reg.run_rest_phase(&ctx, Router::new()).unwrap_err(),
            RegistryError::RestRequiresHost
        ));
    }

    #[tokio::test]
    async fn rest_phase_composes_host_and_providers() {
        let mut b = RegistryBuilder::default();
        b.add(core("host", &[]).with_rest_host(Arc::new(Host(NullRegistry))));
        b.add(core("svc", &["host"]).with_rest(Arc::new(Ping)));
        let reg = b.build_topo_sorted().unwrap();

        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        let router = reg.run_rest_phase(&ctx, Router::new()).unwrap();

        for uri in ["/health", "/ping"] {
            let resp = router
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn init_start_stop_run_with_plain_modules() {
        let mut b = RegistryBuilder::default();
        b.add(core("a", &[]));
        b.add(core("b", &["a"]));
        let reg = b.build_topo_sorted().unwrap();

        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        reg.run_init_phase(&ctx).await.unwrap();
        let cancel = CancellationToken::new();
        reg.run_start_phase(cancel.child_token()).await.unwrap();
        reg.run_stop_phase(cancel.child_token()).await;
        assert!(reg.get_module("b").is_some());
        assert!(reg.get_module("zzz").is_none());
    }
}
