//! End-to-end runs of the phase runner with in-process test modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use modkit::{
    context::{ConfigProvider, ModuleCtx},
    contracts::{Module, OpenApiRegistry, RestHostModule, RestfulModule, StatefulModule},
    registry::{ModuleDescriptor, RegistryBuilder},
    runtime::{run, DbOptions, RunOptions, ShutdownOptions},
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

type Calls = Arc<Mutex<Vec<String>>>;

struct Provider(HashMap<String, serde_json::Value>);

impl ConfigProvider for Provider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrackerCfg {
    label: String,
}

struct Tracker {
    name: &'static str,
    calls: Calls,
    fail_start: bool,
}

impl Tracker {
    fn log(&self, what: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{what}", self.name));
    }
}

#[async_trait::async_trait]
impl Module for Tracker {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: TrackerCfg = ctx.module_config();
        self.log(&format!("init({})", cfg.label));
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait::async_trait]
impl StatefulModule for Tracker {
    async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.log("start");
        if self.fail_start {
            anyhow::bail!("boom");
        }
        Ok(())
    }
    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.log("stop");
        Ok(())
    }
}

struct Docs(Mutex<usize>);

impl OpenApiRegistry for Docs {
    fn register_document(&self, _doc: utoipa::openapi::OpenApi) {
        *self.0.lock().unwrap() += 1;
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct Host {
    docs: Docs,
    calls: Calls,
}

impl RestHostModule for Host {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        self.calls.lock().unwrap().push("host:prepare".into());
        Ok(router)
    }
    fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let n = *self.docs.0.lock().unwrap();
        self.calls
            .lock()
            .unwrap()
            .push(format!("host:finalize({n} docs)"));
        Ok(router)
    }
    fn as_registry(&self) -> &dyn OpenApiRegistry {
        &self.docs
    }
}

struct Routes;

impl RestfulModule for Routes {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router> {
        openapi.register_document(utoipa::openapi::OpenApi::default());
        Ok(router)
    }
}

fn provider() -> Arc<dyn ConfigProvider> {
    let mut m = HashMap::new();
    m.insert("svc".to_string(), serde_json::json!({"label": "configured"}));
    Arc::new(Provider(m))
}

#[tokio::test]
async fn phases_run_in_order_and_stop_on_cancel() {
    let calls: Calls = Arc::default();
    let host = Arc::new(Host {
        docs: Docs(Mutex::new(0)),
        calls: calls.clone(),
    });
    let svc = Arc::new(Tracker {
        name: "svc",
        calls: calls.clone(),
        fail_start: false,
    });
    let host_core = Arc::new(Tracker {
        name: "host",
        calls: calls.clone(),
        fail_start: false,
    });

    let mut b = RegistryBuilder::default();
    b.add(ModuleDescriptor::new("svc", &["host"], svc.clone()).with_rest(Arc::new(Routes)).with_stateful(svc));
    b.add(ModuleDescriptor::new("host", &[], host_core).with_rest_host(host));
    let registry = b.build_topo_sorted().unwrap();

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stopper.cancel();
    });

    tokio::time::timeout(
        Duration::from_secs(5),
        run(RunOptions {
            registry,
            modules_cfg: provider(),
            db: DbOptions::None,
            shutdown: ShutdownOptions::Token(cancel),
        }),
    )
    .await
    .expect("runner should finish after cancel")
    .unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "host:init()",
            "svc:init(configured)",
            "host:prepare",
            "host:finalize(1 docs)",
            "svc:start",
            "svc:stop",
        ]
    );
}

#[tokio::test]
async fn failed_start_stops_started_modules_and_errors() {
    let calls: Calls = Arc::default();
    let ok = Arc::new(Tracker {
        name: "ok",
        calls: calls.clone(),
        fail_start: false,
    });
    let bad = Arc::new(Tracker {
        name: "bad",
        calls: calls.clone(),
        fail_start: true,
    });

    let mut b = RegistryBuilder::default();
    b.add(ModuleDescriptor::new("ok", &[], ok.clone()).with_stateful(ok));
    b.add(ModuleDescriptor::new("bad", &["ok"], bad.clone()).with_stateful(bad));
    let registry = b.build_topo_sorted().unwrap();

    let err = run(RunOptions {
        registry,
        modules_cfg: provider(),
        db: DbOptions::None,
        shutdown: ShutdownOptions::Future(Box::pin(std::future::pending())),
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("start failed for 'bad'"));

    let calls = calls.lock().unwrap().clone();
    assert!(calls.contains(&"ok:stop".to_string()));
}
