//! REST host: owns the HTTP server, the middleware stack and the merged
//! OpenAPI document.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{http::header, middleware::from_fn, response::IntoResponse, routing::get, Router};
use modkit::api::OpenApiRegistry;
use modkit::registry::{ModuleDescriptor, RegistryBuilder};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use web::WELCOME_MESSAGE;

pub const MODULE_NAME: &str = "api_ingress";

const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Adds the ingress to a registry; every REST module depends on it.
pub fn register(b: &mut RegistryBuilder) {
    let m = Arc::new(ApiIngress::default());
    b.add(
        ModuleDescriptor::new(MODULE_NAME, &[], m.clone())
            .with_rest_host(m.clone())
            .with_stateful(m),
    );
}

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    openapi: Mutex<utoipa::openapi::OpenApi>,
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            openapi: Mutex::new(openapi::base_document()),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Address the server is listening on, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Snapshot of the merged OpenAPI document.
    pub fn openapi_document(&self) -> utoipa::openapi::OpenApi {
        self.openapi.lock().clone()
    }

    /// Global middleware, outermost first: set request id → propagate it →
    /// trace span → request id into extensions → timeout → CORS → body limit.
    pub fn apply_middleware(&self, mut router: Router) -> Router {
        let cfg = self.get_config();
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::very_permissive());
        }
        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            cfg.request_timeout_secs,
        )));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    fn openapi_route(&self) -> Result<axum::routing::MethodRouter> {
        let doc = Arc::new(serde_json::to_value(&*self.openapi.lock())?);
        Ok(get(move || {
            let doc = doc.clone();
            async move {
                (
                    [(header::CACHE_CONTROL, "no-store")],
                    axum::Json((*doc).clone()),
                )
                    .into_response()
            }
        }))
    }
}

async fn not_found_fallback(uri: axum::http::Uri) -> modkit::ProblemResponse {
    let mut p = modkit::not_found("Not Found");
    p.0.instance = uri.path().to_owned();
    p
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(bind_addr = %cfg.bind_addr, cors = cfg.cors_enabled, "api_ingress configured");
        if cfg.cors_enabled {
            tracing::warn!("CORS mirrors any origin with credentials; restrict before exposing publicly");
        }
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl modkit::contracts::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &modkit::ModuleCtx, router: Router) -> Result<Router> {
        Ok(router
            .route("/", get(web::root))
            .route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &modkit::ModuleCtx, mut router: Router) -> Result<Router> {
        let cfg = self.get_config();

        router = router.route("/openapi.json", self.openapi_route()?);
        if cfg.enable_docs {
            router = router.route("/docs", get(web::serve_docs));
        }
        router = router.fallback(not_found_fallback);
        let router = self.apply_middleware(router);

        *self.final_router.lock() = Some(router.clone());
        tracing::debug!(
            paths = self.openapi.lock().paths.paths.len(),
            "REST host finalized router"
        );
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_document(&self, doc: utoipa::openapi::OpenApi) {
        let mut merged = self.openapi.lock();
        for path in doc.paths.paths.keys() {
            if merged.paths.paths.contains_key(path) {
                tracing::warn!(%path, "OpenAPI path registered twice; operations are merged");
            }
        }
        merged.merge(doc);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl modkit::contracts::StatefulModule for ApiIngress {
    /// Binds before returning so address errors fail the start phase.
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving base routes only");
                let base = Router::new()
                    .route("/", get(web::root))
                    .route("/health", get(web::health_check))
                    .fallback(not_found_fallback);
                self.apply_middleware(base)
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        *self.local_addr.lock() = Some(local);
        tracing::info!("HTTP server bound on {}", local);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    tracing::info!("HTTP server shutting down gracefully (cancellation)");
                })
                .await
                .map_err(|e| anyhow::anyhow!(e))
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> Result<()> {
        cancel.cancel();
        let handle = { self.server.lock().take() };
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(res)) => res,
            Ok(Err(join)) => Err(anyhow::anyhow!("HTTP server task failed: {join}")),
            Err(_) => {
                tracing::warn!("HTTP server did not stop within {:?}", STOP_TIMEOUT);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use modkit::contracts::{RestHostModule, StatefulModule};
    use modkit::ModuleCtxBuilder;
    use tower::ServiceExt;

    fn ctx() -> modkit::ModuleCtx {
        ModuleCtxBuilder::new(CancellationToken::new())
            .for_module(MODULE_NAME)
            .build()
    }

    fn finalized(ingress: &ApiIngress) -> Router {
        let r = ingress.rest_prepare(&ctx(), Router::new()).unwrap();
        ingress.rest_finalize(&ctx(), r).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_returns_welcome_message() {
        let app = finalized(&ApiIngress::default());
        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({"message": WELCOME_MESSAGE}));
    }

    #[tokio::test]
    async fn unknown_route_is_problem_404() {
        let app = finalized(&ApiIngress::default());
        let resp = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            modkit::api::problem::APPLICATION_PROBLEM_JSON
        );
        assert_eq!(body_json(resp).await["instance"], "/nope");
    }

    #[tokio::test]
    async fn docs_route_follows_config() {
        let off = finalized(&ApiIngress::default());
        let resp = off
            .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let on = finalized(&ApiIngress::new(ApiIngressConfig {
            enable_docs: true,
            ..Default::default()
        }));
        let resp = on
            .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn registered_documents_are_served() {
        let ingress = ApiIngress::default();
        let extra = utoipa::openapi::OpenApiBuilder::new()
            .paths(
                utoipa::openapi::path::PathsBuilder::new().path(
                    "/api/extra",
                    utoipa::openapi::path::PathItem::new(
                        utoipa::openapi::path::HttpMethod::Get,
                        utoipa::openapi::path::OperationBuilder::new().build(),
                    ),
                ),
            )
            .build();
        ingress.register_document(extra);

        let app = finalized(&ingress);
        let resp = app
            .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["info"]["title"], "CareLens API");
        assert!(json["paths"]["/"].is_object());
        assert!(json["paths"]["/health"].is_object());
        assert!(json["paths"]["/api/extra"].is_object());
    }

    #[tokio::test]
    async fn cors_mirrors_origin_with_credentials() {
        let app = finalized(&ApiIngress::default());
        let resp = app
            .oneshot(
                Request::get("/health")
                    .header("origin", "https://app.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let h = resp.headers();
        assert_eq!(
            h.get("access-control-allow-origin").unwrap(),
            "https://app.example.org"
        );
        assert_eq!(h.get("access-control-allow-credentials").unwrap(), "true");

        let closed = finalized(&ApiIngress::new(ApiIngressConfig {
            cors_enabled: false,
            ..Default::default()
        }));
        let resp = closed
            .oneshot(
                Request::get("/health")
                    .header("origin", "https://app.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            body_limit_bytes: 8,
            ..Default::default()
        });
        let r = Router::new().route(
            "/echo",
            axum::routing::post(|body: String| async move { body }),
        );
        let app = ingress.apply_middleware(r);
        let resp = app
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "25")
                    .body(Body::from("way more than eight bytes"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn start_binds_and_stop_releases() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: "127.0.0.1:0".into(),
            ..Default::default()
        });
        let _ = finalized(&ingress);

        let cancel = CancellationToken::new();
        ingress.start(cancel.clone()).await.unwrap();
        let addr = ingress.local_addr().expect("bound address");
        tokio::net::TcpStream::connect(addr).await.unwrap();

        ingress.stop(cancel).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_bind_addr_fails_start() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: "not-an-addr".into(),
            ..Default::default()
        });
        let err = ingress.start(CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid bind address"));
    }
}
