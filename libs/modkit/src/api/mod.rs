pub mod auth;
pub mod extract;
pub mod problem;

/// Sink for per-module OpenAPI documents. The REST host merges everything it
/// receives into the document served at `/openapi.json`.
pub trait OpenApiRegistry: Send + Sync {
    fn register_document(&self, doc: utoipa::openapi::OpenApi);
    fn as_any(&self) -> &dyn std::any::Any;
}
