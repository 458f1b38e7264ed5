//! Router assembly and the middleware stack around it.

use axum::body::Body;
use axum::http::{Method, Request};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::Span;
use uuid::Uuid;

use crate::handlers::{self, AppState};
use crate::service::TodoService;
use crate::storage::TodoRepository;

/// Build the todo API around `service`.
///
/// Every request gets an `x-request-id` (kept if the client sent one), is
/// traced in a span carrying that id. Each todo route answers CORS requests
/// from any origin for the methods it serves.
pub fn router<R: TodoRepository>(service: TodoService<R>) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos::<R>)
                .post(handlers::create_todo::<R>)
                .delete(handlers::delete_all_todos::<R>)
                .layer(cors_layer([Method::GET, Method::POST, Method::DELETE])),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo::<R>)
                .put(handlers::update_todo::<R>)
                .patch(handlers::patch_todo::<R>)
                .delete(handlers::delete_todo::<R>)
                .layer(cors_layer([
                    Method::GET,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(AppState::new(service))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Any origin, any headers, no credentials. `methods` are the ones the route
/// serves; the layer also answers the route's `OPTIONS` preflight.
fn cors_layer<const N: usize>(methods: [Method; N]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods)
        .allow_headers(Any)
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

#[derive(Debug, Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
