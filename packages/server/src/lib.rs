pub mod config;
pub mod database;
pub mod engagement;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hub;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pulse Event Engagement API",
        version = "1.0.0",
        description = "Live event engagement: sessions, polls, Q&A, resources and real-time dashboards. Real-time updates are pushed over the `/ws` websocket."
    ),
    tags(
        (name = "Users", description = "User accounts"),
        (name = "Events", description = "Events and the single active event"),
        (name = "Participants", description = "Event registrations"),
        (name = "Sessions", description = "Sessions and check-ins"),
        (name = "Polls", description = "Live polls"),
        (name = "Questions", description = "Audience Q&A"),
        (name = "Resources", description = "Session resources and downloads"),
        (name = "Engagement", description = "Derived statistics, poll tallies and leaderboards"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .route("/ws", get(handlers::realtime::ws_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `"*"` allows any origin. An empty list sends no CORS headers at all.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}
