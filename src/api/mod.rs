use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod attributes;
pub mod auth;
mod error;
mod health;
mod observability;
mod recipes;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::image::MEDIA_URL;
use metrics_exporter_prometheus::PrometheusHandle;

/// Room for multipart framing around the largest accepted image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (media_path, cors_origins, max_image_bytes) = {
        let config = state.config().read().await;
        (
            config.general.media_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.uploads.max_image_bytes,
        )
    };

    let protected_routes = create_protected_router(state.clone(), max_image_bytes);

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/user/create", post(auth::create_user))
        .route("/user/token", post(auth::create_token))
        .route("/health", get(health::health))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service(MEDIA_URL, tower_http::services::ServeDir::new(media_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>, max_image_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/user/me",
            get(auth::get_me).patch(auth::patch_me).put(auth::put_me),
        )
        .route(
            "/recipe/tags",
            get(attributes::list_tags).post(attributes::create_tag),
        )
        .route(
            "/recipe/ingredients",
            get(attributes::list_ingredients).post(attributes::create_ingredient),
        )
        .route(
            "/recipe/ingredient-create",
            post(attributes::ingredient_create_message),
        )
        .route(
            "/recipe/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipe/recipes/{id}",
            get(recipes::get_recipe)
                .patch(recipes::patch_recipe)
                .put(recipes::put_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipe/recipes/{id}/upload-image",
            post(recipes::upload_image)
                .layer(DefaultBodyLimit::max(max_image_bytes + MULTIPART_OVERHEAD)),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
