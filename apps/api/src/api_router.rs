use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use genoshare_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let asset_routes = Router::new()
        .route("/api/assets", get(handlers::assets::list_assets_handler))
        .route(
            "/api/assets/featured",
            get(handlers::assets::list_featured_assets_handler),
        )
        .route(
            "/api/assets/explore",
            get(handlers::assets::explore_assets_handler),
        )
        .route(
            "/api/assets/{dxid}",
            get(handlers::assets::show_asset_handler)
                .put(handlers::assets::update_asset_handler)
                .delete(handlers::assets::destroy_asset_handler),
        )
        .route(
            "/api/assets/{dxid}/edit",
            get(handlers::assets::edit_asset_handler),
        )
        .route(
            "/api/assets/{dxid}/rename",
            post(handlers::assets::rename_asset_handler),
        )
        .route(
            "/api/assets/{dxid}/download",
            post(handlers::assets::download_asset_handler),
        )
        .route("/api/events", get(handlers::events::list_events_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_request_context,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/platform/config",
            get(handlers::platform::platform_config_handler),
        )
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(asset_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
