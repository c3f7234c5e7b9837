pub mod controls;
pub mod dashboard;
mod extract;
pub mod health;
pub mod locations;
mod rate_limit;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use rate_limit::OperatorKeyExtractor;

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        controls::get_state,
        controls::list_devices,
        controls::select_device,
        controls::set_chart_range,
        controls::refresh_now,
        controls::toggle_auto_refresh,
        locations::list_locations,
        locations::get_location,
        locations::save_location,
        locations::get_map_view,
    ),
    components(
        schemas(
            controls::StateResponse,
            controls::DevicesResponse,
            controls::SelectDeviceRequest,
            crate::dashboard::DashboardState,
            crate::dashboard::ChartRange,
            crate::dashboard::ChartView,
            crate::dashboard::CurrentReading,
            crate::dashboard::MapView,
            crate::dashboard::MapDefaults,
            crate::dashboard::ApiStatus,
            crate::refresh::SchedulerStatus,
            crate::series::NormalizedSeries,
            crate::series::DeviceSummary,
            crate::series::FleetSummary,
            crate::series::WindowMetrics,
            crate::store::DeviceLocation,
            crate::store::LocationInput,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Dashboard state, device selection and refresh controls"),
        (name = "locations", description = "Pinned device locations and map markers"),
    ),
    info(
        title = "SMAAWA Monitor API",
        description = "Water-level monitoring dashboard for SMAAWA sensing devices",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // Routes that trigger upstream fetches
    let upstream_routes = Router::new()
        .route("/selection", put(controls::select_device))
        .route("/chart/range", put(controls::set_chart_range))
        .route("/refresh", post(controls::refresh_now))
        .route("/locations/{device_id}/map", get(locations::get_map_view));

    let local_routes = Router::new()
        .route("/state", get(controls::get_state))
        .route("/devices", get(controls::list_devices))
        .route("/auto-refresh", post(controls::toggle_auto_refresh))
        .route("/locations", get(locations::list_locations))
        .route(
            "/locations/{device_id}",
            get(locations::get_location).put(locations::save_location),
        );

    let limiter = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        None
    } else {
        let limiter = GovernorConfigBuilder::default()
            .key_extractor(OperatorKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish();
        match &limiter {
            Some(_) => tracing::info!(
                per_second = config.rate_limit_per_second,
                burst = config.rate_limit_burst,
                "Rate limiting configured"
            ),
            None => tracing::warn!(
                per_second = config.rate_limit_per_second,
                burst = config.rate_limit_burst,
                "Invalid rate limit settings, rate limiting disabled"
            ),
        }
        limiter
    };

    let upstream_routes = match limiter {
        Some(limiter) => upstream_routes.layer(GovernorLayer {
            config: Arc::new(limiter),
        }),
        None => upstream_routes,
    };

    let api_routes = Router::new()
        .merge(upstream_routes)
        .merge(local_routes)
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let page_routes = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/healthz", get(health::healthz));

    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
