//! Ocean-routing HTTP microservice.
//!
//! Computes navigable routes between two geographic points over the
//! Indian Ocean, balancing distance, fuel, and safety under current
//! weather conditions.
//!
//! # Endpoints
//!
//! - `POST /route` - Compute a route between two points
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `GRID_STORE_URI` - Path to the grid store database (required)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)

mod weather_source;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use voyage_core::geo::Point;
use voyage_core::{
    build_alerts, compute_fuel_metrics, fuel_efficiency_score, plan_route, safety_score,
    sample_path, weather_index, Cell, FuelModelConfig, Mode, RoutingConfig,
};
use voyage_service_shared::{
    from_core_error, health_live, health_ready, init_logging, init_metrics, metrics_handler,
    record_route_calculated, record_route_distance_km, record_route_failed,
    record_weather_samples, AppState, LoggingConfig, MetricsConfig, MetricsLayer, ProblemDetails,
    RouteRequestDto, ServiceResponse, Validate,
};
use weather_source::HttpWeatherSource;

/// A single resolved point on the returned path, with weather attached
/// where it was sampled.
#[derive(Debug, Serialize)]
struct PathPointDto {
    lat: f64,
    lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather: Option<voyage_core::grid::Weather>,
}

#[derive(Debug, Serialize)]
struct FuelConsumptionDto {
    total_tons: f64,
    main_engine_tons: f64,
    auxiliary_tons: f64,
    total_cost_usd: f64,
    breakdown: voyage_core::FuelBreakdown,
}

#[derive(Debug, Serialize)]
struct DurationDto {
    hours: f64,
    days: f64,
    avg_speed_knots: f64,
    avg_speed_kmh: f64,
}

#[derive(Debug, Serialize)]
struct WeatherStatsDto {
    avg_wind_speed: f64,
    max_wind_speed: f64,
    avg_wave_height: f64,
    max_wave_height: f64,
    avg_temperature: f64,
    avg_visibility: f64,
    data_coverage: f64,
}

#[derive(Debug, Serialize)]
struct AlertsDto {
    critical: usize,
    high: usize,
    moderate: usize,
    total_count: usize,
    #[serde(rename = "hasCritical")]
    has_critical: bool,
    #[serde(rename = "hasHigh")]
    has_high: bool,
}

#[derive(Debug, Serialize)]
struct StyleDto {
    color: &'static str,
    stroke_width: f64,
    dash_array: &'static str,
    opacity: f64,
}

fn style_for_mode(mode: Mode) -> StyleDto {
    match mode {
        Mode::Fuel => StyleDto {
            color: "#2e7d32",
            stroke_width: 3.0,
            dash_array: "none",
            opacity: 0.9,
        },
        Mode::Optimal => StyleDto {
            color: "#1565c0",
            stroke_width: 3.0,
            dash_array: "none",
            opacity: 0.9,
        },
        Mode::Safe => StyleDto {
            color: "#ef6c00",
            stroke_width: 3.5,
            dash_array: "6,3",
            opacity: 0.9,
        },
        Mode::Ulcv => StyleDto {
            color: "#6a1b9a",
            stroke_width: 4.0,
            dash_array: "2,2",
            opacity: 0.9,
        },
    }
}

#[derive(Debug, Serialize)]
struct ThresholdsDto {
    wind_knots: [f64; 3],
    wave_metres: [f64; 3],
    visibility_km: [f64; 2],
}

impl Default for ThresholdsDto {
    fn default() -> Self {
        Self {
            wind_knots: [15.0, 25.0, 35.0],
            wave_metres: [2.5, 4.0, 6.0],
            visibility_km: [5.0, 2.0],
        }
    }
}

/// Successful route response, matching the published external contract.
#[derive(Debug, Serialize)]
struct RouteResponse {
    success: bool,
    mode: Mode,
    path: Vec<PathPointDto>,
    total_distance_km: f64,
    total_time_hours: f64,
    fuel_consumption: FuelConsumptionDto,
    duration: DurationDto,
    safety_percentage: f64,
    fuel_efficiency_percentage: f64,
    weather_stats: WeatherStatsDto,
    alerts: AlertsDto,
    style: StyleDto,
    thresholds: ThresholdsDto,
    calculated_at: String,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RouteHttpResponse {
    Success(ServiceResponse<RouteResponse>),
    Error(ProblemDetails),
}

impl IntoResponse for RouteHttpResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            RouteHttpResponse::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            RouteHttpResponse::Error(problem) => problem.into_response(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("voyage-service");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let routing_config = RoutingConfig::from_env();
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(
        grid_store_uri = %routing_config.grid_store_uri,
        port = port,
        "starting voyage service"
    );

    let state = AppState::load(&routing_config.grid_store_uri, routing_config).map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;

    info!(ready = state.is_ready(), "application state loaded");

    let app = Router::new()
        .route("/route", post(route_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle POST /route requests.
async fn route_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(request): Json<RouteRequestDto>,
) -> RouteHttpResponse {
    let request_id = voyage_service_shared::extract_or_generate_request_id(&headers).to_string();

    info!(
        request_id = %request_id,
        start_lat = request.start.lat,
        start_lon = request.start.lon,
        end_lat = request.end.lat,
        end_lon = request.end.lon,
        mode = ?request.mode,
        "handling route request"
    );

    if let Err(problem) = request.validate(&request_id) {
        record_route_failed("validation_error", "voyage-service");
        return RouteHttpResponse::Error(*problem);
    }

    let mode: Mode = request.mode.into();
    let start = Point::new(request.start.lat, request.start.lon);
    let end = Point::new(request.end.lat, request.end.lon);

    let hub_key = voyage_core::nearest_hub(start.lat, start.lon)
        .zip(voyage_core::nearest_hub(end.lat, end.lon))
        .map(|(from_hub, to_hub)| voyage_core::HubKey {
            from_hub: from_hub.to_string(),
            to_hub: to_hub.to_string(),
            mode: mode.into(),
        });

    let cached_snapshot = hub_key.as_ref().and_then(|key| {
        let mut cache = state.route_cache().lock().unwrap();
        cache.get(key).or_else(|| {
            cache.get_reversed(&key.from_hub, &key.to_hub, mode)
        })
    });

    let route = if let Some(snapshot) = cached_snapshot {
        voyage_core::Route {
            mode,
            points: snapshot.points,
            distance_km: snapshot.distance_km,
            skipped_segments: 0,
        }
    } else {
        let state_for_blocking = state.clone();
        let plan_result = tokio::task::spawn_blocking(move || {
            let grid = state_for_blocking.grid();
            plan_route(&grid, start, end, mode)
        })
        .await
        .expect("route planning task did not panic");

        match plan_result {
            Ok(route) => {
                if let Some(key) = hub_key {
                    state
                        .route_cache()
                        .lock()
                        .unwrap()
                        .put(key, (&route).into());
                }
                route
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "route planning failed");
                let reason = match &e {
                    voyage_core::Error::OffGrid { .. } => "off_grid",
                    voyage_core::Error::NoPath { .. } | voyage_core::Error::SegmentFailed { .. } => {
                        "no_path"
                    }
                    voyage_core::Error::GridUnavailable { .. } => "grid_unavailable",
                    voyage_core::Error::InvalidRequest { .. } => "validation_error",
                    _ => "internal_error",
                };
                record_route_failed(reason, "voyage-service");
                return RouteHttpResponse::Error(from_core_error(&e, &request_id));
            }
        }
    };

    let config = state.config();
    let weather_source: Arc<dyn voyage_core::WeatherSource> = Arc::new(HttpWeatherSource::new());
    let (samples, weather_error) = if config.enable_route_weather_update {
        sample_path(weather_source, &route.points, config.weather_sample_rate).await
    } else {
        (std::collections::HashMap::new(), None)
    };

    if let Some(err) = &weather_error {
        tracing::warn!(request_id = %request_id, error = %err, "partial weather coverage");
    }
    record_weather_samples(samples.len(), route.points.len().saturating_sub(samples.len()));

    voyage_core::write_through(&state.grid(), &route.points, &samples);

    let avg_weather_index = if samples.is_empty() {
        0.0
    } else {
        samples.values().map(weather_index).sum::<f64>() / samples.len() as f64
    };

    let fuel_metrics = match compute_fuel_metrics(
        &FuelModelConfig::default(),
        route.distance_km,
        mode,
        avg_weather_index,
    ) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "fuel model rejected route metrics");
            record_route_failed("internal_error", "voyage-service");
            return RouteHttpResponse::Error(from_core_error(&e, &request_id));
        }
    };

    let (_, alert_summary) = build_alerts(&route.points, &samples);

    let mut safety_sum = 0.0;
    let mut fuel_eff_sum = 0.0;
    let mut wind_sum = 0.0;
    let mut wind_max: f64 = 0.0;
    let mut wave_sum = 0.0;
    let mut wave_max: f64 = 0.0;
    let mut temp_sum = 0.0;
    let mut visibility_sum = 0.0;
    for weather in samples.values() {
        let cell = Cell {
            lat: 0.0,
            lon: 0.0,
            is_land: false,
            obstacle: false,
            zone: None,
            weather: Some(*weather),
        };
        safety_sum += safety_score(&cell);
        fuel_eff_sum += fuel_efficiency_score(&cell);
        wind_sum += weather.wind_speed;
        wind_max = wind_max.max(weather.wind_speed);
        wave_sum += weather.wave_height;
        wave_max = wave_max.max(weather.wave_height);
        temp_sum += weather.temperature;
        visibility_sum += weather.visibility;
    }
    let sample_count = samples.len().max(1) as f64;
    let safety_percentage = if samples.is_empty() {
        100.0
    } else {
        (safety_sum / sample_count) * 100.0
    };
    let fuel_efficiency_percentage = if samples.is_empty() {
        100.0
    } else {
        (fuel_eff_sum / sample_count) * 100.0
    };

    let path: Vec<PathPointDto> = route
        .points
        .iter()
        .enumerate()
        .map(|(idx, p)| PathPointDto {
            lat: p.lat,
            lon: p.lon,
            weather: samples.get(&idx).copied(),
        })
        .collect();

    let speed_knots = mode.speed_knots();
    let response = RouteResponse {
        success: true,
        mode,
        path,
        total_distance_km: route.distance_km,
        total_time_hours: fuel_metrics.duration_hours,
        fuel_consumption: FuelConsumptionDto {
            total_tons: fuel_metrics.total_tons,
            main_engine_tons: fuel_metrics.main_engine_tons,
            auxiliary_tons: fuel_metrics.auxiliary_tons,
            total_cost_usd: fuel_metrics.total_cost_usd,
            breakdown: fuel_metrics.breakdown,
        },
        duration: DurationDto {
            hours: fuel_metrics.duration_hours,
            days: fuel_metrics.duration_hours / 24.0,
            avg_speed_knots: speed_knots,
            avg_speed_kmh: speed_knots * 1.852,
        },
        safety_percentage,
        fuel_efficiency_percentage,
        weather_stats: WeatherStatsDto {
            avg_wind_speed: if samples.is_empty() { 0.0 } else { wind_sum / sample_count },
            max_wind_speed: wind_max,
            avg_wave_height: if samples.is_empty() { 0.0 } else { wave_sum / sample_count },
            max_wave_height: wave_max,
            avg_temperature: if samples.is_empty() { 0.0 } else { temp_sum / sample_count },
            avg_visibility: if samples.is_empty() { 0.0 } else { visibility_sum / sample_count },
            data_coverage: if route.points.is_empty() {
                0.0
            } else {
                (samples.len() as f64 / route.points.len() as f64) * 100.0
            },
        },
        alerts: AlertsDto {
            critical: alert_summary.critical,
            high: alert_summary.high,
            moderate: alert_summary.moderate,
            total_count: alert_summary.total_count(),
            has_critical: alert_summary.has_critical(),
            has_high: alert_summary.has_high(),
        },
        style: style_for_mode(mode),
        thresholds: ThresholdsDto::default(),
        calculated_at: chrono::Utc::now().to_rfc3339(),
    };

    record_route_calculated(mode_label(mode), "voyage-service");
    record_route_distance_km(response.total_distance_km, mode_label(mode));

    info!(
        request_id = %request_id,
        distance_km = response.total_distance_km,
        skipped_segments = route.skipped_segments,
        "route computed successfully"
    );

    RouteHttpResponse::Success(ServiceResponse::new(response))
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Fuel => "fuel",
        Mode::Optimal => "optimal",
        Mode::Safe => "safe",
        Mode::Ulcv => "ulcv",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use voyage_service_shared::test_utils::test_state;

    #[test]
    fn test_mode_label_matches_serde_rename() {
        assert_eq!(mode_label(Mode::Fuel), "fuel");
        assert_eq!(mode_label(Mode::Optimal), "optimal");
        assert_eq!(mode_label(Mode::Safe), "safe");
    }

    #[test]
    fn test_style_for_mode_varies_by_mode() {
        assert_ne!(style_for_mode(Mode::Fuel).color, style_for_mode(Mode::Safe).color);
    }

    fn app() -> Router {
        Router::new()
            .route("/route", post(route_handler))
            .route("/health/live", get(health_live))
            .route("/health/ready", get(health_ready))
            .layer(MetricsLayer)
            .with_state(test_state())
    }

    #[tokio::test]
    async fn test_route_endpoint_success() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .post("/route")
            .json(&serde_json::json!({
                "start": {"lat": 5.0, "lon": 75.0},
                "end": {"lat": 10.0, "lon": 85.0},
                "mode": "optimal"
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["success"], true);
        assert!(body["data"]["total_distance_km"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_route_endpoint_rejects_invalid_latitude() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .post("/route")
            .json(&serde_json::json!({
                "start": {"lat": 200.0, "lon": 75.0},
                "end": {"lat": 10.0, "lon": 85.0},
                "mode": "fuel"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_route_endpoint_off_grid_point() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .post("/route")
            .json(&serde_json::json!({
                "start": {"lat": 60.0, "lon": 60.0},
                "end": {"lat": 10.0, "lon": 85.0},
                "mode": "safe"
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoints_ready() {
        let server = TestServer::new(app()).unwrap();
        server.get("/health/live").await.assert_status_ok();
        server.get("/health/ready").await.assert_status_ok();
    }
}
