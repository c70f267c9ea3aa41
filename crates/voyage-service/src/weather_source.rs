//! HTTP-backed [`WeatherSource`] for live weather sampling.
//!
//! Uses a blocking `reqwest` client since [`WeatherSource::fetch`] is a
//! synchronous trait method; the weather updater already bounds
//! concurrency and staggers dispatch via a semaphore, so each blocking
//! call occupies one of a small, fixed number of tokio worker threads
//! at a time.

use serde::Deserialize;

use voyage_core::grid::Weather;
use voyage_core::weather::{FetchError, WeatherSource};

const DEFAULT_BASE_URL: &str = "https://marine-api.open-meteo.com/v1/marine";

/// Fetches current marine conditions from an Open-Meteo-compatible
/// marine weather endpoint.
pub struct HttpWeatherSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpWeatherSource {
    pub fn new() -> Self {
        Self::with_base_url(
            std::env::var("WEATHER_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        )
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(voyage_core::weather::FETCH_TIMEOUT)
                .build()
                .expect("weather HTTP client builds"),
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    current: CurrentMarine,
}

#[derive(Debug, Deserialize)]
struct CurrentMarine {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    wind_speed_10m: f64,
    #[serde(default)]
    wind_direction_10m: f64,
    #[serde(default)]
    wind_gusts_10m: f64,
    #[serde(default)]
    wave_height: f64,
    #[serde(default)]
    wave_direction: f64,
    #[serde(default)]
    wave_period: f64,
    #[serde(default = "default_visibility")]
    visibility: f64,
    #[serde(default)]
    cloud_cover: f64,
    #[serde(default)]
    precipitation: f64,
}

fn default_visibility() -> f64 {
    10.0
}

impl WeatherSource for HttpWeatherSource {
    fn fetch(&self, lat: f64, lon: f64) -> std::result::Result<Weather, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "current".to_string(),
                    "temperature_2m,wind_speed_10m,wind_direction_10m,wind_gusts_10m,\
                     wave_height,wave_direction,wave_period,visibility,cloud_cover,precipitation"
                        .to_string(),
                ),
            ])
            .send()
            .map_err(|_| FetchError::Unavailable)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(FetchError::Unavailable);
        }

        let body: MarineResponse = response.json().map_err(|_| FetchError::Unavailable)?;
        let current = body.current;

        Ok(Weather {
            temperature: current.temperature_2m,
            wind_speed: current.wind_speed_10m,
            wind_direction: current.wind_direction_10m,
            wind_gusts: current.wind_gusts_10m,
            wave_height: current.wave_height,
            wave_direction: current.wave_direction,
            wave_period: current.wave_period,
            visibility: current.visibility,
            cloud_cover: current.cloud_cover,
            precipitation: current.precipitation,
            timestamp: chrono::Utc::now().timestamp(),
        })
    }
}
