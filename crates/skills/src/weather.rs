//! Weather skill backed by the Open-Meteo geocoding and forecast APIs.
//!
//! No API key is needed. The last requested location is remembered so a
//! bare "what's the weather" follows up on the previous city.

use std::time::Duration;

use async_trait::async_trait;
use jarvis_core::context::ConversationContext;
use jarvis_core::error::SkillError;
use jarvis_core::intent::Intent;
use jarvis_core::provider::ToolDefinition;
use jarvis_core::skill::Skill;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const WEATHER_INTENT: &str = "weather.get";
const DEFAULT_LOCATION: &str = "New York";
const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WeatherSkill {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
    last_location: Mutex<Option<String>>,
}

impl WeatherSkill {
    pub fn new() -> Result<Self, SkillError> {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL)
    }

    /// Point the skill at different geocoding / forecast endpoints.
    pub fn with_endpoints(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Result<Self, SkillError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SkillError::InitFailed {
                skill: "weather".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
            last_location: Mutex::new(None),
        })
    }

    pub async fn last_location(&self) -> Option<String> {
        self.last_location.lock().await.clone()
    }

    async fn geocode(&self, location: &str) -> Result<GeoResult, String> {
        let response: GeoResponse = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        response
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| "I couldn't determine that location.".to_string())
    }

    async fn fetch_report(&self, location: &str) -> Result<String, String> {
        let place = self.geocode(location).await?;
        debug!(location, lat = place.latitude, lon = place.longitude, "Location resolved");

        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let response: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        let current = response
            .current_weather
            .ok_or_else(|| "the forecast did not include current conditions".to_string())?;
        Ok(format_report(location, &current))
    }
}

fn format_report(location: &str, current: &CurrentWeather) -> String {
    format!(
        "Weather for {}: {}°C, wind {} km/h. {}.",
        title_case(location),
        current.temperature,
        current.windspeed,
        describe_weather_code(current.weathercode)
    )
}

/// Capitalise the first letter of every word, lowercase the rest.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text for a WMO weather interpretation code.
fn describe_weather_code(code: u32) -> String {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow fall",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        other => return format!("Weather code {other}"),
    };
    text.to_string()
}

#[async_trait]
impl Skill for WeatherSkill {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Provide quick weather reports using Open-Meteo."
    }

    fn can_handle(&self, intent: &Intent, _text: &str) -> bool {
        intent.is(WEATHER_INTENT)
    }

    async fn handle(&self, intent: &Intent, _text: &str, _context: &ConversationContext) -> String {
        let location = {
            let mut last = self.last_location.lock().await;
            let location = intent
                .entity("location")
                .map(|l| l.trim().trim_end_matches(['?', '!', '.']).trim())
                .filter(|l| !l.is_empty())
                .map(String::from)
                .or_else(|| last.clone())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
            *last = Some(location.clone());
            location
        };

        match self.fetch_report(&location).await {
            Ok(report) => report,
            Err(reason) => {
                warn!(location = %location, error = %reason, "Weather lookup failed");
                format!("I couldn't retrieve the weather right now: {reason}")
            }
        }
    }

    fn tool_spec(&self) -> Option<ToolDefinition> {
        Some(ToolDefinition {
            name: "weather".into(),
            description: self.description().into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city name to report the weather for"
                    }
                }
            }),
        })
    }
}

// --- Open-Meteo wire types ---

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    #[serde(default)]
    weathercode: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nothing listens on the discard port, so requests fail fast.
    fn offline_skill() -> WeatherSkill {
        WeatherSkill::with_endpoints("http://127.0.0.1:9/search", "http://127.0.0.1:9/forecast")
            .unwrap()
    }

    fn ctx() -> ConversationContext {
        ConversationContext::new("persona", 4)
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("  lONDON  "), "London");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn weather_codes() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(81), "Rain showers");
        assert_eq!(describe_weather_code(42), "Weather code 42");
    }

    #[test]
    fn report_format() {
        let current: CurrentWeather = serde_json::from_value(serde_json::json!({
            "temperature": 21.5,
            "windspeed": 9.4,
            "weathercode": 2
        }))
        .unwrap();
        assert_eq!(
            format_report("paris", &current),
            "Weather for Paris: 21.5°C, wind 9.4 km/h. Partly cloudy."
        );
    }

    #[test]
    fn geocoding_without_results() {
        let parsed: GeoResponse = serde_json::from_str(r#"{"generationtime_ms": 0.3}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[tokio::test]
    async fn network_failure_becomes_reply() {
        let skill = offline_skill();
        let intent = Intent::new(WEATHER_INTENT, 0.8).with_entity("location", "Malibu");
        let reply = skill.handle(&intent, "weather in malibu", &ctx()).await;
        assert!(reply.starts_with("I couldn't retrieve the weather right now:"));
    }

    #[tokio::test]
    async fn location_defaults_and_is_remembered() {
        let skill = offline_skill();
        let bare = Intent::new(WEATHER_INTENT, 0.8);

        skill.handle(&bare, "weather", &ctx()).await;
        assert_eq!(skill.last_location().await.as_deref(), Some("New York"));

        let malibu = Intent::new(WEATHER_INTENT, 0.8).with_entity("location", "Malibu?");
        skill.handle(&malibu, "weather in malibu?", &ctx()).await;
        skill.handle(&bare, "forecast", &ctx()).await;
        assert_eq!(skill.last_location().await.as_deref(), Some("Malibu"));
    }
}
