//! Weather forecast tool: deterministic mock data.
//!
//! Returns a plausible two-hourly forecast derived from a hash of the
//! location and day, so the dispatch loop and planner can be exercised
//! end-to-end without network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use errand_core::error::ToolError;
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc};
use serde::Serialize;

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new("Useful for getting the weather at a location on a particular day")
            .param("location", "the location to get the weather for")
            .param("day", "the day to get the weather for. 'yyyy-mm-dd' format.")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("location", ParamType::String),
            ParamDecl::required("day", ParamType::String),
        ]
    }

    async fn call(&self, args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let location = args.str("location")?;
        let day = args.str("day")?;

        let Ok(date) = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d") else {
            return Ok(serde_json::json!({
                "error": format!("'{day}' is not a date in yyyy-mm-dd format")
            }));
        };

        serde_json::to_value(mock_forecast(location, date)).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct Forecast {
    location: String,
    day: String,
    time: Vec<String>,
    temp_c: Vec<f64>,
    condition: Vec<&'static str>,
    wind_kph: Vec<f64>,
    wind_dir: Vec<&'static str>,
    chance_of_rain: Vec<u32>,
}

const CONDITIONS: [&str; 8] = [
    "Clear",
    "Partly cloudy",
    "Overcast",
    "Light rain",
    "Heavy rain",
    "Thunderstorms",
    "Snow",
    "Fog",
];

const WIND_DIRS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn hash(text: &str) -> u32 {
    text.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

fn mock_forecast(location: &str, date: NaiveDate) -> Forecast {
    let seed = hash(&location.to_lowercase()) ^ hash(&date.to_string());
    let base_temp = ((seed % 30) as f64) - 2.0;

    let mut forecast = Forecast {
        location: location.to_string(),
        day: date.format("%Y-%m-%d").to_string(),
        time: Vec::new(),
        temp_c: Vec::new(),
        condition: Vec::new(),
        wind_kph: Vec::new(),
        wind_dir: Vec::new(),
        chance_of_rain: Vec::new(),
    };

    for hour in (0..24u32).step_by(2) {
        let step = seed.wrapping_add(hour.wrapping_mul(2_654_435_761));
        // Coolest before dawn, warmest mid-afternoon
        let diurnal = 6.0 * (((hour as f64) - 9.0) * std::f64::consts::PI / 12.0).sin();
        let condition = CONDITIONS[((seed / 7) as usize + (hour as usize / 8)) % CONDITIONS.len()];

        forecast.time.push(format!("{hour:02}:00"));
        forecast.temp_c.push(((base_temp + diurnal) * 10.0).round() / 10.0);
        forecast.condition.push(condition);
        forecast.wind_kph.push(((step % 300) as f64) / 10.0 + 3.0);
        forecast.wind_dir.push(WIND_DIRS[(seed as usize / 3) % WIND_DIRS.len()]);
        forecast.chance_of_rain.push(match condition {
            "Light rain" | "Heavy rain" | "Thunderstorms" => 60 + step % 40,
            _ => step % 30,
        });
    }

    forecast
}
