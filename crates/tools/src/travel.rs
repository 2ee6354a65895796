//! Travel distance tool: great-circle distance between known cities.
//!
//! Uses a small built-in gazetteer instead of a geocoding service.

use async_trait::async_trait;
use errand_core::error::ToolError;
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc};

/// Mean Earth radius in km, as used by the haversine formula below.
const EARTH_RADIUS_KM: f64 = 6373.0;

const CITIES: &[(&str, f64, f64)] = &[
    ("amsterdam", 52.3676, 4.9041),
    ("berlin", 52.5200, 13.4050),
    ("edinburgh", 55.9533, -3.1883),
    ("london", 51.5074, -0.1278),
    ("lyon", 45.7640, 4.8357),
    ("madrid", 40.4168, -3.7038),
    ("manchester", 53.4808, -2.2426),
    ("new york", 40.7128, -74.0060),
    ("paris", 48.8566, 2.3522),
    ("rome", 41.9028, 12.4964),
    ("san francisco", 37.7749, -122.4194),
    ("sydney", -33.8688, 151.2093),
    ("tokyo", 35.6762, 139.6503),
];

/// Average door-to-door speed per travel mode, km/h.
fn speed_kmh(mode: &str) -> Option<f64> {
    match mode {
        "walking" => Some(5.0),
        "cycling" => Some(16.0),
        "driving" => Some(70.0),
        "transit" => Some(55.0),
        _ => None,
    }
}

fn lookup(city: &str) -> Option<(f64, f64)> {
    let key = city.split(',').next().unwrap_or(city).trim().to_lowercase();
    CITIES
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|&(_, lat, lon)| (lat, lon))
}

/// Haversine distance in km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub struct TravelDistanceTool;

#[async_trait]
impl Tool for TravelDistanceTool {
    fn name(&self) -> &str {
        "get_travel_distance"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new("Useful for finding the distance and rough travel time between two cities")
            .param("origin", "the city to travel from, e.g. \"London\"")
            .param("destination", "the city to travel to, e.g. \"Paris\"")
            .param("mode", "one of walking, cycling, driving or transit. Defaults to driving.")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("origin", ParamType::String),
            ParamDecl::required("destination", ParamType::String),
            ParamDecl::optional("mode", ParamType::String),
        ]
    }

    async fn call(&self, args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let origin = args.str("origin")?;
        let destination = args.str("destination")?;
        let mode = args.opt_str("mode").unwrap_or("driving").to_lowercase();

        let Some(speed) = speed_kmh(&mode) else {
            return Ok(serde_json::json!({ "error": format!("Unknown travel mode '{mode}'") }));
        };

        let (Some((lat1, lon1)), Some((lat2, lon2))) = (lookup(origin), lookup(destination)) else {
            let unknown = if lookup(origin).is_none() { origin } else { destination };
            return Ok(serde_json::json!({ "error": format!("Unknown city '{unknown}'") }));
        };

        let km = (haversine_km(lat1, lon1, lat2, lon2) * 100.0).round() / 100.0;
        let hours = (km / speed * 10.0).round() / 10.0;

        Ok(serde_json::json!({
            "origin": origin,
            "destination": destination,
            "mode": mode,
            "distance": format!("{km}km"),
            "estimated_hours": hours,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errand_core::session::NullSession;
    use errand_core::tool::ToolRegistry;
    use std::sync::Arc;

    async fn invoke(args: serde_json::Value) -> serde_json::Value {
        let registry =
            ToolRegistry::from_tools([Arc::new(TravelDistanceTool) as Arc<dyn Tool>]).unwrap();
        let out = registry
            .invoke(
                "get_travel_distance",
                args.as_object().cloned().unwrap(),
                &NullSession,
            )
            .await
            .unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn london_to_paris_is_about_344_km() {
        let (lat1, lon1) = lookup("London").unwrap();
        let (lat2, lon2) = lookup("Paris, France").unwrap();
        let d = haversine_km(lat1, lon1, lat2, lon2);
        assert!((d - 344.0).abs() < 5.0, "{d}");
    }

    #[tokio::test]
    async fn default_mode_is_driving() {
        let value = invoke(serde_json::json!({
            "origin": "London", "destination": "Paris", "reason": "planning a trip"
        }))
        .await;
        assert_eq!(value["mode"], "driving");
        assert!(value["distance"].as_str().unwrap().ends_with("km"));
    }

    #[tokio::test]
    async fn unknown_city_is_an_error_payload() {
        let value = invoke(serde_json::json!({
            "origin": "Atlantis", "destination": "Paris", "reason": "planning a trip"
        }))
        .await;
        assert_eq!(value["error"], "Unknown city 'Atlantis'");
    }

    #[tokio::test]
    async fn unknown_mode_is_an_error_payload() {
        let value = invoke(serde_json::json!({
            "origin": "London", "destination": "Paris", "mode": "teleport", "reason": "x"
        }))
        .await;
        assert!(value["error"].as_str().unwrap().contains("teleport"));
    }
}
