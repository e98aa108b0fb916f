//! Typed views over the three enrichment API responses.
//!
//! Each upstream service has its own envelope; the `From` conversions
//! translate those shapes into the flat field names the pipeline merges
//! into records. Every field the upstream may omit is an `Option`.

use serde::{Deserialize, Serialize};

/// Flattened user profile attributes keyed by join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub is_premium: bool,
    pub join_date: Option<String>,
    pub location: Option<String>,
}

/// Geolocation attributes for an IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub country: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: Option<String>,
    pub region: Option<String>,
    pub isp: Option<String>,
}

/// Weather attributes for a coordinate + timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub condition: Option<String>,
    pub description: Option<String>,
}

// --- upstream envelopes -------------------------------------------------

/// `randomuser.me`-style envelope: `{"results": [{...}]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    #[serde(default)]
    pub results: Vec<ProfileResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResult {
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: ProfileDob,
    #[serde(default)]
    pub registered: ProfileRegistered,
    #[serde(default)]
    pub location: ProfileLocation,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileDob {
    pub age: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileRegistered {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileLocation {
    pub city: Option<String>,
}

impl From<ProfileResult> for UserProfile {
    fn from(result: ProfileResult) -> Self {
        UserProfile {
            age: result.dob.age,
            gender: result.gender,
            // The profile service carries no subscription data.
            is_premium: false,
            join_date: result.registered.date,
            location: result.location.city,
        }
    }
}

/// `ip-api.com`-style flat response with a `"status"` discriminator.
#[derive(Debug, Deserialize)]
pub(crate) struct GeolocationResponse {
    pub status: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: Option<String>,
    #[serde(rename = "regionName")]
    pub region_name: Option<String>,
    pub isp: Option<String>,
}

impl From<GeolocationResponse> for Geolocation {
    fn from(response: GeolocationResponse) -> Self {
        Geolocation {
            country: response.country,
            city: response.city,
            lat: response.lat,
            lon: response.lon,
            timezone: response.timezone,
            region: response.region_name,
            isp: response.isp,
        }
    }
}

/// OpenWeatherMap-style envelope: `{"main": {...}, "weather": [{...}]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct WeatherEnvelope {
    #[serde(default)]
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WeatherMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherEntry {
    pub main: Option<String>,
    pub description: Option<String>,
}

impl From<WeatherEnvelope> for WeatherInfo {
    fn from(envelope: WeatherEnvelope) -> Self {
        let (condition, description) = envelope
            .weather
            .into_iter()
            .next()
            .map_or((None, None), |entry| (entry.main, entry.description));
        WeatherInfo {
            temperature: envelope.main.temp,
            humidity: envelope.main.humidity,
            condition,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_envelope_translates_to_flat_fields() {
        let envelope: ProfileEnvelope = serde_json::from_value(json!({
            "results": [{
                "gender": "female",
                "dob": {"age": 34, "date": "1991-04-02"},
                "registered": {"date": "2015-06-01T00:00:00Z"},
                "location": {"city": "Bandung", "country": "Indonesia"}
            }]
        }))
        .unwrap();
        let profile: UserProfile = envelope.results.into_iter().next().unwrap().into();
        assert_eq!(profile.age, Some(34));
        assert_eq!(profile.gender.as_deref(), Some("female"));
        assert!(!profile.is_premium);
        assert_eq!(profile.location.as_deref(), Some("Bandung"));
    }

    #[test]
    fn profile_tolerates_sparse_payload() {
        let envelope: ProfileEnvelope =
            serde_json::from_value(json!({"results": [{"gender": "male"}]})).unwrap();
        let profile: UserProfile = envelope.results.into_iter().next().unwrap().into();
        assert_eq!(profile.age, None);
        assert_eq!(profile.join_date, None);
    }

    #[test]
    fn geolocation_renames_region_field() {
        let response: GeolocationResponse = serde_json::from_value(json!({
            "status": "success",
            "country": "Australia",
            "city": "Sydney",
            "lat": -33.8688,
            "lon": 151.2093,
            "timezone": "Australia/Sydney",
            "regionName": "New South Wales",
            "isp": "Telstra"
        }))
        .unwrap();
        let geo: Geolocation = response.into();
        assert_eq!(geo.region.as_deref(), Some("New South Wales"));
        assert_eq!(geo.lat, Some(-33.8688));
    }

    #[test]
    fn weather_takes_first_entry_of_conditions() {
        let envelope: WeatherEnvelope = serde_json::from_value(json!({
            "main": {"temp": 28.5, "humidity": 70},
            "weather": [
                {"main": "Rain", "description": "light rain"},
                {"main": "Clouds", "description": "broken clouds"}
            ]
        }))
        .unwrap();
        let weather: WeatherInfo = envelope.into();
        assert_eq!(weather.temperature, Some(28.5));
        assert_eq!(weather.condition.as_deref(), Some("Rain"));
        assert_eq!(weather.description.as_deref(), Some("light rain"));
    }

    #[test]
    fn weather_with_no_entries_yields_nulls() {
        let envelope: WeatherEnvelope = serde_json::from_value(json!({"main": {}})).unwrap();
        let weather: WeatherInfo = envelope.into();
        assert_eq!(weather, WeatherInfo {
            temperature: None,
            humidity: None,
            condition: None,
            description: None
        });
    }
}
