//! Typed enrichment endpoints on [`ApiClient`].
//!
//! Each method performs the response-shape translation from the upstream
//! envelope into the pipeline's flat field names. Shape mismatches surface
//! as [`ApiError::MissingData`], which callers treat as "no data."

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{
    Geolocation, GeolocationResponse, ProfileEnvelope, UserProfile, WeatherEnvelope, WeatherInfo,
};

impl ApiClient {
    /// Fetches profile attributes for one join key.
    ///
    /// The reference profile service has no per-user lookup; the key is sent
    /// as a seed parameter so repeated runs get stable responses per user.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingData`] if the response carries no profile.
    /// - Transport/status errors per [`ApiClient::request`].
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let body = self.request("", &[("seed", user_id)]).await?;
        let envelope: ProfileEnvelope = serde_json::from_value(body)
            .map_err(|e| ApiError::MissingData(format!("profile envelope for {user_id}: {e}")))?;
        envelope
            .results
            .into_iter()
            .next()
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::MissingData(format!("no profile results for {user_id}")))
    }

    /// Looks up geolocation attributes for an IP address.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingData`] if the lookup did not succeed.
    /// - Transport/status errors per [`ApiClient::request`].
    pub async fn geolocation(&self, ip_address: &str) -> Result<Geolocation, ApiError> {
        let body = self.request("", &[("query", ip_address)]).await?;
        let response: GeolocationResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::MissingData(format!("geolocation shape for {ip_address}: {e}")))?;
        if response.status.as_deref() != Some("success") {
            return Err(ApiError::MissingData(format!(
                "geolocation lookup failed for {ip_address}"
            )));
        }
        Ok(response.into())
    }

    /// Fetches weather attributes for a coordinate at a unix timestamp.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingData`] if the response shape is unusable.
    /// - Transport/status errors per [`ApiClient::request`].
    pub async fn weather(
        &self,
        lat: f64,
        lon: f64,
        unix_timestamp: i64,
    ) -> Result<WeatherInfo, ApiError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let dt = unix_timestamp.to_string();
        let body = self
            .request("weather", &[("lat", &lat), ("lon", &lon), ("dt", &dt)])
            .await?;
        let envelope: WeatherEnvelope = serde_json::from_value(body)
            .map_err(|e| ApiError::MissingData(format!("weather shape at {lat},{lon}: {e}")))?;
        Ok(envelope.into())
    }
}
