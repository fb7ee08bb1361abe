use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::config::PlacesConfig;

/// Venue returned by the search proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Place {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlaceSearchQuery {
    #[serde(default)]
    pub query: String,
    /// `latitude,longitude` of the search origin.
    #[serde(default)]
    pub ll: String,
}

#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn search(&self, query: &PlaceSearchQuery) -> anyhow::Result<Vec<Place>>;
}

pub struct FoursquareClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl FoursquareClient {
    pub fn new(config: &PlacesConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to initialize HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PlacesClient for FoursquareClient {
    async fn search(&self, query: &PlaceSearchQuery) -> anyhow::Result<Vec<Place>> {
        let url = format!("{}/v3/places/search", self.api_url);
        let body: Value = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("ll", query.ll.as_str()),
                ("open_now", "true"),
                ("sort", "DISTANCE"),
                ("query", query.query.as_str()),
            ])
            .send()
            .await
            .context("Failed to reach places API")?
            .error_for_status()
            .context("Places API returned an error status")?
            .json()
            .await
            .context("Failed to decode places API response")?;

        Ok(extract_places(&body))
    }
}

/// Keeps results that carry both a name and a formatted address.
pub fn extract_places(body: &Value) -> Vec<Place> {
    let Some(results) = body.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|place| {
            let name = place.get("name").and_then(Value::as_str).unwrap_or("");
            let location = place
                .get("location")
                .and_then(|l| l.get("formatted_address"))
                .and_then(Value::as_str)
                .unwrap_or("");
            if name.is_empty() || location.is_empty() {
                return None;
            }
            Some(Place {
                name: name.to_string(),
                location: location.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_places_drops_incomplete_results() {
        let body = json!({
            "results": [
                {"name": "Cafe Nour", "location": {"formatted_address": "12 Rue de Marseille"}},
                {"name": "", "location": {"formatted_address": "nowhere"}},
                {"name": "No Address", "location": {}},
                {"location": {"formatted_address": "anonymous"}}
            ]
        });

        let places = extract_places(&body);
        assert_eq!(
            places,
            vec![Place {
                name: "Cafe Nour".into(),
                location: "12 Rue de Marseille".into(),
            }]
        );
    }

    #[test]
    fn extract_places_tolerates_missing_results() {
        assert!(extract_places(&json!({"message": "quota"})).is_empty());
    }
}
