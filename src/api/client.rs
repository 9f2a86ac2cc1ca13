use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::*;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the public encounter API
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("route-tracker")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Follow the resource's own URL, falling back to `{base}/{kind}/{name}`
    fn resource_url(&self, kind: &str, resource: &NamedResource) -> String {
        if resource.url.is_empty() {
            format!("{}/{}/{}", self.base_url, kind, resource.name)
        } else {
            resource.url.clone()
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.client.get(url).send().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound(url.to_string())),
            status if !status.is_success() => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let text = response.text().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl EncounterSource for PokeApiClient {
    fn region(&self, slug: &str) -> Result<RegionPayload, FetchError> {
        self.get_json(&format!("{}/region/{}", self.base_url, slug))
    }

    fn location(&self, location: &NamedResource) -> Result<LocationPayload, FetchError> {
        self.get_json(&self.resource_url("location", location))
    }

    fn area(&self, area: &NamedResource) -> Result<AreaPayload, FetchError> {
        self.get_json(&self.resource_url("location-area", area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_url() {
        let client = PokeApiClient::new("https://example.test/api/v2/").unwrap();
        let bare = NamedResource {
            name: "pallet-town".to_string(),
            url: String::new(),
        };
        assert_eq!(
            client.resource_url("location", &bare),
            "https://example.test/api/v2/location/pallet-town"
        );

        let linked = NamedResource {
            name: "pallet-town".to_string(),
            url: "https://example.test/api/v2/location/86/".to_string(),
        };
        assert_eq!(
            client.resource_url("location", &linked),
            "https://example.test/api/v2/location/86/"
        );
    }
}
