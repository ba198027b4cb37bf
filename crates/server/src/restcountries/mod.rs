//! REST Countries gateway client.
//!
//! A stateless forwarding shim over the REST Countries v3.1 API. Every
//! lookup is a single GET with the configured timeout - one attempt, no
//! retries, no caching. Upstream 404s (and empty results where a single
//! entity is expected) surface as [`CountriesError::NotFound`]; any other
//! upstream failure surfaces as [`CountriesError::Upstream`] with the
//! upstream message attached.

pub mod types;

pub use types::{Country, CountryFlags, CountryName};

use thiserror::Error;

use atlas_core::CountryCode;

use crate::config::CountriesConfig;

/// Errors that can occur when calling the country-data provider.
#[derive(Debug, Error)]
pub enum CountriesError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("country service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The looked-up entity does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// Upstream returned a non-success status other than 404.
    #[error("country service returned {status}: {message}")]
    Upstream {
        /// HTTP status code from upstream.
        status: u16,
        /// Upstream response body, as text.
        message: String,
    },
}

impl CountriesError {
    /// Replace the message of a `NotFound` error, leaving other variants as-is.
    fn with_not_found_message(self, message: impl FnOnce() -> String) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(message()),
            other => other,
        }
    }
}

/// Client for the REST Countries API.
pub struct CountriesClient {
    client: reqwest::Client,
    base_url: String,
}

impl CountriesClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::Http` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &CountriesConfig) -> Result<Self, CountriesError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// All independent countries.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn all_independent(&self) -> Result<Vec<Country>, CountriesError> {
        self.get_list("independent?status=true").await
    }

    /// Countries matching a name.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::NotFound` if the name matches nothing.
    pub async fn by_name(&self, name: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("name/{}", urlencoding::encode(name)))
            .await
            .map_err(|e| e.with_not_found_message(|| format!("Country \"{name}\" not found")))
    }

    /// Countries in a region.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn by_region(&self, region: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("region/{}", urlencoding::encode(region)))
            .await
            .map_err(|e| e.with_not_found_message(|| format!("Region \"{region}\" not found")))
    }

    /// Countries speaking a language.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn by_language(&self, language: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("lang/{}", urlencoding::encode(language)))
            .await
            .map_err(|e| e.with_not_found_message(|| format!("Language \"{language}\" not found")))
    }

    /// A single country by alpha-2 or alpha-3 code.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::NotFound` if the code matches nothing.
    pub async fn by_code(&self, code: &CountryCode) -> Result<Country, CountriesError> {
        let mut countries = self
            .get_list(&format!("alpha/{}", code.as_str()))
            .await
            .map_err(|e| e.with_not_found_message(|| "Country not found".to_owned()))?;

        if countries.is_empty() {
            return Err(CountriesError::NotFound("Country not found".to_owned()));
        }
        Ok(countries.swap_remove(0))
    }

    /// A batch of countries by code, in one upstream call.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn by_codes(&self, codes: &[CountryCode]) -> Result<Vec<Country>, CountriesError> {
        let joined = codes
            .iter()
            .map(CountryCode::as_str)
            .collect::<Vec<_>>()
            .join(",");

        self.get_list(&format!("alpha?codes={joined}")).await
    }

    /// Countries using a currency.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::NotFound` if the currency matches nothing.
    pub async fn by_currency(&self, currency: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("currency/{}", urlencoding::encode(currency)))
            .await
            .map_err(|e| e.with_not_found_message(|| "Currency not found".to_owned()))
    }

    /// Countries whose citizens are called by a demonym.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::NotFound` if the demonym matches nothing.
    pub async fn by_demonym(&self, demonym: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("demonym/{}", urlencoding::encode(demonym)))
            .await
            .map_err(|e| e.with_not_found_message(|| "Demonym not found".to_owned()))
    }

    /// Countries with a capital city.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError::NotFound` if the capital matches nothing.
    pub async fn by_capital(&self, capital: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("capital/{}", urlencoding::encode(capital)))
            .await
            .map_err(|e| e.with_not_found_message(|| "Capital not found".to_owned()))
    }

    /// Countries in a subregion.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn by_subregion(&self, subregion: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("subregion/{}", urlencoding::encode(subregion)))
            .await
            .map_err(|e| {
                e.with_not_found_message(|| format!("Subregion \"{subregion}\" not found"))
            })
    }

    /// Countries matching a translated name.
    ///
    /// # Errors
    ///
    /// Returns `CountriesError` if the upstream call fails.
    pub async fn by_translation(&self, translation: &str) -> Result<Vec<Country>, CountriesError> {
        self.get_list(&format!("translation/{}", urlencoding::encode(translation)))
            .await
            .map_err(|e| {
                e.with_not_found_message(|| format!("Translation \"{translation}\" not found"))
            })
    }

    /// Execute a GET against the upstream and decode the country list.
    async fn get_list(&self, path_and_query: &str) -> Result<Vec<Country>, CountriesError> {
        let url = format!("{}/{path_and_query}", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CountriesError::NotFound("not found".to_owned()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CountriesError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_replacement() {
        let err = CountriesError::NotFound("not found".to_owned())
            .with_not_found_message(|| "Country \"atlantis\" not found".to_owned());
        assert_eq!(err.to_string(), "Country \"atlantis\" not found");
    }

    #[test]
    fn test_upstream_error_keeps_message() {
        let err = CountriesError::Upstream {
            status: 500,
            message: "boom".to_owned(),
        }
        .with_not_found_message(|| "unused".to_owned());
        assert_eq!(err.to_string(), "country service returned 500: boom");
    }
}
