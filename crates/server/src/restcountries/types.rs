//! Typed view of REST Countries v3.1 payloads.
//!
//! Atlas reads only a handful of fields (name, codes, region, flags); the
//! rest of each upstream payload is preserved through `#[serde(flatten)]` so
//! the proxy returns full country objects unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use atlas_core::CountryCode;

/// One country object as returned by the upstream provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Country {
    /// Country name block.
    #[serde(default)]
    pub name: CountryName,
    /// ISO 3166-1 alpha-2 code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cca2: String,
    /// ISO 3166-1 alpha-3 code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cca3: String,
    /// Continent-level region (e.g. "Europe").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Subregion (e.g. "Northern Europe").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    /// Capital city name(s).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capital: Vec<String>,
    /// Flag image URLs.
    #[serde(default, skip_serializing_if = "CountryFlags::is_empty")]
    pub flags: CountryFlags,
    /// All remaining upstream fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Country {
    /// Whether this country is identified by `code` (alpha-2 or alpha-3).
    #[must_use]
    pub fn matches_code(&self, code: &CountryCode) -> bool {
        self.cca2.eq_ignore_ascii_case(code.as_str()) || self.cca3.eq_ignore_ascii_case(code.as_str())
    }
}

/// The `name` block of a country object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryName {
    /// Common name (e.g. "Estonia").
    #[serde(default)]
    pub common: String,
    /// Official name (e.g. "Republic of Estonia").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub official: String,
    /// Native and translated name variants, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `flags` block of a country object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryFlags {
    /// PNG flag image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    /// SVG flag image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    /// Remaining flag fields (alt text etc.), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CountryFlags {
    fn is_empty(&self) -> bool {
        self.png.is_none() && self.svg.is_none() && self.extra.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodeled_fields_round_trip() {
        let raw = serde_json::json!({
            "name": {"common": "Estonia", "official": "Republic of Estonia", "nativeName": {"est": {"common": "Eesti"}}},
            "cca2": "EE",
            "cca3": "EST",
            "region": "Europe",
            "subregion": "Northern Europe",
            "capital": ["Tallinn"],
            "flags": {"png": "https://flagcdn.com/w320/ee.png", "alt": "The flag of Estonia"},
            "population": 1331057,
            "currencies": {"EUR": {"name": "Euro", "symbol": "€"}}
        });

        let country: Country = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(country.name.common, "Estonia");
        assert_eq!(country.cca3, "EST");
        assert_eq!(country.capital, vec!["Tallinn"]);

        // Fields Atlas doesn't model survive serialization unchanged.
        let back = serde_json::to_value(&country).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_matches_code_either_alpha() {
        let country = Country {
            cca2: "EE".to_owned(),
            cca3: "EST".to_owned(),
            ..Country::default()
        };

        assert!(country.matches_code(&CountryCode::parse("ee").unwrap()));
        assert!(country.matches_code(&CountryCode::parse("EST").unwrap()));
        assert!(!country.matches_code(&CountryCode::parse("NO").unwrap()));
    }
}
