use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Upstream portal a listing was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Olx,
    Nekretnine,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Olx => "olx",
            Source::Nekretnine => "nekretnine",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown listing source '{}'", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The backend stores some rows with a country suffix ("olx_ba")
        let lower = s.trim().to_ascii_lowercase();
        let base = lower
            .strip_suffix("_ba")
            .or_else(|| lower.strip_suffix("_rs"))
            .unwrap_or(&lower);

        match base {
            "olx" => Ok(Source::Olx),
            "nekretnine" => Ok(Source::Nekretnine),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a listing. `id` alone collides across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingKey {
    pub source: Source,
    pub id: i64,
}

impl ListingKey {
    pub fn new(source: Source, id: i64) -> Self {
        Self { source, id }
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Core listing data model, as returned by the listings backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub source: Source,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub ad_type: Option<String>,
    #[serde(default)]
    pub rooms: Option<f64>,
    #[serde(default)]
    pub square_m2: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default, rename = "price_numeric", alias = "price")]
    pub price: Option<f64>,
    /// Computed server-side; opaque to the client
    #[serde(default)]
    pub deal_score: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub level: Option<serde_json::Value>,
    #[serde(default)]
    pub heating: Option<String>,
    #[serde(default)]
    pub year_built: Option<serde_json::Value>,
}

/// Accept `null` wherever a missing field would fall back to `Default`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Listing {
    pub fn key(&self) -> ListingKey {
        ListingKey::new(self.source, self.id)
    }
}

#[cfg(test)]
pub(crate) fn sample_listing(source: Source, id: i64) -> Listing {
    Listing {
        id,
        source,
        title: format!("Stan {id}"),
        municipality: Some("Centar".to_string()),
        property_type: Some("stan".to_string()),
        ad_type: Some("prodaja".to_string()),
        rooms: Some(2.0),
        square_m2: Some(54.0),
        condition: None,
        price: Some(150_000.0),
        deal_score: Some(72.0),
        url: None,
        thumbnail_url: None,
        level: None,
        heating: None,
        year_built: None,
    }
}
