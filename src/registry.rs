use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ResolvedConfig, SpeciesLink};
use crate::error::PageError;

pub const DATA_SUMMARY_FILE: &str = "_data_summary.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(Url),
    File(Utf8PathBuf),
}

impl SourceLocation {
    pub fn parse(raw: &str, base: Option<&Url>) -> Result<Self, PageError> {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Http(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .ok()
                .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
                .map(Self::File)
                .ok_or_else(|| PageError::InvalidLocation(raw.to_string())),
            Ok(_) => Err(PageError::InvalidLocation(raw.to_string())),
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => base
                    .join(raw)
                    .map(Self::Http)
                    .map_err(|err| PageError::InvalidLocation(format!("{raw}: {err}"))),
                None => Ok(Self::File(Utf8PathBuf::from(raw))),
            },
            Err(err) => Err(PageError::InvalidLocation(format!("{raw}: {err}"))),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Http(url) => write!(f, "{url}"),
            SourceLocation::File(path) => write!(f, "{path}"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DataSummary {
    pub species: BTreeMap<String, SummaryEntry>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SummaryEntry {
    pub filename: String,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    order: Vec<String>,
    locations: HashMap<String, SourceLocation>,
}

impl SourceRegistry {
    pub fn from_links(links: &[SpeciesLink], base_url: Option<&str>) -> Result<Self, PageError> {
        let base = base_url
            .map(|raw| {
                Url::parse(raw).map_err(|err| PageError::InvalidLocation(format!("{raw}: {err}")))
            })
            .transpose()?;

        let mut registry = Self::default();
        for link in links {
            let location = SourceLocation::parse(&link.url, base.as_ref())?;
            registry.insert(link.text.clone(), location);
        }
        Ok(registry)
    }

    pub fn from_summary(data_root: &Utf8Path) -> Result<Self, PageError> {
        let path = data_root.join(DATA_SUMMARY_FILE);
        let content =
            fs::read_to_string(&path).map_err(|err| PageError::Filesystem(format!("{path}: {err}")))?;
        let summary: DataSummary = serde_json::from_str(&content)
            .map_err(|err| PageError::ConfigParse(format!("{path}: {err}")))?;

        let mut registry = Self::default();
        for (species, entry) in summary.species {
            registry.insert(species, SourceLocation::File(data_root.join(&entry.filename)));
        }
        Ok(registry)
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, PageError> {
        if !config.species.is_empty() {
            return Self::from_links(&config.species, config.base_url.as_deref());
        }
        Self::from_summary(&config.data_root)
            .map_err(|_| PageError::NoSpecies(config.data_root.to_string()))
    }

    fn insert(&mut self, species: String, location: SourceLocation) {
        if self.locations.insert(species.clone(), location).is_none() {
            self.order.push(species);
        }
    }

    pub fn location_for(&self, species: &str) -> Option<&SourceLocation> {
        self.locations.get(species)
    }

    pub fn first_species(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn link(text: &str, url: &str) -> SpeciesLink {
        SpeciesLink {
            text: text.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn resolves_known_and_unknown_species() {
        let registry = SourceRegistry::from_links(
            &[link("Human", "/data/human.json"), link("Mouse", "/data/mouse.json")],
            Some("https://example.org/pages/"),
        )
        .unwrap();

        assert_eq!(registry.first_species(), Some("Human"));
        assert_eq!(
            registry.location_for("Human").map(ToString::to_string),
            Some("https://example.org/data/human.json".to_string())
        );
        assert!(registry.location_for("Martian").is_none());
    }

    #[test]
    fn relative_location_without_base_is_a_file() {
        let location = SourceLocation::parse("data/human.json", None).unwrap();
        assert_matches!(location, SourceLocation::File(path) if path == "data/human.json");
    }

    #[test]
    fn duplicate_species_keeps_first_position_last_location() {
        let registry = SourceRegistry::from_links(
            &[link("Human", "a.json"), link("Human", "b.json")],
            None,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.location_for("Human"),
            Some(&SourceLocation::File(Utf8PathBuf::from("b.json")))
        );
    }
}
