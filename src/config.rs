use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::species_filename;
use crate::error::PageError;

pub const DEFAULT_CONFIG_FILE: &str = "datapages.json";
pub const DEFAULT_PROJECT_COLUMN: &str = "Study Name";
pub const DEFAULT_REFERENCES_URL: &str = "/component/References";
pub const DEFAULT_RECORD_URL_TEMPLATE: &str = "http://www.ebi.ac.uk/ena/data/view/{accession}";
pub const DEFAULT_PUBLICATION_URL_TEMPLATE: &str = "http://europepmc.org/abstract/MED/{id}";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub species: Vec<SpeciesEntry>,
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub project_column: Option<String>,
    #[serde(default)]
    pub references_url: Option<String>,
    #[serde(default)]
    pub record_url_template: Option<String>,
    #[serde(default)]
    pub publication_url_template: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SpeciesEntry {
    Shorthand(String),
    Detailed(SpeciesLink),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpeciesLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub species: Vec<SpeciesLink>,
    pub data_root: Utf8PathBuf,
    pub base_url: Option<String>,
    pub project_column: String,
    pub references_url: String,
    pub record_url_template: String,
    pub publication_url_template: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            species: Vec::new(),
            data_root: Utf8PathBuf::from("data"),
            base_url: None,
            project_column: DEFAULT_PROJECT_COLUMN.to_string(),
            references_url: DEFAULT_REFERENCES_URL.to_string(),
            record_url_template: DEFAULT_RECORD_URL_TEMPLATE.to_string(),
            publication_url_template: DEFAULT_PUBLICATION_URL_TEMPLATE.to_string(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, PageError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(PageError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| PageError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| PageError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, PageError> {
        let defaults = ResolvedConfig::default();
        let data_root = config
            .data_root
            .map(Utf8PathBuf::from)
            .unwrap_or(defaults.data_root);

        let species = config
            .species
            .into_iter()
            .map(|entry| match entry {
                SpeciesEntry::Shorthand(text) => {
                    let url = data_root.join(species_filename(&text)).into_string();
                    SpeciesLink { text, url }
                }
                SpeciesEntry::Detailed(link) => link,
            })
            .collect::<Vec<_>>();

        if let Some(empty) = species.iter().find(|link| link.text.trim().is_empty()) {
            return Err(PageError::ConfigParse(format!(
                "species entry with empty text (url {})",
                empty.url
            )));
        }

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            species,
            data_root,
            base_url: config.base_url,
            project_column: config
                .project_column
                .unwrap_or(defaults.project_column),
            references_url: config
                .references_url
                .unwrap_or(defaults.references_url),
            record_url_template: config
                .record_url_template
                .unwrap_or(defaults.record_url_template),
            publication_url_template: config
                .publication_url_template
                .unwrap_or(defaults.publication_url_template),
        })
    }
}
