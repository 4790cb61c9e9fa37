use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::client::DatasetPayload;
use crate::publications::PublicationsPanel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataPanel {
    pub title: String,
    pub description: String,
    pub published_data_description: String,
    pub links: String,
    pub publications: PublicationsPanel,
    pub last_updated: Option<String>,
}

impl MetadataPanel {
    pub fn from_payload(payload: &DatasetPayload) -> Self {
        let publications = if payload.pubmed_ids.is_empty() {
            PublicationsPanel::Empty
        } else {
            PublicationsPanel::Pending(payload.pubmed_ids.clone())
        };
        Self {
            title: payload.species.clone(),
            description: payload.description.clone(),
            published_data_description: payload.published_data_description.clone(),
            links: payload.links.clone(),
            publications,
            last_updated: payload.updated.as_deref().map(last_updated_text),
        }
    }
}

pub fn last_updated_text(updated: &str) -> String {
    let formatted = if let Ok(stamp) = DateTime::parse_from_rfc3339(updated) {
        stamp.format("%Y-%m-%d %H:%M:%S %:z").to_string()
    } else if let Ok(stamp) = NaiveDateTime::parse_from_str(updated, "%Y-%m-%dT%H:%M:%S%.f") {
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        updated.to_string()
    };
    format!("Last updated: {formatted}")
}
