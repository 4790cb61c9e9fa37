#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use datapages::client::{DatasetClient, DatasetPayload, ReferencesClient};
use datapages::config::{
    DEFAULT_PUBLICATION_URL_TEMPLATE, DEFAULT_RECORD_URL_TEMPLATE, SpeciesLink,
};
use datapages::error::PageError;
use datapages::navigation::SessionHistory;
use datapages::page::Page;
use datapages::registry::{SourceLocation, SourceRegistry};
use datapages::runtime::Runtime;
use datapages::switcher::{DatasetSwitcher, SwitcherOptions};

#[derive(Clone, Default)]
pub struct MockSource {
    datasets: HashMap<String, DatasetPayload>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn with(mut self, location: &str, payload: DatasetPayload) -> Self {
        self.datasets.insert(location.to_string(), payload);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DatasetClient for MockSource {
    fn fetch_dataset(&self, location: &SourceLocation) -> Result<DatasetPayload, PageError> {
        let key = location.to_string();
        self.calls.lock().unwrap().push(key.clone());
        self.datasets
            .get(&key)
            .cloned()
            .ok_or_else(|| PageError::DatasetHttp(format!("connection refused: {key}")))
    }
}

#[derive(Clone, Default)]
pub struct MockReferences {
    html: Option<String>,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockReferences {
    pub fn returning(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

impl ReferencesClient for MockReferences {
    fn lookup(&self, pubmed_ids: &[String]) -> Result<String, PageError> {
        self.calls.lock().unwrap().push(pubmed_ids.to_vec());
        self.html
            .clone()
            .ok_or_else(|| PageError::ReferencesHttp("unreachable".to_string()))
    }
}

pub fn links() -> Vec<SpeciesLink> {
    [
        ("Human", "/data/human.json"),
        ("Mouse", "/data/mouse.json"),
        ("Empty", "/data/empty.json"),
    ]
    .into_iter()
    .map(|(text, url)| SpeciesLink {
        text: text.to_string(),
        url: url.to_string(),
    })
    .collect()
}

pub fn page(url: &str) -> Page<SessionHistory> {
    let registry = SourceRegistry::from_links(&links(), None).unwrap();
    let switcher = DatasetSwitcher::new(
        registry,
        SwitcherOptions {
            project_column: "Study Name".to_string(),
            record_url_template: DEFAULT_RECORD_URL_TEMPLATE.to_string(),
            publication_url_template: DEFAULT_PUBLICATION_URL_TEMPLATE.to_string(),
        },
    );
    Page::new(switcher, SessionHistory::new(url))
}

pub fn human() -> DatasetPayload {
    DatasetPayload {
        columns: vec![
            "Species".to_string(),
            "Study Name".to_string(),
            "Study Accession".to_string(),
            "Run Accession".to_string(),
            "Sample Accession".to_string(),
        ],
        data: vec![
            vec![
                json!("Homo sapiens"),
                json!("ProjX"),
                json!("ERP0001"),
                json!("ERR0001"),
                json!("ERS0001"),
            ],
            vec![
                json!("Homo sapiens"),
                json!("ProjY"),
                json!("ERP0002"),
                json!("ERR0002"),
                json!("pending"),
            ],
            vec![
                json!("Homo sapiens"),
                json!("ProjX10"),
                json!("ERP0003"),
                json!("ERR0003"),
                json!("ERS0003"),
            ],
            vec![
                json!("Homo sapiens"),
                json!("ProjX"),
                json!("ERP0001"),
                json!("ERR0004"),
                json!("ERS0004"),
            ],
        ],
        species: "Human".to_string(),
        description: "<p>Human sequencing</p>".to_string(),
        published_data_description: String::new(),
        links: String::new(),
        pubmed_ids: Vec::new(),
        updated: Some("2017-05-02T10:11:12.123456".to_string()),
    }
}

pub fn mouse() -> DatasetPayload {
    DatasetPayload {
        columns: vec![
            "Run Accession".to_string(),
            "Study Name".to_string(),
            "Species".to_string(),
        ],
        data: vec![
            vec![json!("SRR1234"), json!("MouseProj"), json!("Mus musculus")],
            vec![json!("SRR1235"), json!("MouseProj"), json!("Mus musculus")],
        ],
        species: "Mouse".to_string(),
        pubmed_ids: vec!["111".to_string(), "222".to_string()],
        ..DatasetPayload::default()
    }
}

pub fn empty() -> DatasetPayload {
    DatasetPayload {
        columns: vec!["Species".to_string(), "Study Name".to_string()],
        species: "Empty".to_string(),
        description: "<p>Nothing yet</p>".to_string(),
        ..DatasetPayload::default()
    }
}

pub fn source() -> MockSource {
    MockSource::default()
        .with("/data/human.json", human())
        .with("/data/mouse.json", mouse())
        .with("/data/empty.json", empty())
}

pub fn runtime(
    source: &MockSource,
    references: &MockReferences,
) -> Runtime<MockSource, MockReferences> {
    Runtime::new(source.clone(), references.clone())
}
