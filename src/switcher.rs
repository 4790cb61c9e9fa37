use std::fmt;

use serde::Serialize;

use crate::client::DatasetPayload;
use crate::domain::{Project, Selection};
use crate::error::PageError;
use crate::filter::{ProjectFilter, ProjectSelector};
use crate::linker::AccessionLinker;
use crate::metadata::MetadataPanel;
use crate::publications::PublicationsPanel;
use crate::registry::{SourceLocation, SourceRegistry};
use crate::table::DataTable;

/// Tags an in-flight request; only the most recently issued token may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Loading { species: String, token: RequestToken },
    Loaded { species: String },
    Empty { species: String },
    Unknown { species: String },
    FetchFailed { species: String, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub loading: bool,
    pub table: bool,
    pub projects: bool,
    pub content: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: RequestToken,
    pub selection: Selection,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub token: RequestToken,
    pub pubmed_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchDataset(FetchTicket),
    LookupPublications(LookupTicket),
}

#[derive(Debug)]
pub enum Completion {
    Dataset {
        ticket: FetchTicket,
        result: Result<DatasetPayload, PageError>,
    },
    Publications {
        ticket: LookupTicket,
        result: Result<String, PageError>,
    },
}

#[derive(Debug, Clone)]
pub struct SwitcherOptions {
    pub project_column: String,
    pub record_url_template: String,
    pub publication_url_template: String,
}

pub struct DatasetSwitcher {
    registry: SourceRegistry,
    filter: ProjectFilter,
    publication_url_template: String,
    table: DataTable,
    selector: ProjectSelector,
    metadata: MetadataPanel,
    visibility: Visibility,
    species_label: Option<String>,
    bound_species: Option<String>,
    state: ViewState,
    next_token: u64,
    latest_fetch: Option<RequestToken>,
    latest_lookup: Option<RequestToken>,
    loading_project: Option<Project>,
}

impl DatasetSwitcher {
    pub fn new(registry: SourceRegistry, options: SwitcherOptions) -> Self {
        let mut table = DataTable::new();
        table.attach_hook(Box::new(AccessionLinker::new(options.record_url_template)));
        Self {
            registry,
            filter: ProjectFilter::new(options.project_column),
            publication_url_template: options.publication_url_template,
            table,
            selector: ProjectSelector::default(),
            metadata: MetadataPanel::default(),
            visibility: Visibility::default(),
            species_label: None,
            bound_species: None,
            state: ViewState::Idle,
            next_token: 0,
            latest_fetch: None,
            latest_lookup: None,
            loading_project: None,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn selector(&self) -> &ProjectSelector {
        &self.selector
    }

    pub fn metadata(&self) -> &MetadataPanel {
        &self.metadata
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn species_label(&self) -> Option<&str> {
        self.species_label.as_deref()
    }

    pub fn bound_species(&self) -> Option<&str> {
        self.bound_species.as_deref()
    }

    pub fn is_bound_to(&self, species: &str) -> bool {
        self.bound_species.as_deref() == Some(species)
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    /// Brings the view to `selection`. Returns the fetch to run when the species isn't bound yet
    /// but has a known source.
    pub fn request_view(&mut self, selection: &Selection) -> Option<Effect> {
        self.show_loading();
        self.species_label = Some(selection.species.clone());

        if self.is_bound_to(&selection.species) {
            tracing::debug!(%selection, "species already bound; reusing loaded data");
            self.latest_fetch = None;
            self.show_content();
            self.present_bound(&selection.species, &selection.project);
            return None;
        }

        if let Some(location) = self.registry.location_for(&selection.species).cloned() {
            let token = self.issue_token();
            tracing::info!(%selection, %location, %token, "fetching dataset");
            self.latest_fetch = Some(token);
            self.loading_project = None;
            self.state = ViewState::Loading {
                species: selection.species.clone(),
                token,
            };
            return Some(Effect::FetchDataset(FetchTicket {
                token,
                selection: selection.clone(),
                location,
            }));
        }

        tracing::info!(
            species = %selection.species,
            "no data source for species; showing empty view"
        );
        self.latest_fetch = None;
        self.latest_lookup = None;
        self.table.clear();
        self.show_content();
        self.bound_species = Some(selection.species.clone());
        self.metadata = MetadataPanel {
            title: selection.species.clone(),
            ..MetadataPanel::default()
        };
        let projects = self.filter.derive_projects(&self.table);
        self.selector = self.filter.render_selector(projects, Project::All);
        self.apply_or_clear(&Project::All);
        self.visibility.projects = false;
        self.selector.visible = false;
        self.state = ViewState::Unknown {
            species: selection.species.clone(),
        };
        None
    }

    pub fn select_project(&mut self, selection: &Selection) -> Option<Effect> {
        if let ViewState::Loading { species, .. } = &self.state {
            if *species == selection.species {
                self.loading_project = Some(selection.project.clone());
                return None;
            }
        }
        if self.is_bound_to(&selection.species) {
            self.selector.label = selection.project.clone();
            self.apply_or_clear(&selection.project);
            return None;
        }
        self.request_view(selection)
    }

    pub fn complete(&mut self, completion: Completion) -> Option<Effect> {
        match completion {
            Completion::Dataset { ticket, result } => self.complete_fetch(ticket, result),
            Completion::Publications { ticket, result } => {
                self.complete_lookup(ticket, result);
                None
            }
        }
    }

    fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<DatasetPayload, PageError>,
    ) -> Option<Effect> {
        if self.latest_fetch != Some(ticket.token) {
            tracing::warn!(
                token = %ticket.token,
                selection = %ticket.selection,
                "discarding stale dataset response"
            );
            return None;
        }
        self.latest_fetch = None;
        let species = ticket.selection.species.clone();
        let project = self
            .loading_project
            .take()
            .unwrap_or_else(|| ticket.selection.project.clone());

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%species, error = %err, "dataset fetch failed");
                self.bound_species = None;
                self.latest_lookup = None;
                self.table.clear();
                self.table.draw();
                self.metadata = MetadataPanel {
                    title: species.clone(),
                    ..MetadataPanel::default()
                };
                self.visibility = Visibility::default();
                self.selector.visible = false;
                self.state = ViewState::FetchFailed {
                    species,
                    reason: err.to_string(),
                };
                return None;
            }
        };

        tracing::info!(%species, rows = payload.data.len(), "dataset bound");
        self.metadata = MetadataPanel::from_payload(&payload);
        let DatasetPayload {
            columns,
            data,
            pubmed_ids,
            ..
        } = payload;
        self.table.load(columns, data);
        self.show_content();
        self.bound_species = Some(species.clone());
        self.present_bound(&species, &project);

        if pubmed_ids.is_empty() {
            self.latest_lookup = None;
            return None;
        }
        let token = self.issue_token();
        self.latest_lookup = Some(token);
        Some(Effect::LookupPublications(LookupTicket { token, pubmed_ids }))
    }

    fn complete_lookup(&mut self, ticket: LookupTicket, result: Result<String, PageError>) {
        if self.latest_lookup != Some(ticket.token) {
            tracing::warn!(token = %ticket.token, "discarding stale publications response");
            return;
        }
        self.latest_lookup = None;
        self.metadata.publications = PublicationsPanel::from_lookup(
            &ticket.pubmed_ids,
            result,
            &self.publication_url_template,
        );
    }

    fn present_bound(&mut self, species: &str, project: &Project) {
        if self.table.row_count() == 0 {
            self.table.clear_search();
            self.table.draw();
            self.visibility.table = false;
            self.visibility.projects = false;
            self.selector.visible = false;
            self.state = ViewState::Empty {
                species: species.to_string(),
            };
            return;
        }
        let projects = self.filter.derive_projects(&self.table);
        self.selector = self.filter.render_selector(projects, project.clone());
        self.apply_or_clear(project);
        self.visibility.table = true;
        self.visibility.projects = true;
        self.state = ViewState::Loaded {
            species: species.to_string(),
        };
    }

    fn apply_or_clear(&mut self, project: &Project) {
        if let Err(err) = self.filter.apply_filter(&mut self.table, project) {
            tracing::warn!(%project, error = %err, "cannot filter by project; showing all rows");
            self.table.clear_search();
            self.table.draw();
        }
    }

    fn show_loading(&mut self) {
        self.visibility = Visibility {
            loading: true,
            table: false,
            projects: self.visibility.projects,
            content: false,
        };
    }

    fn show_content(&mut self) {
        self.visibility.loading = false;
        self.visibility.table = true;
        self.visibility.content = true;
    }
}
