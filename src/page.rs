use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::{Project, Selection};
use crate::error::PageError;
use crate::filter::ProjectSelector;
use crate::metadata::MetadataPanel;
use crate::navigation::{History, NavigationMode, NavigationSync, SessionHistory};
use crate::registry::SourceRegistry;
use crate::switcher::{
    Completion, DatasetSwitcher, Effect, SwitcherOptions, ViewState, Visibility,
};
use crate::table::DrawnTable;

#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub selection: Selection,
    pub url: String,
    pub view: ViewState,
    pub visibility: Visibility,
    pub species: Vec<String>,
    pub projects: ProjectSelector,
    pub metadata: MetadataPanel,
    pub row_count: usize,
    pub table: DrawnTable,
}

/// The data page: one selection kept in step with the switcher's view and the URL/history.
///
/// Every user-initiated change pushes one history entry; opening the page replaces the current
/// entry and history traversal writes none.
pub struct Page<H: History> {
    switcher: DatasetSwitcher,
    navigation: NavigationSync<H>,
    selection: Selection,
}

impl<H: History> Page<H> {
    pub fn new(switcher: DatasetSwitcher, history: H) -> Self {
        Self {
            switcher,
            navigation: NavigationSync::new(history),
            selection: Selection::all_projects(""),
        }
    }

    pub fn from_config(config: &ResolvedConfig, history: H) -> Result<Self, PageError> {
        let registry = SourceRegistry::from_config(config)?;
        let switcher = DatasetSwitcher::new(
            registry,
            SwitcherOptions {
                project_column: config.project_column.clone(),
                record_url_template: config.record_url_template.clone(),
                publication_url_template: config.publication_url_template.clone(),
            },
        );
        Ok(Self::new(switcher, history))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn switcher(&self) -> &DatasetSwitcher {
        &self.switcher
    }

    pub fn history(&self) -> &H {
        self.navigation.history()
    }

    fn first_species(&self) -> String {
        self.switcher
            .registry()
            .first_species()
            .unwrap_or_default()
            .to_string()
    }

    pub fn open(&mut self) -> Option<Effect> {
        let selection = self.navigation.decode(&self.first_species());
        self.selection = selection.clone();
        let effect = self.switcher.request_view(&selection);
        self.navigation.encode(&selection, NavigationMode::Replace);
        effect
    }

    pub fn select_species(&mut self, species: &str) -> Option<Effect> {
        let selection = Selection::all_projects(species);
        self.selection = selection.clone();
        let effect = self.switcher.request_view(&selection);
        self.navigation.encode(&selection, NavigationMode::Push);
        effect
    }

    pub fn select_project(&mut self, project: Project) -> Option<Effect> {
        let selection = self.selection.with_project(project);
        self.selection = selection.clone();
        let effect = self.switcher.select_project(&selection);
        self.navigation.encode(&selection, NavigationMode::Push);
        effect
    }

    pub fn history_navigated(&mut self, state: Option<Selection>) -> Option<Effect> {
        let selection = self
            .navigation
            .on_history_navigate(state, &self.first_species());
        self.selection = selection.clone();
        self.switcher.request_view(&selection)
    }

    pub fn retry(&mut self) -> Option<Effect> {
        if !matches!(self.switcher.state(), ViewState::FetchFailed { .. }) {
            return None;
        }
        let selection = self.selection.clone();
        self.switcher.request_view(&selection)
    }

    pub fn complete(&mut self, completion: Completion) -> Option<Effect> {
        self.switcher.complete(completion)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            selection: self.selection.clone(),
            url: self.navigation.history().location().to_string(),
            view: self.switcher.state().clone(),
            visibility: self.switcher.visibility(),
            species: self
                .switcher
                .registry()
                .species()
                .map(str::to_string)
                .collect(),
            projects: self.switcher.selector().clone(),
            metadata: self.switcher.metadata().clone(),
            row_count: self.switcher.table().row_count(),
            table: self.switcher.table().drawn().clone(),
        }
    }
}

impl Page<SessionHistory> {
    pub fn back(&mut self) -> Option<Effect> {
        let state = self.navigation.history_mut().back()?;
        self.history_navigated(state)
    }

    pub fn forward(&mut self) -> Option<Effect> {
        let state = self.navigation.history_mut().forward()?;
        self.history_navigated(state)
    }
}
