use std::collections::HashMap;

use serde::Serialize;
use url::form_urlencoded;

use crate::domain::{Project, Selection};

pub const SPECIES_PARAM: &str = "species";
pub const PROJECT_PARAM: &str = "project";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    Push,
    Replace,
}

pub trait History {
    fn push(&mut self, state: Selection, url: String);
    fn replace(&mut self, state: Selection, url: String);
    fn location(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub state: Option<Selection>,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl SessionHistory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry {
                state: None,
                url: url.into(),
            }],
            index: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<Option<Selection>> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(self.current().state.clone())
    }

    pub fn forward(&mut self) -> Option<Option<Selection>> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(self.current().state.clone())
    }
}

impl History for SessionHistory {
    fn push(&mut self, state: Selection, url: String) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            state: Some(state),
            url,
        });
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, state: Selection, url: String) {
        self.entries[self.index] = HistoryEntry {
            state: Some(state),
            url,
        };
    }

    fn location(&self) -> &str {
        &self.current().url
    }
}

// Spaces go out as %20, not +, so the page's own script reads the URL back unchanged.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn encode_query(selection: &Selection) -> String {
    format!(
        "?{SPECIES_PARAM}={}&{PROJECT_PARAM}={}",
        encode_component(&selection.species),
        encode_component(selection.project.as_str())
    )
}

pub fn decode_query(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

pub fn selection_from_query(query: &str, first_species: &str) -> Selection {
    let mut params = decode_query(query);
    let species = params
        .remove(SPECIES_PARAM)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| first_species.to_string());
    let project = params
        .remove(PROJECT_PARAM)
        .filter(|value| !value.is_empty())
        .map(Project::named)
        .unwrap_or_default();
    Selection::new(species, project)
}

fn split_location(location: &str) -> (&str, &str) {
    match location.find('?') {
        Some(at) => location.split_at(at),
        None => (location, ""),
    }
}

pub struct NavigationSync<H: History> {
    history: H,
}

impl<H: History> NavigationSync<H> {
    pub fn new(history: H) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn encode(&mut self, selection: &Selection, mode: NavigationMode) {
        let (pathname, _) = split_location(self.history.location());
        let url = format!("{pathname}{}", encode_query(selection));
        match mode {
            NavigationMode::Push => self.history.push(selection.clone(), url.clone()),
            NavigationMode::Replace => self.history.replace(selection.clone(), url.clone()),
        }
        tracing::debug!(%selection, ?mode, %url, "navigation entry recorded");
    }

    pub fn decode(&self, first_species: &str) -> Selection {
        let (_, query) = split_location(self.history.location());
        selection_from_query(query, first_species)
    }

    pub fn on_history_navigate(&self, state: Option<Selection>, first_species: &str) -> Selection {
        state.unwrap_or_else(|| self.decode(first_species))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_round_trips() {
        let cases = [
            ("Human", "All Projects"),
            ("Staphylococcus aureus", "Proj 1/2"),
            ("E. coli & friends", "a=b?c#d"),
            ("Plasmodium falciparum", "100% + more"),
            ("Ünïcode", "日本"),
        ];
        for (species, project) in cases {
            let selection = Selection::new(species, Project::named(project));
            let query = encode_query(&selection);
            assert!(query.starts_with("?species="));
            assert_eq!(selection_from_query(&query, "Fallback"), selection);
        }
    }

    #[test]
    fn spaces_encode_as_percent_twenty() {
        let selection = Selection::new("Mus musculus", Project::named("C++ lib"));
        assert_eq!(
            encode_query(&selection),
            "?species=Mus%20musculus&project=C%2B%2B%20lib"
        );
        assert_eq!(
            selection_from_query("?species=Mus+musculus&project=C%2B%2B%20lib", "Human"),
            selection
        );
    }

    #[test]
    fn decode_defaults() {
        assert_eq!(
            selection_from_query("", "Human"),
            Selection::all_projects("Human")
        );
        assert_eq!(
            selection_from_query("?project=ProjX", "Human"),
            Selection::new("Human", Project::named("ProjX"))
        );
        assert_eq!(
            selection_from_query("?species=Mouse%20lemur", "Human"),
            Selection::all_projects("Mouse lemur")
        );
    }

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = SessionHistory::new("/data.html");
        history.push(Selection::all_projects("A"), "/data.html?species=A".to_string());
        history.push(Selection::all_projects("B"), "/data.html?species=B".to_string());
        assert_eq!(history.back(), Some(Some(Selection::all_projects("A"))));
        history.push(Selection::all_projects("C"), "/data.html?species=C".to_string());
        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
        assert_eq!(history.back(), Some(Some(Selection::all_projects("A"))));
        assert_eq!(history.back(), Some(None));
        assert_eq!(history.back(), None);
    }

    #[test]
    fn replace_keeps_path_and_length() {
        let mut sync = NavigationSync::new(SessionHistory::new("/pages/data.html?species=Old"));
        sync.encode(
            &Selection::new("Human", Project::named("P 1")),
            NavigationMode::Replace,
        );
        assert_eq!(
            sync.history().location(),
            "/pages/data.html?species=Human&project=P%201"
        );
        assert_eq!(sync.history().len(), 1);
        assert_eq!(
            sync.decode("Other"),
            Selection::new("Human", Project::named("P 1"))
        );
    }
}
