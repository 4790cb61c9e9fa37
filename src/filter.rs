use regex::Regex;
use serde::Serialize;

use crate::domain::Project;
use crate::error::PageError;
use crate::table::DataTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSelector {
    pub label: Project,
    pub entries: Vec<Project>,
    pub visible: bool,
}

impl Default for ProjectSelector {
    fn default() -> Self {
        Self {
            label: Project::All,
            entries: vec![Project::All],
            visible: false,
        }
    }
}

impl ProjectSelector {
    pub fn entry(&self, index: usize) -> Option<&Project> {
        self.entries.get(index)
    }

    pub fn position(&self, project: &Project) -> Option<usize> {
        self.entries.iter().position(|entry| entry == project)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectFilter {
    column_label: String,
}

impl ProjectFilter {
    pub fn new(column_label: impl Into<String>) -> Self {
        Self {
            column_label: column_label.into(),
        }
    }

    fn column(&self, table: &DataTable) -> Option<usize> {
        table.schema().index_of(&self.column_label)
    }

    /// `All Projects` followed by the distinct project values in ascending order. Blank values
    /// are left out: an empty project can't be told apart from a missing one in the URL.
    pub fn derive_projects(&self, table: &DataTable) -> Vec<Project> {
        let mut projects = vec![Project::All];
        if let Some(column) = self.column(table) {
            projects.extend(
                table
                    .distinct_values(column)
                    .into_iter()
                    .filter(|value| !value.trim().is_empty())
                    .map(Project::named)
                    .filter(|project| !project.is_all()),
            );
        }
        projects
    }

    pub fn render_selector(&self, projects: Vec<Project>, label: Project) -> ProjectSelector {
        ProjectSelector {
            label,
            entries: projects,
            visible: true,
        }
    }

    pub fn apply_filter(&self, table: &mut DataTable, project: &Project) -> Result<(), PageError> {
        match project {
            Project::All => table.clear_search(),
            Project::Named(value) => {
                let column = self
                    .column(table)
                    .ok_or_else(|| PageError::UnknownColumn(self.column_label.clone()))?;
                table.search_column(column, Some(exact_match_pattern(value)?));
            }
        }
        table.draw();
        Ok(())
    }
}

pub fn exact_match_pattern(value: &str) -> Result<Regex, PageError> {
    Regex::new(&format!("^{}$", regex::escape(value)))
        .map_err(|err| PageError::InvalidFilter(err.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn table_with_projects(projects: &[&str]) -> DataTable {
        let mut table = DataTable::new();
        table.load(
            vec!["Run Accession".to_string(), "Study Name".to_string()],
            projects
                .iter()
                .enumerate()
                .map(|(i, project)| vec![json!(format!("ERR{:04}", i)), json!(project)])
                .collect(),
        );
        table
    }

    #[test]
    fn derive_projects_sorted_unique_skips_blanks() {
        let table = table_with_projects(&["b", "a", "b", "", "c", "  "]);
        let filter = ProjectFilter::new("Study Name");
        let projects = filter.derive_projects(&table);
        assert_eq!(
            projects,
            vec![
                Project::All,
                Project::named("a"),
                Project::named("b"),
                Project::named("c")
            ]
        );
    }

    #[test]
    fn exact_match_excludes_prefix_and_suffix_matches() {
        let mut table = table_with_projects(&["Proj1", "Proj10", "MyProj1", "Proj1"]);
        let filter = ProjectFilter::new("Study Name");
        filter
            .apply_filter(&mut table, &Project::named("Proj1"))
            .unwrap();
        assert_eq!(table.drawn().rows.len(), 2);
        assert!(table.drawn().rows.iter().all(|row| row[1].text == "Proj1"));
    }

    #[test]
    fn metacharacters_are_escaped() {
        let mut table = table_with_projects(&["a.b (x)", "aXb (x)", "a.b x"]);
        let filter = ProjectFilter::new("Study Name");
        filter
            .apply_filter(&mut table, &Project::named("a.b (x)"))
            .unwrap();
        assert_eq!(table.drawn().rows.len(), 1);
        assert_eq!(table.drawn().rows[0][1].text, "a.b (x)");
    }

    #[test]
    fn clearing_restores_full_row_set() {
        let mut table = table_with_projects(&["Proj1", "Proj2", "Proj3"]);
        let filter = ProjectFilter::new("Study Name");
        filter
            .apply_filter(&mut table, &Project::named("Proj2"))
            .unwrap();
        assert_eq!(table.drawn().rows.len(), 1);
        filter.apply_filter(&mut table, &Project::All).unwrap();
        assert_eq!(table.drawn().rows.len(), 3);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn missing_project_column_is_reported() {
        let mut table = DataTable::new();
        table.load(vec!["Species".to_string()], vec![vec![json!("Human")]]);
        let filter = ProjectFilter::new("Study Name");
        assert_eq!(filter.derive_projects(&table), vec![Project::All]);
        let err = filter
            .apply_filter(&mut table, &Project::named("Proj1"))
            .unwrap_err();
        assert_matches!(err, PageError::UnknownColumn(_));
    }
}
