use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PageError;

pub const ALL_PROJECTS: &str = "All Projects";

static ACCESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3,4}[0-9]{4,}$").expect("valid accession regex"));

pub fn is_valid_accession(value: &str) -> bool {
    ACCESSION_RE.is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accession(String);

impl Accession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Accession {
    type Err = PageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !is_valid_accession(value) {
            return Err(PageError::MalformedAccession(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Project {
    #[default]
    All,
    Named(String),
}

impl Project {
    pub fn named(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == ALL_PROJECTS {
            Project::All
        } else {
            Project::Named(value)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Project::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Project::All => ALL_PROJECTS,
            Project::Named(name) => name,
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Project {
    fn from(value: &str) -> Self {
        Project::named(value)
    }
}

impl Serialize for Project {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Project {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Project::named(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub species: String,
    #[serde(default)]
    pub project: Project,
}

impl Selection {
    pub fn new(species: impl Into<String>, project: Project) -> Self {
        Self {
            species: species.into(),
            project,
        }
    }

    pub fn all_projects(species: impl Into<String>) -> Self {
        Self::new(species, Project::All)
    }

    pub fn with_project(&self, project: Project) -> Self {
        Self {
            species: self.species.clone(),
            project,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.species, self.project)
    }
}

pub fn species_filename(species: &str) -> String {
    let mut slug = String::with_capacity(species.len());
    let mut pending_sep = false;
    for ch in species.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    format!("{slug}.json")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accession_pattern_bounds() {
        assert!(is_valid_accession("ERP0001"));
        assert!(is_valid_accession("ERRR123456"));
        assert!(!is_valid_accession("ER0001"));
        assert!(!is_valid_accession("ERRRR0001"));
        assert!(!is_valid_accession("ERP001"));
        assert!(!is_valid_accession("erp0001"));
        assert!(!is_valid_accession(" ERP0001"));
        assert!(!is_valid_accession("ERP0001x"));
        assert!(!is_valid_accession(""));
    }

    #[test]
    fn parse_accession_invalid() {
        let err = "not-an-accession".parse::<Accession>().unwrap_err();
        assert_matches!(err, PageError::MalformedAccession(_));
    }

    #[test]
    fn project_sentinel_maps_to_all() {
        assert_eq!(Project::named("All Projects"), Project::All);
        assert_eq!(Project::named("Proj1").as_str(), "Proj1");
        assert_eq!(Project::All.to_string(), ALL_PROJECTS);
    }

    #[test]
    fn species_filename_slugifies() {
        assert_eq!(
            species_filename("Staphylococcus aureus"),
            "staphylococcus_aureus.json"
        );
        assert_eq!(species_filename("  E. coli (K-12) "), "e_coli_k_12.json");
        assert_eq!(species_filename("Human"), "human.json");
    }
}
