use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnSchema {
    pub fn new(labels: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            index.entry(label.clone()).or_insert(position);
        }
        Self { labels, index }
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Cell {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawnTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Runs after every redraw, for the lifetime of the table.
pub trait DrawHook {
    fn after_draw(&self, schema: &ColumnSchema, drawn: &mut DrawnTable);
}

#[derive(Debug, Clone)]
struct ColumnSearch {
    column: usize,
    pattern: Regex,
}

#[derive(Default)]
pub struct DataTable {
    schema: ColumnSchema,
    rows: Vec<Vec<String>>,
    search: Option<ColumnSearch>,
    hooks: Vec<Box<dyn DrawHook>>,
    drawn: DrawnTable,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, columns: Vec<String>, rows: Vec<Vec<Value>>) {
        let width = columns.len();
        self.schema = ColumnSchema::new(columns);
        self.rows = rows
            .into_iter()
            .map(|row| {
                let mut cells = row.iter().map(cell_text).collect::<Vec<_>>();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        self.search = None;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.search = None;
    }

    pub fn attach_hook(&mut self, hook: Box<dyn DrawHook>) {
        self.hooks.push(hook);
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter().filter(|row| match &self.search {
            Some(search) => row
                .get(search.column)
                .is_some_and(|value| search.pattern.is_match(value)),
            None => true,
        })
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn distinct_values(&self, column: usize) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .cloned()
            .collect()
    }

    pub fn search_column(&mut self, column: usize, pattern: Option<Regex>) {
        self.search = pattern.map(|pattern| ColumnSearch { column, pattern });
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    pub fn draw(&mut self) {
        let mut drawn = DrawnTable {
            columns: self.schema.labels().to_vec(),
            rows: self
                .visible_rows()
                .map(|row| row.iter().map(|value| Cell::plain(value)).collect())
                .collect(),
        };
        for hook in &self.hooks {
            hook.after_draw(&self.schema, &mut drawn);
        }
        self.drawn = drawn;
    }

    pub fn drawn(&self) -> &DrawnTable {
        &self.drawn
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
