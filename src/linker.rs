use crate::domain::is_valid_accession;
use crate::table::{ColumnSchema, DrawHook, DrawnTable};

pub const ACCESSION_COLUMNS: [&str; 3] = ["Study Accession", "Run Accession", "Sample Accession"];

#[derive(Debug, Clone)]
pub struct AccessionLinker {
    url_template: String,
}

impl AccessionLinker {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    pub fn record_url(&self, accession: &str) -> String {
        self.url_template.replace("{accession}", accession)
    }
}

impl DrawHook for AccessionLinker {
    fn after_draw(&self, schema: &ColumnSchema, drawn: &mut DrawnTable) {
        let columns = ACCESSION_COLUMNS
            .iter()
            .filter_map(|label| schema.index_of(label))
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return;
        }
        for row in &mut drawn.rows {
            for &column in &columns {
                if let Some(cell) = row.get_mut(column) {
                    if is_valid_accession(&cell.text) {
                        cell.href = Some(self.record_url(&cell.text));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::DataTable;

    #[test]
    fn links_only_valid_accessions_in_accession_columns() {
        let mut table = DataTable::new();
        table.attach_hook(Box::new(AccessionLinker::new(
            "http://www.ebi.ac.uk/ena/data/view/{accession}",
        )));
        table.load(
            vec![
                "Run Accession".to_string(),
                "Study Name".to_string(),
                "Study Accession".to_string(),
            ],
            vec![
                vec![json!("ERR0001"), json!("ERP0002"), json!("pending")],
                vec![json!("ERR12"), json!("x"), json!("ERP123456")],
            ],
        );
        table.draw();

        let rows = &table.drawn().rows;
        assert_eq!(
            rows[0][0].href.as_deref(),
            Some("http://www.ebi.ac.uk/ena/data/view/ERR0001")
        );
        assert_eq!(rows[0][1].href, None);
        assert_eq!(rows[0][2].href, None);
        assert_eq!(rows[1][0].href, None);
        assert_eq!(
            rows[1][2].href.as_deref(),
            Some("http://www.ebi.ac.uk/ena/data/view/ERP123456")
        );
    }
}
