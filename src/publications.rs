use serde::Serialize;

use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationLink {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum PublicationsPanel {
    #[default]
    Empty,
    Pending(Vec<String>),
    Service(String),
    Fallback(Vec<PublicationLink>),
}

impl PublicationsPanel {
    pub fn from_lookup(
        pubmed_ids: &[String],
        result: Result<String, PageError>,
        url_template: &str,
    ) -> Self {
        match result {
            Ok(html) if !html.trim().is_empty() => PublicationsPanel::Service(html),
            Ok(_) => {
                tracing::debug!("references service returned nothing; rendering links");
                Self::fallback(pubmed_ids, url_template)
            }
            Err(err) => {
                tracing::warn!(error = %err, "references lookup failed; rendering links");
                Self::fallback(pubmed_ids, url_template)
            }
        }
    }

    pub fn fallback(pubmed_ids: &[String], url_template: &str) -> Self {
        PublicationsPanel::Fallback(
            pubmed_ids
                .iter()
                .map(|id| PublicationLink {
                    id: id.clone(),
                    url: url_template.replace("{id}", id),
                })
                .collect(),
        )
    }

    pub fn to_html(&self) -> String {
        match self {
            PublicationsPanel::Empty | PublicationsPanel::Pending(_) => String::new(),
            PublicationsPanel::Service(html) => format!("<h3>Publications</h3>{html}"),
            PublicationsPanel::Fallback(links) => {
                let items = links
                    .iter()
                    .map(|link| {
                        format!(
                            "<li><a href=\"{}\">{}</a></li>",
                            escape_html(&link.url),
                            escape_html(&link.id)
                        )
                    })
                    .collect::<String>();
                format!("<h3>Publications</h3><ul>{items}</ul>")
            }
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
