//! Fixed-schema content extraction from a rendered HTML snapshot.
//!
//! Every field is best effort: a missing element yields an empty field,
//! never an error.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Heading texts grouped by level. All six levels are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    pub fn levels(&self) -> [(&'static str, &[String]); 6] {
        [
            ("h1", self.h1.as_slice()),
            ("h2", self.h2.as_slice()),
            ("h3", self.h3.as_slice()),
            ("h4", self.h4.as_slice()),
            ("h5", self.h5.as_slice()),
            ("h6", self.h6.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.levels().iter().all(|(_, items)| items.is_empty())
    }
}

/// Structured content of one page.
///
/// Serializes to the `{title, meta_description, canonical_url, paragraphs,
/// headings, links, lists, tables, images_alt}` JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub title: String,
    pub meta_description: String,
    pub canonical_url: String,
    pub paragraphs: Vec<String>,
    pub headings: Headings,
    pub links: Vec<String>,
    #[serde(rename = "lists")]
    pub list_items: Vec<String>,
    /// Row-major cell grids; never contains an empty row or an empty table.
    pub tables: Vec<Vec<Vec<String>>>,
    #[serde(rename = "images_alt")]
    pub image_alt_texts: Vec<String>,
}

impl ExtractedPage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Flattened, human-readable form.
    ///
    /// Section headers carry a leading newline so that printing one entry per
    /// line leaves a blank line before each section.
    pub fn to_lines(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.title.is_empty() {
            parts.push(format!("Title: {}", self.title));
        }
        if !self.meta_description.is_empty() {
            parts.push(format!("Meta Description: {}", self.meta_description));
        }
        if !self.canonical_url.is_empty() {
            parts.push(format!("Canonical URL: {}", self.canonical_url));
        }
        if !self.paragraphs.is_empty() {
            parts.push("\nParagraphs:".to_string());
            parts.extend(self.paragraphs.iter().cloned());
        }
        if !self.headings.is_empty() {
            parts.push("\nHeadings:".to_string());
            for (tag, items) in self.headings.levels() {
                if !items.is_empty() {
                    parts.push(format!("{tag}: {}", items.join(", ")));
                }
            }
        }
        if !self.list_items.is_empty() {
            parts.push("\nLists:".to_string());
            parts.extend(self.list_items.iter().cloned());
        }
        if !self.tables.is_empty() {
            parts.push("\nTables:".to_string());
            for row in self.tables.iter().flatten() {
                parts.push(row.join(" | "));
            }
        }
        if !self.image_alt_texts.is_empty() {
            parts.push("\nImage Alt Texts:".to_string());
            parts.extend(self.image_alt_texts.iter().cloned());
        }
        if !self.links.is_empty() {
            parts.push("\nLinks:".to_string());
            parts.extend(self.links.iter().cloned());
        }
        parts
    }
}

/// Parse `html` and extract the fixed schema.
pub fn extract_page(html: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);

    ExtractedPage {
        title: first(&doc, "title").map(element_text).unwrap_or_default(),
        meta_description: first(&doc, r#"meta[name="description"]"#)
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default(),
        canonical_url: first(&doc, r#"link[rel~="canonical"]"#)
            .and_then(|l| l.value().attr("href"))
            .map(str::to_string)
            .unwrap_or_default(),
        paragraphs: texts(&doc, "p"),
        headings: Headings {
            h1: texts(&doc, "h1"),
            h2: texts(&doc, "h2"),
            h3: texts(&doc, "h3"),
            h4: texts(&doc, "h4"),
            h5: texts(&doc, "h5"),
            h6: texts(&doc, "h6"),
        },
        links: select(&doc, "a[href]")
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
        list_items: texts(&doc, "li"),
        tables: tables(&doc),
        image_alt_texts: select(&doc, "img[alt]")
            .filter_map(|img| img.value().attr("alt"))
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

fn tables(doc: &Html) -> Vec<Vec<Vec<String>>> {
    let (Ok(tr), Ok(cell)) = (Selector::parse("tr"), Selector::parse("td, th")) else {
        return Vec::new();
    };
    select(doc, "table")
        .map(|table| {
            table
                .select(&tr)
                .map(|row| row.select(&cell).map(element_text).collect::<Vec<_>>())
                .filter(|cells| !cells.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|rows| !rows.is_empty())
        .collect()
}

/// Descendant text with whitespace runs collapsed and the ends trimmed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn texts(doc: &Html, css: &str) -> Vec<String> {
    select(doc, css)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

fn first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    select(doc, css).next()
}

fn select<'a>(doc: &'a Html, css: &str) -> std::vec::IntoIter<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => doc.select(&sel).collect::<Vec<_>>().into_iter(),
        Err(e) => {
            tracing::warn!(target: "web.extract", css, error = ?e, "extract.selector.invalid");
            Vec::new().into_iter()
        }
    }
}
