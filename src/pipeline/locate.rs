use crate::error::{EtlError, Result};
use crate::types::{RawCell, RawPage, RawRow};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

/// Class markers identifying the target `<table>`; every marker must be present.
#[derive(Debug, Clone)]
pub struct TableSignature {
    classes: Vec<String>,
}

impl TableSignature {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// CSS form, e.g. `table.sortable.sticky-header`.
    pub fn css(&self) -> String {
        let mut css = String::from("table");
        for class in &self.classes {
            css.push('.');
            css.push_str(class.trim());
        }
        css
    }
}

/// Finds the first table matching `signature` and reduces each `<tr>` to its `<td>` cells.
///
/// Header rows are kept as empty rows so row positions stay aligned with the document.
#[instrument(skip(page), fields(url = %page.url))]
pub fn locate_table(page: &RawPage, signature: &TableSignature) -> Result<Vec<RawRow>> {
    let css = signature.css();
    let table_selector = Selector::parse(&css)
        .map_err(|e| EtlError::Config(format!("invalid table signature `{}`: {:?}", css, e)))?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let img_selector = selector("img")?;

    let document = Html::parse_document(&page.html);
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| EtlError::TableNotFound { signature: css.clone() })?;

    let rows: Vec<RawRow> = table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| reduce_cell(cell, &img_selector))
                .collect()
        })
        .collect();

    debug!(
        header_rows = rows.iter().filter(|r| r.is_empty()).count(),
        "Located table rows"
    );
    info!("Found {} rows in table `{}`", rows.len(), css);
    Ok(rows)
}

fn reduce_cell(cell: ElementRef<'_>, img_selector: &Selector) -> RawCell {
    RawCell {
        text: cell.text().collect::<String>(),
        image_src: cell
            .select(img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Config(format!("invalid selector `{}`: {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn page(html: &str) -> RawPage {
        RawPage {
            url: "https://example.org/wiki".to_string(),
            html: html.to_string(),
        }
    }

    fn signature() -> TableSignature {
        TableSignature::new(["sortable", "sticky-header"])
    }

    #[test]
    fn picks_first_table_carrying_all_markers() {
        let html = r#"
            <table class="wikitable sortable"><tr><td>wrong</td></tr></table>
            <table class="wikitable sortable sticky-header">
              <tr><th>Stadium</th><th>Capacity</th></tr>
              <tr><td>Right</td><td><img src="//img/a.jpg"></td></tr>
            </table>
            <table class="sortable sticky-header"><tr><td>later</td></tr></table>
        "#;
        let rows = locate_table(&page(html), &signature()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1][0].text, "Right");
        assert_eq!(rows[1][1].image_src.as_deref(), Some("//img/a.jpg"));
        assert_eq!(rows[1][0].image_src, None);
    }

    #[test]
    fn no_match_is_table_not_found() {
        let err = locate_table(&page("<table class=\"wikitable\"></table>"), &signature())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TableNotFound);
        assert!(err.to_string().contains("table.sortable.sticky-header"));
    }

    #[test]
    fn cell_text_spans_nested_markup() {
        let html = r#"<table class="sortable sticky-header">
            <tr><td><a href="/x">Camp</a> Nou<sup>[1]</sup></td></tr>
        </table>"#;
        let rows = locate_table(&page(html), &signature()).unwrap();
        assert_eq!(rows[0][0].text, "Camp Nou[1]");
    }
}
