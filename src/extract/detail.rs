//! Channel detail page parsing

use crate::config::SiteProfile;
use crate::extract::dom::{find_table, read_rows};
use crate::extract::predicates::{is_decorative_row, is_detail_table, is_self_referential_row};
use crate::extract::table::{ColumnSchema, TableRow};
use crate::model::{Cell, DetailRow};
use crate::url::resolve_href;
use scraper::Html;
use thiserror::Error;
use url::Url;

/// Why a detail page yielded no rows
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error("no transmission table on page")]
    TableNotFound,

    #[error("transmission table has no header columns")]
    EmptySchema,

    #[error("transmission table has no data rows")]
    NoRows,

    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl DetailError {
    /// Archived pages sometimes come back truncated, so a missing or empty
    /// table is worth another fetch. Transport failures were already retried
    /// by the gateway.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Fetch(_))
    }
}

/// Parses the transmission table of a channel detail page
///
/// Decorative rows (two or fewer non-empty cells) and footer rows mentioning
/// the site's own domain are dropped first; the first remaining row is the
/// header. Linked cells become two entries, `"{column} text"` and
/// `"{column} url"`.
pub fn parse_detail_page(
    document: &Html,
    base_url: &Url,
    profile: &SiteProfile,
) -> Result<Vec<DetailRow>, DetailError> {
    let table = find_table(document, |text| is_detail_table(text, profile))
        .ok_or(DetailError::TableNotFound)?;

    let mut rows = read_rows(table).into_iter().filter(|row| {
        !is_decorative_row(row.non_empty_cells())
            && !is_self_referential_row(&row.text, &profile.site_domain)
    });

    let header = rows.next().ok_or(DetailError::NoRows)?;
    let schema = ColumnSchema::from_header(&header.cells);
    if schema.is_empty() {
        return Err(DetailError::EmptySchema);
    }

    let records: Vec<DetailRow> = rows
        .map(|row| map_row(&schema, &row, base_url))
        .filter(|record| !record.is_empty())
        .collect();

    if records.is_empty() {
        return Err(DetailError::NoRows);
    }
    Ok(records)
}

fn map_row(schema: &ColumnSchema, row: &TableRow, base_url: &Url) -> DetailRow {
    let mut record = DetailRow::new();

    for (index, cell) in row.cells.iter().enumerate() {
        let Some(column) = schema.name(index) else {
            break;
        };

        let url = cell
            .href
            .as_deref()
            .and_then(|href| resolve_href(base_url, href).ok());

        match url {
            Some(url) => {
                fold_into(&mut record, format!("{} text", column), &cell.text);
                fold_into(&mut record, format!("{} url", column), url.as_str());
            }
            None => fold_into(&mut record, column.to_string(), &cell.text),
        }
    }

    record
}

/// Repeated header names share one entry, values joined
fn fold_into(record: &mut DetailRow, key: String, text: &str) {
    match record.get_mut(&key) {
        Some(existing) => existing.merge_text(text),
        None => {
            record.insert(key, Cell::text_cell(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse(
            "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/tvchannels/jp/NHK.html",
        )
        .unwrap()
    }

    const DETAIL_PAGE: &str = r#"<html><body>
        <table>
          <tr><td colspan="6">NHK-G</td></tr>
          <tr><td>Position</td><td>Satellite</td><td>Frequency</td><td>System</td></tr>
          <tr><td>110.0°E</td><td><a href="/BSAT-3A.html">BSAT 3A</a></td><td>11727 R</td><td>ISDB</td></tr>
          <tr><td>128.0°E</td><td><a href="/JCSAT-3A.html">JCSAT 3A</a></td><td>12523 V</td><td>DVB-S2</td></tr>
          <tr><td>Copyright LyngSat.com</td><td>2015</td><td>all rights</td></tr>
        </table>
    </body></html>"#;

    #[test]
    fn test_parse_detail_page() {
        let document = Html::parse_document(DETAIL_PAGE);
        let rows = parse_detail_page(&document, &base_url(), &SiteProfile::default()).unwrap();

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.get("Position"), Some(&Cell::from("110.0°E")));
        assert_eq!(first.get("Satellite text"), Some(&Cell::from("BSAT 3A")));
        assert_eq!(
            first.get("Satellite url"),
            Some(&Cell::from(
                "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/BSAT-3A.html"
            ))
        );
        assert!(first.get("Satellite").is_none());
        assert_eq!(first.get("System"), Some(&Cell::from("ISDB")));
    }

    #[test]
    fn test_repeated_detail_column_folds() {
        let html = r#"<html><body><table>
            <tr><td>Position</td><td>Satellite</td><td>Frequency</td><td>Frequency</td></tr>
            <tr><td>110.0°E</td><td>BSAT 3A</td><td>11727 R</td><td>11766 R</td></tr>
        </table></body></html>"#;
        let document = Html::parse_document(html);

        let rows = parse_detail_page(&document, &base_url(), &SiteProfile::default()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].get("Frequency"), Some(&Cell::from("11727 R, 11766 R")));
    }

    #[test]
    fn test_detail_table_missing() {
        let html = r#"<html><body><table><tr><td>Colour legend</td><td>Position</td><td>Satellite</td></tr></table></body></html>"#;
        let document = Html::parse_document(html);
        let result = parse_detail_page(&document, &base_url(), &SiteProfile::default());
        assert_eq!(result, Err(DetailError::TableNotFound));
    }

    #[test]
    fn test_detail_table_without_data_rows() {
        let html = r#"<html><body><table>
            <tr><td>Position</td><td>Satellite</td><td>Frequency</td></tr>
        </table></body></html>"#;
        let document = Html::parse_document(html);
        let result = parse_detail_page(&document, &base_url(), &SiteProfile::default());
        assert_eq!(result, Err(DetailError::NoRows));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(DetailError::TableNotFound.is_retryable());
        assert!(DetailError::NoRows.is_retryable());
        assert!(!DetailError::Fetch("timeout".to_string()).is_retryable());
    }
}
