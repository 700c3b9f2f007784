use crate::model::cell::Cell;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of a channel detail table, keyed by the detail table's columns
pub type DetailRow = IndexMap<String, Cell>;

/// One logical channel, assembled from a primary row and its continuation rows
///
/// Columns keep the order in which the source table's header named them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Summary table columns
    pub columns: IndexMap<String, Cell>,

    /// Detail page linked from the name column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_page_url: Option<String>,

    /// Rows merged in from the detail page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detail_records: Vec<DetailRow>,

    /// Why the detail page could not be merged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_error: Option<String>,
}

impl ChannelRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no cell has been mapped into the record yet
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.detail_page_url.is_none()
    }

    /// Returns the cell stored under `column`
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns.get(column)
    }

    /// Returns the trimmed, non-empty text of the name column
    pub fn name(&self, name_column: &str) -> Option<&str> {
        self.columns
            .get(name_column)
            .map(|cell| cell.text().trim())
            .filter(|name| !name.is_empty())
    }

    /// Folds one source cell into `column`
    ///
    /// A column seen for the first time takes the cell as is. An occupied
    /// column concatenates the new text, and a link upgrades it to a link
    /// cell pointing at the new target.
    pub fn merge_cell(&mut self, column: &str, text: &str, href: Option<String>) {
        match self.columns.get_mut(column) {
            Some(cell) => match href {
                Some(href) => cell.merge_link(text, href),
                None => cell.merge_text(text),
            },
            None => {
                let cell = match href {
                    Some(href) => Cell::link(text, href),
                    None => Cell::text_cell(text),
                };
                self.columns.insert(column.to_string(), cell);
            }
        }
    }

    /// Merges detail page rows into the record
    ///
    /// A non-empty merge makes the detail rows authoritative: every summary
    /// column other than those in `keep` is dropped. An empty merge changes
    /// nothing. Returns true if the rows were merged.
    pub fn attach_details(&mut self, rows: Vec<DetailRow>, keep: &[&str]) -> bool {
        if rows.is_empty() {
            return false;
        }

        self.columns.retain(|column, _| keep.contains(&column.as_str()));
        self.detail_records = rows;
        self.detail_error = None;
        true
    }

    /// Records a detail page failure, keeping all summary columns
    pub fn record_detail_failure(&mut self, message: impl Into<String>) {
        self.detail_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ChannelRecord {
        let mut record = ChannelRecord::new();
        record.merge_cell("Logo", "", None);
        record.merge_cell(
            "Channel Name",
            "NHK-G",
            Some("http://x/tvchannels/jp/NHK.html".to_string()),
        );
        record.merge_cell("Position", "110.0°E", None);
        record.merge_cell("Beam", "Japan", None);
        record
    }

    #[test]
    fn test_merge_cell_inserts_and_concatenates() {
        let mut record = record();
        record.merge_cell("Beam", "Asia", None);
        assert_eq!(record.get("Beam"), Some(&Cell::from("Japan, Asia")));
    }

    #[test]
    fn test_columns_keep_header_order() {
        let record = record();
        let columns: Vec<&str> = record.columns.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Logo", "Channel Name", "Position", "Beam"]);
    }

    #[test]
    fn test_name_requires_text() {
        let record = record();
        assert_eq!(record.name("Channel Name"), Some("NHK-G"));

        let mut nameless = ChannelRecord::new();
        nameless.merge_cell("Channel Name", "   ", None);
        nameless.merge_cell("Beam", "Asia", None);
        assert_eq!(nameless.name("Channel Name"), None);
    }

    #[test]
    fn test_attach_details_drops_summary_columns() {
        let mut record = record();
        let mut row = DetailRow::new();
        row.insert("Satellite".to_string(), Cell::from("BSAT-4a"));

        assert!(record.attach_details(vec![row], &["Channel Name", "Logo"]));
        let columns: Vec<&str> = record.columns.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Logo", "Channel Name"]);
        assert_eq!(record.detail_records.len(), 1);
    }

    #[test]
    fn test_attach_empty_details_keeps_columns() {
        let mut record = record();
        assert!(!record.attach_details(vec![], &["Channel Name", "Logo"]));
        assert_eq!(record.columns.len(), 4);
    }

    #[test]
    fn test_detail_failure_keeps_columns() {
        let mut record = record();
        record.record_detail_failure("no detail table");
        assert_eq!(record.columns.len(), 4);
        assert_eq!(record.detail_error.as_deref(), Some("no detail table"));
    }
}
