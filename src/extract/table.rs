//! Table row model and column schema

/// One cell as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Whitespace-collapsed visible text
    pub text: String,
    /// Raw `href` of the first anchor in the cell, unresolved
    pub href: Option<String>,
}

impl RawCell {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
        }
    }

    pub fn link(text: &str, href: &str) -> Self {
        Self {
            text: text.to_string(),
            href: Some(href.to_string()),
        }
    }

    /// Returns true if the cell shows no text
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// One table row as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// Whitespace-collapsed visible text of the whole row
    pub text: String,
    pub cells: Vec<RawCell>,
}

impl TableRow {
    /// Builds a row from cells, deriving the row text from them
    pub fn from_cells(cells: Vec<RawCell>) -> Self {
        let text = cells
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, cells }
    }

    /// Number of cells showing text
    pub fn non_empty_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }
}

/// Ordered column names of one table, taken from its header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    /// Derives the schema from a header row
    ///
    /// Each cell's text names a column. Blank headers get placeholders: the
    /// second column (the satellite link on this site) becomes `Sat link`,
    /// any other becomes `Empty {n}` with its 1-based position.
    pub fn from_header(cells: &[RawCell]) -> Self {
        let columns = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| header_name(index, &cell.text))
            .collect();
        Self { columns }
    }

    /// Builds a schema from explicit column names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            columns: names.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First column a short row of `cell_count` cells maps to
    ///
    /// Short rows omit leading columns, never trailing ones, so their cells
    /// are anchored to the right end of the schema.
    pub fn continuation_offset(&self, cell_count: usize) -> usize {
        self.columns.len().saturating_sub(cell_count)
    }
}

fn header_name(index: usize, text: &str) -> String {
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    if index == 1 {
        "Sat link".to_string()
    } else {
        format!("Empty {}", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_placeholders() {
        let schema = ColumnSchema::from_header(&[
            RawCell::text(""),
            RawCell::text(""),
            RawCell::text("Channel Name"),
            RawCell::text(""),
        ]);
        assert_eq!(
            schema.columns(),
            &["Empty 1", "Sat link", "Channel Name", "Empty 4"]
        );
    }

    #[test]
    fn test_continuation_offset() {
        let schema = ColumnSchema::from_names(&["A", "B", "C", "D"]);
        assert_eq!(schema.continuation_offset(2), 2);
        assert_eq!(schema.continuation_offset(1), 3);
        assert_eq!(schema.continuation_offset(6), 0);
    }

    #[test]
    fn test_row_text_and_counts() {
        let row = TableRow::from_cells(vec![
            RawCell::text(""),
            RawCell::link("NHK", "/x.html"),
            RawCell::text("Japan"),
        ]);
        assert_eq!(row.text, "NHK Japan");
        assert_eq!(row.non_empty_cells(), 2);
    }
}
