//! Small helpers over `scraper` element trees

use crate::extract::table::{RawCell, TableRow};
use scraper::{ElementRef, Html, Selector};

/// Parses a CSS selector, yielding `None` for an invalid one
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collapses runs of whitespace (including non-breaking spaces) and trims
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the visible text of an element, whitespace-collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Returns the text of an element's direct text nodes, ignoring child elements
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    collapse_whitespace(&text)
}

/// Returns the first `href` of an anchor inside `element`
pub(crate) fn first_href(element: ElementRef<'_>) -> Option<String> {
    let anchor = selector("a[href]")?;
    element
        .select(&anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Returns true if `inner` lies strictly inside `outer`
fn is_descendant(inner: ElementRef<'_>, outer: ElementRef<'_>) -> bool {
    inner.ancestors().any(|node| node.id() == outer.id())
}

/// Finds the innermost table whose text satisfies `predicate`
///
/// Layout tables wrap the data tables on this site, so an outer table whose
/// text happens to qualify is skipped in favour of the qualifying table it
/// contains.
pub(crate) fn find_table<'a>(
    document: &'a Html,
    predicate: impl Fn(&str) -> bool,
) -> Option<ElementRef<'a>> {
    let table_selector = selector("table")?;
    let candidates: Vec<ElementRef<'a>> = document
        .select(&table_selector)
        .filter(|table| predicate(&table.text().collect::<String>()))
        .collect();

    candidates
        .iter()
        .find(|table| {
            !candidates
                .iter()
                .any(|other| other.id() != table.id() && is_descendant(*other, **table))
        })
        .copied()
}

/// Returns the rows that belong to `table` itself, not to nested tables
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Some(row_selector) = selector("tr") else {
        return Vec::new();
    };

    table
        .select(&row_selector)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|ancestor| ancestor.value().name() == "table")
                .map(|nearest| nearest.id() == table.id())
                .unwrap_or(false)
        })
        .collect()
}

/// Reads the rows of a table into plain cell data, in document order
pub(crate) fn read_rows(table: ElementRef<'_>) -> Vec<TableRow> {
    own_rows(table)
        .into_iter()
        .map(|row| {
            let cells = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| RawCell {
                    text: element_text(cell),
                    href: first_href(cell),
                })
                .collect();

            TableRow {
                text: element_text(row),
                cells,
            }
        })
        .collect()
}
