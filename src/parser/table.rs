use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.wikitable").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

// ── Views the row normalizer works against ──

pub trait TableView {
    type Row: RowView;
    fn rows(&self) -> Vec<Self::Row>;
}

pub trait RowView {
    type Cell: CellView;
    fn cells(&self) -> Vec<Self::Cell>;
}

pub trait CellView {
    /// All text inside the cell, untrimmed.
    fn text(&self) -> String;
    /// Text of the first link in the cell, if there is a link.
    fn first_link_text(&self) -> Option<String>;
    /// `href` of the first link in the cell, as written in the page.
    fn first_link_href(&self) -> Option<String>;
}

// ── scraper-backed implementation ──

/// A parsed page. Tables borrow from it, so keep it alive while reading rows.
pub struct WikiDocument {
    html: Html,
}

impl WikiDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Every `wikitable` in document order. Pages without one give an empty list.
    pub fn tables(&self) -> Vec<HtmlTable<'_>> {
        self.html.select(&TABLE_SEL).map(HtmlTable).collect()
    }
}

#[derive(Clone, Copy)]
pub struct HtmlTable<'a>(ElementRef<'a>);

#[derive(Clone, Copy)]
pub struct HtmlRow<'a>(ElementRef<'a>);

#[derive(Clone, Copy)]
pub struct HtmlCell<'a>(ElementRef<'a>);

impl<'a> TableView for HtmlTable<'a> {
    type Row = HtmlRow<'a>;

    fn rows(&self) -> Vec<HtmlRow<'a>> {
        self.0.select(&ROW_SEL).map(HtmlRow).collect()
    }
}

impl<'a> RowView for HtmlRow<'a> {
    type Cell = HtmlCell<'a>;

    fn cells(&self) -> Vec<HtmlCell<'a>> {
        self.0.select(&CELL_SEL).map(HtmlCell).collect()
    }
}

impl<'a> HtmlCell<'a> {
    fn first_link(&self) -> Option<ElementRef<'a>> {
        self.0.select(&LINK_SEL).next()
    }
}

impl CellView for HtmlCell<'_> {
    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn first_link_text(&self) -> Option<String> {
        self.first_link().map(|a| a.text().collect())
    }

    fn first_link_href(&self) -> Option<String> {
        self.first_link()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="infobox"><tr><td>Not a data table</td><td>x</td></tr></table>
        <table class="wikitable sortable">
          <tr><th>Title</th><th>Director</th></tr>
          <tr><td><i><a href="/wiki/Dune:_Part_Two">Dune: Part Two</a></i></td><td>Denis Villeneuve</td></tr>
          <tr><td>Plain <b>title</b></td></tr>
        </table>
        <table class="wikitable"><tr><td>Second table</td></tr></table>
        </body></html>"#;

    #[test]
    fn finds_only_wikitables() {
        let doc = WikiDocument::parse(PAGE);
        assert_eq!(doc.tables().len(), 2);
    }

    #[test]
    fn header_rows_have_no_cells() {
        let doc = WikiDocument::parse(PAGE);
        let rows = doc.tables()[0].rows();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].cells().is_empty());
        assert_eq!(rows[1].cells().len(), 2);
        assert_eq!(rows[2].cells().len(), 1);
    }

    #[test]
    fn cell_exposes_text_and_first_link() {
        let doc = WikiDocument::parse(PAGE);
        let rows = doc.tables()[0].rows();

        let linked = rows[1].cells()[0];
        assert_eq!(linked.text(), "Dune: Part Two");
        assert_eq!(linked.first_link_text().as_deref(), Some("Dune: Part Two"));
        assert_eq!(linked.first_link_href().as_deref(), Some("/wiki/Dune:_Part_Two"));

        let plain = rows[2].cells()[0];
        assert_eq!(plain.text(), "Plain title");
        assert_eq!(plain.first_link_text(), None);
        assert_eq!(plain.first_link_href(), None);
    }

    #[test]
    fn link_without_href() {
        let doc = WikiDocument::parse(
            r#"<table class="wikitable"><tr><td><a name="x">Anchor</a></td></tr></table>"#,
        );
        let cell = doc.tables()[0].rows()[0].cells()[0];
        assert_eq!(cell.first_link_text().as_deref(), Some("Anchor"));
        assert_eq!(cell.first_link_href(), None);
    }

    #[test]
    fn garbage_and_empty_input_yield_no_tables() {
        assert!(WikiDocument::parse("").tables().is_empty());
        assert!(WikiDocument::parse("<<<not html at all").tables().is_empty());
        assert!(WikiDocument::parse("<table><tr><td>a</td></tr></table>")
            .tables()
            .is_empty());
    }
}
