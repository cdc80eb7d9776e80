//! Landscape US-Letter table report.
//!
//! Rendering happens in two steps: [`layout`] decides what goes on which page
//! (pure, no PDF types involved) and [`draw`] paints that plan with
//! `printpdf`. The table flows across as many pages as needed; the header
//! row, when enabled, sits at the top of the first page only.

use printpdf::path::PaintMode;
use printpdf::*;
use querydrop_core::ResultSet;

use crate::error::{RenderError, Result};

pub const NO_DATA_TEXT: &str = "No data returned by the query.";
const ELLIPSIS: &str = "...";

// Geometry in points (1/72 in). Landscape letter with 1 inch margins.
const PAGE_WIDTH: f32 = 792.0;
const PAGE_HEIGHT: f32 = 612.0;
const MARGIN: f32 = 72.0;
const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FRAME_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;

const FONT_SIZE: f32 = 10.0;
const LEADING: f32 = 12.0;
const PAD_X: f32 = 6.0;
const PAD_TOP: f32 = 3.0;
const PAD_BOTTOM: f32 = 3.0;
const HEADER_PAD_BOTTOM: f32 = 12.0;
const GRID_WIDTH: f32 = 1.0;
// Helvetica has no metrics available here; half an em per glyph is close
// enough for sizing and centring.
const GLYPH_WIDTH: f32 = 0.5 * FONT_SIZE;
const BOLD_GLYPH_WIDTH: f32 = 0.55 * FONT_SIZE;

pub const ROW_HEIGHT: f32 = LEADING + PAD_TOP + PAD_BOTTOM;
pub const HEADER_HEIGHT: f32 = LEADING + PAD_TOP + HEADER_PAD_BOTTOM;

const HEADER_BACKGROUND: (f32, f32, f32) = (0.5, 0.5, 0.5);
const HEADER_TEXT: (f32, f32, f32) = (0.961, 0.961, 0.961);
const BODY_BACKGROUND: (f32, f32, f32) = (0.961, 0.961, 0.863);
const BODY_TEXT: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GRID: (f32, f32, f32) = (0.0, 0.0, 0.0);

/// The slice of the table that lands on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Paragraph(String),
    Table(TableFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageContent>,
    /// Column widths in points, shared by every table fragment.
    pub column_widths: Vec<f32>,
}

impl DocumentLayout {
    pub fn has_table(&self) -> bool {
        self.pages.iter().any(|p| matches!(p, PageContent::Table(_)))
    }

    pub fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// Render `set` straight to PDF bytes.
pub fn to_pdf(set: &ResultSet, include_header: bool) -> Result<Vec<u8>> {
    draw(&layout(set, include_header))
}

/// Plan pages for `set`. An empty result set yields a single explanatory
/// paragraph and no table.
pub fn layout(set: &ResultSet, include_header: bool) -> DocumentLayout {
    if set.is_empty() {
        return DocumentLayout {
            pages: vec![PageContent::Paragraph(NO_DATA_TEXT.to_string())],
            column_widths: Vec::new(),
        };
    }

    let rows: Vec<Vec<String>> = set.text_rows().collect();
    let header = include_header.then(|| set.columns.clone());
    let column_widths = column_widths(header.as_deref(), &rows, set.column_count());
    let header = header.map(|h| fit_row(&h, &column_widths, BOLD_GLYPH_WIDTH));
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| fit_row(r, &column_widths, GLYPH_WIDTH))
        .collect();

    let mut pages = Vec::new();
    let mut current = TableFragment {
        header,
        rows: Vec::new(),
    };
    let mut used = if current.header.is_some() {
        HEADER_HEIGHT
    } else {
        0.0
    };

    for row in rows {
        if used + ROW_HEIGHT > FRAME_HEIGHT && !current.rows.is_empty() {
            pages.push(PageContent::Table(std::mem::replace(
                &mut current,
                TableFragment {
                    header: None,
                    rows: Vec::new(),
                },
            )));
            used = 0.0;
        }
        current.rows.push(row);
        used += ROW_HEIGHT;
    }
    pages.push(PageContent::Table(current));

    DocumentLayout {
        pages,
        column_widths,
    }
}

/// Natural width of each column from its longest cell, scaled down
/// proportionally when the table would overflow the frame.
fn column_widths(header: Option<&[String]>, rows: &[Vec<String>], columns: usize) -> Vec<f32> {
    let mut widths = vec![2.0 * PAD_X; columns];
    if let Some(header) = header {
        for (w, cell) in widths.iter_mut().zip(header) {
            *w = w.max(text_width(cell, BOLD_GLYPH_WIDTH) + 2.0 * PAD_X);
        }
    }
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = w.max(text_width(cell, GLYPH_WIDTH) + 2.0 * PAD_X);
        }
    }

    let total: f32 = widths.iter().sum();
    if total > FRAME_WIDTH {
        let scale = FRAME_WIDTH / total;
        widths.iter_mut().for_each(|w| *w *= scale);
    }
    widths
}

fn text_width(text: &str, glyph: f32) -> f32 {
    text.chars().count() as f32 * glyph
}

fn fit_row(cells: &[String], widths: &[f32], glyph: f32) -> Vec<String> {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| fit_cell(cell, width - 2.0 * PAD_X, glyph))
        .collect()
}

/// Cut `text` to fit `room` points, marking the cut with an ellipsis.
fn fit_cell(text: &str, room: f32, glyph: f32) -> String {
    if text_width(text, glyph) <= room + 0.01 {
        return text.to_string();
    }
    let fits = (room / glyph).floor().max(0.0) as usize;
    if fits <= ELLIPSIS.len() {
        return text.chars().take(fits).collect();
    }
    let mut out: String = text.chars().take(fits - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Paint a planned layout into a PDF document.
pub fn draw(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Query export", mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

    for (idx, content) in layout.pages.iter().enumerate() {
        let layer = if idx == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
            doc.get_page(page).get_layer(layer)
        };

        match content {
            PageContent::Paragraph(text) => {
                layer.set_fill_color(rgb(BODY_TEXT));
                layer.use_text(
                    text.as_str(),
                    FONT_SIZE,
                    mm(MARGIN),
                    mm(PAGE_HEIGHT - MARGIN - LEADING),
                    &regular,
                );
            }
            PageContent::Table(fragment) => {
                draw_table(&layer, fragment, &layout.column_widths, &regular, &bold);
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn draw_table(
    layer: &PdfLayerReference,
    fragment: &TableFragment,
    widths: &[f32],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let table_width: f32 = widths.iter().sum();
    let left = MARGIN + (FRAME_WIDTH - table_width).max(0.0) / 2.0;
    let mut top = PAGE_HEIGHT - MARGIN;

    layer.set_outline_color(rgb(GRID));
    layer.set_outline_thickness(GRID_WIDTH);

    if let Some(header) = &fragment.header {
        draw_row(layer, header, widths, left, top, &HEADER_STYLE, bold);
        top -= HEADER_STYLE.height;
    }
    for row in &fragment.rows {
        draw_row(layer, row, widths, left, top, &BODY_STYLE, regular);
        top -= BODY_STYLE.height;
    }
}

struct RowStyle {
    height: f32,
    pad_bottom: f32,
    background: (f32, f32, f32),
    text: (f32, f32, f32),
    glyph: f32,
}

const HEADER_STYLE: RowStyle = RowStyle {
    height: HEADER_HEIGHT,
    pad_bottom: HEADER_PAD_BOTTOM,
    background: HEADER_BACKGROUND,
    text: HEADER_TEXT,
    glyph: BOLD_GLYPH_WIDTH,
};

const BODY_STYLE: RowStyle = RowStyle {
    height: ROW_HEIGHT,
    pad_bottom: PAD_BOTTOM,
    background: BODY_BACKGROUND,
    text: BODY_TEXT,
    glyph: GLYPH_WIDTH,
};

fn draw_row(
    layer: &PdfLayerReference,
    cells: &[String],
    widths: &[f32],
    left: f32,
    top: f32,
    style: &RowStyle,
    font: &IndirectFontRef,
) {
    let bottom = top - style.height;
    let mut x = left;
    for (cell, width) in cells.iter().zip(widths) {
        layer.set_fill_color(rgb(style.background));
        layer.add_rect(
            Rect::new(mm(x), mm(bottom), mm(x + width), mm(top)).with_mode(PaintMode::FillStroke),
        );

        // Centre horizontally; baseline sits just above the bottom padding.
        let text_x = x + (width - text_width(cell, style.glyph)).max(0.0) / 2.0;
        let baseline = bottom + style.pad_bottom + (LEADING - FONT_SIZE);
        layer.set_fill_color(rgb(style.text));
        layer.use_text(cell.as_str(), FONT_SIZE, mm(text_x), mm(baseline), font);

        x += width;
    }
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn pdf_err(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use querydrop_core::Value;

    fn rows(n: usize) -> ResultSet {
        let mut set = ResultSet::new(vec!["id".into(), "label".into()]);
        for i in 0..n {
            set.push_row(vec![Value::Int(i as i64), Value::Text(format!("row {i}"))]);
        }
        set
    }

    #[test]
    fn empty_set_is_a_single_paragraph() {
        let plan = layout(&rows(0), true);
        assert_eq!(plan.pages, vec![PageContent::Paragraph(NO_DATA_TEXT.to_string())]);
        assert!(!plan.has_table());
        assert_eq!(NO_DATA_TEXT, "No data returned by the query.");
    }

    #[test]
    fn small_table_fits_one_page() {
        let plan = layout(&rows(3), true);
        assert_eq!(plan.pages.len(), 1);
        match &plan.pages[0] {
            PageContent::Table(t) => {
                assert_eq!(t.header.as_deref(), Some(&["id".to_string(), "label".to_string()][..]));
                assert_eq!(t.rows.len(), 3);
                assert_eq!(t.rows[2], vec!["2".to_string(), "row 2".to_string()]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn header_omitted_when_disabled() {
        let plan = layout(&rows(2), false);
        match &plan.pages[0] {
            PageContent::Table(t) => assert!(t.header.is_none()),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn long_tables_flow_across_pages() {
        let plan = layout(&rows(100), true);
        assert!(plan.pages.len() > 1);

        let mut total = 0;
        for (idx, page) in plan.pages.iter().enumerate() {
            let PageContent::Table(t) = page else {
                panic!("expected only tables");
            };
            assert_eq!(t.header.is_some(), idx == 0, "header only on first page");
            let height = t.header.as_ref().map_or(0.0, |_| HEADER_HEIGHT)
                + t.rows.len() as f32 * ROW_HEIGHT;
            assert!(height <= FRAME_HEIGHT);
            total += t.rows.len();
        }
        assert_eq!(total, 100);
    }

    #[test]
    fn wide_tables_are_scaled_to_frame() {
        let mut set = ResultSet::new((0..8).map(|i| format!("c{i}")).collect());
        set.push_row((0..8).map(|_| Value::Text("x".repeat(60))).collect());
        let plan = layout(&set, true);
        assert!((plan.table_width() - FRAME_WIDTH).abs() < 0.5);
    }

    #[test]
    fn long_cells_are_clipped_to_their_column() {
        let mut set = ResultSet::new((0..8).map(|i| format!("c{i}")).collect());
        set.push_row((0..8).map(|_| Value::Text("x".repeat(60))).collect());
        let plan = layout(&set, true);

        let PageContent::Table(t) = &plan.pages[0] else {
            panic!("expected table");
        };
        for (cell, width) in t.rows[0].iter().zip(&plan.column_widths) {
            assert!(cell.ends_with("..."), "cell not clipped: {cell}");
            assert!(text_width(cell, GLYPH_WIDTH) <= width - 2.0 * PAD_X);
        }
        // Short header text still fits untouched.
        assert_eq!(t.header.as_ref().unwrap()[0], "c0");
    }

    #[test]
    fn fit_cell_edges() {
        assert_eq!(fit_cell("abc", 100.0, GLYPH_WIDTH), "abc");
        assert_eq!(fit_cell("abcdefghij", 6.0 * GLYPH_WIDTH, GLYPH_WIDTH), "abc...");
        assert_eq!(fit_cell("abcdefghij", 2.0 * GLYPH_WIDTH, GLYPH_WIDTH), "ab");
        assert_eq!(fit_cell("abc", 0.0, GLYPH_WIDTH), "");
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn hex_text(text: &str) -> Vec<u8> {
        let hex: String = text.bytes().map(|b| format!("{b:02X}")).collect();
        format!("<{hex}> Tj").into_bytes()
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = to_pdf(&rows(40), true).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b" re\n"), "table cells are drawn as rectangles");
        assert!(contains(&bytes, &hex_text("row 39")));
    }

    #[test]
    fn empty_pdf_has_message_and_no_table() {
        let bytes = to_pdf(&rows(0), true).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, &hex_text(NO_DATA_TEXT)));
        assert!(!contains(&bytes, b" re\n"));
        assert!(!contains(&bytes, &hex_text("id")));
    }
}
