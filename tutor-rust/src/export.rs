//! Printable rendering of a tutorial.
//!
//! [`export`] lays a tutorial out on fixed-size pages of text. The resulting
//! [`ExportDocument`] keeps the colour of every span. [`ExportDocument::to_pdf`]
//! draws it on A4 pages in a monospaced builtin font, one fill colour per
//! span; [`ExportDocument::to_text`] flattens it to plain text with a form
//! feed between pages.

use crate::{errors::ExportError, variant::Rgb, Tutorial, Variant};
use printpdf::{BuiltinFont, Color, Mm, PdfDocument};
use serde::Serialize;

pub const DOCUMENT_HEADER: &str = "AI Video Editing Tutor";

/// File stem used when the title leaves nothing usable.
pub const DEFAULT_FILE_STEM: &str = "video-tutorial";

const FILE_EXTENSION: &str = "pdf";
const PAGE_BREAK: char = '\u{c}';

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
/// Advance of one Courier glyph, as a fraction of the font size.
const COURIER_ADVANCE: f32 = 0.6;
const PT_PER_MM: f32 = 72.0 / 25.4;
const MAX_FONT_SIZE_PT: f32 = 12.0;

/// Size of a page in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    pub width: usize,
    pub lines_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 76,
            lines_per_page: 56,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

impl Span {
    fn new(text: impl Into<String>, color: Rgb, bold: bool) -> Self {
        Self {
            text: text.into(),
            color,
            bold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
    pub alignment: Alignment,
}

impl Line {
    fn left(spans: Vec<Span>) -> Self {
        Self {
            spans,
            alignment: Alignment::Left,
        }
    }

    fn center(span: Span) -> Self {
        Self {
            spans: vec![span],
            alignment: Alignment::Center,
        }
    }

    fn blank() -> Self {
        Self::left(vec![])
    }

    /// The line's text without colour.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub lines: Vec<Line>,
}

/// A span placed on a PDF page. Coordinates are in millimetres from the
/// bottom-left corner, as PDF expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub page: usize,
    pub x_mm: f32,
    pub y_mm: f32,
    pub font_size: f32,
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDocument {
    file_name: String,
    layout: PageLayout,
    pages: Vec<Page>,
}

impl ExportDocument {
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Plain text rendering, pages separated by a form feed.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                out.push(PAGE_BREAK);
                out.push('\n');
            }
            for line in &page.lines {
                let text = line.text();
                if line.alignment == Alignment::Center {
                    let pad = self.layout.width.saturating_sub(text.chars().count()) / 2;
                    out.push_str(&" ".repeat(pad));
                }
                out.push_str(text.trim_end());
                out.push('\n');
            }
        }
        out
    }

    /// Where every non-empty span lands on an A4 page. The font size is the
    /// largest (up to 12pt) that fits a full-width line between the margins.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn text_runs(&self) -> Vec<TextRun> {
        let printable_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let printable_height = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;
        let columns = self.layout.width.max(1) as f32;
        let font_size = (printable_width * PT_PER_MM / (columns * COURIER_ADVANCE))
            .min(MAX_FONT_SIZE_PT);
        let advance_mm = font_size * COURIER_ADVANCE / PT_PER_MM;
        let line_height_mm = printable_height / self.layout.lines_per_page.max(1) as f32;

        let mut runs = vec![];
        for (page_index, page) in self.pages.iter().enumerate() {
            for (line_index, line) in page.lines.iter().enumerate() {
                // Baselines sit a fifth of a line above the bottom of their slot.
                let slot = line_index as f32 + 0.8;
                let baseline = PAGE_HEIGHT_MM - MARGIN_MM - slot * line_height_mm;
                let length = line.text().chars().count();
                let mut column = match line.alignment {
                    Alignment::Left => 0,
                    Alignment::Center => self.layout.width.saturating_sub(length) / 2,
                };
                for span in &line.spans {
                    let chars = span.text.chars().count();
                    if !span.text.trim().is_empty() {
                        runs.push(TextRun {
                            page: page_index,
                            x_mm: MARGIN_MM + column as f32 * advance_mm,
                            y_mm: baseline,
                            font_size,
                            text: span.text.clone(),
                            color: span.color,
                            bold: span.bold,
                        });
                    }
                    column += chars;
                }
            }
        }
        runs
    }

    /// Render the document as PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ExportError> {
        let title = self.file_name.trim_end_matches(".pdf");
        let (doc, first_page, first_layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::CourierBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;

        let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
        for _ in 1..self.pages.len() {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layers.push(doc.get_page(page).get_layer(layer));
        }

        for run in self.text_runs() {
            let Some(layer) = layers.get(run.page) else {
                continue;
            };
            let Rgb(r, g, b) = run.color;
            layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                None,
            )));
            let font = if run.bold { &bold } else { &regular };
            layer.use_text(run.text, run.font_size, Mm(run.x_mm), Mm(run.y_mm), font);
        }

        drop(layers);
        doc.save_to_bytes()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

/// Lay out a tutorial with the default page size.
#[must_use]
pub fn export(tutorial: &Tutorial, variant: Variant) -> ExportDocument {
    export_with_layout(tutorial, variant, PageLayout::default())
}

#[must_use]
pub fn export_with_layout(
    tutorial: &Tutorial,
    variant: Variant,
    layout: PageLayout,
) -> ExportDocument {
    let mut pages = Paginator::new(layout.lines_per_page.max(1));

    pages.push(Line::center(Span::new(DOCUMENT_HEADER, Rgb::BLACK, true)));
    pages.push(Line::center(Span::new(
        format!("{} Tutorial", variant.label()),
        Rgb::GRAY,
        false,
    )));
    pages.push(Line::blank());
    for text in wrap(tutorial.title(), layout.width) {
        pages.push(Line::left(vec![Span::new(text, Rgb::BLACK, true)]));
    }

    let accent = variant.accent_color();
    for (index, step) in tutorial.steps().iter().enumerate() {
        let prefix = format!("Step {}: ", index + 1);
        let body = crate::tutorial::strip_step_prefix(step);
        let wrapped = wrap(&format!("{prefix}{body}"), layout.width);

        let label = prefix.trim_end();
        let mut block = vec![Line::blank()];
        for (line_index, text) in wrapped.into_iter().enumerate() {
            let spans = if line_index == 0 && text.starts_with(label) {
                vec![
                    Span::new(label, accent, true),
                    Span::new(&text[label.len()..], Rgb::BLACK, false),
                ]
            } else {
                vec![Span::new(text, Rgb::BLACK, false)]
            };
            block.push(Line::left(spans));
        }
        pages.push_block(block);
    }

    ExportDocument {
        file_name: file_name(tutorial.title()),
        layout,
        pages: pages.finish(),
    }
}

/// Lower-cased title with whitespace runs turned into hyphens and anything
/// outside `[a-z0-9-]` removed.
#[must_use]
pub fn file_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    let mut slug: String = hyphenated
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    // Leading or trailing whitespace in the title becomes a hyphen.
    if lowered.starts_with(char::is_whitespace) {
        slug.insert(0, '-');
    }
    if lowered.ends_with(char::is_whitespace) {
        slug.push('-');
    }
    slug
}

/// `<slug>.pdf`, falling back to [`DEFAULT_FILE_STEM`].
#[must_use]
pub fn file_name(title: &str) -> String {
    let slug = file_slug(title);
    let stem = if slug.is_empty() {
        DEFAULT_FILE_STEM
    } else {
        &slug
    };
    format!("{stem}.{FILE_EXTENSION}")
}

struct Paginator {
    lines_per_page: usize,
    done: Vec<Page>,
    current: Page,
}

impl Paginator {
    fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page,
            done: vec![],
            current: Page::default(),
        }
    }

    fn remaining(&self) -> usize {
        self.lines_per_page - self.current.lines.len()
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
    }

    fn push(&mut self, line: Line) {
        if self.remaining() == 0 {
            self.break_page();
        }
        self.current.lines.push(line);
    }

    /// Keep a block on one page when it fits on a fresh page. A leading blank
    /// line is dropped at the top of a page.
    fn push_block(&mut self, mut block: Vec<Line>) {
        if block.len() > self.remaining() && !self.current.lines.is_empty() {
            self.break_page();
        }
        if self.current.lines.is_empty() && block.first().is_some_and(|l| l.spans.is_empty()) {
            block.remove(0);
        }
        for line in block {
            self.push(line);
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.done.is_empty() {
            self.done.push(self.current);
        }
        self.done
    }
}

/// Greedy word wrap on character count. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![];
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let sep = usize::from(line_len > 0);
            if line_len + sep + word.len() <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.extend(word.iter());
                line_len += sep + word.len();
                break;
            }
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }
            let rest = word.split_off(width);
            lines.push(word.iter().collect());
            word = rest;
        }
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}
