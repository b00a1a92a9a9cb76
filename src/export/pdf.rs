// src/export/pdf.rs

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 20.0;

const FONT_SIZE: f32 = 10.0;
const HEADER_FONT_SIZE: f32 = 11.0;
const TITLE_FONT_SIZE: f32 = 14.0;

/// Low-level PDF assembly for the report: one Helvetica font, A4 pages,
/// a bordered fixed-width table that flows onto new pages as it fills.
pub struct ReportPdf {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,
    next_id: i32,
}

impl Default for ReportPdf {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPdf {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            current_content_id: None,
            next_id: 4,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
            .contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), self.font_id);
        drop(page);

        self.current_content_id = Some(content_id);
        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id.take() {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn draw_text(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(text.as_bytes()));
        content.end_text();
    }

    fn draw_cell_borders(content: &mut Content, x: f32, y: f32, w: f32, h: f32) {
        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        content.rect(x, y, w, h);
        content.stroke();
        content.restore_state();
    }

    fn draw_row(content: &mut Content, y: f32, col_widths: &[f32], row: &[String], size: f32) {
        let mut x = MARGIN;
        for (i, text) in row.iter().enumerate() {
            let w = col_widths[i];
            Self::draw_text(content, x + 4.0, y + 5.0, size, text);
            Self::draw_cell_borders(content, x, y, w, ROW_H);
            x += w;
        }
    }

    /// Write the title and the table, paginating as needed. Column widths
    /// are fixed by the caller.
    pub fn write_table(
        &mut self,
        title: &str,
        headers: &[&str],
        col_widths: &[f32],
        rows: &[Vec<String>],
    ) {
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let table_width: f32 = col_widths.iter().sum();

        let mut remaining: &[Vec<String>] = rows;
        let mut first_page = true;

        loop {
            let mut content = self.new_page();
            let mut y = PAGE_H - MARGIN;

            if first_page {
                Self::draw_text(&mut content, MARGIN, y, TITLE_FONT_SIZE, title);
                y -= 30.0;
                first_page = false;
            }

            // header row with a light fill
            y -= ROW_H;
            content.save_state();
            content.set_fill_rgb(0.85, 0.87, 0.90);
            content.rect(MARGIN, y, table_width, ROW_H);
            content.fill_nonzero();
            content.restore_state();
            Self::draw_row(&mut content, y, col_widths, &header_row, HEADER_FONT_SIZE);

            let mut consumed = 0;
            for row in remaining {
                if y - ROW_H < MARGIN {
                    break;
                }
                y -= ROW_H;
                Self::draw_row(&mut content, y, col_widths, row, FONT_SIZE);
                consumed += 1;
            }

            self.finalize_page(content);
            remaining = &remaining[consumed..];

            if remaining.is_empty() {
                break;
            }
        }
    }

    /// Assemble the document and hand back the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);

        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.iter().copied());
        drop(pages);

        self.pdf.finish()
    }
}
