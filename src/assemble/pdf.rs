//! PDF canvas backed by `printpdf`.
//!
//! Pages are accumulated as `Vec<Op>` lists and serialised once in [`PageCanvas::finish`].
//! Images are embedded at 72 DPI so one pixel starts out as one point; the
//! transform scale then stretches it to the target rectangle.

use image::RgbImage;
use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg,
    Point, Pt, RawImage, RawImageData, RawImageFormat, Rgb, TextItem, XObjectTransform,
};
use tracing::{debug, warn};

use super::{DrawError, PageCanvas, Rect, SinkError};
use crate::layout::PageSize;

const EMBED_DPI: f32 = 72.0;
const FALLBACK_FONT_PT: f32 = 8.0;
const FALLBACK_STROKE_PT: f32 = 1.0;
const FALLBACK_TEXT_INSET_PT: f32 = 5.0;

pub struct PdfCanvas {
    doc: PdfDocument,
    page_size: PageSize,
    pages: Vec<PdfPage>,
    ops: Option<Vec<Op>>,
}

impl PdfCanvas {
    pub fn new(page_size: PageSize, title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            page_size,
            pages: Vec::new(),
            ops: None,
        }
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w, h) = self.page_size.dimensions_mm();
        (Mm(w), Mm(h))
    }

    fn flush_page(&mut self) {
        if let Some(ops) = self.ops.take() {
            let (w, h) = self.page_dimensions();
            self.pages.push(PdfPage::new(w, h, ops));
        }
    }
}

impl PageCanvas for PdfCanvas {
    fn begin_page(&mut self) -> Result<(), SinkError> {
        self.flush_page();
        self.ops = Some(Vec::new());
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbImage, rect: Rect) -> Result<(), DrawError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DrawError::UnsupportedImage(format!("{width}x{height} image")));
        }
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(DrawError::UnsupportedImage(format!(
                "target {}x{} pt",
                rect.width, rect.height
            )));
        }
        let Some(ops) = self.ops.as_mut() else {
            return Err(DrawError::UnsupportedImage("no open page".into()));
        };

        let raw = RawImage {
            pixels: RawImageData::U8(image.as_raw().clone()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = self.doc.add_image(&raw);

        ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(rect.x)),
                translate_y: Some(Pt(rect.y)),
                scale_x: Some(rect.width / width as f32),
                scale_y: Some(rect.height / height as f32),
                dpi: Some(EMBED_DPI),
                rotate: None,
            },
        });
        Ok(())
    }

    fn draw_fallback(&mut self, rect: Rect, label: &str) -> Result<(), SinkError> {
        let ops = self.ops.as_mut().ok_or(SinkError::NoPage)?;
        let red = Color::Rgb(Rgb::new(1.0, 0.0, 0.0, None));

        let corner = |x: f32, y: f32| LinePoint {
            p: Point { x: Pt(x), y: Pt(y) },
            bezier: false,
        };
        ops.push(Op::SetOutlineColor { col: red.clone() });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(FALLBACK_STROKE_PT),
        });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    corner(rect.x, rect.y),
                    corner(rect.x + rect.width, rect.y),
                    corner(rect.x + rect.width, rect.y + rect.height),
                    corner(rect.x, rect.y + rect.height),
                ],
                is_closed: true,
            },
        });

        ops.push(Op::SetFillColor { col: red });
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(rect.x + FALLBACK_TEXT_INSET_PT),
                y: Pt(rect.y + rect.height / 2.0),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(FALLBACK_FONT_PT),
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(label.to_string())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, SinkError> {
        self.flush_page();
        if self.pages.is_empty() {
            let (w, h) = self.page_dimensions();
            self.pages.push(PdfPage::new(w, h, Vec::new()));
        }

        let page_count = self.pages.len();
        self.doc.with_pages(self.pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialisation produced warnings");
        }
        if bytes.is_empty() {
            return Err(SinkError::Failed("empty PDF output".into()));
        }

        debug!(page_count, bytes = bytes.len(), "PDF written");
        Ok(bytes)
    }
}
