//! Drawing surface used by the receipt layout.
//!
//! Layout code works in millimetres with the origin at the top-left corner of
//! the current page and `y` growing downwards. [`PdfCanvas`] flips that into
//! PDF user space.

use printpdf::image_crate::GenericImageView;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Pt, Rgb, TextMatrix,
};

use super::ReceiptError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour(pub f32, pub f32, pub f32);

impl Colour {
    pub const BLACK: Colour = Colour(0.0, 0.0, 0.0);
    pub const MUTED: Colour = Colour(0.35, 0.35, 0.35);
    pub const ACCENT: Colour = Colour(0.85, 0.33, 0.1);
    pub const WATERMARK: Colour = Colour(0.92, 0.92, 0.92);
}

pub trait Canvas {
    fn page_size(&self) -> (f32, f32);
    fn set_colour(&mut self, colour: Colour);
    fn text(&mut self, text: &str, size: f32, x: f32, y: f32, style: FontStyle);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32);
    /// Draws text rotated counter-clockwise by `degrees` around its baseline origin.
    fn rotated_text(&mut self, text: &str, size: f32, x: f32, y: f32, degrees: f32);
    /// Places an encoded image (PNG/JPEG) with its top-left corner at `(x, y)`.
    /// Fails if the bytes cannot be decoded; callers fall back to text.
    fn image(&mut self, bytes: &[u8], x: f32, y: f32, width: f32) -> Result<(), ReceiptError>;
    fn new_page(&mut self, width: f32, height: f32);
}

/// Rough Helvetica advance width; good enough for centring short labels.
pub fn text_width(text: &str, size: f32) -> f32 {
    let points = text.chars().count() as f32 * size * 0.5;
    points * 0.352_778
}

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    width: f32,
    height: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

fn pdf_err(e: printpdf::Error) -> ReceiptError {
    ReceiptError::Pdf(format!("{:?}", e))
}

impl PdfCanvas {
    pub fn new(title: &str, width: f32, height: f32) -> Result<Self, ReceiptError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(width), Mm(height), "Receipt");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, width, height, regular, bold, italic })
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }

    fn flip(&self, y: f32) -> Mm {
        Mm(self.height - y)
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ReceiptError> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

impl Canvas for PdfCanvas {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn set_colour(&mut self, colour: Colour) {
        let c = Color::Rgb(Rgb::new(colour.0, colour.1, colour.2, None));
        self.layer.set_fill_color(c.clone());
        self.layer.set_outline_color(c);
    }

    fn text(&mut self, text: &str, size: f32, x: f32, y: f32, style: FontStyle) {
        let font = self.font(style).clone();
        self.layer.use_text(text, size, Mm(x), self.flip(y), &font);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), self.flip(y1)), false),
                (Point::new(Mm(x2), self.flip(y2)), false),
            ],
            is_closed: false,
        });
    }

    fn rotated_text(&mut self, text: &str, size: f32, x: f32, y: f32, degrees: f32) {
        let font = self.regular.clone();
        self.layer.begin_text_section();
        self.layer.set_font(&font, size);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt::from(Mm(x)),
            Pt::from(self.flip(y)),
            degrees,
        ));
        self.layer.write_text(text, &font);
        self.layer.end_text_section();
    }

    fn image(&mut self, bytes: &[u8], x: f32, y: f32, width: f32) -> Result<(), ReceiptError> {
        let decoded = printpdf::image_crate::load_from_memory(bytes)
            .map_err(|e| ReceiptError::Image(e.to_string()))?;
        let (px_w, px_h) = (decoded.width() as f32, decoded.height() as f32);
        if px_w == 0.0 || width <= 0.0 {
            return Err(ReceiptError::Image("empty image".to_string()));
        }
        // Pick the dpi that makes the image exactly `width` millimetres wide.
        let dpi = px_w * 25.4 / width;
        let height = px_h * 25.4 / dpi;
        let image = Image::from_dynamic_image(&decoded);
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(self.flip(y + height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn new_page(&mut self, width: f32, height: f32) {
        let (page, layer) = self.doc.add_page(Mm(width), Mm(height), "Certificate");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.width = width;
        self.height = height;
    }
}
