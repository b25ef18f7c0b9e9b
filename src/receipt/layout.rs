use super::canvas::{text_width, Canvas, Colour, FontStyle};
use super::words::{amount_in_words_paise, format_inr};
use super::{ReceiptAssets, ReceiptData};
use crate::config::OrgConfig;

pub const A4_WIDTH: f32 = 210.0;
pub const A4_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
const LABEL_COLUMN: f32 = 62.0;
const ADDRESS_WRAP: usize = 60;

/// Vertical position of the next line, in millimetres from the top of the page.
struct Cursor {
    y: f32,
}

impl Cursor {
    fn advance(&mut self, by: f32) -> f32 {
        let at = self.y;
        self.y += by;
        at
    }
}

pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn centred<C: Canvas>(canvas: &mut C, text: &str, size: f32, y: f32, style: FontStyle) {
    let (width, _) = canvas.page_size();
    let x = ((width - text_width(text, size)) / 2.0).max(MARGIN);
    canvas.text(text, size, x, y, style);
}

fn row<C: Canvas>(canvas: &mut C, cursor: &mut Cursor, label: &str, value: &str) {
    let y = cursor.advance(7.0);
    canvas.set_colour(Colour::MUTED);
    canvas.text(label, 10.0, MARGIN, y, FontStyle::Regular);
    canvas.set_colour(Colour::BLACK);
    canvas.text(value, 10.0, LABEL_COLUMN, y, FontStyle::Bold);
}

fn rule<C: Canvas>(canvas: &mut C, cursor: &mut Cursor) {
    let (width, _) = canvas.page_size();
    let y = cursor.advance(6.0);
    canvas.set_colour(Colour::MUTED);
    canvas.line(MARGIN, y, width - MARGIN, y, 0.5);
}

pub fn draw_receipt<C: Canvas>(
    canvas: &mut C,
    data: &ReceiptData,
    org: &OrgConfig,
    assets: &ReceiptAssets,
) {
    let (width, height) = canvas.page_size();
    let mut cursor = Cursor { y: MARGIN };

    canvas.set_colour(Colour::WATERMARK);
    canvas.rotated_text(&org.name, 54.0, 45.0, height - 80.0, 45.0);

    // Header: logo when it decodes, otherwise the organisation name.
    let logo_drawn = match &assets.logo {
        Some(bytes) => match canvas.image(bytes, MARGIN, cursor.y, 28.0) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Receipt logo unusable, using text header: {}", e);
                false
            }
        },
        None => false,
    };
    let header_x = if logo_drawn { MARGIN + 34.0 } else { MARGIN };
    canvas.set_colour(Colour::ACCENT);
    canvas.text(&org.name, 18.0, header_x, cursor.advance(8.0) + 6.0, FontStyle::Bold);
    canvas.set_colour(Colour::MUTED);
    for line in wrap_text(&org.address, 70) {
        canvas.text(&line, 9.0, header_x, cursor.advance(4.5) + 6.0, FontStyle::Regular);
    }
    let mut ids = Vec::new();
    if !org.registration_no.is_empty() {
        ids.push(format!("Reg. No: {}", org.registration_no));
    }
    if !org.pan.is_empty() {
        ids.push(format!("PAN: {}", org.pan));
    }
    if !ids.is_empty() {
        canvas.text(&ids.join("  |  "), 9.0, header_x, cursor.advance(4.5) + 6.0, FontStyle::Regular);
    }
    if logo_drawn && cursor.y < MARGIN + 28.0 {
        cursor.y = MARGIN + 28.0;
    }
    cursor.advance(6.0);
    rule(canvas, &mut cursor);

    canvas.set_colour(Colour::BLACK);
    centred(canvas, "DONATION RECEIPT", 16.0, cursor.advance(12.0) + 4.0, FontStyle::Bold);

    let y = cursor.advance(10.0);
    canvas.text(&format!("Receipt No: {}", data.receipt_number), 10.0, MARGIN, y, FontStyle::Regular);
    let date = format!("Date: {}", data.date.format("%d/%m/%Y"));
    canvas.text(&date, 10.0, width - MARGIN - text_width(&date, 10.0), y, FontStyle::Regular);

    canvas.set_colour(Colour::MUTED);
    canvas.text("Received with thanks from", 10.0, MARGIN, cursor.advance(9.0), FontStyle::Italic);
    row(canvas, &mut cursor, "Name", &data.donor_name);
    row(canvas, &mut cursor, "Email", &data.email);
    if let Some(phone) = data.phone.as_deref().filter(|p| !p.is_empty()) {
        row(canvas, &mut cursor, "Phone", phone);
    }
    if let Some(pan) = data.pan.as_deref().filter(|p| !p.is_empty()) {
        row(canvas, &mut cursor, "PAN", pan);
    }
    if let Some(address) = data.address.as_deref().filter(|a| !a.trim().is_empty()) {
        let lines = wrap_text(address, ADDRESS_WRAP);
        for (i, line) in lines.iter().enumerate() {
            row(canvas, &mut cursor, if i == 0 { "Address" } else { "" }, line);
        }
    }
    cursor.advance(3.0);
    rule(canvas, &mut cursor);

    row(canvas, &mut cursor, "Amount", &format!("Rs. {}", format_inr(data.amount_paise)));
    row(canvas, &mut cursor, "Amount in words", "");
    canvas.set_colour(Colour::BLACK);
    for line in wrap_text(&amount_in_words_paise(data.amount_paise), 80) {
        canvas.text(&line, 10.0, MARGIN, cursor.advance(6.0), FontStyle::Italic);
    }
    row(canvas, &mut cursor, "Payment method", &data.payment_method);
    row(canvas, &mut cursor, "Transaction ID", &data.payment_id);
    row(canvas, &mut cursor, "Order ID", &data.order_id);
    if let Some(kind) = data.donation_type.as_deref().filter(|k| !k.is_empty()) {
        row(canvas, &mut cursor, "Donation type", kind);
    }
    cursor.advance(3.0);
    rule(canvas, &mut cursor);

    if !org.exemption_no.is_empty() {
        let note = format!(
            "Donations to {} are eligible for deduction under Section 80G of the Income Tax Act, 1961 (Approval No: {}).",
            org.name, org.exemption_no
        );
        canvas.set_colour(Colour::MUTED);
        for line in wrap_text(&note, 95) {
            canvas.text(&line, 9.0, MARGIN, cursor.advance(5.0), FontStyle::Italic);
        }
    }

    // Signature block sits on the right.
    cursor.advance(12.0);
    let sig_x = width - MARGIN - 50.0;
    let signed = match &assets.signature {
        Some(bytes) => match canvas.image(bytes, sig_x, cursor.y, 40.0) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Receipt signature unusable, using text label: {}", e);
                false
            }
        },
        None => false,
    };
    canvas.set_colour(Colour::BLACK);
    if signed {
        cursor.advance(18.0);
    } else {
        canvas.text("(Digitally signed)", 10.0, sig_x, cursor.advance(8.0), FontStyle::Italic);
    }
    let y = cursor.advance(2.0);
    canvas.line(sig_x, y, width - MARGIN, y, 0.3);
    canvas.text(&org.signatory, 10.0, sig_x, cursor.advance(6.0) + 3.0, FontStyle::Bold);
    canvas.text(&format!("For {}", org.name), 9.0, sig_x, cursor.advance(5.0) + 3.0, FontStyle::Regular);

    canvas.set_colour(Colour::MUTED);
    centred(
        canvas,
        "This is a computer generated receipt and does not require a physical signature.",
        8.0,
        height - MARGIN,
        FontStyle::Regular,
    );
}

pub fn draw_certificate<C: Canvas>(canvas: &mut C, data: &ReceiptData, org: &OrgConfig) {
    canvas.new_page(A4_HEIGHT, A4_WIDTH);
    let (width, height) = canvas.page_size();

    canvas.set_colour(Colour::ACCENT);
    let inset = MARGIN / 2.0;
    canvas.line(inset, inset, width - inset, inset, 2.0);
    canvas.line(width - inset, inset, width - inset, height - inset, 2.0);
    canvas.line(width - inset, height - inset, inset, height - inset, 2.0);
    canvas.line(inset, height - inset, inset, inset, 2.0);

    let mut cursor = Cursor { y: 50.0 };
    centred(canvas, "Certificate of Appreciation", 28.0, cursor.advance(22.0), FontStyle::Bold);
    canvas.set_colour(Colour::MUTED);
    centred(canvas, "This certificate is proudly presented to", 12.0, cursor.advance(16.0), FontStyle::Italic);
    canvas.set_colour(Colour::BLACK);
    centred(canvas, &data.donor_name, 24.0, cursor.advance(18.0), FontStyle::Bold);
    canvas.set_colour(Colour::MUTED);
    let thanks = format!(
        "in grateful recognition of a generous contribution of Rs. {} to {}.",
        format_inr(data.amount_paise),
        org.name
    );
    centred(canvas, &thanks, 12.0, cursor.advance(10.0), FontStyle::Regular);
    centred(
        canvas,
        "Your support helps us continue our work in the community.",
        12.0,
        cursor.advance(24.0),
        FontStyle::Regular,
    );

    canvas.set_colour(Colour::BLACK);
    let y = height - 35.0;
    canvas.text(&format!("Date: {}", data.date.format("%d %B %Y")), 11.0, MARGIN + 10.0, y, FontStyle::Regular);
    let sig_x = width - MARGIN - 70.0;
    canvas.line(sig_x, y - 5.0, width - MARGIN - 10.0, y - 5.0, 0.3);
    canvas.text(&org.signatory, 11.0, sig_x, y, FontStyle::Bold);
}
