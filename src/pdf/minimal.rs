//! Minimal PDF emitter
//!
//! Writes a single US Letter page showing one line of Helvetica text.
//! The output is a header, five numbered objects (catalog, pages, page,
//! content stream, font), a cross-reference table, the trailer and the
//! `startxref` footer.

use std::borrow::Cow;
use std::fmt::Write as _;

const HEADER: &str = "%PDF-1.4\n";

/// Object number of the document catalog
const CATALOG_ID: usize = 1;

/// Build a single-page PDF that displays `content`
///
/// Total over all inputs. Text outside the Helvetica glyph set is passed
/// through as raw UTF-8 bytes, so only ASCII is guaranteed to display as
/// written.
pub fn build_simple_pdf(content: &str) -> Vec<u8> {
    let text = escape_text(content);
    let stream = format!("BT /F1 14 Tf 72 720 Td ({}) Tj ET", text);

    let mut writer = ObjectWriter::new();
    writer.push("<< /Type /Catalog /Pages 2 0 R >>");
    writer.push("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    writer.push(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>",
    );
    writer.push(&format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        stream.len(),
        stream
    ));
    writer.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
    writer.finish(CATALOG_ID)
}

/// Escape text for use inside a PDF literal string
///
/// Backslash and both parentheses get a leading backslash; everything else
/// is copied unchanged.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(&['\\', '(', ')'][..]) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if matches!(c, '\\' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Output buffer that records where each object starts
struct ObjectWriter {
    buf: Vec<u8>,
    /// Byte offset of object `i + 1`
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(HEADER.as_bytes());
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append the next object. Objects are numbered from 1 in push order.
    fn push(&mut self, body: &str) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    /// Write the xref table, trailer and footer, and return the document
    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref_start = self.buf.len();
        // Entry 0 is the head of the free list
        let size = self.offsets.len() + 1;

        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for offset in &self.offsets {
            let _ = write!(tail, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF",
            size, root, xref_start
        );

        self.buf.extend_from_slice(tail.as_bytes());
        self.buf
    }
}
