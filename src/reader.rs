//! PDF parsing boundary.
//!
//! Wraps `lopdf` behind the [`PageSource`] trait: the rest of the pipeline
//! only sees ordered positioned text fragments plus a per-page raster-content
//! flag, so any PDF-capable parser satisfying that contract is substitutable.
//!
//! The content-stream walk is deliberately shallow: it tracks the text matrix
//! translation (`Tm`/`Td`/`TD`/`T*`) and font size (`Tf`), and emits one
//! fragment per show-text operator. Rotation and scaling are ignored; widths
//! are estimated from glyph count and font size, which is enough for the
//! line-break and word-gap thresholds downstream.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::models::PageFragment;

/// Width of an average glyph relative to the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.5;

/// Failure to open or walk a PDF byte stream.
#[derive(Debug)]
pub enum ReadError {
    /// Input bytes do not carry a PDF header.
    NotPdf,
    /// The document is encrypted; extraction is not attempted.
    Encrypted,
    /// lopdf could not parse the document structure.
    Parse(String),
    /// A page's content stream could not be decoded.
    Page { page: usize, message: String },
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::NotPdf => write!(f, "input is not a PDF byte stream"),
            ReadError::Encrypted => write!(f, "PDF is encrypted"),
            ReadError::Parse(e) => write!(f, "failed to parse PDF: {}", e),
            ReadError::Page { page, message } => {
                write!(f, "failed to read page {}: {}", page, message)
            }
        }
    }
}

impl std::error::Error for ReadError {}

/// One page's raw extraction input.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Positioned text fragments in content-stream order.
    pub fragments: Vec<PageFragment>,
    /// True when the page paints raster/image content.
    pub has_images: bool,
}

/// Per-page access to positioned text fragments. Implemented by
/// [`LopdfSource`]; test doubles implement it to drive the pipeline without
/// real PDF bytes.
pub trait PageSource {
    fn page_count(&self) -> usize;
    /// Read one page (1-based). Pages must be readable in any order.
    fn page(&self, page_number: usize) -> Result<SourcePage, ReadError>;
    /// Title from the document's own metadata, when the format carries one.
    fn metadata_title(&self) -> Option<String> {
        None
    }
}

/// [`PageSource`] backed by `lopdf`.
#[derive(Debug)]
pub struct LopdfSource {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl LopdfSource {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(ReadError::NotPdf);
        }
        let doc = Document::load_mem(bytes).map_err(|e| ReadError::Parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ReadError::Encrypted);
        }
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        Ok(Self { doc, page_ids })
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&self, page_number: usize) -> Result<SourcePage, ReadError> {
        let page_id = *self
            .page_ids
            .get(page_number.checked_sub(1).ok_or(ReadError::Page {
                page: page_number,
                message: "page numbers are 1-based".to_string(),
            })?)
            .ok_or(ReadError::Page {
                page: page_number,
                message: "page out of range".to_string(),
            })?;

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| ReadError::Page {
                page: page_number,
                message: e.to_string(),
            })?;
        let content = Content::decode(&data).map_err(|e| ReadError::Page {
            page: page_number,
            message: e.to_string(),
        })?;

        let fragments = collect_fragments(&content);
        let has_images = page_has_images(&self.doc, page_id, &content);

        Ok(SourcePage {
            fragments,
            has_images,
        })
    }

    fn metadata_title(&self) -> Option<String> {
        let info = match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        let title = string_operand(info.get(b"Title").ok()?)?;
        let title = title.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    }
}

/// Text cursor state across one page's operations.
#[derive(Debug, Clone, Copy, Default)]
struct TextCursor {
    x: f64,
    y: f64,
    line_x: f64,
    line_y: f64,
    leading: f64,
    font_size: f64,
}

impl TextCursor {
    fn set_matrix(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.line_x = x;
        self.line_y = y;
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        self.line_x += tx;
        self.line_y += ty;
        self.x = self.line_x;
        self.y = self.line_y;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }
}

fn collect_fragments(content: &Content) -> Vec<PageFragment> {
    let mut fragments = Vec::new();
    let mut cursor = TextCursor::default();

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => cursor = TextCursor {
                font_size: cursor.font_size,
                leading: cursor.leading,
                ..TextCursor::default()
            },
            "Tf" => {
                if operands.len() >= 2 {
                    cursor.font_size = as_num(&operands[1]);
                }
            }
            "TL" => {
                if let Some(value) = operands.first() {
                    cursor.leading = as_num(value);
                }
            }
            "Tm" => {
                if operands.len() == 6 {
                    cursor.set_matrix(as_num(&operands[4]), as_num(&operands[5]));
                }
            }
            "Td" => {
                if operands.len() == 2 {
                    cursor.translate_line(as_num(&operands[0]), as_num(&operands[1]));
                }
            }
            "TD" => {
                if operands.len() == 2 {
                    cursor.leading = -as_num(&operands[1]);
                    cursor.translate_line(as_num(&operands[0]), as_num(&operands[1]));
                }
            }
            "T*" => cursor.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(string_operand) {
                    emit(&mut fragments, &mut cursor, text);
                }
            }
            "'" => {
                cursor.next_line();
                if let Some(text) = operands.first().and_then(string_operand) {
                    emit(&mut fragments, &mut cursor, text);
                }
            }
            "\"" => {
                cursor.next_line();
                if let Some(text) = operands.get(2).and_then(string_operand) {
                    emit(&mut fragments, &mut cursor, text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operands.first() {
                    let start_x = cursor.x;
                    let mut text = String::new();
                    let mut width = 0.0;
                    for part in parts {
                        match part {
                            Object::String(_, _) => {
                                if let Some(piece) = string_operand(part) {
                                    width += estimated_width(&piece, cursor.font_size);
                                    text.push_str(&piece);
                                }
                            }
                            Object::Integer(i) => {
                                width -= *i as f64 / 1000.0 * cursor.font_size;
                            }
                            Object::Real(r) => {
                                width -= f64::from(*r) / 1000.0 * cursor.font_size;
                            }
                            _ => {}
                        }
                    }
                    if !text.is_empty() {
                        fragments.push(PageFragment {
                            text,
                            x: start_x,
                            y: cursor.y,
                            width,
                        });
                        cursor.x = start_x + width;
                    }
                }
            }
            _ => {}
        }
    }

    fragments
}

fn emit(fragments: &mut Vec<PageFragment>, cursor: &mut TextCursor, text: String) {
    let width = estimated_width(&text, cursor.font_size);
    fragments.push(PageFragment {
        text,
        x: cursor.x,
        y: cursor.y,
        width,
    });
    cursor.x += width;
}

fn estimated_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO
}

fn as_num(object: &Object) -> f64 {
    match object {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => f64::from(*r),
        _ => 0.0,
    }
}

/// Decode a string operand. UTF-16BE strings carry a `FE FF` BOM; everything
/// else is read lossily as single-byte text.
fn string_operand(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => {
            if bytes.starts_with(&[0xFE, 0xFF]) {
                let (decoded, _, _) = encoding_rs::UTF_16BE.decode(&bytes[2..]);
                Some(decoded.into_owned())
            } else {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
        }
        _ => None,
    }
}

fn page_has_images(doc: &Document, page_id: ObjectId, content: &Content) -> bool {
    if let Some(resources) = page_resources(doc, page_id) {
        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Some(xobjects) = resolve_dict(doc, xobjects) {
                for (_name, value) in xobjects.iter() {
                    let stream = match value {
                        Object::Reference(id) => doc
                            .get_object(*id)
                            .ok()
                            .and_then(|o| o.as_stream().ok()),
                        Object::Stream(s) => Some(s),
                        _ => None,
                    };
                    if let Some(stream) = stream {
                        if let Ok(Object::Name(subtype)) = stream.dict.get(b"Subtype") {
                            if subtype.as_slice() == b"Image" {
                                return true;
                            }
                        }
                    }
                }
            }
        }
    }
    // Inline images bypass the resource dictionary.
    content.operations.iter().any(|op| op.operator == "BI")
}

/// Walk the page's Parent chain for an inherited Resources dictionary.
/// Malformed documents can make the chain cyclic, so visited ids end the walk.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut visited: Vec<ObjectId> = Vec::new();
    let mut object_id = page_id;
    loop {
        if visited.contains(&object_id) {
            return None;
        }
        visited.push(object_id);
        let dict = doc.get_object(object_id).ok()?.as_dict().ok()?;
        if let Ok(resources) = dict.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        object_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}
