//! Attachment text extraction.
//!
//! Every failure path returns a bracketed marker string instead of an error,
//! so callers can treat the output uniformly as "some text describing or
//! containing the document". Supported formats: PDF, DOCX, TXT. Legacy DOC
//! is flagged for manual conversion.

use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};

pub const EMPTY_FILE_MARKER: &str = "[Empty file]";
const LEGACY_DOC_MARKER: &str = "[Legacy DOC format - manual conversion needed]";

/// A text-layer PDF must yield more than this many characters; anything
/// shorter is treated as a scanned/image-only document.
const MIN_TEXT_PDF_CHARS: usize = 50;
const ERROR_REASON_MAX_CHARS: usize = 100;
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Extracts plain text from raw attachment bytes, dispatching on the
/// lowercased filename extension. Total: never panics, never errors.
pub fn extract_text(content: &[u8], filename: &str) -> String {
    if content.is_empty() {
        return EMPTY_FILE_MARKER.to_string();
    }

    let extension = file_extension(filename);
    match extension.as_str() {
        "pdf" => extract_pdf(content),
        "docx" => extract_docx(content),
        "txt" | "text" => extract_txt(content),
        "doc" => LEGACY_DOC_MARKER.to_string(),
        _ => format!("[Unsupported format: .{extension}]"),
    }
}

/// Whitespace-collapsed preview of extracted text, truncated with an
/// ellipsis when longer than `max_chars`. Marker strings (anything starting
/// with `[`) pass through verbatim.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    if text.is_empty() || text.starts_with('[') {
        return text.to_string();
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

fn file_extension(filename: &str) -> String {
    let lowered = filename.to_lowercase();
    match lowered.rsplit_once('.') {
        Some((_, extension)) => extension.to_string(),
        None => String::new(),
    }
}

fn truncate_reason(reason: &str) -> String {
    reason.chars().take(ERROR_REASON_MAX_CHARS).collect()
}

fn extract_pdf(content: &[u8]) -> String {
    match pdf_text(content) {
        Ok(text) => text,
        Err(e) => format!("[PDF extraction error: {}]", truncate_reason(&e.to_string())),
    }
}

fn pdf_text(content: &[u8]) -> Result<String, lopdf::Error> {
    let document = lopdf::Document::load_mem(content)?;
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

    let mut text = String::new();
    for page in &page_numbers {
        text.push_str(&document.extract_text(&[*page])?);
        text.push('\n');
    }

    let trimmed = text.trim();
    if trimmed.chars().count() > MIN_TEXT_PDF_CHARS {
        return Ok(trimmed.to_string());
    }

    let creator = pdf_creator(&document).unwrap_or_else(|| "Unknown".to_string());
    Ok(format!(
        "[IMAGE-BASED PDF DETECTED]\n\
         Creator: {creator}\n\
         Pages: {}\n\
         This PDF contains images/scanned content that requires OCR for text extraction.",
        page_numbers.len()
    ))
}

/// Reads `/Creator` from the document info dictionary, if any.
fn pdf_creator(document: &lopdf::Document) -> Option<String> {
    let info = document.trailer.get(b"Info").ok()?;
    let dict = match info {
        lopdf::Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok()?,
        lopdf::Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match dict.get(b"Creator").ok()? {
        lopdf::Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn extract_docx(content: &[u8]) -> String {
    let document = match docx_rs::read_docx(content) {
        Ok(document) => document,
        Err(e) => return format!("[DOCX extraction error: {}]", truncate_reason(&e.to_string())),
    };

    let mut parts: Vec<String> = Vec::new();

    for child in &document.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            DocumentChild::Table(table) => {
                for table_child in &table.rows {
                    let TableChild::TableRow(row) = table_child;
                    let cells: Vec<String> = row
                        .cells
                        .iter()
                        .map(|TableRowChild::TableCell(cell)| cell_text(cell))
                        .map(|text| text.trim().to_string())
                        .filter(|text| !text.is_empty())
                        .collect();
                    if !cells.is_empty() {
                        parts.push(cells.join(" | "));
                    }
                }
            }
            _ => {}
        }
    }

    parts.join("\n")
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn cell_text(cell: &docx_rs::TableCell) -> String {
    let mut parts = Vec::new();
    for content in &cell.children {
        if let TableCellContent::Paragraph(paragraph) = content {
            let text = paragraph_text(paragraph);
            if !text.trim().is_empty() {
                parts.push(text);
            }
        }
    }
    parts.join(" ")
}

fn extract_txt(content: &[u8]) -> String {
    // Strict UTF-8 first. Latin-1 accepts any byte sequence, so the
    // CP1252/ISO-8859-1 entries of the legacy encoding chain are never
    // reached and a lossy fallback is unnecessary.
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => encoding_rs::mem::decode_latin1(content).into_owned(),
    }
}
