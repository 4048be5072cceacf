//! # PDF Serializer
//!
//! Writes a single finished page as a PDF 1.7 file. The drawing surface in
//! [`surface`] produces the content stream; this module wraps it in the object
//! graph a reader needs.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, content, annotations, page, info
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the catalog and info dictionary
//! %%EOF
//! ```
//!
//! Fonts are the standard Type1 faces with WinAnsiEncoding, so nothing is
//! embedded.

pub mod surface;

pub use surface::{PdfBackend, PdfSurface};

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use crate::font::StandardFont;
use crate::model::Metadata;
use miniz_oxide::deflate::compress_to_vec_zlib;

const PRODUCER: &str = concat!("formslate ", env!("CARGO_PKG_VERSION"));

/// A clickable region bound to a URL. Coordinates are PDF points with the
/// origin at the bottom-left of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    pub rect: [f64; 4],
    pub url: String,
}

/// Everything the serializer needs to know about the page.
pub struct PageContent<'a> {
    pub width: f64,
    pub height: f64,
    /// Uncompressed content stream operators.
    pub stream: &'a [u8],
    /// Fonts referenced by the stream; index `i` is resource `/F{i}`.
    pub fonts: &'a [StandardFont],
    pub links: &'a [LinkAnnotation],
}

#[derive(Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    /// Append an object and return its id.
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, page: &PageContent<'_>, metadata: &Metadata) -> Vec<u8> {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut builder = PdfBuilder {
            objects: (0..3).map(|_| PdfObject { data: Vec::new() }).collect(),
        };

        let font_ids = self.register_fonts(&mut builder, page.fonts);

        let compressed = compress_to_vec_zlib(page.stream, 6);
        let mut content_data: Vec<u8> = Vec::new();
        let _ = write!(
            content_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        content_data.extend_from_slice(&compressed);
        content_data.extend_from_slice(b"\nendstream");
        let content_id = builder.push(content_data);

        let annot_ids: Vec<usize> = page
            .links
            .iter()
            .map(|link| builder.push(Self::link_annotation(link)))
            .collect();

        let mut page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << /Font << {} >> >>",
            page.width,
            page.height,
            content_id,
            Self::font_resource_dict(&font_ids)
        );
        if !annot_ids.is_empty() {
            let _ = write!(page_dict, " /Annots [{}]", Self::references(&annot_ids));
        }
        page_dict.push_str(" >>");
        let page_id = builder.push(page_dict.into_bytes());

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page_id).into_bytes();

        let info_id = builder.push(Self::info_dict(metadata));
        self.serialize(&builder, info_id)
    }

    fn register_fonts(&self, builder: &mut PdfBuilder, fonts: &[StandardFont]) -> Vec<usize> {
        // A page without text still gets a font resource.
        let fallback = [StandardFont::Helvetica];
        let fonts = if fonts.is_empty() { &fallback[..] } else { fonts };
        fonts
            .iter()
            .map(|font| {
                let dict = format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                     /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                );
                builder.push(dict.into_bytes())
            })
            .collect()
    }

    fn font_resource_dict(font_ids: &[usize]) -> String {
        font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn references(ids: &[usize]) -> String {
        ids.iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn link_annotation(link: &LinkAnnotation) -> Vec<u8> {
        let [x0, y0, x1, y1] = link.rect;
        let mut data = format!(
            "<< /Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] \
             /Border [0 0 0] /A << /S /URI /URI (",
            x0, y0, x1, y1
        )
        .into_bytes();
        data.extend_from_slice(&encode_pdf_string(&link.url));
        data.extend_from_slice(b") >> >>");
        data
    }

    fn info_dict(metadata: &Metadata) -> Vec<u8> {
        let mut info = b"<< ".to_vec();
        let entries = [
            ("Title", metadata.title.as_deref()),
            ("Author", metadata.author.as_deref()),
            ("Subject", metadata.subject.as_deref()),
            ("Creator", metadata.creator.as_deref()),
            ("Producer", Some(PRODUCER)),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} (", key);
                info.extend_from_slice(&encode_pdf_string(value));
                info.extend_from_slice(b") ");
            }
        }
        info.extend_from_slice(b">>");
        info
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// Encode text as the body of a PDF literal string: WinAnsi bytes with the
/// string delimiters escaped. Unmappable characters become `?`.
pub fn encode_pdf_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(unicode_to_winansi(ch).unwrap_or(b'?')),
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// Printable ASCII and Latin-1 map directly; 0x80..=0x9F hold the
/// Windows-1252 punctuation.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91), // curly quotes
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96), // en dash
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_page<'a>(fonts: &'a [StandardFont], links: &'a [LinkAnnotation]) -> PageContent<'a> {
        PageContent {
            width: 595.28,
            height: 841.89,
            stream: b"",
            fonts,
            links,
        }
    }

    fn contains(bytes: &[u8], needle: &str) -> bool {
        bytes
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_encode_pdf_string() {
        assert_eq!(encode_pdf_string("Hello (World)"), b"Hello \\(World\\)");
        assert_eq!(encode_pdf_string("back\\slash"), b"back\\\\slash");
        assert_eq!(encode_pdf_string("caf\u{e9}"), b"caf\xe9");
        assert_eq!(encode_pdf_string("\u{2014}"), b"\x97");
        assert_eq!(encode_pdf_string("\u{4e2d}"), b"?");
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let bytes = PdfWriter::new().write(&blank_page(&[], &[]), &Metadata::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, "%%EOF"));
        assert!(contains(&bytes, "xref"));
        assert!(contains(&bytes, "trailer"));
        assert!(contains(&bytes, "/BaseFont /Helvetica"));
        assert!(!contains(&bytes, "/Annots"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Test Document".to_string()),
            author: Some("Registrar".to_string()),
            subject: None,
            creator: None,
        };
        let bytes = PdfWriter::new().write(&blank_page(&[], &[]), &metadata);

        assert!(contains(&bytes, "/Title (Test Document)"));
        assert!(contains(&bytes, "/Author (Registrar)"));
        assert!(contains(&bytes, "/Producer (formslate"));
        assert!(!contains(&bytes, "/Subject"));
    }

    #[test]
    fn test_fonts_are_numbered_in_order() {
        let fonts = [StandardFont::HelveticaBold, StandardFont::Helvetica];
        let bytes = PdfWriter::new().write(&blank_page(&fonts, &[]), &Metadata::default());

        // catalog and page tree take objects 1 and 2
        assert!(contains(&bytes, "/F0 3 0 R /F1 4 0 R"));
        assert!(contains(&bytes, "/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_link_annotation_attached_to_page() {
        let links = [LinkAnnotation {
            rect: [10.0, 20.0, 110.0, 32.0],
            url: "https://example.org/a(b)".to_string(),
        }];
        let bytes = PdfWriter::new().write(&blank_page(&[], &links), &Metadata::default());

        assert!(contains(&bytes, "/Subtype /Link /Rect [10.00 20.00 110.00 32.00]"));
        assert!(contains(&bytes, "/URI (https://example.org/a\\(b\\))"));
        assert!(contains(&bytes, "/Annots [5 0 R]"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = PdfWriter::new().write(&blank_page(&[], &[]), &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        let xref_start = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }
}
