//! # PDF Sink
//!
//! Writes composed pages as a PDF 1.7 file.
//!
//! The writer is from scratch: the report only needs filled rectangles,
//! stroked lines and text in the two standard Helvetica faces, and that
//! subset of PDF is small enough to emit by hand.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, content streams
//! ...
//! xref                <- byte offset of every object
//! trailer             <- points to the catalog and info dictionary
//! %%EOF
//! ```
//!
//! Layout coordinates have their origin at the top-left corner; PDF's is at
//! the bottom-left, so every y is flipped against the page height here.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use log::debug;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ReportError;
use crate::font::{self, StandardFont};
use crate::layout::{ComposedDocument, DrawOp, Page};
use crate::sink::OutputSink;

/// Compression level for content streams.
const DEFLATE_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSink;

/// Objects allocated while building the file. Index = object number;
/// slot 0 is the free-list head and never written.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder, 1 = Catalog, 2 = Pages
        Self {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn add(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl PdfSink {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, document: &ComposedDocument) -> Vec<u8> {
        let mut builder = PdfBuilder::new();

        let font_ids: Vec<(StandardFont, usize)> = StandardFont::ALL
            .iter()
            .map(|f| {
                let dict = format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    f.pdf_name()
                );
                (*f, builder.add(dict.into_bytes()))
            })
            .collect();
        let font_resources = font_ids
            .iter()
            .map(|(f, id)| format!("/{} {} 0 R", f.resource_name(), id))
            .collect::<Vec<_>>()
            .join(" ");

        let (width, height) = (document.geometry.width, document.geometry.height);
        let mut page_ids = Vec::with_capacity(document.pages.len());

        for page in &document.pages {
            let content = self.content_stream(page, height);
            let compressed = compress_to_vec_zlib(content.as_bytes(), DEFLATE_LEVEL);

            let mut stream = format!(
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )
            .into_bytes();
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = builder.add(stream);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                width, height, content_id, font_resources
            );
            page_ids.push(builder.add(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let meta = &document.metadata;
        let mut info = String::from("<< ");
        for (key, value) in [
            ("Title", &meta.title),
            ("Author", &meta.author),
            ("Subject", &meta.subject),
        ] {
            if !value.is_empty() {
                let _ = write!(info, "/{} ({}) ", key, Self::encode_text(value));
            }
        }
        info.push_str("/Producer (hemoscan-report) >>");
        let info_id = builder.add(info.into_bytes());

        debug!(
            "pdf: {} page(s), {} objects",
            page_ids.len(),
            builder.objects.len() - 1
        );
        self.serialize(&builder, info_id)
    }

    /// Build the content stream for one page.
    fn content_stream(&self, page: &Page, page_height: f64) -> String {
        let mut stream = String::new();

        for op in &page.ops {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        fill.r,
                        fill.g,
                        fill.b,
                        x,
                        page_height - y - height,
                        width,
                        height
                    );
                }

                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        width,
                        x1,
                        page_height - y1,
                        x2,
                        page_height - y2
                    );
                }

                DrawOp::Text {
                    x,
                    y,
                    text,
                    font_size,
                    bold,
                    color,
                } => {
                    let font = StandardFont::regular_or_bold(*bold);
                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        color.r,
                        color.g,
                        color.b,
                        font.resource_name(),
                        font_size,
                        x,
                        page_height - y,
                        Self::encode_text(text)
                    );
                }
            }
        }

        stream
    }

    /// Encode text as the body of a PDF literal string in WinAnsiEncoding.
    /// Unencodable characters become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let b = font::winansi_byte(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
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
            info_id,
            xref_offset
        );

        output
    }
}

impl OutputSink for PdfSink {
    fn write_document(&self, document: &ComposedDocument, out: &mut dyn IoWrite) -> Result<(), ReportError> {
        let bytes = self.build(document);
        out.write_all(&bytes)
            .map_err(|e| ReportError::sink("writing PDF bytes", e))?;
        out.flush().map_err(|e| ReportError::sink("flushing PDF output", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageGeometry;
    use crate::layout::Metadata;
    use crate::style::Color;

    fn doc(pages: Vec<Page>) -> ComposedDocument {
        ComposedDocument {
            geometry: PageGeometry::default(),
            metadata: Metadata {
                title: "HemoScan AI - Report".to_string(),
                author: "HemoScan AI".to_string(),
                subject: String::new(),
            },
            pages,
        }
    }

    fn blank(number: usize) -> Page {
        Page { number, ops: vec![] }
    }

    struct FailingWriter;

    impl IoWrite for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_text_escapes() {
        assert_eq!(PdfSink::encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfSink::encode_text("back\\slash"), "back\\\\slash");
        assert_eq!(PdfSink::encode_text("caf\u{e9}"), "caf\\351");
        assert_eq!(PdfSink::encode_text("\u{1F957}"), "?");
    }

    #[test]
    fn test_single_page_is_valid_pdf() {
        let bytes = PdfSink::new().to_bytes(&doc(vec![blank(1)])).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn test_page_count_in_tree() {
        let bytes = PdfSink::new()
            .to_bytes(&doc(vec![blank(1), blank(2), blank(3)]))
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
        assert_eq!(text.matches("/Type /Page ").count(), 3);
    }

    #[test]
    fn test_metadata_and_fonts() {
        let bytes = PdfSink::new().to_bytes(&doc(vec![blank(1)])).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (HemoScan AI - Report)"));
        assert!(text.contains("/Author (HemoScan AI)"));
        assert!(!text.contains("/Subject"));
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold "));
    }

    #[test]
    fn test_content_stream_flips_y() {
        let page = Page {
            number: 1,
            ops: vec![
                DrawOp::Rect {
                    x: 10.0,
                    y: 20.0,
                    width: 30.0,
                    height: 40.0,
                    fill: Color::rgb8(0, 0, 0),
                },
                DrawOp::Text {
                    x: 40.0,
                    y: 100.0,
                    text: "Page 1 of 1".to_string(),
                    font_size: 8.0,
                    bold: true,
                    color: Color::rgb8(0, 0, 0),
                },
            ],
        };
        let stream = PdfSink::new().content_stream(&page, 800.0);
        assert!(stream.contains("10.00 740.00 30.00 40.00 re"));
        assert!(stream.contains("/F1 8.0 Tf\n40.00 700.00 Td\n(Page 1 of 1) Tj"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let err = PdfSink::new()
            .write_document(&doc(vec![blank(1)]), &mut FailingWriter)
            .unwrap_err();
        assert!(matches!(err, ReportError::OutputSink { .. }));
    }

    #[test]
    fn test_output_is_deterministic() {
        let d = doc(vec![blank(1), blank(2)]);
        let sink = PdfSink::new();
        assert_eq!(sink.to_bytes(&d).unwrap(), sink.to_bytes(&d).unwrap());
    }
}
