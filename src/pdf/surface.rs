//! The PDF drawing surface.
//!
//! Implements [`DrawingSurface`] by appending content-stream operators for one
//! page. Callers work in page units with a top-left origin; everything is
//! converted to points with the origin at the bottom-left as it is written.
//! Every primitive is wrapped in `q`/`Q` and sets its own colors, so the
//! stream carries no state from one primitive to the next.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

use super::{encode_pdf_string, LinkAnnotation, PageContent, PdfWriter};
use crate::error::FormslateError;
use crate::font::{FontContext, StandardFont};
use crate::model::{Metadata, Page};
use crate::style::{Color, FontWeight, StyleSpec, TextAlign};
use crate::surface::{DrawingSurface, RectMode, SurfaceFactory, TextMeasure, TextOptions};
use crate::text::{break_into_lines, LINE_HEIGHT_FACTOR};

/// Stroke width in points (0.2mm).
const LINE_WIDTH: f64 = 0.567;
/// Portion of the font size below the baseline, for link hit areas.
const DESCENT: f64 = 0.2;
/// Portion of the font size above the baseline.
const ASCENT: f64 = 0.8;

fn check_finite(values: &[f64], what: &str) -> Result<(), FormslateError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(FormslateError::Render(format!(
            "non-finite coordinate in {}: {:?}",
            what, values
        )))
    }
}

fn color_op(stream: &mut String, color: Color, op: &str) {
    let _ = writeln!(
        stream,
        "{:.3} {:.3} {:.3} {}",
        color.r, color.g, color.b, op
    );
}

pub struct PdfSurface {
    page: Page,
    /// Points per page unit.
    k: f64,
    fonts: FontContext,
    metadata: Metadata,
    output_dir: PathBuf,

    font_family: String,
    font_weight: FontWeight,
    font_size: f64,
    text_color: Color,
    draw_color: Color,
    fill_color: Color,

    stream: String,
    fonts_used: Vec<StandardFont>,
    links: Vec<LinkAnnotation>,
    saved: bool,
}

impl PdfSurface {
    pub fn new(page: Page, metadata: Metadata, fonts: FontContext, output_dir: &Path) -> Self {
        let baseline = StyleSpec::default();
        Self {
            page,
            k: page.unit.points_per_unit(),
            fonts,
            metadata,
            output_dir: output_dir.to_path_buf(),
            font_family: baseline.font_family,
            font_weight: baseline.font_weight,
            font_size: baseline.font_size,
            text_color: baseline.text_color,
            draw_color: baseline.draw_color,
            fill_color: baseline.fill_color,
            stream: String::new(),
            fonts_used: Vec::new(),
            links: Vec::new(),
            saved: false,
        }
    }

    /// The complete PDF file for what has been drawn so far.
    pub fn into_bytes(self) -> Vec<u8> {
        self.to_bytes()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let content = PageContent {
            width: self.page.width * self.k,
            height: self.page.height * self.k,
            stream: self.stream.as_bytes(),
            fonts: &self.fonts_used,
            links: &self.links,
        };
        PdfWriter::new().write(&content, &self.metadata)
    }

    fn ensure_open(&self) -> Result<(), FormslateError> {
        if self.saved {
            Err(FormslateError::Render(
                "surface already saved".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn pt_x(&self, x: f64) -> f64 {
        x * self.k
    }

    fn pt_y(&self, y: f64) -> f64 {
        (self.page.height - y) * self.k
    }

    /// Resource index of the current font, registering it on first use.
    fn font_index(&mut self) -> usize {
        let font = self.fonts.resolve(&self.font_family, self.font_weight);
        match self.fonts_used.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.fonts_used.push(font);
                self.fonts_used.len() - 1
            }
        }
    }

    fn measure_pt(&self, content: &str) -> f64 {
        self.fonts
            .measure_string(content, &self.font_family, self.font_weight, self.font_size)
    }

    /// Distance between successive lines, in page units.
    fn leading(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR / self.k
    }

    /// Write one line of text `width` points wide; returns its left edge.
    fn show_line(&mut self, content: &str, width: f64, x: f64, y: f64, align: TextAlign) -> f64 {
        let left = match align {
            TextAlign::Left => self.pt_x(x),
            TextAlign::Center => self.pt_x(x) - width / 2.0,
        };
        let baseline = self.pt_y(y);
        let font = self.font_index();

        let _ = writeln!(self.stream, "q");
        color_op(&mut self.stream, self.text_color, "rg");
        let _ = writeln!(self.stream, "BT\n/F{} {:.2} Tf", font, self.font_size);
        let _ = writeln!(self.stream, "{:.2} {:.2} Td", left, baseline);
        let encoded = encode_pdf_string(content);
        // WinAnsi bytes above 0x7F are kept as octal escapes so the stream stays ASCII.
        self.stream.push('(');
        for byte in encoded {
            if byte.is_ascii() {
                self.stream.push(byte as char);
            } else {
                let _ = write!(self.stream, "\\{:03o}", byte);
            }
        }
        let _ = writeln!(self.stream, ") Tj\nET\nQ");
        left
    }
}

impl TextMeasure for PdfSurface {
    fn text_width(&self, content: &str, style: &StyleSpec) -> f64 {
        self.fonts.measure_string(
            content,
            &style.font_family,
            style.font_weight,
            style.font_size,
        ) / self.k
    }
}

impl DrawingSurface for PdfSurface {
    fn page_width(&self) -> f64 {
        self.page.width
    }

    fn set_font(&mut self, family: &str, weight: FontWeight) -> Result<(), FormslateError> {
        self.ensure_open()?;
        self.font_family = family.to_string();
        self.font_weight = weight;
        Ok(())
    }

    fn set_font_size(&mut self, points: f64) -> Result<(), FormslateError> {
        self.ensure_open()?;
        if !points.is_finite() || points <= 0.0 {
            return Err(FormslateError::Render(format!(
                "invalid font size {}",
                points
            )));
        }
        self.font_size = points;
        Ok(())
    }

    fn set_text_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.ensure_open()?;
        self.text_color = color;
        Ok(())
    }

    fn set_draw_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.ensure_open()?;
        self.draw_color = color;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.ensure_open()?;
        self.fill_color = color;
        Ok(())
    }

    fn text(
        &mut self,
        content: &str,
        x: f64,
        y: f64,
        options: TextOptions,
    ) -> Result<(), FormslateError> {
        self.ensure_open()?;
        check_finite(&[x, y], "text")?;
        match options.max_width {
            None => {
                // Explicit line breaks still start new lines.
                let leading = self.leading();
                for (i, line) in content.lines().enumerate() {
                    let width = self.measure_pt(line);
                    self.show_line(line, width, x, y + i as f64 * leading, options.align);
                }
            }
            Some(max_width) => {
                check_finite(&[max_width], "text width")?;
                let lines = break_into_lines(
                    &self.fonts,
                    content,
                    max_width * self.k,
                    &self.font_family,
                    self.font_weight,
                    self.font_size,
                );
                let leading = self.leading();
                for (i, line) in lines.iter().enumerate() {
                    let y = y + i as f64 * leading;
                    self.show_line(&line.text, line.width, x, y, options.align);
                }
            }
        }
        Ok(())
    }

    fn text_with_link(
        &mut self,
        content: &str,
        x: f64,
        y: f64,
        url: &str,
        align: TextAlign,
    ) -> Result<(), FormslateError> {
        self.ensure_open()?;
        check_finite(&[x, y], "link")?;
        if content.contains(['\n', '\r']) {
            return Err(FormslateError::Render(
                "link text must be a single line".to_string(),
            ));
        }
        let width = self.measure_pt(content);
        let left = self.show_line(content, width, x, y, align);
        let baseline = self.pt_y(y);
        self.links.push(LinkAnnotation {
            rect: [
                left,
                baseline - DESCENT * self.font_size,
                left + width,
                baseline + ASCENT * self.font_size,
            ],
            url: url.to_string(),
        });
        Ok(())
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: RectMode,
    ) -> Result<(), FormslateError> {
        self.ensure_open()?;
        check_finite(&[x, y, width, height], "rect")?;
        if width < 0.0 || height < 0.0 {
            return Err(FormslateError::Render(format!(
                "negative rect size {} x {}",
                width, height
            )));
        }
        let paint = match mode {
            RectMode::Stroke => "S",
            RectMode::Fill => "f",
            RectMode::FillStroke => "B",
        };
        let _ = writeln!(self.stream, "q");
        color_op(&mut self.stream, self.fill_color, "rg");
        color_op(&mut self.stream, self.draw_color, "RG");
        let _ = writeln!(
            self.stream,
            "{:.3} w\n{:.2} {:.2} {:.2} {:.2} re\n{}\nQ",
            LINE_WIDTH,
            self.pt_x(x),
            self.pt_y(y + height),
            width * self.k,
            height * self.k,
            paint
        );
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), FormslateError> {
        self.ensure_open()?;
        check_finite(&[x1, y1, x2, y2], "line")?;
        let _ = writeln!(self.stream, "q");
        color_op(&mut self.stream, self.draw_color, "RG");
        let _ = writeln!(
            self.stream,
            "{:.3} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ",
            LINE_WIDTH,
            self.pt_x(x1),
            self.pt_y(y1),
            self.pt_x(x2),
            self.pt_y(y2)
        );
        Ok(())
    }

    /// Written to a sibling temporary file first, then renamed into place, so
    /// a failed save never leaves a truncated document behind.
    fn save(&mut self, filename: &str) -> Result<(), FormslateError> {
        self.ensure_open()?;
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(FormslateError::Render(format!(
                "output filename must be a bare file name, got {:?}",
                filename
            )));
        }
        let bytes = self.to_bytes();
        let target = self.output_dir.join(filename);
        let temp = self.output_dir.join(format!(".{}.partial", filename));
        if let Err(e) = fs::write(&temp, &bytes).and_then(|()| fs::rename(&temp, &target)) {
            if temp.is_file() {
                let _ = fs::remove_file(&temp);
            }
            return Err(e.into());
        }
        self.saved = true;
        log::info!("wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }
}

/// The loaded PDF drawing backend: font metrics plus an output directory.
#[derive(Debug, Clone)]
pub struct PdfBackend {
    output_dir: PathBuf,
    fonts: FontContext,
}

impl PdfBackend {
    /// Prepare a backend writing into `output_dir`, creating it if needed.
    pub fn load(output_dir: impl AsRef<Path>) -> Result<Self, FormslateError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        if !output_dir.is_dir() {
            return Err(FormslateError::Initialization(format!(
                "{} is not a directory",
                output_dir.display()
            )));
        }
        log::debug!("pdf backend ready, writing to {}", output_dir.display());
        Ok(Self {
            output_dir,
            fonts: FontContext::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl SurfaceFactory for PdfBackend {
    type Surface = PdfSurface;

    fn create(&self, page: &Page, metadata: &Metadata) -> Result<PdfSurface, FormslateError> {
        Ok(PdfSurface::new(
            *page,
            metadata.clone(),
            self.fonts.clone(),
            &self.output_dir,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PdfSurface {
        PdfSurface::new(
            Page::a4(),
            Metadata::default(),
            FontContext::new(),
            Path::new("."),
        )
    }

    #[test]
    fn test_measure_is_in_page_units() {
        let s = surface();
        let style = StyleSpec::sized(10.0);
        // "Hello" is 22.78pt at 10pt
        let expected = 22.78 * 25.4 / 72.0;
        assert!((s.text_width("Hello", &style) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_centered_text_is_shifted_by_half_its_width() {
        let mut s = surface();
        s.set_font_size(10.0).unwrap();
        s.text(
            "Hello",
            105.0,
            15.0,
            TextOptions {
                align: TextAlign::Center,
                max_width: None,
            },
        )
        .unwrap();
        let left = 105.0 * 72.0 / 25.4 - 22.78 / 2.0;
        let top = (297.0 - 15.0) * 72.0 / 25.4;
        assert!(s.stream.contains(&format!("{:.2} {:.2} Td", left, top)));
        assert!(s.stream.contains("/F0 10.00 Tf"));
    }

    #[test]
    fn test_rect_is_flipped_to_bottom_left_origin() {
        let mut s = surface();
        s.set_fill_color(Color::rgb8(200, 220, 255)).unwrap();
        s.rect(10.0, 70.0, 190.0, 6.0, RectMode::FillStroke).unwrap();
        let k = 72.0 / 25.4;
        let expected = format!(
            "{:.2} {:.2} {:.2} {:.2} re\nB",
            10.0 * k,
            (297.0 - 76.0) * k,
            190.0 * k,
            6.0 * k
        );
        assert!(s.stream.contains(&expected));
        assert!(s.stream.contains("0.784 0.863 1.000 rg"));
    }

    #[test]
    fn test_bold_registers_second_font() {
        let mut s = surface();
        s.text("a", 0.0, 10.0, TextOptions::default()).unwrap();
        s.set_font("Helvetica", FontWeight::Bold).unwrap();
        s.text("b", 0.0, 20.0, TextOptions::default()).unwrap();
        s.set_font("Helvetica", FontWeight::Normal).unwrap();
        s.text("c", 0.0, 30.0, TextOptions::default()).unwrap();
        assert_eq!(
            s.fonts_used,
            vec![StandardFont::Helvetica, StandardFont::HelveticaBold]
        );
    }

    #[test]
    fn test_wrapped_text_emits_several_lines() {
        let mut s = surface();
        s.text(
            "one two three four five six seven eight nine ten",
            8.0,
            50.0,
            TextOptions {
                align: TextAlign::Left,
                max_width: Some(30.0),
            },
        )
        .unwrap();
        assert!(s.stream.matches(" Tj").count() > 1);
    }

    #[test]
    fn test_wrapped_lines_are_centered_one_by_one() {
        let mut s = surface();
        s.set_font_size(10.0).unwrap();
        s.text(
            "Hello Hello",
            105.0,
            15.0,
            TextOptions {
                align: TextAlign::Center,
                max_width: Some(10.0),
            },
        )
        .unwrap();
        assert_eq!(s.stream.matches(" Tj").count(), 2);
        let left = format!("{:.2} ", 105.0 * 72.0 / 25.4 - 22.78 / 2.0);
        let anchors: Vec<&str> = s.stream.lines().filter(|l| l.ends_with(" Td")).collect();
        assert_eq!(anchors.len(), 2);
        assert!(anchors.iter().all(|l| l.starts_with(&left)), "{:?}", anchors);
    }

    #[test]
    fn test_embedded_newlines_start_new_lines() {
        let mut s = surface();
        s.set_font_size(10.0).unwrap();
        s.text("one\ntwo\r\nthree", 0.0, 10.0, TextOptions::default())
            .unwrap();
        assert_eq!(s.stream.matches(" Tj").count(), 3);
        assert!(s.stream.contains("(one) Tj"));
        assert!(s.stream.contains("(three) Tj"));
        assert!(!s.stream.contains("\\n"));
        assert!(!s.stream.contains("\\r"));

        let second = (297.0 - 10.0 - 11.5 * 25.4 / 72.0) * 72.0 / 25.4;
        assert!(s.stream.contains(&format!("0.00 {:.2} Td", second)));

        assert!(matches!(
            s.text_with_link("a\nb", 0.0, 10.0, "https://example.org", TextAlign::Left),
            Err(FormslateError::Render(_))
        ));
    }

    #[test]
    fn test_link_records_annotation() {
        let mut s = surface();
        s.text_with_link("site", 105.0, 30.0, "https://example.org", TextAlign::Center)
            .unwrap();
        assert_eq!(s.links.len(), 1);
        let [x0, y0, x1, y1] = s.links[0].rect;
        assert!(x0 < x1 && y0 < y1);
        assert!(((x0 + x1) / 2.0 - 105.0 * 72.0 / 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_input_is_a_render_error() {
        let mut s = surface();
        assert!(matches!(
            s.set_font_size(f64::NAN),
            Err(FormslateError::Render(_))
        ));
        assert!(matches!(
            s.set_font_size(0.0),
            Err(FormslateError::Render(_))
        ));
        assert!(matches!(
            s.line(0.0, f64::INFINITY, 1.0, 1.0),
            Err(FormslateError::Render(_))
        ));
        assert!(matches!(
            s.rect(0.0, 0.0, -1.0, 5.0, RectMode::Stroke),
            Err(FormslateError::Render(_))
        ));
    }

    #[test]
    fn test_non_latin_text_keeps_stream_ascii() {
        let mut s = surface();
        s.text("Jos\u{e9}", 0.0, 10.0, TextOptions::default()).unwrap();
        assert!(s.stream.contains("(Jos\\351) Tj"));
        assert!(s.stream.is_ascii());
    }

    #[test]
    fn test_save_writes_file_and_closes_surface() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PdfBackend::load(dir.path()).unwrap();
        let mut s = backend.create(&Page::a4(), &Metadata::default()).unwrap();
        s.text("hi", 10.0, 10.0, TextOptions::default()).unwrap();
        s.save("out.pdf").unwrap();

        let bytes = fs::read(dir.path().join("out.pdf")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(!dir.path().join(".out.pdf.partial").exists());
        assert!(s.text("late", 0.0, 0.0, TextOptions::default()).is_err());
        assert!(s.save("out.pdf").is_err());
    }

    #[test]
    fn test_failed_write_leaves_nothing_and_keeps_surface_open() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PdfBackend::load(dir.path()).unwrap();
        let mut s = backend.create(&Page::a4(), &Metadata::default()).unwrap();
        s.text("hi", 10.0, 10.0, TextOptions::default()).unwrap();

        // A directory in the temp file's place makes the write fail.
        let blocker = dir.path().join(".out.pdf.partial");
        fs::create_dir(&blocker).unwrap();
        assert!(matches!(s.save("out.pdf"), Err(FormslateError::Io(_))));
        assert!(!dir.path().join("out.pdf").exists());
        assert!(blocker.is_dir());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(".out.pdf.partial")]);

        fs::remove_dir(&blocker).unwrap();
        s.save("out.pdf").unwrap();
        assert!(dir.path().join("out.pdf").is_file());
        assert!(!blocker.exists());
    }

    #[test]
    fn test_save_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PdfBackend::load(dir.path()).unwrap();
        let mut s = backend.create(&Page::a4(), &Metadata::default()).unwrap();
        for name in ["", "../escaped.pdf", "sub/out.pdf", ".."] {
            assert!(matches!(s.save(name), Err(FormslateError::Render(_))), "{:?}", name);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_load_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let backend = PdfBackend::load(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(backend.output_dir(), nested.as_path());
    }
}
