//! # Document Model
//!
//! The input representation for one render: the page geometry, the caller's
//! field values, and the [`Document`] built from them.
//!
//! A document is constructed fresh for every render call. Nothing in it is
//! cached or shared between calls, which is what keeps two consecutive
//! renders with different field values independent of each other.

use crate::layout::LayoutConfig;
use crate::style::{StyleSpec, TextAlign};
use serde::{Deserialize, Serialize};

/// Fixed output name of the persisted certificate.
pub const OUTPUT_FILENAME: &str = "header-example.pdf";

const INSTITUTION: &str = "The University of the State of New York";
const DEPARTMENT: &str = "THE STATE EDUCATION DEPARTMENT";
const OFFICE: &str = "Office of Teaching Initiatives";
const LINK_TEXT: &str = "www.highered.nysed.gov/tcert";
const CAPTION: &str =
    "Completion of Approved Continuing Teacher and Leader Education (CTLE) Hour(s) Certificate";
const INTRO: &str = "All CTLE must be completed with Approved Sponsors and be reported using this form, \
or an alternative form/format that captures the same information that is requested on this form, \
in addition to any electronic reporting requirements.";

/// Unit of the page coordinate system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Millimetres (1/25.4 inch).
    #[default]
    Mm,
    /// PDF points (1/72 inch).
    Pt,
}

impl Unit {
    /// How many PDF points one unit spans.
    pub fn points_per_unit(self) -> f64 {
        match self {
            Unit::Mm => 72.0 / 25.4,
            Unit::Pt => 1.0,
        }
    }
}

/// Page dimensions in semantic units. Immutable for the duration of a render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
}

impl Default for Page {
    fn default() -> Self {
        Self::a4()
    }
}

impl Page {
    /// A4 portrait in millimetres.
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            unit: Unit::Mm,
        }
    }

    /// Width left between two symmetric side margins.
    pub fn content_width(&self, margin: f64) -> f64 {
        self.width - 2.0 * margin
    }

    /// Horizontal anchor for centered text.
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Caller-supplied values for the certificate fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldValues {
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: String,
    pub date_of_birth: String,
    /// Last four digits of the Social Security Number.
    pub ssn_last4: String,
}

impl FieldValues {
    pub fn new(first_name: &str, last_name: &str, middle_initial: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            middle_initial: middle_initial.to_string(),
            ..Default::default()
        }
    }
}

/// A single run of text with its own style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    pub style: StyleSpec,
    #[serde(default)]
    pub align: TextAlign,
    /// Wrap the run to this width, in page units.
    #[serde(default)]
    pub max_width: Option<f64>,
    /// Makes the run a clickable link.
    #[serde(default)]
    pub url: Option<String>,
}

impl TextRun {
    pub fn new(text: &str, style: StyleSpec) -> Self {
        Self {
            text: text.to_string(),
            style,
            align: TextAlign::Left,
            max_width: None,
            url: None,
        }
    }

    pub fn centered(text: &str, style: StyleSpec) -> Self {
        Self {
            align: TextAlign::Center,
            ..Self::new(text, style)
        }
    }
}

/// How one column of a row claims its share of the content width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Fraction of the content width (0.0-1.0).
    Fraction(f64),
    /// Fixed width in page units.
    Fixed(f64),
    /// Absorbs whatever the fixed columns leave over.
    Remainder,
}

/// A labeled field before column widths are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl Field {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// A horizontal band of fields sharing one height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<ColumnWidth>,
    pub fields: Vec<Field>,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

/// Everything drawn on the certificate page, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title_lines: Vec<TextRun>,
    pub link: TextRun,
    pub caption: TextRun,
    pub intro: TextRun,
    pub sections: Vec<Section>,
}

impl Document {
    /// Build the CTLE certificate for one set of field values.
    pub fn certificate(fields: &FieldValues, layout: &LayoutConfig) -> Self {
        let title = &layout.title_style;
        let title_lines = vec![
            TextRun::centered(INSTITUTION, title.clone()),
            TextRun::centered(DEPARTMENT, title.clone().bold()),
            TextRun::centered(OFFICE, title.clone()),
        ];

        let mut link = TextRun::centered(
            LINK_TEXT,
            title
                .clone()
                .with_text_color(layout.link_color)
                .with_draw_color(layout.link_color),
        );
        link.url = Some(LINK_TEXT.to_string());

        let caption = TextRun::centered(CAPTION, layout.caption_style.clone());

        let mut intro = TextRun::new(INTRO, layout.paragraph_style.clone());
        intro.max_width = Some(layout.paragraph_max_width);

        let names = Row {
            columns: layout.name_columns.clone(),
            fields: vec![
                Field::new("First Name:", &fields.first_name),
                Field::new("Last Name:", &fields.last_name),
                Field::new("Middle Initial:", &fields.middle_initial),
            ],
            height: layout.row_height,
        };
        let identity = Row {
            columns: layout.identity_columns.clone(),
            fields: vec![
                Field::new("Date of Birth:", &fields.date_of_birth),
                Field::new(
                    "Last 4 Digits of the Social Security Number:",
                    &fields.ssn_last4,
                ),
            ],
            height: layout.row_height,
        };

        Self {
            title_lines,
            link,
            caption,
            intro,
            sections: vec![Section {
                title: "Section I".to_string(),
                rows: vec![names, identity],
            }],
        }
    }
}

/// Everything a render needs besides the field values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    pub page: Page,
    pub metadata: Metadata,
    pub layout: LayoutConfig,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            page: Page::a4(),
            metadata: Metadata {
                title: Some(CAPTION.to_string()),
                author: None,
                subject: Some("CTLE completion".to_string()),
                creator: Some("formslate".to_string()),
            },
            layout: LayoutConfig::default(),
        }
    }
}
