//! Document model for scanlation projects.
//!
//! A `Project` is an ordered list of `Page`s, each holding the text boxes
//! placed over that page's artwork. These are pure value types: no rendering
//! knowledge, no identity beyond field equality plus the interned id keys.
//! Anything that reaches the store goes through `validate` first, so a
//! committed project is always well-formed.

use crate::error::{Result, ValidationError};
use crate::id::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{SystemTime, UNIX_EPOCH};

// ─── Defaults ────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_WIDTH: f64 = 900.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 1200.0;
pub const DEFAULT_FONT_SIZE: f64 = 32.0;
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;
pub const MIN_FONT_SIZE: f64 = 6.0;
pub const MIN_LINE_HEIGHT: f64 = 0.8;
pub const MAX_LINE_HEIGHT: f64 = 3.0;
/// Smallest box dimension accepted from scene write-back.
pub const MIN_BOX_SIZE: f64 = 20.0;

/// Current time in epoch milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, stored as 4 × f32 in [0.0, 1.0]. Serialized as a hex string
/// (`#RRGGBB` or `#RRGGBBAA`) to match the persisted JSON schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let expand = |n: u8| (n * 17) as f32 / 255.0;
        match bytes.len() {
            3 | 4 => {
                let r = expand(hex_val(bytes[0])?);
                let g = expand(hex_val(bytes[1])?);
                let b = expand(hex_val(bytes[2])?);
                let a = if bytes.len() == 4 {
                    expand(hex_val(bytes[3])?)
                } else {
                    1.0
                };
                Some(Self::rgba(r, g, b, a))
            }
            6 | 8 => {
                let byte =
                    |i: usize| Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32);
                let r = byte(0)? / 255.0;
                let g = byte(2)? / 255.0;
                let b = byte(4)? / 255.0;
                let a = if bytes.len() == 8 {
                    byte(6)? / 255.0
                } else {
                    1.0
                };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {s:?}")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position, size, and rotation of a text box in page coordinates.
/// `x`, `y`, `rotation` are unconstrained reals; `w` and `h` must stay
/// positive. All fields must be finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 60.0,
            y: 60.0,
            w: 280.0,
            h: 80.0,
            rotation: 0.0,
        }
    }
}

impl Geometry {
    pub fn validate(&self, path: &str) -> Result<()> {
        for (field, value) in [
            ("x", self.x),
            ("y", self.y),
            ("w", self.w),
            ("h", self.h),
            ("rotation", self.rotation),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::new(
                    format!("{path}.{field}"),
                    "must be a finite number",
                ));
            }
        }
        if self.w <= 0.0 {
            return Err(ValidationError::new(
                format!("{path}.w"),
                "must be positive",
            ));
        }
        if self.h <= 0.0 {
            return Err(ValidationError::new(
                format!("{path}.h"),
                "must be positive",
            ));
        }
        Ok(())
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// The decorative shape drawn behind a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleShape {
    None,
    #[default]
    Rounded,
    Ellipse,
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}
fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}
fn default_color() -> Color {
    Color::WHITE
}
fn default_line_height() -> f64 {
    DEFAULT_LINE_HEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_color")]
    pub color: Color,
    /// Bubble fill. `None` falls back to the renderer's default fill.
    #[serde(default)]
    pub bg_color: Option<Color>,
    #[serde(default)]
    pub bubble_shape: BubbleShape,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: Color::WHITE,
            bg_color: None,
            bubble_shape: BubbleShape::default(),
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl TextStyle {
    pub fn validate(&self, path: &str) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size < MIN_FONT_SIZE {
            return Err(ValidationError::new(
                format!("{path}.fontSize"),
                format!("must be at least {MIN_FONT_SIZE}"),
            ));
        }
        if self.font_family.is_empty() {
            return Err(ValidationError::new(
                format!("{path}.fontFamily"),
                "must not be empty",
            ));
        }
        if !self.line_height.is_finite()
            || !(MIN_LINE_HEIGHT..=MAX_LINE_HEIGHT).contains(&self.line_height)
        {
            return Err(ValidationError::new(
                format!("{path}.lineHeight"),
                format!("must be between {MIN_LINE_HEIGHT} and {MAX_LINE_HEIGHT}"),
            ));
        }
        Ok(())
    }
}

// ─── Text box ────────────────────────────────────────────────────────────

/// A translatable text overlay. `original_text` holds the source-language
/// content and is immutable after creation; `text` holds the current
/// (possibly translated) content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub id: ObjectId,
    pub text: String,
    pub original_text: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextBox {
    /// A fresh box with default geometry and style. `original_text` is
    /// captured from the initial content.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: ObjectId::text_box(),
            original_text: text.clone(),
            text,
            geometry: Geometry::default(),
            style: TextStyle::default(),
        }
    }

    pub fn validate(&self, path: &str) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::new(
                format!("{path}.id"),
                "must not be empty",
            ));
        }
        self.geometry.validate(&format!("{path}.geometry"))?;
        self.style.validate(&format!("{path}.style"))
    }
}

// ─── Page ────────────────────────────────────────────────────────────────

/// A single comic page: background artwork references plus the text boxes
/// placed over it. Box order is draw order; identity is by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: ObjectId,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Alternate background with source text removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inpainted_image_url: Option<String>,
    #[serde(default)]
    pub text_boxes: Vec<TextBox>,
}

impl Page {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: ObjectId::page(),
            name: name.into(),
            width,
            height,
            image_url: None,
            inpainted_image_url: None,
            text_boxes: Vec::new(),
        }
    }

    pub fn text_box(&self, id: ObjectId) -> Option<&TextBox> {
        self.text_boxes.iter().find(|tb| tb.id == id)
    }

    pub fn text_box_mut(&mut self, id: ObjectId) -> Option<&mut TextBox> {
        self.text_boxes.iter_mut().find(|tb| tb.id == id)
    }

    /// The background source to display: the inpainted artwork when the
    /// toggle is on and a non-empty url exists, the raw artwork otherwise.
    pub fn background_source(&self, show_inpainted: bool) -> Option<&str> {
        if show_inpainted
            && let Some(url) = self.inpainted_image_url.as_deref()
            && !url.is_empty()
        {
            return Some(url);
        }
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn validate(&self, path: &str) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::new(
                format!("{path}.id"),
                "must not be empty",
            ));
        }
        if self.name.is_empty() {
            return Err(ValidationError::new(
                format!("{path}.name"),
                "must not be empty",
            ));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ValidationError::new(
                format!("{path}.width"),
                "must be positive",
            ));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ValidationError::new(
                format!("{path}.height"),
                "must be positive",
            ));
        }
        for (i, tb) in self.text_boxes.iter().enumerate() {
            tb.validate(&format!("{path}.textBoxes[{i}]"))?;
            if self.text_boxes[..i].iter().any(|other| other.id == tb.id) {
                return Err(ValidationError::new(
                    format!("{path}.textBoxes[{i}].id"),
                    format!("duplicate text box id {:?}", tb.id.as_str()),
                ));
            }
        }
        Ok(())
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default = "now_ms")]
    pub created_at: u64,
    /// Refreshed on every mutation.
    #[serde(default = "now_ms")]
    pub updated_at: u64,
}

impl Default for Metadata {
    fn default() -> Self {
        let now = now_ms();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_show_inpainted() -> bool {
    true
}

/// The full editable unit: ordered pages plus UI-adjacent state (active
/// page index, current selection, background toggle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub active_page_id: usize,
    #[serde(default)]
    pub selected_text_box_id: Option<ObjectId>,
    #[serde(default = "default_show_inpainted")]
    pub show_inpainted: bool,
}

impl Project {
    /// A fresh project with one blank default page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::generate("project"),
            name: name.into(),
            metadata: Metadata::default(),
            pages: vec![Page::new("Page 1", DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)],
            active_page_id: 0,
            selected_text_box_id: None,
            show_inpainted: true,
        }
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.pages.get(self.active_page_id)
    }

    pub fn active_page_mut(&mut self) -> Option<&mut Page> {
        self.pages.get_mut(self.active_page_id)
    }

    /// Deserialize from untrusted JSON, coercing recoverable deviations and
    /// rejecting the rest with a `ValidationError`.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let mut project: Project = serde_json::from_value(value)
            .map_err(|e| ValidationError::new("$", e.to_string()))?;
        project.coerce();
        project.validate()?;
        Ok(project)
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("project serialization is infallible")
    }

    /// Repair UI-adjacent state that may be stale in loaded data: clamp the
    /// active page index into range and drop a selection that no longer
    /// resolves on the active page.
    pub fn coerce(&mut self) {
        if !self.pages.is_empty() && self.active_page_id >= self.pages.len() {
            self.active_page_id = self.pages.len() - 1;
        }
        if let Some(selected) = self.selected_text_box_id
            && self
                .active_page()
                .is_none_or(|page| page.text_box(selected).is_none())
        {
            self.selected_text_box_id = None;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::new("id", "must not be empty"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        for (i, page) in self.pages.iter().enumerate() {
            page.validate(&format!("pages[{i}]"))?;
            if self.pages[..i].iter().any(|other| other.id == page.id) {
                return Err(ValidationError::new(
                    format!("pages[{i}].id"),
                    format!("duplicate page id {:?}", page.id.as_str()),
                ));
            }
        }
        // Box ids are globally unique, not just per page.
        for (i, page) in self.pages.iter().enumerate() {
            for (j, tb) in page.text_boxes.iter().enumerate() {
                let clash = self.pages[..i]
                    .iter()
                    .any(|p| p.text_boxes.iter().any(|other| other.id == tb.id));
                if clash {
                    return Err(ValidationError::new(
                        format!("pages[{i}].textBoxes[{j}].id"),
                        format!("text box id {:?} appears on another page", tb.id.as_str()),
                    ));
                }
            }
        }
        if !self.pages.is_empty() && self.active_page_id >= self.pages.len() {
            return Err(ValidationError::new(
                "activePageId",
                "must reference an existing page",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9); // #RRGGBBAA

        let short = Color::from_hex("fff").unwrap();
        assert_eq!(short.to_hex(), "#FFFFFF");
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn geometry_rejects_nonpositive_size() {
        let geo = Geometry {
            w: 0.0,
            ..Geometry::default()
        };
        let err = geo.validate("geometry").unwrap_err();
        assert_eq!(err.path, "geometry.w");
    }

    #[test]
    fn geometry_rejects_non_finite() {
        let geo = Geometry {
            x: f64::NAN,
            ..Geometry::default()
        };
        assert!(geo.validate("geometry").is_err());

        let geo = Geometry {
            rotation: f64::INFINITY,
            ..Geometry::default()
        };
        assert_eq!(
            geo.validate("g").unwrap_err().path,
            "g.rotation"
        );
    }

    #[test]
    fn style_enforces_font_floor_and_line_height_range() {
        let style = TextStyle {
            font_size: 5.0,
            ..TextStyle::default()
        };
        assert_eq!(style.validate("style").unwrap_err().path, "style.fontSize");

        let style = TextStyle {
            line_height: 3.5,
            ..TextStyle::default()
        };
        assert_eq!(
            style.validate("style").unwrap_err().path,
            "style.lineHeight"
        );
    }

    #[test]
    fn style_defaults_fill_missing_json_fields() {
        let style: TextStyle = serde_json::from_str("{}").unwrap();
        assert_eq!(style, TextStyle::default());
        assert_eq!(style.font_size, 32.0);
        assert_eq!(style.bubble_shape, BubbleShape::Rounded);
    }

    #[test]
    fn text_box_new_captures_original_text() {
        let tb = TextBox::new("こんにちは");
        assert_eq!(tb.text, "こんにちは");
        assert_eq!(tb.original_text, "こんにちは");
        assert!(tb.validate("box").is_ok());
    }

    #[test]
    fn page_rejects_duplicate_box_ids() {
        let mut page = Page::new("Page 1", 900.0, 1200.0);
        let tb = TextBox::new("a");
        page.text_boxes.push(tb.clone());
        page.text_boxes.push(tb);
        let err = page.validate("pages[0]").unwrap_err();
        assert_eq!(err.path, "pages[0].textBoxes[1].id");
    }

    #[test]
    fn background_source_prefers_inpainted_when_toggled() {
        let mut page = Page::new("Page 1", 900.0, 1200.0);
        page.image_url = Some("raw.png".into());
        page.inpainted_image_url = Some("clean.png".into());
        assert_eq!(page.background_source(true), Some("clean.png"));
        assert_eq!(page.background_source(false), Some("raw.png"));

        page.inpainted_image_url = Some(String::new());
        assert_eq!(page.background_source(true), Some("raw.png"));
    }

    #[test]
    fn project_coerce_clamps_active_and_clears_stale_selection() {
        let mut project = Project::new("Untitled chapter");
        project.active_page_id = 7;
        project.selected_text_box_id = Some(ObjectId::intern("ghost"));
        project.coerce();
        assert_eq!(project.active_page_id, 0);
        assert_eq!(project.selected_text_box_id, None);
    }

    #[test]
    fn project_json_roundtrip_uses_camel_case() {
        let mut project = Project::new("Untitled chapter");
        project.pages[0].text_boxes.push(TextBox::new("hello"));
        let value = project.to_value();

        assert!(value.get("activePageId").is_some());
        assert!(value.get("showInpainted").is_some());
        let tb = &value["pages"][0]["textBoxes"][0];
        assert!(tb.get("originalText").is_some());
        assert_eq!(tb["style"]["fontFamily"], "Inter");
        assert_eq!(tb["style"]["color"], "#FFFFFF");

        let back = Project::from_value(value).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn project_from_value_rejects_bad_geometry() {
        let mut project = Project::new("p");
        project.pages[0].text_boxes.push(TextBox::new("x"));
        let mut value = project.to_value();
        value["pages"][0]["textBoxes"][0]["geometry"]["w"] = serde_json::json!(-4);
        let err = Project::from_value(value).unwrap_err();
        assert_eq!(err.path, "pages[0].textBoxes[0].geometry.w");
    }
}
