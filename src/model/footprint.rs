//! Footprint model: text, graphics and pads on named KiCad layers.
//!
//! All dimensions are in millimetres.

use serde::{Deserialize, Serialize};

use super::bounds::{BoundingBox, Point};

/// KiCad board layer identifiers used by footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    /// Front copper.
    #[serde(rename = "F.Cu")]
    FrontCopper,
    /// Back copper.
    #[serde(rename = "B.Cu")]
    BackCopper,
    /// All copper layers (through-hole pads).
    #[serde(rename = "*.Cu")]
    AllCopper,
    /// Front silkscreen.
    #[serde(rename = "F.SilkS")]
    FrontSilkscreen,
    /// Back silkscreen.
    #[serde(rename = "B.SilkS")]
    BackSilkscreen,
    /// Front fabrication drawing.
    #[default]
    #[serde(rename = "F.Fab")]
    FrontFab,
    /// Back fabrication drawing.
    #[serde(rename = "B.Fab")]
    BackFab,
    /// Front courtyard.
    #[serde(rename = "F.CrtYd")]
    FrontCourtyard,
    /// Back courtyard.
    #[serde(rename = "B.CrtYd")]
    BackCourtyard,
    /// Front solder mask.
    #[serde(rename = "F.Mask")]
    FrontMask,
    /// Back solder mask.
    #[serde(rename = "B.Mask")]
    BackMask,
    /// All solder mask layers.
    #[serde(rename = "*.Mask")]
    AllMask,
    /// Front solder paste.
    #[serde(rename = "F.Paste")]
    FrontPaste,
    /// Back solder paste.
    #[serde(rename = "B.Paste")]
    BackPaste,
    /// User drawings.
    #[serde(rename = "Dwgs.User")]
    DrawingsUser,
    /// User comments.
    #[serde(rename = "Cmts.User")]
    CommentsUser,
    /// Board outline.
    #[serde(rename = "Edge.Cuts")]
    EdgeCuts,
}

impl Layer {
    /// Returns the KiCad layer name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FrontCopper => "F.Cu",
            Self::BackCopper => "B.Cu",
            Self::AllCopper => "*.Cu",
            Self::FrontSilkscreen => "F.SilkS",
            Self::BackSilkscreen => "B.SilkS",
            Self::FrontFab => "F.Fab",
            Self::BackFab => "B.Fab",
            Self::FrontCourtyard => "F.CrtYd",
            Self::BackCourtyard => "B.CrtYd",
            Self::FrontMask => "F.Mask",
            Self::BackMask => "B.Mask",
            Self::AllMask => "*.Mask",
            Self::FrontPaste => "F.Paste",
            Self::BackPaste => "B.Paste",
            Self::DrawingsUser => "Dwgs.User",
            Self::CommentsUser => "Cmts.User",
            Self::EdgeCuts => "Edge.Cuts",
        }
    }

    /// Parses a layer from its KiCad name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "F.Cu" => Some(Self::FrontCopper),
            "B.Cu" => Some(Self::BackCopper),
            "*.Cu" => Some(Self::AllCopper),
            "F.SilkS" => Some(Self::FrontSilkscreen),
            "B.SilkS" => Some(Self::BackSilkscreen),
            "F.Fab" => Some(Self::FrontFab),
            "B.Fab" => Some(Self::BackFab),
            "F.CrtYd" => Some(Self::FrontCourtyard),
            "B.CrtYd" => Some(Self::BackCourtyard),
            "F.Mask" => Some(Self::FrontMask),
            "B.Mask" => Some(Self::BackMask),
            "*.Mask" => Some(Self::AllMask),
            "F.Paste" => Some(Self::FrontPaste),
            "B.Paste" => Some(Self::BackPaste),
            "Dwgs.User" => Some(Self::DrawingsUser),
            "Cmts.User" => Some(Self::CommentsUser),
            "Edge.Cuts" => Some(Self::EdgeCuts),
            _ => None,
        }
    }

    /// Whether this is one of the two fabrication layers.
    #[must_use]
    pub const fn is_fabrication(&self) -> bool {
        matches!(self, Self::FrontFab | Self::BackFab)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke font dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Character height.
    pub height: f64,
    /// Character width.
    pub width: f64,
    /// Stroke thickness.
    pub thickness: f64,
}

impl Font {
    /// Creates a font with equal height and width.
    #[must_use]
    pub const fn square(size: f64, thickness: f64) -> Self {
        Self {
            height: size,
            width: size,
            thickness,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::square(1.0, 0.15)
    }
}

/// Role of a footprint text item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// Reference designator.
    Reference,
    /// Value label.
    Value,
    /// Free user text.
    #[default]
    User,
}

/// A text item on a footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpText {
    /// Role of the text.
    #[serde(default)]
    pub kind: TextKind,
    /// Text content. `%R` on user text is the secondary reference designator.
    pub text: String,
    /// Anchor position.
    #[serde(default)]
    pub position: Point,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Layer the text is on.
    #[serde(default)]
    pub layer: Layer,
    /// Font dimensions.
    #[serde(default)]
    pub font: Font,
    /// Whether the text is hidden.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl FpText {
    /// Creates a visible text item with the default font.
    #[must_use]
    pub fn new(kind: TextKind, text: impl Into<String>, layer: Layer) -> Self {
        Self {
            kind,
            text: text.into(),
            position: Point::default(),
            rotation: 0.0,
            layer,
            font: Font::default(),
            hidden: false,
        }
    }
}

/// Geometry of a graphic item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
    },
    /// Circle through `end` around `center`.
    Circle {
        /// Centre.
        center: Point,
        /// A point on the circle.
        end: Point,
    },
    /// Arc starting at `start`, sweeping `angle` degrees around `center`.
    Arc {
        /// Centre.
        center: Point,
        /// Start point.
        start: Point,
        /// Sweep in degrees.
        angle: f64,
    },
    /// Closed polygon.
    Polygon {
        /// Vertices.
        points: Vec<Point>,
    },
}

/// A drawn line or shape on a footprint layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    /// Geometry.
    #[serde(flatten)]
    pub shape: Shape,
    /// Layer the graphic is on.
    pub layer: Layer,
    /// Stroke width.
    pub width: f64,
}

impl Graphic {
    /// Creates a line segment.
    #[must_use]
    pub const fn line(start: Point, end: Point, layer: Layer, width: f64) -> Self {
        Self {
            shape: Shape::Line { start, end },
            layer,
            width,
        }
    }

    /// Creates a circle from centre and radius.
    #[must_use]
    pub const fn circle(center: Point, radius: f64, layer: Layer, width: f64) -> Self {
        Self {
            shape: Shape::Circle {
                center,
                end: Point::new(center.x + radius, center.y),
            },
            layer,
            width,
        }
    }

    /// Whether the graphic is a straight segment.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        matches!(self.shape, Shape::Line { .. })
    }

    /// Bounding box of the geometry (stroke width not included).
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        match &self.shape {
            Shape::Line { start, end } => {
                bb.add_point(start.x, start.y);
                bb.add_point(end.x, end.y);
            }
            Shape::Circle { center, end } => {
                let r = (end.x - center.x).hypot(end.y - center.y);
                bb.add_point(center.x - r, center.y - r);
                bb.add_point(center.x + r, center.y + r);
            }
            Shape::Arc {
                center,
                start,
                angle,
            } => arc_bounds(&mut bb, *center, *start, *angle),
            Shape::Polygon { points } => {
                for p in points {
                    bb.add_point(p.x, p.y);
                }
            }
        }
        bb
    }

    /// One-line description used in rule reports.
    #[must_use]
    pub fn describe(&self) -> String {
        let geometry = match &self.shape {
            Shape::Line { start, end } => format!(
                "Line ({}, {}) -> ({}, {})",
                start.x, start.y, end.x, end.y
            ),
            Shape::Circle { center, end } => format!(
                "Circle @ ({}, {}), radius {}",
                center.x,
                center.y,
                (end.x - center.x).hypot(end.y - center.y)
            ),
            Shape::Arc {
                center,
                start,
                angle,
            } => format!(
                "Arc @ ({}, {}) from ({}, {}), angle {}",
                center.x, center.y, start.x, start.y, angle
            ),
            Shape::Polygon { points } => format!("Polygon ({} points)", points.len()),
        };
        format!("{geometry} on layer {}, width {}mm", self.layer, self.width)
    }
}

/// Adds the start, end and every axis crossing of an arc.
fn arc_bounds(bb: &mut BoundingBox, center: Point, start: Point, sweep: f64) {
    let radius = (start.x - center.x).hypot(start.y - center.y);
    let a0 = (start.y - center.y).atan2(start.x - center.x).to_degrees();
    // More than one turn adds no extent.
    let a1 = a0 + sweep.clamp(-360.0, 360.0);
    let (lo, hi) = if a0 <= a1 { (a0, a1) } else { (a1, a0) };

    for a in [lo, hi] {
        let rad = a.to_radians();
        bb.add_point(center.x + radius * rad.cos(), center.y + radius * rad.sin());
    }

    #[allow(clippy::cast_possible_truncation)] // at most five quadrant indices
    let (first, last) = ((lo / 90.0).ceil() as i64, (hi / 90.0).floor() as i64);
    for k in first..=last {
        #[allow(clippy::cast_precision_loss)]
        let rad = (k as f64 * 90.0).to_radians();
        bb.add_point(center.x + radius * rad.cos(), center.y + radius * rad.sin());
    }
}

/// Pad shape types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    /// Rectangular pad.
    Rect,
    /// Rectangle with rounded corners.
    #[default]
    RoundRect,
    /// Circular pad.
    Circle,
    /// Oblong pad.
    Oval,
}

/// A footprint pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad number (e.g. "1", "A1").
    pub number: String,
    /// Centre position.
    pub position: Point,
    /// Size along X before rotation.
    pub width: f64,
    /// Size along Y before rotation.
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Pad shape.
    #[serde(default)]
    pub shape: PadShape,
    /// Layers the pad is on.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Pad {
    /// Creates a front-side SMD pad.
    #[must_use]
    pub fn smd(number: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            number: number.into(),
            position: Point::new(x, y),
            width,
            height,
            rotation: 0.0,
            shape: PadShape::RoundRect,
            layers: vec![Layer::FrontCopper, Layer::FrontPaste, Layer::FrontMask],
        }
    }

    /// Bounding box of the (rotated) pad outline.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        for (dx, dy) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)] {
            bb.add_point(
                self.position.x + dx * cos - dy * sin,
                self.position.y + dx * sin + dy * cos,
            );
        }
        bb
    }
}

/// A complete footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Footprint name (e.g. "R_0603_1608Metric").
    pub name: String,

    /// Description of the footprint.
    #[serde(default)]
    pub description: String,

    /// Reference designator text.
    pub reference: FpText,

    /// Value text.
    pub value: FpText,

    /// Free user text items.
    #[serde(default)]
    pub user_text: Vec<FpText>,

    /// Lines and shapes.
    #[serde(default)]
    pub graphics: Vec<Graphic>,

    /// Pads.
    #[serde(default)]
    pub pads: Vec<Pad>,
}

impl Footprint {
    /// Creates an empty footprint whose value text matches its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let reference = FpText::new(TextKind::Reference, "REF**", Layer::FrontSilkscreen);
        let value = FpText::new(TextKind::Value, name.clone(), Layer::FrontFab);
        Self {
            name,
            description: String::new(),
            reference,
            value,
            user_text: Vec::new(),
            graphics: Vec::new(),
            pads: Vec::new(),
        }
    }

    /// Adds a graphic item.
    pub fn add_graphic(&mut self, graphic: Graphic) {
        self.graphics.push(graphic);
    }

    /// Adds a pad.
    pub fn add_pad(&mut self, pad: Pad) {
        self.pads.push(pad);
    }

    /// Adds a user text item with the given content.
    pub fn add_user_text(
        &mut self,
        text: impl Into<String>,
        position: Point,
        font: Font,
        layer: Layer,
    ) {
        let mut item = FpText::new(TextKind::User, text, layer);
        item.position = position;
        item.font = font;
        self.user_text.push(item);
    }

    /// Indices of all graphics on `layer`.
    #[must_use]
    pub fn filter_graphs(&self, layer: Layer) -> Vec<usize> {
        self.graphics
            .iter()
            .enumerate()
            .filter(|(_, g)| g.layer == layer)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of straight line graphics on `layer`.
    #[must_use]
    pub fn filter_lines(&self, layer: Layer) -> Vec<usize> {
        self.graphics
            .iter()
            .enumerate()
            .filter(|(_, g)| g.layer == layer && g.is_line())
            .map(|(i, _)| i)
            .collect()
    }

    /// Bounding box of all graphics on `layer`.
    #[must_use]
    pub fn geometric_bounding_box(&self, layer: Layer) -> BoundingBox {
        let mut bb = BoundingBox::new();
        for g in self.graphics.iter().filter(|g| g.layer == layer) {
            bb.merge(&g.bounds());
        }
        bb
    }

    /// Bounding box enclosing every pad.
    #[must_use]
    pub fn overpads_bounds(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        for pad in &self.pads {
            bb.merge(&pad.bounds());
        }
        bb
    }
}
