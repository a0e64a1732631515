//! Schematic symbol model: fields and draw-ordered graphic items.
//!
//! Coordinates and text sizes are in mils, as in KiCad legacy libraries.
//! The y axis points up in the file, so reports negate it for display.

use serde::{Deserialize, Serialize};

/// Symbol header data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Reference designator prefix (e.g. "U", "R").
    #[serde(default)]
    pub reference: String,
    /// Number of units in the symbol.
    #[serde(default = "default_unit_count")]
    pub unit_count: u32,
    /// Offset of pin names from the pin end.
    #[serde(default)]
    pub text_offset: i32,
}

const fn default_unit_count() -> u32 {
    1
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            reference: "U".to_string(),
            unit_count: 1,
            text_offset: 0,
        }
    }
}

/// A labelled text attribute of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name. The four mandatory fields may leave this empty.
    #[serde(default)]
    pub name: String,
    /// Field text.
    #[serde(default)]
    pub value: String,
    /// Reference tag shown instead of the name, possibly quoted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// X position.
    pub x: i32,
    /// Y position.
    pub y: i32,
    /// Text size.
    pub text_size: u32,
    /// Whether the field is hidden.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Field {
    /// Creates a visible field at the given position.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        x: i32,
        y: i32,
        text_size: u32,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            reference: None,
            x,
            y,
            text_size,
            hidden: false,
        }
    }

    /// Label used in reports: the reference tag, else the name if it is
    /// longer than two characters, else "UNKNOWN".
    ///
    /// Surrounding quote delimiters are stripped from either.
    #[must_use]
    pub fn display_label(&self) -> String {
        let strip = |s: &str| s.trim_matches('"').to_string();
        if let Some(reference) = &self.reference {
            return strip(reference);
        }
        let name = strip(&self.name);
        if self.name.chars().count() > 2 && !name.is_empty() {
            name
        } else {
            "UNKNOWN".to_string()
        }
    }
}

/// Pin orientation (direction the pin points from its connection end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinOrientation {
    /// Pin points right.
    #[default]
    Right,
    /// Pin points left.
    Left,
    /// Pin points up.
    Up,
    /// Pin points down.
    Down,
}

/// Pin electrical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricalType {
    /// Input pin.
    Input,
    /// Output pin.
    Output,
    /// Bidirectional pin.
    Bidirectional,
    /// Tri-state output.
    TriState,
    /// Passive pin.
    #[default]
    Passive,
    /// Unspecified.
    Unspecified,
    /// Power input.
    PowerInput,
    /// Power output.
    PowerOutput,
    /// Open collector output.
    OpenCollector,
    /// Open emitter output.
    OpenEmitter,
    /// Not connected.
    NoConnect,
}

impl ElectricalType {
    /// Creates from the KiCad legacy one-letter code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(Self::Input),
            'O' => Some(Self::Output),
            'B' => Some(Self::Bidirectional),
            'T' => Some(Self::TriState),
            'P' => Some(Self::Passive),
            'U' => Some(Self::Unspecified),
            'W' => Some(Self::PowerInput),
            'w' => Some(Self::PowerOutput),
            'C' => Some(Self::OpenCollector),
            'E' => Some(Self::OpenEmitter),
            'N' => Some(Self::NoConnect),
            _ => None,
        }
    }

    /// Returns the KiCad legacy one-letter code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Input => 'I',
            Self::Output => 'O',
            Self::Bidirectional => 'B',
            Self::TriState => 'T',
            Self::Passive => 'P',
            Self::Unspecified => 'U',
            Self::PowerInput => 'W',
            Self::PowerOutput => 'w',
            Self::OpenCollector => 'C',
            Self::OpenEmitter => 'E',
            Self::NoConnect => 'N',
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
            Self::Bidirectional => "Bidirectional",
            Self::TriState => "Tri-state",
            Self::Passive => "Passive",
            Self::Unspecified => "Unspecified",
            Self::PowerInput => "Power input",
            Self::PowerOutput => "Power output",
            Self::OpenCollector => "Open collector",
            Self::OpenEmitter => "Open emitter",
            Self::NoConnect => "Not connected",
        }
    }
}

impl std::fmt::Display for ElectricalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schematic symbol pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin name (e.g. "VCC", "GND", "~").
    pub name: String,

    /// Pin number (e.g. "1", "A1").
    pub number: String,

    /// X position of the connection point.
    pub x: i32,

    /// Y position of the connection point.
    pub y: i32,

    /// Pin length.
    #[serde(default = "default_pin_length")]
    pub length: i32,

    /// Pin orientation.
    #[serde(default)]
    pub orientation: PinOrientation,

    /// Unit the pin belongs to (0 = common to all units).
    #[serde(default = "default_one")]
    pub unit: u32,

    /// Body style ("convert"): 1 = normal, 2 = De Morgan, 0 = both.
    #[serde(default = "default_one")]
    pub convert: u32,

    /// Electrical type.
    #[serde(default)]
    pub electrical_type: ElectricalType,

    /// Graphic type code. A leading `N` marks the pin invisible.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pin_type: String,

    /// Pin name text size.
    pub name_text_size: u32,

    /// Pin number text size.
    pub number_text_size: u32,
}

const fn default_pin_length() -> i32 {
    100
}

const fn default_one() -> u32 {
    1
}

impl Pin {
    /// Creates a visible passive pin in unit 1, body style 1, with 50 mil text.
    #[must_use]
    pub fn new(name: impl Into<String>, number: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            x,
            y,
            length: 100,
            orientation: PinOrientation::Right,
            unit: 1,
            convert: 1,
            electrical_type: ElectricalType::Passive,
            pin_type: String::new(),
            name_text_size: 50,
            number_text_size: 50,
        }
    }

    /// Whether the pin is drawn (its type code has no `N` prefix).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.pin_type.starts_with('N')
    }

    /// Marks the pin invisible or visible, keeping the rest of its type code.
    pub fn set_visible(&mut self, visible: bool) {
        match (visible, self.is_visible()) {
            (false, true) => self.pin_type.insert(0, 'N'),
            (true, false) => {
                self.pin_type.remove(0);
            }
            _ => {}
        }
    }
}

/// Filled area style of closed symbol graphics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    /// Not filled.
    #[default]
    None,
    /// Filled with the foreground colour.
    Foreground,
    /// Filled with the background colour.
    Background,
}

/// A symbol drawing item, kept in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawItem {
    /// A pin.
    Pin(Pin),
    /// A rectangle.
    Rectangle {
        /// First corner X.
        x1: i32,
        /// First corner Y.
        y1: i32,
        /// Second corner X.
        x2: i32,
        /// Second corner Y.
        y2: i32,
        /// Unit (0 = all).
        #[serde(default)]
        unit: u32,
        /// Line width.
        #[serde(default)]
        width: i32,
        /// Fill style.
        #[serde(default)]
        fill: FillStyle,
    },
    /// An open or closed polyline.
    Polyline {
        /// Vertices as (x, y).
        points: Vec<(i32, i32)>,
        /// Unit (0 = all).
        #[serde(default)]
        unit: u32,
        /// Line width.
        #[serde(default)]
        width: i32,
        /// Fill style.
        #[serde(default)]
        fill: FillStyle,
    },
    /// Free graphic text.
    Text {
        /// Text content.
        text: String,
        /// X position.
        x: i32,
        /// Y position.
        y: i32,
        /// Text size.
        size: u32,
        /// Unit (0 = all).
        #[serde(default)]
        unit: u32,
    },
}

/// A schematic symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name.
    pub name: String,

    /// Header data.
    #[serde(default)]
    pub definition: Definition,

    /// Fields (reference, value, footprint, datasheet, user fields).
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Drawing items in file order.
    #[serde(default)]
    pub draw: Vec<DrawItem>,
}

impl Symbol {
    /// Creates an empty single-unit symbol.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: Definition::default(),
            fields: Vec::new(),
            draw: Vec::new(),
        }
    }

    /// Appends a pin to the drawing list.
    pub fn add_pin(&mut self, pin: Pin) {
        self.draw.push(DrawItem::Pin(pin));
    }

    /// Appends a field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Pins in drawing order.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.draw.iter().filter_map(|item| match item {
            DrawItem::Pin(pin) => Some(pin),
            _ => None,
        })
    }

    /// Mutable pins in drawing order.
    pub fn pins_mut(&mut self) -> impl Iterator<Item = &mut Pin> {
        self.draw.iter_mut().filter_map(|item| match item {
            DrawItem::Pin(pin) => Some(pin),
            _ => None,
        })
    }

    /// Whether the symbol has more than one unit.
    #[must_use]
    pub const fn is_multi_unit(&self) -> bool {
        self.definition.unit_count > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrical_type_codes_roundtrip() {
        for code in ['I', 'O', 'B', 'T', 'P', 'U', 'W', 'w', 'C', 'E', 'N'] {
            let etype = ElectricalType::from_code(code).unwrap();
            assert_eq!(etype.code(), code);
        }
        assert_eq!(ElectricalType::from_code('x'), None);
    }

    #[test]
    fn pin_visibility_from_type_code() {
        let mut pin = Pin::new("GND", "1", 0, 0);
        assert!(pin.is_visible());

        pin.pin_type = "NI".to_string();
        assert!(!pin.is_visible());

        pin.set_visible(true);
        assert_eq!(pin.pin_type, "I");
        pin.set_visible(false);
        assert_eq!(pin.pin_type, "NI");
    }

    #[test]
    fn field_display_label() {
        let mut field = Field::new("\"Sim.Type\"", "", 0, 0, 50);
        assert_eq!(field.display_label(), "Sim.Type");

        field.reference = Some("\"REF\"".to_string());
        assert_eq!(field.display_label(), "REF");

        let empty = Field::new("\"\"", "", 0, 0, 50);
        assert_eq!(empty.display_label(), "UNKNOWN");
    }

    #[test]
    fn short_field_names_are_unknown() {
        assert_eq!(Field::new("AB", "", 0, 0, 50).display_label(), "UNKNOWN");
        assert_eq!(Field::new("\"AB\"", "", 0, 0, 50).display_label(), "AB");
        assert_eq!(Field::new("ABC", "", 0, 0, 50).display_label(), "ABC");
    }

    #[test]
    fn pins_follow_draw_order() {
        let mut symbol = Symbol::new("TEST");
        symbol.add_pin(Pin::new("A", "1", 0, 0));
        symbol.draw.push(DrawItem::Rectangle {
            x1: 0,
            y1: 0,
            x2: 100,
            y2: 100,
            unit: 0,
            width: 10,
            fill: FillStyle::Background,
        });
        symbol.add_pin(Pin::new("B", "2", 0, 100));

        let numbers: Vec<_> = symbol.pins().map(|p| p.number.as_str()).collect();
        assert_eq!(numbers, ["1", "2"]);
    }

    #[test]
    fn draw_item_serde_tag() {
        let json = r#"{"type":"pin","name":"A","number":"1","x":0,"y":0,"name_text_size":50,"number_text_size":50}"#;
        let item: DrawItem = serde_json::from_str(json).unwrap();
        match item {
            DrawItem::Pin(pin) => {
                assert_eq!(pin.unit, 1);
                assert_eq!(pin.convert, 1);
                assert!(pin.is_visible());
            }
            other => panic!("expected pin, got {other:?}"),
        }
    }
}
