//! In-memory object model the rules operate on.
//!
//! - [`footprint`] - PCB footprints: text, graphics and pads on board layers
//! - [`symbol`] - schematic symbols: fields and draw-ordered pins and graphics
//! - [`bounds`] - bounding boxes used to place synthesised text

pub mod bounds;
pub mod footprint;
pub mod symbol;

pub use bounds::{BoundingBox, Point};
pub use footprint::{Font, Footprint, FpText, Graphic, Layer, Pad, PadShape, Shape, TextKind};
pub use symbol::{
    Definition, DrawItem, ElectricalType, Field, FillStyle, Pin, PinOrientation, Symbol,
};
