//! Rule 7.4: fabrication layer requirements.
//!
//! - The value label matches the footprint name, is visible, sits on a
//!   fabrication layer and uses the standard font.
//! - There is at least one drawing on F.Fab or B.Fab, and every such drawing
//!   has a line width inside the allowed range.
//! - A second reference designator (user text `%R`) exists on a fabrication
//!   layer with a square font inside the allowed size and thickness ranges.
//!
//! A missing `%R` text is synthesised by [`Rule::fix`] at the centre of the
//! F.Fab outline (or the pads, or the origin) with a size derived from the
//! outline width.

use tracing::{debug, info};

use super::{map_to_grid, round_to, Reporter, Rule, RuleId};
use crate::config::Conventions;
use crate::model::{BoundingBox, Font, Footprint, FpText, Layer, Point};

/// User text content marking the second reference designator.
pub const SECOND_REF_TEXT: &str = "%R";

/// Grid the synthesised text position is snapped to.
const PLACEMENT_GRID: f64 = 0.001;

/// Starting text size for the synthesised reference, before scaling.
const SYNTH_TEXT_SIZE: f64 = 4.0;

/// Smallest synthesised text size. Larger than the allowed minimum on purpose.
const SYNTH_TEXT_SIZE_MIN: f64 = 0.5;

/// Stroke thickness as a fraction of the synthesised text size.
const SYNTH_THICKNESS_RATIO: f64 = 0.15;

/// Size and thickness used when the footprint has no geometry at all.
const FALLBACK_FONT: Font = Font::square(1.0, 0.15);

const TOLERANCE: f64 = 1e-9;

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

fn outside(value: f64, min: f64, max: f64) -> bool {
    value < min - TOLERANCE || value > max + TOLERANCE
}

/// State of the second reference designator found by the last check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondRefStatus {
    /// Present and correct (or not checked yet).
    #[default]
    Ok,
    /// No `%R` user text.
    Missing,
    /// `%R` text at this user text index is not on a fabrication layer.
    WrongLayer(usize),
    /// `%R` text at this user text index has a bad font.
    BadFont(usize),
}

/// Checks fabrication layer requirements on one footprint.
#[derive(Debug)]
pub struct FabricationLayerRule<'a> {
    footprint: &'a mut Footprint,
    conventions: Conventions,

    /// Indices of graphics on F.Fab.
    pub f_fabrication_all: Vec<usize>,
    /// Indices of graphics on B.Fab.
    pub b_fabrication_all: Vec<usize>,
    /// Indices of straight lines on F.Fab.
    pub f_fabrication_lines: Vec<usize>,
    /// Indices of straight lines on B.Fab.
    pub b_fabrication_lines: Vec<usize>,
    /// Indices of fabrication graphics with a width outside the allowed range.
    pub bad_fabrication_width: Vec<usize>,

    /// Value label is wrong.
    pub missing_value: bool,
    /// Nothing is drawn on either fabrication layer.
    pub missing_lines: bool,
    /// Some fabrication line widths are out of range.
    pub incorrect_width: bool,
    /// Second reference designator state.
    pub second_ref: SecondRefStatus,
    /// More than one `%R` text was found.
    pub multiple_second_ref: bool,
}

impl<'a> FabricationLayerRule<'a> {
    /// Binds the rule to a footprint.
    ///
    /// `conventions` should have passed [`Conventions::validate`]; an
    /// inverted range makes every value fail the check but never panics.
    pub fn new(footprint: &'a mut Footprint, conventions: Conventions) -> Self {
        Self {
            footprint,
            conventions,
            f_fabrication_all: Vec::new(),
            b_fabrication_all: Vec::new(),
            f_fabrication_lines: Vec::new(),
            b_fabrication_lines: Vec::new(),
            bad_fabrication_width: Vec::new(),
            missing_value: false,
            missing_lines: false,
            incorrect_width: false,
            second_ref: SecondRefStatus::Ok,
            multiple_second_ref: false,
        }
    }

    /// Whether the second reference designator needs attention.
    #[must_use]
    pub fn missing_second_ref(&self) -> bool {
        self.second_ref != SecondRefStatus::Ok
    }

    fn check_missing_value(&self, sink: &mut dyn Reporter) -> bool {
        let c = &self.conventions;
        let fp = &*self.footprint;
        let val = &fp.value;

        let mut errors = Vec::new();

        if val.text != fp.name {
            errors.push("Value text should match footprint name:".to_string());
            errors.push(format!(
                "Value text is '{}', expected: '{}'",
                val.text, fp.name
            ));
        }
        if !val.layer.is_fabrication() {
            errors.push(format!(
                "Component value is on layer {} but should be on F.Fab or B.Fab",
                val.layer
            ));
        }
        if val.hidden {
            errors.push("Component value is hidden (should be set to visible)".to_string());
        }
        if !same(val.font.height, c.text_size) {
            errors.push(format!(
                "Value label has a height of {}mm (expected: {}mm)",
                val.font.height, c.text_size
            ));
        }
        if !same(val.font.width, c.text_size) {
            errors.push(format!(
                "Value label has a width of {}mm (expected: {}mm)",
                val.font.width, c.text_size
            ));
        }
        if !same(val.font.thickness, c.text_thickness) {
            errors.push(format!(
                "Value label has a thickness of {}mm (expected: {}mm)",
                val.font.thickness, c.text_thickness
            ));
        }

        if !errors.is_empty() {
            sink.error("Value Label Errors");
            for err in &errors {
                sink.error_detail(err.as_str());
            }
        }

        !errors.is_empty()
    }

    fn check_missing_lines(&self, sink: &mut dyn Reporter) -> bool {
        if self.f_fabrication_all.is_empty() && self.b_fabrication_all.is_empty() {
            sink.error("No drawings found on fabrication layer");
            return true;
        }
        false
    }

    fn check_incorrect_width(&mut self, sink: &mut dyn Reporter) -> bool {
        let c = self.conventions;
        let graphics = &self.footprint.graphics;

        self.bad_fabrication_width = self
            .f_fabrication_all
            .iter()
            .chain(&self.b_fabrication_all)
            .copied()
            .filter(|&i| outside(graphics[i].width, c.fab_line_width_min, c.fab_line_width_max))
            .collect();

        if self.bad_fabrication_width.is_empty() {
            return false;
        }

        sink.error(format!(
            "Some fabrication layer lines have a width outside allowed range of [{}mm - {}mm]",
            c.fab_line_width_min, c.fab_line_width_max
        ));
        for &i in &self.bad_fabrication_width {
            sink.error_detail(graphics[i].describe());
        }
        true
    }

    /// Finds the first `%R` user text and records whether there are several.
    fn second_ref_index(&mut self) -> Option<usize> {
        let mut found = self
            .footprint
            .user_text
            .iter()
            .enumerate()
            .filter(|(_, t)| t.text == SECOND_REF_TEXT)
            .map(|(i, _)| i);

        let first = found.next();
        self.multiple_second_ref = found.next().is_some();
        first
    }

    fn check_second_ref(&mut self, sink: &mut dyn Reporter) -> SecondRefStatus {
        let Some(index) = self.second_ref_index() else {
            sink.error("Second Reference Designator missing");
            sink.error_detail(format!("Add RefDes to F.Fab layer with '{SECOND_REF_TEXT}'"));
            return SecondRefStatus::Missing;
        };

        let c = &self.conventions;
        let text = &self.footprint.user_text[index];

        if !text.layer.is_fabrication() {
            sink.error(format!(
                "Reference designator found on layer '{}', expected '{}'",
                text.layer,
                Layer::FrontFab
            ));
            return SecondRefStatus::WrongLayer(index);
        }

        let font = text.font;
        let mut errors = Vec::new();

        if !same(font.height, font.width) {
            errors.push("RefDes aspect ratio should be 1:1".to_string());
        }
        if outside(font.height, c.text_size_min, c.text_size_max) {
            errors.push(format!(
                "RefDes text size ({}mm) is outside allowed range [{}mm - {}mm]",
                font.height, c.text_size_min, c.text_size_max
            ));
        }
        if outside(font.thickness, c.text_thickness_min, c.text_thickness_max) {
            errors.push(format!(
                "RefDes text thickness ({}mm) is outside allowed range [{}mm - {}mm]",
                font.thickness, c.text_thickness_min, c.text_thickness_max
            ));
        }

        // Orientation is not checked.

        if errors.is_empty() {
            return SecondRefStatus::Ok;
        }

        sink.error("RefDes errors");
        for err in errors {
            sink.error_detail(err);
        }
        SecondRefStatus::BadFont(index)
    }

    fn fix_second_ref(&mut self, sink: &mut dyn Reporter) {
        match self.second_ref {
            SecondRefStatus::Ok => {}
            SecondRefStatus::Missing => {
                let (pos, font) = second_ref_placement(self.footprint);
                sink.info(format!(
                    "Adding second RefDes to F.Fab layer @ ({},{})",
                    pos.x, pos.y
                ));
                info!(
                    footprint = %self.footprint.name,
                    x = pos.x,
                    y = pos.y,
                    size = font.height,
                    "Synthesised second reference designator"
                );
                self.footprint
                    .add_user_text(SECOND_REF_TEXT, pos, font, Layer::FrontFab);
            }
            SecondRefStatus::WrongLayer(index) => {
                sink.info("Moving second RefDes to F.Fab layer");
                let c = self.conventions;
                let text = &mut self.footprint.user_text[index];
                text.layer = Layer::FrontFab;
                normalise_font(text, &c);
            }
            SecondRefStatus::BadFont(index) => {
                sink.info("Fixing second RefDes font size");
                let c = self.conventions;
                normalise_font(&mut self.footprint.user_text[index], &c);
            }
        }
    }
}

/// Limits `value` to `[min, max]`; `max` wins on an inverted range.
fn limit(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Makes a text font square and clamps it into the allowed ranges.
fn normalise_font(text: &mut FpText, c: &Conventions) {
    let size = limit(text.font.height, c.text_size_min, c.text_size_max);
    let thickness = limit(
        text.font.thickness,
        c.text_thickness_min,
        c.text_thickness_max,
    );
    text.font = Font::square(size, thickness);
}

/// Best-effort position and font for a synthesised `%R` text.
///
/// Uses the F.Fab outline bounds, then the pad bounds, then the origin.
#[must_use]
pub fn second_ref_placement(footprint: &Footprint) -> (Point, Font) {
    let mut bounds = footprint.geometric_bounding_box(Layer::FrontFab);
    if !bounds.is_valid() {
        bounds = footprint.overpads_bounds();
    }

    if bounds.is_valid() {
        placement_from_bounds(&bounds)
    } else {
        (Point::default(), FALLBACK_FONT)
    }
}

fn placement_from_bounds(bounds: &BoundingBox) -> (Point, Font) {
    let center = bounds.center();
    let pos = Point::new(
        round_to(map_to_grid(center.x, PLACEMENT_GRID), 4),
        round_to(map_to_grid(center.y, PLACEMENT_GRID), 4),
    );

    let mut text_size = SYNTH_TEXT_SIZE;
    if bounds.width() < text_size {
        text_size = 0.9 * bounds.width();
    }
    let text_size = round_to(text_size / 4.0, 1).max(SYNTH_TEXT_SIZE_MIN);
    let thickness = round_to(SYNTH_THICKNESS_RATIO * text_size, 3);

    (pos, Font::square(text_size, thickness))
}

impl Rule for FabricationLayerRule<'_> {
    fn id(&self) -> RuleId {
        RuleId::FabricationLayer
    }

    fn check(&mut self, sink: &mut dyn Reporter) -> bool {
        self.f_fabrication_all = self.footprint.filter_graphs(Layer::FrontFab);
        self.b_fabrication_all = self.footprint.filter_graphs(Layer::BackFab);
        self.f_fabrication_lines = self.footprint.filter_lines(Layer::FrontFab);
        self.b_fabrication_lines = self.footprint.filter_lines(Layer::BackFab);

        debug!(
            footprint = %self.footprint.name,
            front = self.f_fabrication_all.len(),
            back = self.b_fabrication_all.len(),
            front_lines = self.f_fabrication_lines.len(),
            back_lines = self.b_fabrication_lines.len(),
            "Fabrication layer graphics"
        );

        self.missing_value = self.check_missing_value(sink);
        self.missing_lines = self.check_missing_lines(sink);
        self.incorrect_width = self.check_incorrect_width(sink);
        self.second_ref = self.check_second_ref(sink);

        if self.multiple_second_ref {
            sink.warning(format!(
                "Multiple RefDes markers found with text '{SECOND_REF_TEXT}'"
            ));
        }

        self.missing_value || self.missing_lines || self.incorrect_width || self.missing_second_ref()
    }

    fn fix(&mut self, sink: &mut dyn Reporter) {
        if self.incorrect_width {
            sink.info("Setting fabrication lines to correct width");
            let width = self.conventions.fab_line_width;
            for &i in &self.bad_fabrication_width {
                self.footprint.graphics[i].width = width;
            }
            self.incorrect_width = false;
        }

        if self.missing_value {
            sink.info("Fixing 'Value' text on F.Fab layer");
            let c = self.conventions;
            let name = self.footprint.name.clone();
            let value = &mut self.footprint.value;
            value.text = name;
            value.layer = Layer::FrontFab;
            value.hidden = false;
            value.font = Font::square(c.text_size, c.text_thickness);
            self.missing_value = false;
        }

        if self.missing_lines {
            sink.info("FIX for 'no drawings on fabrication layer' not supported! Please fix manually.");
        }

        self.fix_second_ref(sink);
        self.second_ref = SecondRefStatus::Ok;

        if self.multiple_second_ref {
            sink.info("FIX for 'multiple RefDes markers' not supported! Please fix manually.");
        }
    }
}
