//! Library convention rules.
//!
//! Each rule is bound to one component when constructed. The driver calls
//! [`Rule::check`], which reads the component, records what it found in
//! the rule's own diagnostic fields and reports messages. [`Rule::fix`]
//! then consumes those diagnostics and mutates the component; categories
//! that cannot be fixed automatically are reported as info messages and
//! leave the component untouched.
//!
//! | Rule | Target | Checks |
//! |------|--------|--------|
//! | 7.4 | footprint | value label, fabrication drawings, line widths, `%R` text |
//! | 4.3 | symbol | stacked pins |
//! | 4.8 | symbol | field and pin text size |

pub mod fabrication_layer;
pub mod field_text_size;
pub mod pin_stacking;
mod report;

pub use fabrication_layer::FabricationLayerRule;
pub use field_text_size::FieldTextSizeRule;
pub use pin_stacking::PinStackingRule;
pub use report::{Message, MessageKind, Report, Reporter};

use std::str::FromStr;

use serde::Serialize;

use crate::config::Conventions;
use crate::error::LibraryError;
use crate::model::{Footprint, Symbol};

/// A convention check bound to one component.
pub trait Rule {
    /// Which rule this is.
    fn id(&self) -> RuleId;

    /// Inspects the component and reports violations.
    ///
    /// Diagnostics are recomputed from the current component state on every
    /// call. Returns `true` when any violation was found.
    fn check(&mut self, sink: &mut dyn Reporter) -> bool;

    /// Fixes what the most recent [`Rule::check`] found, where possible.
    ///
    /// Does nothing if `check` was never called or found nothing.
    fn fix(&mut self, sink: &mut dyn Reporter);

    /// Runs [`Rule::check`] again and reports whether the fix worked.
    fn recheck(&mut self, sink: &mut dyn Reporter) -> bool {
        let remaining = self.check(sink);
        if remaining {
            sink.error("Could not be fixed");
        } else {
            sink.info("Everything fixed");
        }
        remaining
    }
}

/// What kind of component a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    /// PCB footprints.
    Footprint,
    /// Schematic symbols.
    Symbol,
}

/// The rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Rule 7.4: fabrication layer requirements.
    FabricationLayer,
    /// Rule 4.3: pin stacking.
    PinStacking,
    /// Rule 4.8: field text size.
    FieldTextSize,
}

impl RuleId {
    /// Every rule, in catalog order.
    pub const ALL: [Self; 3] = [Self::FabricationLayer, Self::PinStacking, Self::FieldTextSize];

    /// Rule number, e.g. "7.4".
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FabricationLayer => "7.4",
            Self::PinStacking => "4.3",
            Self::FieldTextSize => "4.8",
        }
    }

    /// Short title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FabricationLayer => "Fabrication layer requirements",
            Self::PinStacking => "Pin stacking",
            Self::FieldTextSize => "Field text size",
        }
    }

    /// One-sentence description of the convention.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FabricationLayer => {
                "Value, outline and second reference designator are drawn on the fabrication layer."
            }
            Self::PinStacking => "Mismatching pins cannot be placed in the same location.",
            Self::FieldTextSize => "Field text uses a common size of 50mils.",
        }
    }

    /// Component kind the rule applies to.
    #[must_use]
    pub const fn target(self) -> RuleTarget {
        match self {
            Self::FabricationLayer => RuleTarget::Footprint,
            Self::PinStacking | Self::FieldTextSize => RuleTarget::Symbol,
        }
    }

    /// Binds the rule to a footprint. `None` for symbol rules.
    #[must_use]
    pub fn bind_footprint<'a>(
        self,
        footprint: &'a mut Footprint,
        conventions: Conventions,
    ) -> Option<Box<dyn Rule + 'a>> {
        match self {
            Self::FabricationLayer => Some(Box::new(FabricationLayerRule::new(
                footprint,
                conventions,
            ))),
            Self::PinStacking | Self::FieldTextSize => None,
        }
    }

    /// Binds the rule to a symbol. `None` for footprint rules.
    #[must_use]
    pub fn bind_symbol<'a>(
        self,
        symbol: &'a mut Symbol,
        conventions: Conventions,
    ) -> Option<Box<dyn Rule + 'a>> {
        match self {
            Self::PinStacking => Some(Box::new(PinStackingRule::new(symbol))),
            Self::FieldTextSize => Some(Box::new(FieldTextSizeRule::new(symbol, conventions))),
            Self::FabricationLayer => None,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rule {}", self.code())
    }
}

impl FromStr for RuleId {
    type Err = LibraryError;

    /// Accepts "7.4", "Rule 7.4", "rule7_4" or the slug "fabrication-layer".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let code = lower
            .strip_prefix("rule")
            .unwrap_or(&lower)
            .trim()
            .replace('_', ".");

        match code.as_str() {
            "7.4" | "fabrication-layer" => Ok(Self::FabricationLayer),
            "4.3" | "pin-stacking" => Ok(Self::PinStacking),
            "4.8" | "field-text-size" => Ok(Self::FieldTextSize),
            _ => Err(LibraryError::unknown_rule(s)),
        }
    }
}

/// Rounds `value` to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Snaps `value` to the nearest multiple of `grid`.
pub(crate) fn map_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rule_ids() {
        assert_eq!("7.4".parse::<RuleId>().unwrap(), RuleId::FabricationLayer);
        assert_eq!("Rule 4.3".parse::<RuleId>().unwrap(), RuleId::PinStacking);
        assert_eq!("rule4_8".parse::<RuleId>().unwrap(), RuleId::FieldTextSize);
        assert_eq!(
            "pin-stacking".parse::<RuleId>().unwrap(),
            RuleId::PinStacking
        );
        assert!("9.9".parse::<RuleId>().is_err());
    }

    #[test]
    fn display_uses_code() {
        assert_eq!(RuleId::FabricationLayer.to_string(), "Rule 7.4");
    }

    #[test]
    fn binding_respects_target() {
        let mut footprint = Footprint::new("R_0603");
        let conventions = Conventions::default();
        assert!(RuleId::PinStacking
            .bind_footprint(&mut footprint, conventions)
            .is_none());
        assert!(RuleId::FabricationLayer
            .bind_footprint(&mut footprint, conventions)
            .is_some());

        let mut symbol = Symbol::new("R");
        assert!(RuleId::FabricationLayer
            .bind_symbol(&mut symbol, conventions)
            .is_none());
        for id in [RuleId::PinStacking, RuleId::FieldTextSize] {
            let rule = id.bind_symbol(&mut symbol, conventions).unwrap();
            assert_eq!(rule.id(), id);
        }
    }

    #[test]
    fn grid_snapping() {
        assert!((round_to(map_to_grid(1.23456, 0.001), 4) - 1.235).abs() < 1e-12);
        assert!((round_to(0.075_000_1, 3) - 0.075).abs() < 1e-12);
    }
}
