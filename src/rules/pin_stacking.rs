//! Rule 4.3: pin stacking.
//!
//! Pins that share position, unit and body style form a stack. Within a
//! stack, pin numbers must differ, names and electrical types must agree,
//! no-connect pins may not take part, and exactly one pin is visible.
//!
//! Stacks made of identical copies of one pin are true duplicates; fixing
//! deletes every copy but the first. All other findings need a human.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::info;

use super::{Reporter, Rule, RuleId};
use crate::model::{DrawItem, ElectricalType, Pin, Symbol};

/// Location key two pins must share to be stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackKey {
    /// X position.
    pub x: i32,
    /// Y position.
    pub y: i32,
    /// Unit.
    pub unit: u32,
    /// Body style.
    pub convert: u32,
}

impl From<&Pin> for StackKey {
    fn from(pin: &Pin) -> Self {
        Self {
            x: pin.x,
            y: pin.y,
            unit: pin.unit,
            convert: pin.convert,
        }
    }
}

/// Pins sharing one [`StackKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinStack {
    /// Shared location.
    pub key: StackKey,
    /// Indices into the symbol's drawing list, in drawing order.
    pub members: Vec<usize>,
}

/// Groups the symbol's pins by location, unit and body style.
///
/// Stacks appear in order of their first pin; members keep drawing order.
/// Single pins are returned as stacks of one.
#[must_use]
pub fn pin_stacks(symbol: &Symbol) -> Vec<PinStack> {
    let mut groups: IndexMap<StackKey, Vec<usize>> = IndexMap::new();
    for (index, item) in symbol.draw.iter().enumerate() {
        if let DrawItem::Pin(pin) = item {
            groups.entry(StackKey::from(pin)).or_default().push(index);
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| PinStack { key, members })
        .collect()
}

/// Everything that must match for two pins to be copies of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PinSignature {
    name: String,
    number: String,
    unit: u32,
    x: i32,
    y: i32,
    convert: u32,
}

impl From<&Pin> for PinSignature {
    fn from(pin: &Pin) -> Self {
        Self {
            name: pin.name.clone(),
            number: pin.number.clone(),
            unit: pin.unit,
            x: pin.x,
            y: pin.y,
            convert: pin.convert,
        }
    }
}

/// Checks pin stacks on one symbol.
#[derive(Debug)]
pub struct PinStackingRule<'a> {
    symbol: &'a mut Symbol,

    /// Stacks of identical pins, as drawing list indices.
    pub duplicated_pins: Vec<Vec<usize>>,
    /// Some stack mixes pin names.
    pub different_names: bool,
    /// Some no-connect pin is stacked.
    pub nc_stacked: bool,
    /// Some stack mixes electrical types.
    pub different_types: bool,
    /// Some stack does not have exactly one visible pin.
    pub only_one_visible: bool,
}

impl<'a> PinStackingRule<'a> {
    /// Binds the rule to a symbol.
    pub fn new(symbol: &'a mut Symbol) -> Self {
        Self {
            symbol,
            duplicated_pins: Vec::new(),
            different_names: false,
            nc_stacked: false,
            different_types: false,
            only_one_visible: false,
        }
    }

    fn pin(&self, index: usize) -> Option<&Pin> {
        match self.symbol.draw.get(index) {
            Some(DrawItem::Pin(pin)) => Some(pin),
            _ => None,
        }
    }

    fn pin_str(&self, pin: &Pin) -> String {
        if self.symbol.is_multi_unit() {
            format!("Pin {} ({}) in unit {}", pin.name, pin.number, pin.unit)
        } else {
            format!("Pin {} ({})", pin.name, pin.number)
        }
    }

    fn stack_str(&self, key: &StackKey) -> String {
        let unit = if self.symbol.is_multi_unit() {
            format!(" (unit {})", key.unit)
        } else {
            String::new()
        };
        format!("Pinstack @ ({},{}){unit}", key.x, -key.y)
    }

    /// Checks one stack of two or more pins. Returns whether it is in error.
    fn check_stack(&mut self, stack: &PinStack, sink: &mut dyn Reporter) -> bool {
        let pins: Vec<&Pin> = stack.members.iter().filter_map(|&i| self.pin(i)).collect();

        let numbers: HashSet<&str> = pins.iter().map(|p| p.number.as_str()).collect();
        let names: HashSet<&str> = pins.iter().map(|p| p.name.as_str()).collect();
        let units: HashSet<u32> = pins.iter().map(|p| p.unit).collect();
        let etypes: HashSet<ElectricalType> = pins.iter().map(|p| p.electrical_type).collect();
        let visible = pins.iter().filter(|p| p.is_visible()).count();

        let mut err = false;
        let mut nc_stacked = false;
        let mut duplicates = false;

        for pin in &pins {
            if pin.electrical_type == ElectricalType::NoConnect {
                sink.error(format!(
                    "NC {} @ ({},{}) is stacked on other pins",
                    self.pin_str(pin),
                    pin.x,
                    -pin.y
                ));
                err = true;
                nc_stacked = true;
            }
        }

        if numbers.len() < pins.len() {
            sink.error(format!(
                "Duplicate pins @ ({},{})",
                stack.key.x, -stack.key.y
            ));
            err = true;
            for pin in &pins {
                sink.error_detail(self.pin_str(pin));
            }

            duplicates = numbers.len() == 1 && names.len() == 1 && units.len() == 1;
        }

        let mut different_names = false;
        let mut different_types = false;
        let mut only_one_visible = false;

        if !duplicates {
            let label = self.stack_str(&stack.key);

            if names.len() > 1 {
                sink.error(format!("{label} have different names"));
                err = true;
                different_names = true;
                for pin in &pins {
                    sink.error_detail(self.pin_str(pin));
                }
            }

            if etypes.len() > 1 {
                sink.error(format!("{label} have different types"));
                err = true;
                different_types = true;
                for pin in &pins {
                    sink.error_detail(format!(
                        "{} : {}",
                        self.pin_str(pin),
                        pin.electrical_type
                    ));
                }
            }

            if visible != 1 {
                sink.error(format!("{label} must have exactly one invisible pin"));
                err = true;
                only_one_visible = true;
                for pin in &pins {
                    sink.error_detail(format!(
                        "{} is {}",
                        self.pin_str(pin),
                        if pin.is_visible() { "VISIBLE" } else { "INVISIBLE" }
                    ));
                }
            }
        }

        self.nc_stacked |= nc_stacked;
        self.different_names |= different_names;
        self.different_types |= different_types;
        self.only_one_visible |= only_one_visible;
        if duplicates {
            self.duplicated_pins.push(stack.members.clone());
        }

        err
    }

    fn remove_duplicates(&mut self, sink: &mut dyn Reporter) {
        let doomed: HashSet<PinSignature> = self
            .duplicated_pins
            .iter()
            .filter_map(|group| group.first())
            .filter_map(|&i| self.pin(i))
            .map(PinSignature::from)
            .collect();

        let multi_unit = self.symbol.is_multi_unit();
        let mut kept = HashSet::new();
        let items = std::mem::take(&mut self.symbol.draw);

        self.symbol.draw = items
            .into_iter()
            .filter(|item| {
                let DrawItem::Pin(pin) = item else {
                    return true;
                };
                let signature = PinSignature::from(pin);
                if !doomed.contains(&signature) || kept.insert(signature) {
                    return true;
                }

                let unit = if multi_unit {
                    format!(" in unit {}", pin.unit)
                } else {
                    String::new()
                };
                sink.info(format!(
                    "Deleting Pin {} ({}){unit} @ ({},{})",
                    pin.name, pin.number, pin.x, pin.y
                ));
                false
            })
            .collect();

        info!(
            symbol = %self.symbol.name,
            groups = self.duplicated_pins.len(),
            "Removed duplicate pins"
        );
    }
}

impl Rule for PinStackingRule<'_> {
    fn id(&self) -> RuleId {
        RuleId::PinStacking
    }

    fn check(&mut self, sink: &mut dyn Reporter) -> bool {
        self.duplicated_pins.clear();
        self.different_names = false;
        self.nc_stacked = false;
        self.different_types = false;
        self.only_one_visible = false;

        let mut err = false;
        for stack in pin_stacks(self.symbol) {
            if stack.members.len() > 1 {
                err |= self.check_stack(&stack, sink);
            }
        }
        err
    }

    fn fix(&mut self, sink: &mut dyn Reporter) {
        if !self.duplicated_pins.is_empty() {
            sink.info("Removing duplicate pins");
            self.remove_duplicates(sink);
            self.duplicated_pins.clear();
        }

        let manual = [
            (self.different_names, "different pin names"),
            (self.nc_stacked, "NC pins stacked"),
            (self.different_types, "different pin types"),
            (self.only_one_visible, "only one pin in a pin stack is visible"),
        ];
        for (flagged, category) in manual {
            if flagged {
                sink.info(format!(
                    "FIX for '{category}' not supported! Please fix manually."
                ));
            }
        }
    }
}
