//! Rule 4.8: field and pin text use the standard size.

use super::{Reporter, Rule, RuleId};
use crate::config::Conventions;
use crate::model::{DrawItem, Symbol};

/// Checks field and pin text sizes on one symbol.
#[derive(Debug)]
pub struct FieldTextSizeRule<'a> {
    symbol: &'a mut Symbol,
    text_size: u32,

    /// Indices of fields with a non-standard size.
    pub violating_fields: Vec<usize>,
    /// Drawing list indices of pins with a non-standard name or number size.
    pub violating_pins: Vec<usize>,
}

impl<'a> FieldTextSizeRule<'a> {
    /// Binds the rule to a symbol.
    pub fn new(symbol: &'a mut Symbol, conventions: Conventions) -> Self {
        Self {
            symbol,
            text_size: conventions.symbol_text_size,
            violating_fields: Vec::new(),
            violating_pins: Vec::new(),
        }
    }
}

impl Rule for FieldTextSizeRule<'_> {
    fn id(&self) -> RuleId {
        RuleId::FieldTextSize
    }

    fn check(&mut self, sink: &mut dyn Reporter) -> bool {
        let size = self.text_size;

        self.violating_fields = self
            .symbol
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.text_size != size)
            .map(|(i, _)| i)
            .collect();

        self.violating_pins = self
            .symbol
            .draw
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                matches!(item, DrawItem::Pin(p) if p.name_text_size != size || p.number_text_size != size)
            })
            .map(|(i, _)| i)
            .collect();

        if !self.violating_fields.is_empty() {
            sink.error(format!("Field text size should be {size}mils"));
            for &i in &self.violating_fields {
                let field = &self.symbol.fields[i];
                sink.error_detail(format!(
                    "Field {} at posx {} posy {} size {}",
                    field.display_label(),
                    field.x,
                    field.y,
                    field.text_size
                ));
            }
        }

        if !self.violating_pins.is_empty() {
            sink.error(format!("Pin text size should be {size}mils"));
            for &i in &self.violating_pins {
                if let DrawItem::Pin(pin) = &self.symbol.draw[i] {
                    sink.error_detail(format!(
                        "Pin {} ({}), text size {}, number size {}",
                        pin.name, pin.number, pin.name_text_size, pin.number_text_size
                    ));
                }
            }
        }

        !self.violating_fields.is_empty() || !self.violating_pins.is_empty()
    }

    fn fix(&mut self, sink: &mut dyn Reporter) {
        if self.violating_fields.is_empty() && self.violating_pins.is_empty() {
            return;
        }

        let size = self.text_size;

        if !self.violating_fields.is_empty() {
            sink.info("Fixing field text size");
        }
        for &i in &self.violating_fields {
            if let Some(field) = self.symbol.fields.get_mut(i) {
                field.text_size = size;
            }
        }

        if !self.violating_pins.is_empty() {
            sink.info("Fixing pin text size");
        }
        for &i in &self.violating_pins {
            if let Some(DrawItem::Pin(pin)) = self.symbol.draw.get_mut(i) {
                pin.name_text_size = size;
                pin.number_text_size = size;
            }
        }

        self.recheck(sink);
    }
}
