//! Field text size rule (4.8) against whole symbols.

use klc_check::config::Conventions;
use klc_check::model::{Field, Pin, Symbol};
use klc_check::rules::{FieldTextSizeRule, MessageKind, Report, Rule};

fn resistor() -> Symbol {
    let mut symbol = Symbol::new("R");
    symbol.definition.reference = "R".to_string();
    symbol.add_field(Field::new("", "\"R\"", 30, 0, 50));
    symbol.add_field(Field::new("", "\"R\"", 0, 0, 50));
    symbol.add_field(Field::new("", "\"\"", -70, 0, 50));
    symbol.add_pin(Pin::new("~", "1", 0, 150));
    symbol.add_pin(Pin::new("~", "2", 0, -150));
    symbol
}

#[test]
fn standard_sizes_report_nothing() {
    let mut symbol = resistor();
    let mut report = Report::new();

    let mut rule = FieldTextSizeRule::new(&mut symbol, Conventions::default());
    assert!(!rule.check(&mut report));
    assert!(report.is_empty());
}

#[test]
fn oversized_fields_and_pins_are_fixed() {
    let mut symbol = resistor();
    symbol.fields[1].text_size = 60;
    symbol.fields[1].reference = Some("\"Value\"".to_string());
    if let Some(pin) = symbol.pins_mut().nth(1) {
        pin.name_text_size = 40;
    }

    let mut report = Report::new();
    let mut rule = FieldTextSizeRule::new(&mut symbol, Conventions::default());
    assert!(rule.check(&mut report));
    assert!(report.contains("Field text size should be 50mils"));
    assert!(report.contains("Field Value at posx 0 posy 0 size 60"));
    assert!(report.contains("Pin text size should be 50mils"));
    assert!(report.contains("Pin ~ (2), text size 40, number size 50"));
    assert_eq!(report.error_count(), 2);

    let mut fix_report = Report::new();
    rule.fix(&mut fix_report);
    assert!(fix_report.contains("Everything fixed"));
    assert_eq!(fix_report.of_kind(MessageKind::Info).count(), 3);

    assert!(symbol.fields.iter().all(|f| f.text_size == 50));
    assert!(symbol
        .pins()
        .all(|p| p.name_text_size == 50 && p.number_text_size == 50));
}

#[test]
fn configured_size_is_used() {
    let mut symbol = resistor();
    let conventions = Conventions {
        symbol_text_size: 40,
        ..Conventions::default()
    };

    let mut report = Report::new();
    let mut rule = FieldTextSizeRule::new(&mut symbol, conventions);
    assert!(rule.check(&mut report));
    assert_eq!(rule.violating_fields.len(), 3);
    assert_eq!(rule.violating_pins.len(), 2);
    assert!(report.contains("should be 40mils"));
}

#[test]
fn fix_after_clean_check_is_silent() {
    let mut symbol = resistor();
    let before = symbol.clone();
    let mut report = Report::new();

    let mut rule = FieldTextSizeRule::new(&mut symbol, Conventions::default());
    assert!(!rule.check(&mut report));
    rule.fix(&mut report);
    assert!(report.is_empty());
    assert_eq!(symbol, before);
}
