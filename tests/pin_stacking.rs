//! Pin stacking rule (4.3) against whole symbols.

use klc_check::model::{DrawItem, ElectricalType, FillStyle, Pin, Symbol};
use klc_check::rules::pin_stacking::pin_stacks;
use klc_check::rules::{MessageKind, PinStackingRule, Report, Rule};

fn hidden(mut pin: Pin) -> Pin {
    pin.set_visible(false);
    pin
}

fn typed(mut pin: Pin, etype: ElectricalType) -> Pin {
    pin.electrical_type = etype;
    pin
}

fn rectangle() -> DrawItem {
    DrawItem::Rectangle {
        x1: -200,
        y1: 200,
        x2: 200,
        y2: -200,
        unit: 0,
        width: 10,
        fill: FillStyle::Background,
    }
}

#[test]
fn duplicate_pins_are_removed() {
    let mut symbol = Symbol::new("PWR");
    symbol.add_pin(Pin::new("GND", "1", 0, 0));
    symbol.add_pin(Pin::new("GND", "1", 0, 0));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    assert_eq!(rule.duplicated_pins, vec![vec![0, 1]]);
    assert!(report.contains("Duplicate pins @ (0,0)"));
    // Copies are not also flagged for visibility.
    assert!(!rule.only_one_visible);

    rule.fix(&mut report);
    assert!(!rule.check(&mut Report::new()));
    assert!(report.contains("Removing duplicate pins"));
    assert!(report.contains("Deleting Pin GND (1) @ (0,0)"));
    assert_eq!(symbol.pins().count(), 1);
}

#[test]
fn deletion_keeps_other_drawings_in_order() {
    let mut symbol = Symbol::new("U");
    symbol.draw.push(rectangle());
    symbol.add_pin(Pin::new("VCC", "8", 0, 300));
    symbol.add_pin(Pin::new("VCC", "8", 0, 300));
    symbol.add_pin(Pin::new("IN", "1", -300, 0));
    symbol.add_pin(Pin::new("VCC", "8", 0, 300));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    rule.fix(&mut report);

    assert_eq!(symbol.draw.len(), 3);
    assert_eq!(symbol.draw[0], rectangle());
    let numbers: Vec<&str> = symbol.pins().map(|p| p.number.as_str()).collect();
    assert_eq!(numbers, ["8", "1"]);
    assert_eq!(report.of_kind(MessageKind::Info).count(), 3);
}

#[test]
fn all_visible_stack_needs_manual_fix() {
    let mut symbol = Symbol::new("REG");
    symbol.add_pin(Pin::new("GND", "1", 0, -200));
    symbol.add_pin(Pin::new("GND", "2", 0, -200));
    symbol.add_pin(Pin::new("GND", "3", 0, -200));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    assert!(rule.only_one_visible);
    assert!(report.contains("Pinstack @ (0,200) must have exactly one invisible pin"));
    assert_eq!(report.of_kind(MessageKind::ErrorDetail).count(), 3);

    let before = symbol.clone();
    let mut rule = PinStackingRule::new(&mut symbol);
    rule.check(&mut Report::new());
    let mut fix_report = Report::new();
    rule.fix(&mut fix_report);
    assert!(fix_report.contains("Please fix manually"));
    assert_eq!(symbol, before);
}

#[test]
fn valid_power_stack_passes() {
    let mut symbol = Symbol::new("REG");
    symbol.add_pin(typed(Pin::new("GND", "1", 0, -200), ElectricalType::PowerInput));
    symbol.add_pin(hidden(typed(
        Pin::new("GND", "2", 0, -200),
        ElectricalType::PowerInput,
    )));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(!rule.check(&mut report));
    assert!(report.is_empty());
}

#[test]
fn mismatched_names_and_types_are_reported() {
    let mut symbol = Symbol::new("MCU");
    symbol.add_pin(typed(Pin::new("VDD", "1", 100, 0), ElectricalType::PowerInput));
    symbol.add_pin(hidden(typed(Pin::new("VDDA", "2", 100, 0), ElectricalType::Input)));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    assert!(rule.different_names);
    assert!(rule.different_types);
    assert!(!rule.only_one_visible);
    assert!(report.contains("Pinstack @ (100,0) have different names"));
    assert!(report.contains("Pinstack @ (100,0) have different types"));
    assert!(report.contains("Pin VDDA (2) : Input"));

    let before = symbol.clone();
    let mut rule = PinStackingRule::new(&mut symbol);
    rule.check(&mut Report::new());
    let mut fix_report = Report::new();
    rule.fix(&mut fix_report);
    assert!(fix_report.contains("FIX for 'different pin names' not supported!"));
    assert!(fix_report.contains("FIX for 'different pin types' not supported!"));
    assert_eq!(fix_report.of_kind(MessageKind::Info).count(), 2);
    assert_eq!(symbol, before);
}

#[test]
fn mismatched_types_alone_are_left_untouched() {
    let mut symbol = Symbol::new("BUF");
    symbol.add_pin(typed(Pin::new("OUT", "5", 300, 0), ElectricalType::Output));
    symbol.add_pin(hidden(typed(
        Pin::new("OUT", "6", 300, 0),
        ElectricalType::TriState,
    )));
    let before = symbol.clone();

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    assert!(rule.different_types);
    assert!(!rule.different_names);

    let mut fix_report = Report::new();
    rule.fix(&mut fix_report);
    assert!(rule.check(&mut Report::new()));
    assert_eq!(
        fix_report.messages().len(),
        1,
        "unexpected messages: {:?}",
        fix_report.messages()
    );
    assert!(fix_report.contains("FIX for 'different pin types' not supported!"));
    assert_eq!(symbol, before);
}

#[test]
fn stacked_no_connect_is_reported() {
    let mut symbol = Symbol::new("IC");
    symbol.add_pin(typed(Pin::new("NC", "3", 0, 100), ElectricalType::NoConnect));
    symbol.add_pin(hidden(typed(Pin::new("NC", "4", 0, 100), ElectricalType::NoConnect)));

    let mut report = Report::new();
    let mut rule = PinStackingRule::new(&mut symbol);
    assert!(rule.check(&mut report));
    assert!(rule.nc_stacked);
    assert!(report.contains("NC Pin NC (3) @ (0,-100) is stacked on other pins"));

    let before = symbol.clone();
    let mut rule = PinStackingRule::new(&mut symbol);
    rule.check(&mut Report::new());
    let mut fix_report = Report::new();
    rule.fix(&mut fix_report);
    assert!(fix_report.contains("FIX for 'NC pins stacked' not supported!"));
    assert_eq!(symbol, before);
}

#[test]
fn units_and_body_styles_do_not_stack() {
    let mut symbol = Symbol::new("DUAL");
    symbol.definition.unit_count = 2;
    let mut a = Pin::new("IN", "1", 0, 0);
    a.unit = 1;
    let mut b = Pin::new("IN", "5", 0, 0);
    b.unit = 2;
    let mut c = Pin::new("IN", "1", 0, 0);
    c.convert = 2;
    symbol.add_pin(a);
    symbol.add_pin(b);
    symbol.add_pin(c);

    assert!(pin_stacks(&symbol).iter().all(|s| s.members.len() == 1));

    let mut report = Report::new();
    assert!(!PinStackingRule::new(&mut symbol).check(&mut report));
}

#[test]
fn multi_unit_labels_name_the_unit() {
    let mut symbol = Symbol::new("QUAD");
    symbol.definition.unit_count = 4;
    let mut a = Pin::new("V+", "4", 0, 300);
    a.unit = 2;
    let mut b = Pin::new("V-", "11", 0, 300);
    b.unit = 2;
    b.set_visible(false);
    symbol.add_pin(a);
    symbol.add_pin(b);

    let mut report = Report::new();
    assert!(PinStackingRule::new(&mut symbol).check(&mut report));
    assert!(report.contains("Pinstack @ (0,-300) (unit 2) have different names"));
    assert!(report.contains("Pin V- (11) in unit 2"));
}

#[test]
fn stack_grouping_ignores_drawing_order() {
    let pins = [
        Pin::new("A", "1", 0, 0),
        Pin::new("B", "2", 100, 0),
        Pin::new("A", "3", 0, 0),
        Pin::new("B", "4", 100, 0),
    ];

    let mut forward = Symbol::new("X");
    for pin in pins.iter().cloned() {
        forward.add_pin(pin);
    }
    let mut reverse = Symbol::new("X");
    for pin in pins.iter().rev().cloned() {
        reverse.add_pin(pin);
    }

    let sizes = |symbol: &Symbol| {
        let mut sizes: Vec<(i32, usize)> = pin_stacks(symbol)
            .iter()
            .map(|s| (s.key.x, s.members.len()))
            .collect();
        sizes.sort_unstable();
        sizes
    };
    assert_eq!(sizes(&forward), vec![(0, 2), (100, 2)]);
    assert_eq!(sizes(&forward), sizes(&reverse));

    let stacks = pin_stacks(&forward);
    assert_eq!(stacks[0].key.x, 0);
    assert_eq!(stacks[0].members, vec![0, 2]);
}
