//! Drives rules over components: check, optionally fix, re-check.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Conventions;
use crate::error::LibraryResult;
use crate::library::Library;
use crate::model::{Footprint, Symbol};
use crate::rules::{Message, Report, Rule, RuleId};

/// Result of running one rule against one component.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    /// Rule that ran.
    pub rule: RuleId,
    /// Component name.
    pub component: String,
    /// Whether the first check found a violation.
    pub violated: bool,
    /// Whether a violation is still present after the cycle.
    pub remaining: bool,
    /// Messages from the check and, if run, the fix.
    pub messages: Vec<Message>,
}

impl RuleOutcome {
    /// Whether a fix was applied and resolved every violation.
    #[must_use]
    pub const fn fixed(&self) -> bool {
        self.violated && !self.remaining
    }
}

/// Runs the footprint rules among `rules` against one footprint.
pub fn check_footprint(
    footprint: &mut Footprint,
    rules: &[RuleId],
    conventions: Conventions,
    fix: bool,
) -> Vec<RuleOutcome> {
    let name = footprint.name.clone();
    let mut outcomes = Vec::new();
    for &id in rules {
        if let Some(mut rule) = id.bind_footprint(footprint, conventions) {
            outcomes.push(run_rule(rule.as_mut(), &name, fix));
        }
    }
    outcomes
}

/// Runs the symbol rules among `rules` against one symbol.
pub fn check_symbol(
    symbol: &mut Symbol,
    rules: &[RuleId],
    conventions: Conventions,
    fix: bool,
) -> Vec<RuleOutcome> {
    let name = symbol.name.clone();
    let mut outcomes = Vec::new();
    for &id in rules {
        if let Some(mut rule) = id.bind_symbol(symbol, conventions) {
            outcomes.push(run_rule(rule.as_mut(), &name, fix));
        }
    }
    outcomes
}

/// Runs `rules` against every component in the library.
pub fn check_library(
    library: &mut Library,
    rules: &[RuleId],
    conventions: Conventions,
    fix: bool,
) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::new();
    for footprint in &mut library.footprints {
        outcomes.extend(check_footprint(footprint, rules, conventions, fix));
    }
    for symbol in &mut library.symbols {
        outcomes.extend(check_symbol(symbol, rules, conventions, fix));
    }
    outcomes
}

/// Result of running rules over one library document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    /// Document path.
    pub path: PathBuf,
    /// Per rule and component results.
    pub outcomes: Vec<RuleOutcome>,
    /// Whether fixes changed the document and it was written back.
    pub written: bool,
}

impl DocumentOutcome {
    /// Whether any violation is still present.
    #[must_use]
    pub fn remaining(&self) -> bool {
        self.outcomes.iter().any(|o| o.remaining)
    }
}

/// Opens a library document, runs `rules` over it and, with `fix`, writes
/// it back whenever a fix changed anything.
///
/// Partial fixes are kept: a component whose other violations need manual
/// work is still saved with the automatic fixes applied.
///
/// # Errors
///
/// Returns an error if the document cannot be read, parsed or written.
pub fn check_document(
    path: &Path,
    rules: &[RuleId],
    conventions: Conventions,
    fix: bool,
) -> LibraryResult<DocumentOutcome> {
    let mut library = Library::open(path)?;
    info!(path = %path.display(), components = library.len(), "Loaded library");

    let original = fix.then(|| library.clone());
    let outcomes = check_library(&mut library, rules, conventions, fix);

    let written = original.is_some_and(|original| original != library);
    if written {
        library.save(path)?;
        info!(path = %path.display(), "Wrote fixed library");
    }

    Ok(DocumentOutcome {
        path: path.to_path_buf(),
        outcomes,
        written,
    })
}

fn run_rule(rule: &mut dyn Rule, component: &str, fix: bool) -> RuleOutcome {
    let id = rule.id();
    debug!(rule = %id, component, "Checking");

    let mut report = Report::new();
    let violated = rule.check(&mut report);
    let mut remaining = violated;

    if fix && violated {
        rule.fix(&mut report);
        // Confirm silently; the first check already reported the details.
        remaining = rule.check(&mut Report::new());
        info!(rule = %id, component, resolved = !remaining, "Applied fixes");
    }

    RuleOutcome {
        rule: id,
        component: component.to_string(),
        violated,
        remaining,
        messages: report.take(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pin;

    #[test]
    fn only_matching_rules_run() {
        let mut footprint = Footprint::new("R_0603");
        let outcomes = check_footprint(
            &mut footprint,
            &RuleId::ALL,
            Conventions::default(),
            false,
        );
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].rule, RuleId::FabricationLayer);

        let mut symbol = Symbol::new("R");
        let outcomes = check_symbol(&mut symbol, &RuleId::ALL, Conventions::default(), false);
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn fix_cycle_reports_resolution() {
        let mut symbol = Symbol::new("R");
        symbol.add_pin(Pin::new("~", "1", 0, 0));
        symbol.add_pin(Pin::new("~", "1", 0, 0));

        let outcomes = check_symbol(
            &mut symbol,
            &[RuleId::PinStacking],
            Conventions::default(),
            true,
        );
        assert!(outcomes[0].violated);
        assert!(outcomes[0].fixed());
        assert_eq!(symbol.pins().count(), 1);
    }
}
