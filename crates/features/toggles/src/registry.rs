use crate::error::ToggleError;
use crate::switch::Switch;
use campus_derive::api_model;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::LazyLock;
use tracing::{debug, info, trace, warn};

static GLOBAL: LazyLock<SwitchRegistry> = LazyLock::new(SwitchRegistry::new);

#[derive(Debug)]
struct Entry {
    switch: &'static Switch,
    forced: Option<bool>,
}

impl Entry {
    fn enabled(&self) -> bool {
        self.forced.unwrap_or(self.switch.metadata.default)
    }
}

/// Listing row for one registered switch.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct SwitchState {
    pub name: String,
    pub enabled: bool,
    pub default: bool,
    pub overridden: bool,
    pub description: String,
}

/// Registered switches keyed by full name, plus their runtime overrides.
#[derive(Debug, Default)]
pub struct SwitchRegistry {
    entries: RwLock<FxHashMap<String, Entry>>,
}

impl SwitchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers a declaration. Registering the same declaration again is a
    /// no-op.
    ///
    /// # Errors
    /// [`ToggleError::Conflict`] if a different switch already owns the name.
    pub fn register(&self, switch: &'static Switch) -> Result<(), ToggleError> {
        let name = switch.full_name();
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&name) {
            if existing.switch == switch {
                return Ok(());
            }
            return Err(ToggleError::Conflict {
                name,
                context: Some(format!("already declared in {}", existing.switch.module).into()),
            });
        }

        debug!(switch = %name, default = switch.metadata.default, "Switch registered");
        entries.insert(name, Entry { switch, forced: None });
        Ok(())
    }

    /// Unknown names read as off.
    pub fn is_enabled(&self, full_name: &str) -> bool {
        let entries = self.entries.read();
        let Some(entry) = entries.get(full_name) else {
            warn!(switch = full_name, "Unknown switch evaluated; treating as disabled");
            return false;
        };

        let enabled = entry.enabled();
        trace!("{}{full_name} is {}", entry.switch.namespace.log_prefix, on_off(enabled));
        enabled
    }

    /// Evaluates a declaration directly. An unregistered declaration reads
    /// as its default.
    pub fn is_switch_enabled(&self, switch: &'static Switch) -> bool {
        let name = switch.full_name();
        let enabled = self
            .entries
            .read()
            .get(&name)
            .filter(|entry| entry.switch == switch)
            .map_or(switch.metadata.default, Entry::enabled);

        trace!("{}{name} is {}", switch.namespace.log_prefix, on_off(enabled));
        enabled
    }

    /// # Errors
    /// [`ToggleError::Unknown`] if nothing is registered under `full_name`.
    pub fn set_override(&self, full_name: &str, enabled: bool) -> Result<(), ToggleError> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(full_name).ok_or_else(|| unknown(full_name))?;

        entry.forced = Some(enabled);
        info!("{}{full_name} forced {}", entry.switch.namespace.log_prefix, on_off(enabled));
        Ok(())
    }

    /// Drops an override and returns the value it held.
    ///
    /// # Errors
    /// [`ToggleError::Unknown`] if nothing is registered under `full_name`.
    pub fn clear_override(&self, full_name: &str) -> Result<Option<bool>, ToggleError> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(full_name).ok_or_else(|| unknown(full_name))?;
        Ok(entry.forced.take())
    }

    /// Current state of every registered switch, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SwitchState> {
        let mut rows: Vec<SwitchState> = self
            .entries
            .read()
            .iter()
            .map(|(name, entry)| SwitchState {
                name: name.clone(),
                enabled: entry.enabled(),
                default: entry.switch.metadata.default,
                overridden: entry.forced.is_some(),
                description: entry.switch.metadata.description.to_owned(),
            })
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

fn unknown(name: &str) -> ToggleError {
    ToggleError::Unknown { name: name.to_owned(), context: None }
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switch::{SwitchMetadata, SwitchNamespace, UseCase};

    const NS: SwitchNamespace = SwitchNamespace::new("grades", "Grades: ");

    const META: SwitchMetadata = SwitchMetadata {
        description: "Recompute grades on submission.",
        default: false,
        use_cases: &[UseCase::Temporary],
        creation_date: "2024-01-01",
        target_removal_date: None,
        tickets: &[],
    };

    static RECOMPUTE: Switch = Switch::new(NS, "recompute", module_path!(), META);
    static RECOMPUTE_AGAIN: Switch = Switch::new(
        NS,
        "recompute",
        "somewhere::else",
        SwitchMetadata { default: true, ..META },
    );
    static ARCHIVE: Switch = Switch::new(NS, "archive", module_path!(), META);

    #[test]
    fn registration_is_idempotent() {
        let registry = SwitchRegistry::new();
        registry.register(&RECOMPUTE).unwrap();
        registry.register(&RECOMPUTE).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_declaration_is_rejected() {
        let registry = SwitchRegistry::new();
        registry.register(&RECOMPUTE).unwrap();

        let err = registry.register(&RECOMPUTE_AGAIN).unwrap_err();
        assert!(matches!(err, ToggleError::Conflict { ref name, .. } if name == "grades.recompute"));
        assert!(!registry.is_enabled("grades.recompute"));
    }

    #[test]
    fn override_wins_until_cleared() {
        let registry = SwitchRegistry::new();
        registry.register(&RECOMPUTE).unwrap();

        registry.set_override("grades.recompute", true).unwrap();
        assert!(registry.is_enabled("grades.recompute"));
        assert!(registry.is_switch_enabled(&RECOMPUTE));

        assert_eq!(registry.clear_override("grades.recompute").unwrap(), Some(true));
        assert!(!registry.is_enabled("grades.recompute"));
        assert_eq!(registry.clear_override("grades.recompute").unwrap(), None);
    }

    #[test]
    fn unknown_switches_read_off_and_reject_overrides() {
        let registry = SwitchRegistry::new();
        assert!(!registry.is_enabled("grades.missing"));
        assert!(matches!(
            registry.set_override("grades.missing", true),
            Err(ToggleError::Unknown { .. })
        ));
        assert!(registry.clear_override("grades.missing").is_err());
    }

    #[test]
    fn unregistered_declaration_reads_default() {
        let registry = SwitchRegistry::new();
        assert!(!registry.is_switch_enabled(&RECOMPUTE));
        assert!(registry.is_switch_enabled(&RECOMPUTE_AGAIN));
    }

    #[test]
    fn snapshot_is_sorted() {
        let registry = SwitchRegistry::new();
        registry.register(&RECOMPUTE).unwrap();
        registry.register(&ARCHIVE).unwrap();
        registry.set_override("grades.recompute", true).unwrap();

        let rows = registry.snapshot();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["grades.archive", "grades.recompute"]);
        assert!(rows[1].enabled && rows[1].overridden && !rows[1].default);
        assert!(!rows[0].enabled && !rows[0].overridden);
    }
}
