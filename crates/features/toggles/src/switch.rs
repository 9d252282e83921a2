//! Switch declarations.
//!
//! A [`Switch`] is a named boolean, declared as a `static` next to the code it
//! guards and registered with the [`SwitchRegistry`](crate::SwitchRegistry) at
//! startup. Declarations never change after compilation; only overrides do.

use serde::Serialize;
use std::fmt;

/// Groups switches of one subsystem and tags their log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchNamespace {
    pub name: &'static str,
    pub log_prefix: &'static str,
}

impl SwitchNamespace {
    #[must_use]
    pub const fn new(name: &'static str, log_prefix: &'static str) -> Self {
        Self { name, log_prefix }
    }
}

/// Why a switch exists, mirroring the toggle annotation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Temporary,
    CircuitBreaker,
    Vip,
    OptIn,
    OptOut,
    OpenEdx,
}

/// Documentation attached to every switch.
///
/// Dates are kept as written in the annotation. They are informational and
/// not always valid calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchMetadata {
    pub description: &'static str,
    pub default: bool,
    pub use_cases: &'static [UseCase],
    pub creation_date: &'static str,
    pub target_removal_date: Option<&'static str>,
    pub tickets: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    pub namespace: SwitchNamespace,
    pub name: &'static str,
    /// Module path of the declaring code, for diagnostics.
    pub module: &'static str,
    pub metadata: SwitchMetadata,
}

impl Switch {
    #[must_use]
    pub const fn new(
        namespace: SwitchNamespace,
        name: &'static str,
        module: &'static str,
        metadata: SwitchMetadata,
    ) -> Self {
        Self { namespace, name, module, metadata }
    }

    /// `namespace.name`, the key used by the registry and config overrides.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace.name, self.name)
    }

    /// Current state in the global registry: the override if one is set,
    /// otherwise the declared default.
    #[must_use]
    pub fn is_enabled(&'static self) -> bool {
        crate::SwitchRegistry::global().is_switch_enabled(self)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace.name, self.name)
    }
}
