//! Feature switches: declarations, the process-wide registry and the
//! `third_party_auth` switches.
//!
//! ```rust
//! use campus_toggles::third_party_auth::ENABLE_MULTIPLE_SSO_ACCOUNTS_ASSOCIATION_TO_SAML_USER as SSO;
//!
//! assert_eq!(
//!     SSO.full_name(),
//!     "third_party_auth.enable_multiple_sso_accounts_association_to_saml_user"
//! );
//! assert!(!SSO.metadata.default);
//! ```

mod error;
#[cfg(feature = "server")]
mod handlers;
mod registry;
mod switch;
pub mod third_party_auth;

pub use error::{ToggleError, ToggleErrorExt};
#[cfg(feature = "server")]
pub use handlers::router;
pub use registry::{SwitchRegistry, SwitchState};
pub use switch::{Switch, SwitchMetadata, SwitchNamespace, UseCase};

use campus_domain::config::TogglesConfig;
use campus_kernel::domain::registry::InitializedSlice;

/// Toggles feature state
#[campus_derive::campus_slice]
pub struct Toggles {
    pub registry: &'static SwitchRegistry,
}

/// Every switch this crate declares.
pub fn declared() -> impl Iterator<Item = &'static Switch> {
    third_party_auth::SWITCHES.iter().copied()
}

/// Registers all declared switches into `registry` and applies the
/// configured overrides.
///
/// # Errors
/// A conflicting declaration, or an override naming an unknown switch.
pub fn install(registry: &SwitchRegistry, config: &TogglesConfig) -> Result<(), ToggleError> {
    for switch in declared() {
        registry.register(switch)?;
    }
    for (name, enabled) in &config.overrides {
        registry.set_override(name, *enabled).context("toggles.overrides")?;
    }
    Ok(())
}

/// Initialize the toggles feature against the global registry.
///
/// # Errors
/// See [`install`].
pub fn init(config: &TogglesConfig) -> Result<InitializedSlice, ToggleError> {
    let registry = SwitchRegistry::global();
    install(registry, config)?;

    tracing::info!(switches = registry.len(), "Toggles slice initialized");

    Ok(InitializedSlice::new(Toggles::new(TogglesInner { registry })))
}
