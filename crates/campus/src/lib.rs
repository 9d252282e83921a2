//! Facade crate for Campus features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `campus` with the `server` feature for the HTTP surface.
//! - Call [`init`] to build every feature slice, then register them in the API state.

pub use campus_domain as domain;
use campus_domain::config::ApiConfig;
use campus_event_bus::EventBus;
pub use campus_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use campus_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use campus_certificates as certificates;
    pub use campus_discussion as discussion;
    pub use campus_toggles as toggles;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "toggles",
        "discussion",
        "certificates",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all features.
///
/// `certificate_task` carries the user, verification and generator ports
/// the certificate worker runs against.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    events: &EventBus,
    certificate_task: features::certificates::CertificateTask,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Switches
    slices.push(features::toggles::init(&config.toggles)?);

    // Discussion access gate
    slices.push(features::discussion::init(&config.discussion)?);

    // Certificate queue (the worker is started by the host)
    slices.push(features::certificates::init(&config.certificates, events, certificate_task)?);

    Ok(slices)
}
