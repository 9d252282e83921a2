//! # Event Bus
//!
//! Typed in-process messaging shared by the feature slices.
//!
//! * **Broadcast** topics fan task outcomes out to any number of observers.
//! * **MPSC** queues carry work (certificate tasks) to a single consumer.
//!
//! Events are keyed by their Rust type; `FxHashMap` + `parking_lot::RwLock`
//! keep lookups cheap, channels are `tokio` primitives.
//!
//! ```rust
//! use campus_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug)]
//! struct SwitchFlipped { name: &'static str }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<SwitchFlipped>()?;
//!     bus.publish(SwitchFlipped { name: "third_party_auth.enable_multiple_sso_accounts_association_to_saml_user" })?;
//!
//!     let event = rx.recv_event().await.expect("bus is open");
//!     assert!(event.name.starts_with("third_party_auth."));
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
