//! OSB core — the Broker Capability contract the gate speaks to.
//!
//! The gate never owns instance or binding state. It calls a [`Broker`],
//! receives a closed result per operation, and maps that result onto the
//! wire.
//!
//! ```text
//! HTTP handler
//!   │
//!   ▼
//! Broker::provision / deprovision / bind / unbind / catalog
//!   │
//!   ▼
//! Result<T, ProvisionError | DeprovisionError | BindError | UnbindError>
//! ```
//!
//! Sentinel conditions are enum variants. Anything the broker cannot name
//! travels as `Other(message)` and is surfaced verbatim.

pub mod broker;
pub mod catalog;
pub mod error;
pub mod memory;

pub use broker::{Broker, Credentials, ProvisionedInstance};
pub use catalog::{Catalog, DashboardClient, Plan, Service};
pub use error::{BindError, CatalogError, DeprovisionError, ProvisionError, UnbindError};
pub use memory::InMemoryBroker;
