use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::error::{BindError, DeprovisionError, ProvisionError, UnbindError};

/// Opaque credentials payload returned by a successful bind.
/// The gate writes it to the wire untouched.
pub type Credentials = Map<String, Value>;

/// Successful provision result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedInstance {
    /// May be empty when the service has no dashboard.
    pub dashboard_url: String,
}

impl ProvisionedInstance {
    pub fn new(dashboard_url: impl Into<String>) -> Self {
        Self {
            dashboard_url: dashboard_url.into(),
        }
    }
}

/// The Broker Capability.
///
/// Implementations own every piece of instance and binding state and must
/// serialise access to it themselves: the gate calls these methods
/// concurrently from independent requests and holds no lock around them.
pub trait Broker: Send + Sync {
    fn catalog(&self) -> Catalog;

    fn provision(&self, instance_id: &str) -> Result<ProvisionedInstance, ProvisionError>;

    fn deprovision(&self, instance_id: &str) -> Result<(), DeprovisionError>;

    fn bind(&self, instance_id: &str, binding_id: &str) -> Result<Credentials, BindError>;

    fn unbind(&self, instance_id: &str, binding_id: &str) -> Result<(), UnbindError>;
}
