//! In-memory reference broker.
//!
//! Instances map to the set of their binding ids. One mutex guards all
//! state and is held only for the duration of a single call.

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use crate::broker::{Broker, Credentials, ProvisionedInstance};
use crate::catalog::Catalog;
use crate::error::{BindError, DeprovisionError, ProvisionError, UnbindError};

const POISONED: &str = "broker state lock poisoned";

/// Every id each operation was invoked with, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub provisioned: Vec<String>,
    pub deprovisioned: Vec<String>,
    pub bound: Vec<(String, String)>,
    pub unbound: Vec<(String, String)>,
}

#[derive(Default)]
struct Inner {
    instances: BTreeMap<String, BTreeSet<String>>,
    calls: CallLog,
}

pub struct InMemoryBroker {
    catalog: Catalog,
    instance_limit: usize,
    dashboard_base_url: String,
    credentials_host: String,
    credentials_port: u16,
    inner: Mutex<Inner>,
}

impl InMemoryBroker {
    pub fn new(catalog: Catalog, instance_limit: usize) -> Self {
        Self {
            catalog,
            instance_limit,
            dashboard_base_url: String::new(),
            credentials_host: "127.0.0.1".into(),
            credentials_port: 5432,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Dashboard URLs become `<base>/<instance_id>`. Empty base → empty URL.
    pub fn with_dashboard_base_url(mut self, base: impl Into<String>) -> Self {
        self.dashboard_base_url = base.into();
        self
    }

    pub fn with_credentials_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.credentials_host = host.into();
        self.credentials_port = port;
        self
    }

    pub fn instance_limit(&self) -> usize {
        self.instance_limit
    }

    pub fn calls(&self) -> CallLog {
        self.inner
            .lock()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }

    pub fn instance_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.instances.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, String> {
        self.inner.lock().map_err(|_| POISONED.to_string())
    }

    fn dashboard_url(&self, instance_id: &str) -> String {
        if self.dashboard_base_url.is_empty() {
            return String::new();
        }
        format!(
            "{}/{}",
            self.dashboard_base_url.trim_end_matches('/'),
            instance_id
        )
    }

    fn credentials(&self, instance_id: &str, binding_id: &str) -> Credentials {
        let digest = blake3::hash(format!("{instance_id}/{binding_id}").as_bytes());
        let password = hex::encode(&digest.as_bytes()[..16]);
        let mut creds = Credentials::new();
        creds.insert(
            "credentials".into(),
            json!({
                "host": self.credentials_host,
                "port": self.credentials_port,
                "username": binding_id,
                "password": password,
            }),
        );
        creds
    }
}

impl Broker for InMemoryBroker {
    fn catalog(&self) -> Catalog {
        self.catalog.clone()
    }

    fn provision(&self, instance_id: &str) -> Result<ProvisionedInstance, ProvisionError> {
        let mut inner = self.lock().map_err(ProvisionError::Other)?;
        inner.calls.provisioned.push(instance_id.to_string());
        if inner.instances.contains_key(instance_id) {
            return Err(ProvisionError::AlreadyExists);
        }
        if inner.instances.len() >= self.instance_limit {
            return Err(ProvisionError::LimitReached);
        }
        inner
            .instances
            .insert(instance_id.to_string(), BTreeSet::new());
        Ok(ProvisionedInstance::new(self.dashboard_url(instance_id)))
    }

    fn deprovision(&self, instance_id: &str) -> Result<(), DeprovisionError> {
        let mut inner = self.lock().map_err(DeprovisionError::Other)?;
        inner.calls.deprovisioned.push(instance_id.to_string());
        match inner.instances.remove(instance_id) {
            Some(_) => Ok(()),
            None => Err(DeprovisionError::DoesNotExist),
        }
    }

    fn bind(&self, instance_id: &str, binding_id: &str) -> Result<Credentials, BindError> {
        let mut inner = self.lock().map_err(BindError::Other)?;
        inner
            .calls
            .bound
            .push((instance_id.to_string(), binding_id.to_string()));
        let bindings = inner
            .instances
            .get_mut(instance_id)
            .ok_or(BindError::InstanceDoesNotExist)?;
        if !bindings.insert(binding_id.to_string()) {
            return Err(BindError::BindingAlreadyExists);
        }
        Ok(self.credentials(instance_id, binding_id))
    }

    fn unbind(&self, instance_id: &str, binding_id: &str) -> Result<(), UnbindError> {
        let mut inner = self.lock().map_err(UnbindError::Other)?;
        inner
            .calls
            .unbound
            .push((instance_id.to_string(), binding_id.to_string()));
        let bindings = inner
            .instances
            .get_mut(instance_id)
            .ok_or(UnbindError::InstanceDoesNotExist)?;
        if !bindings.remove(binding_id) {
            return Err(UnbindError::BindingDoesNotExist);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker(limit: usize) -> InMemoryBroker {
        InMemoryBroker::new(Catalog::demo(), limit)
    }

    #[test]
    fn provision_then_repeat_is_already_exists() {
        let b = broker(3);
        assert!(b.provision("i-1").is_ok());
        assert_eq!(b.provision("i-1"), Err(ProvisionError::AlreadyExists));
        assert_eq!(b.instance_count(), 1);
    }

    #[test]
    fn provision_beyond_limit() {
        let b = broker(2);
        b.provision("i-1").unwrap();
        b.provision("i-2").unwrap();
        assert_eq!(b.provision("i-3"), Err(ProvisionError::LimitReached));
    }

    #[test]
    fn existing_instance_wins_over_limit() {
        let b = broker(1);
        b.provision("i-1").unwrap();
        assert_eq!(b.provision("i-1"), Err(ProvisionError::AlreadyExists));
    }

    #[test]
    fn dashboard_url_empty_without_base() {
        let b = broker(3);
        assert_eq!(b.provision("i-1").unwrap().dashboard_url, "");
    }

    #[test]
    fn dashboard_url_joins_base_and_id() {
        let b = broker(3).with_dashboard_base_url("https://dash.example.com/");
        assert_eq!(
            b.provision("i-1").unwrap().dashboard_url,
            "https://dash.example.com/i-1"
        );
    }

    #[test]
    fn deprovision_unknown_does_not_exist() {
        let b = broker(3);
        assert_eq!(b.deprovision("nope"), Err(DeprovisionError::DoesNotExist));
    }

    #[test]
    fn deprovision_frees_a_slot() {
        let b = broker(1);
        b.provision("i-1").unwrap();
        b.deprovision("i-1").unwrap();
        assert!(b.provision("i-2").is_ok());
    }

    #[test]
    fn bind_rules() {
        let b = broker(3);
        assert_eq!(b.bind("i-1", "b-1"), Err(BindError::InstanceDoesNotExist));
        b.provision("i-1").unwrap();
        let creds = b.bind("i-1", "b-1").unwrap();
        let inner = &creds["credentials"];
        assert_eq!(inner["username"], "b-1");
        assert_eq!(inner["password"].as_str().unwrap().len(), 32);
        assert_eq!(b.bind("i-1", "b-1"), Err(BindError::BindingAlreadyExists));
    }

    #[test]
    fn credentials_are_deterministic_per_pair() {
        let b = broker(3);
        assert_eq!(b.credentials("i", "b"), b.credentials("i", "b"));
        assert_ne!(b.credentials("i", "b"), b.credentials("i", "c"));
    }

    #[test]
    fn unbind_rules() {
        let b = broker(3);
        assert_eq!(b.unbind("i-1", "b-1"), Err(UnbindError::InstanceDoesNotExist));
        b.provision("i-1").unwrap();
        assert_eq!(b.unbind("i-1", "b-1"), Err(UnbindError::BindingDoesNotExist));
        b.bind("i-1", "b-1").unwrap();
        assert!(b.unbind("i-1", "b-1").is_ok());
        assert_eq!(b.unbind("i-1", "b-1"), Err(UnbindError::BindingDoesNotExist));
    }

    #[test]
    fn deprovision_drops_bindings() {
        let b = broker(3);
        b.provision("i-1").unwrap();
        b.bind("i-1", "b-1").unwrap();
        b.deprovision("i-1").unwrap();
        b.provision("i-1").unwrap();
        assert!(b.bind("i-1", "b-1").is_ok());
    }

    #[test]
    fn records_calls() {
        let b = broker(3);
        let _ = b.provision("i-1");
        let _ = b.bind("i-1", "b-1");
        let _ = b.unbind("i-1", "b-1");
        let _ = b.deprovision("i-1");
        let calls = b.calls();
        assert_eq!(calls.provisioned, vec!["i-1"]);
        assert_eq!(calls.bound, vec![("i-1".to_string(), "b-1".to_string())]);
        assert_eq!(calls.unbound, vec![("i-1".to_string(), "b-1".to_string())]);
        assert_eq!(calls.deprovisioned, vec!["i-1"]);
    }
}
