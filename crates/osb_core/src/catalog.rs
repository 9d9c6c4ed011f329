//! Service catalog served on `GET /v2/catalog`.
//!
//! Only the fields the gate checks are typed. Everything else an operator
//! writes (`metadata`, `plan_updateable`, `schemas`, ...) is kept in `extra`
//! and written back out untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub bindable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<String>>,
    pub plans: Vec<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_client: Option<DashboardClient>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardClient {
    pub id: String,
    pub secret: String,
    pub redirect_uri: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    /// Load a catalog from a JSON file and check that it is usable.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Service ids must be unique and every service needs a plan.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for service in &self.services {
            if !seen.insert(service.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate service id '{}'",
                    service.id
                )));
            }
            if service.plans.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "service '{}' has no plans",
                    service.name
                )));
            }
        }
        Ok(())
    }

    /// Built-in single-service catalog used when no file is configured.
    pub fn demo() -> Self {
        let mut service_extra = Map::new();
        service_extra.insert(
            "metadata".into(),
            serde_json::json!({
                "displayName": "Demo Service",
                "providerDisplayName": "osb",
            }),
        );
        Catalog {
            services: vec![Service {
                id: "osb-demo-service".into(),
                name: "demo".into(),
                description: "In-memory demo service".into(),
                bindable: true,
                tags: Some(vec!["demo".into()]),
                requires: None,
                plans: vec![Plan {
                    id: "osb-demo-plan-default".into(),
                    name: "default".into(),
                    description: "Shared demo plan".into(),
                    free: Some(true),
                    extra: Map::new(),
                }],
                dashboard_client: None,
                extra: service_extra,
            }],
            extra: Map::new(),
        }
    }
}
