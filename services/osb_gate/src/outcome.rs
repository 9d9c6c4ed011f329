//! Outcome mapper: broker results → status, JSON body, error log line.
//!
//! Every body is a JSON object. Failures carry either `{}` or
//! `{"description": "..."}`, never partial success data.
//!
//! ```json
//! { "description": "instance limit for this service has been reached" }
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use osb_core::{
    BindError, Credentials, DeprovisionError, ProvisionError, ProvisionedInstance, UnbindError,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Empty(EmptyResponse),
    Error(ErrorResponse),
    Provisioned(ProvisionedInstance),
    Credentials(Credentials),
}

impl Body {
    fn empty() -> Self {
        Body::Empty(EmptyResponse {})
    }

    fn error(description: impl Into<String>) -> Self {
        Body::Error(ErrorResponse {
            description: description.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: StatusCode,
    pub body: Body,
    /// Emitted at error severity by the handler when present.
    pub log: Option<String>,
}

impl Outcome {
    fn ok(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            body,
            log: None,
        }
    }

    fn failed(status: StatusCode, body: Body, log: String) -> Self {
        Self {
            status,
            body,
            log: Some(log),
        }
    }

    /// Broker error outside the sentinel set: raw text in body and log.
    fn unexpected(operation: &str, message: String) -> Self {
        let log = format!("{operation} error: {message}");
        Self::failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            Body::error(message),
            log,
        )
    }
}

pub fn provision(
    instance_id: &str,
    result: Result<ProvisionedInstance, ProvisionError>,
) -> Outcome {
    match result {
        Ok(instance) => Outcome::ok(StatusCode::CREATED, Body::Provisioned(instance)),
        Err(ProvisionError::AlreadyExists) => Outcome::failed(
            StatusCode::CONFLICT,
            Body::empty(),
            format!("Provisioning error: instance {instance_id} already exists"),
        ),
        Err(ProvisionError::LimitReached) => Outcome::failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            Body::error("instance limit for this service has been reached"),
            "Provisioning error: instance limit for this service has been reached".to_string(),
        ),
        Err(ProvisionError::Other(message)) => Outcome::unexpected("Provisioning", message),
    }
}

pub fn deprovision(instance_id: &str, result: Result<(), DeprovisionError>) -> Outcome {
    match result {
        Ok(()) => Outcome::ok(StatusCode::OK, Body::empty()),
        Err(DeprovisionError::DoesNotExist) => Outcome::failed(
            StatusCode::GONE,
            Body::empty(),
            format!("Deprovisioning error: instance {instance_id} does not exist"),
        ),
        Err(DeprovisionError::Other(message)) => Outcome::unexpected("Deprovisioning", message),
    }
}

pub fn bind(instance_id: &str, result: Result<Credentials, BindError>) -> Outcome {
    match result {
        Ok(credentials) => Outcome::ok(StatusCode::CREATED, Body::Credentials(credentials)),
        Err(BindError::InstanceDoesNotExist) => Outcome::failed(
            StatusCode::NOT_FOUND,
            Body::error("instance does not exist"),
            format!("Binding error: instance {instance_id} does not exist"),
        ),
        Err(BindError::BindingAlreadyExists) => Outcome::failed(
            StatusCode::CONFLICT,
            Body::error("binding already exists"),
            "Binding error: binding already exists".to_string(),
        ),
        Err(BindError::Other(message)) => Outcome::unexpected("Binding", message),
    }
}

pub fn unbind(instance_id: &str, binding_id: &str, result: Result<(), UnbindError>) -> Outcome {
    match result {
        Ok(()) => Outcome::ok(StatusCode::OK, Body::empty()),
        Err(UnbindError::InstanceDoesNotExist) => Outcome::failed(
            StatusCode::NOT_FOUND,
            Body::empty(),
            format!("Unbinding error: instance {instance_id} does not exist"),
        ),
        Err(UnbindError::BindingDoesNotExist) => Outcome::failed(
            StatusCode::GONE,
            Body::empty(),
            format!("Unbinding error: binding {binding_id} does not exist"),
        ),
        Err(UnbindError::Other(message)) => Outcome::unexpected("Unbinding", message),
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let mut resp = (self.status, Json(self.body)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(o: &Outcome) -> Value {
        serde_json::to_value(&o.body).unwrap()
    }

    #[test]
    fn empty_body_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&Body::empty()).unwrap(), "{}");
    }

    #[test]
    fn provision_success() {
        let o = provision("i-1", Ok(ProvisionedInstance::new("https://dash/i-1")));
        assert_eq!(o.status, StatusCode::CREATED);
        assert_eq!(body(&o), json!({"dashboard_url": "https://dash/i-1"}));
        assert!(o.log.is_none());
    }

    #[test]
    fn provision_success_keeps_empty_dashboard_url() {
        let o = provision("i-1", Ok(ProvisionedInstance::default()));
        assert_eq!(body(&o), json!({"dashboard_url": ""}));
    }

    #[test]
    fn provision_already_exists() {
        let o = provision("i-1", Err(ProvisionError::AlreadyExists));
        assert_eq!(o.status, StatusCode::CONFLICT);
        assert_eq!(body(&o), json!({}));
        assert_eq!(
            o.log.as_deref(),
            Some("Provisioning error: instance i-1 already exists")
        );
    }

    #[test]
    fn provision_limit_reached() {
        let o = provision("i-1", Err(ProvisionError::LimitReached));
        assert_eq!(o.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body(&o),
            json!({"description": "instance limit for this service has been reached"})
        );
        assert_eq!(
            o.log.as_deref(),
            Some("Provisioning error: instance limit for this service has been reached")
        );
    }

    #[test]
    fn deprovision_table() {
        let o = deprovision("i-1", Ok(()));
        assert_eq!((o.status, body(&o), o.log), (StatusCode::OK, json!({}), None));

        let o = deprovision("i-1", Err(DeprovisionError::DoesNotExist));
        assert_eq!(o.status, StatusCode::GONE);
        assert_eq!(body(&o), json!({}));
        assert_eq!(
            o.log.as_deref(),
            Some("Deprovisioning error: instance i-1 does not exist")
        );
    }

    #[test]
    fn bind_table() {
        let mut creds = Credentials::new();
        creds.insert("credentials".into(), json!({"username": "batman"}));
        let o = bind("i-1", Ok(creds));
        assert_eq!(o.status, StatusCode::CREATED);
        assert_eq!(body(&o), json!({"credentials": {"username": "batman"}}));
        assert!(o.log.is_none());

        let o = bind("i-1", Err(BindError::InstanceDoesNotExist));
        assert_eq!(o.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&o), json!({"description": "instance does not exist"}));
        assert_eq!(
            o.log.as_deref(),
            Some("Binding error: instance i-1 does not exist")
        );

        let o = bind("i-1", Err(BindError::BindingAlreadyExists));
        assert_eq!(o.status, StatusCode::CONFLICT);
        assert_eq!(body(&o), json!({"description": "binding already exists"}));
        assert_eq!(o.log.as_deref(), Some("Binding error: binding already exists"));
    }

    #[test]
    fn unbind_table() {
        let o = unbind("i-1", "b-1", Ok(()));
        assert_eq!((o.status, body(&o), o.log), (StatusCode::OK, json!({}), None));

        let o = unbind("i-1", "b-1", Err(UnbindError::InstanceDoesNotExist));
        assert_eq!(o.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&o), json!({}));
        assert_eq!(
            o.log.as_deref(),
            Some("Unbinding error: instance i-1 does not exist")
        );

        let o = unbind("i-1", "b-1", Err(UnbindError::BindingDoesNotExist));
        assert_eq!(o.status, StatusCode::GONE);
        assert_eq!(body(&o), json!({}));
        assert_eq!(
            o.log.as_deref(),
            Some("Unbinding error: binding b-1 does not exist")
        );
    }

    #[test]
    fn unexpected_errors_pass_message_through() {
        let cases = [
            (provision("i", Err(ProvisionError::Other("broker failed".into()))), "Provisioning"),
            (deprovision("i", Err(DeprovisionError::Other("broker failed".into()))), "Deprovisioning"),
            (bind("i", Err(BindError::Other("broker failed".into()))), "Binding"),
            (unbind("i", "b", Err(UnbindError::Other("broker failed".into()))), "Unbinding"),
        ];
        for (o, op) in cases {
            assert_eq!(o.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body(&o), json!({"description": "broker failed"}));
            assert_eq!(o.log, Some(format!("{op} error: broker failed")));
        }
    }

    #[test]
    fn response_is_json() {
        let resp = deprovision("i-1", Ok(())).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
