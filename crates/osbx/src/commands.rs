use colored::Colorize;
use reqwest::blocking::Response;
use serde_json::Value;

pub struct Client {
    base: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn get(&self, path: &str) -> Result<Response, String> {
        let url = format!("{}{}", self.base, path);
        self.http
            .get(&url)
            .send()
            .map_err(|e| format!("request failed: {e}"))
    }

    fn put(&self, path: &str) -> Result<Response, String> {
        let url = format!("{}{}", self.base, path);
        self.http
            .put(&url)
            .json(&serde_json::json!({}))
            .send()
            .map_err(|e| format!("request failed: {e}"))
    }

    fn delete(&self, path: &str) -> Result<Response, String> {
        let url = format!("{}{}", self.base, path);
        self.http
            .delete(&url)
            .send()
            .map_err(|e| format!("request failed: {e}"))
    }
}

fn instance_path(instance_id: &str) -> String {
    format!("/v2/service_instances/{instance_id}")
}

fn binding_path(instance_id: &str, binding_id: &str) -> String {
    format!("/v2/service_instances/{instance_id}/service_bindings/{binding_id}")
}

/// Read the body and turn a non-2xx status into `HTTP <code>: <description>`.
fn read(resp: Response) -> Result<Value, String> {
    let status = resp.status();
    let json: Value = resp.json().map_err(|e| format!("parse response: {e}"))?;
    if status.is_success() {
        return Ok(json);
    }
    let code = status.as_u16();
    let detail = json
        .get("description")
        .and_then(|d| d.as_str())
        .unwrap_or(match code {
            409 => "already exists",
            410 => "already gone",
            404 => "not found",
            _ => "unknown error",
        });
    Err(format!("HTTP {code}: {detail}"))
}

// ── catalog ─────────────────────────────────────────────────────

pub fn catalog(client: &Client, raw: bool) -> Result<(), String> {
    let json = read(client.get("/v2/catalog")?)?;
    if raw {
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return Ok(());
    }

    let services = json
        .get("services")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();
    if services.is_empty() {
        println!("{}", "No services in catalog.".dimmed());
        return Ok(());
    }
    for svc in &services {
        let name = svc.get("name").and_then(|n| n.as_str()).unwrap_or("?");
        let id = svc.get("id").and_then(|i| i.as_str()).unwrap_or("?");
        let bindable = svc.get("bindable").and_then(|b| b.as_bool()).unwrap_or(false);
        let badge = if bindable {
            " bindable".green()
        } else {
            " not bindable".dimmed()
        };
        println!("{} {}{}", name.cyan().bold(), id.dimmed(), badge);
        if let Some(plans) = svc.get("plans").and_then(|p| p.as_array()) {
            for plan in plans {
                let pname = plan.get("name").and_then(|n| n.as_str()).unwrap_or("?");
                let desc = plan.get("description").and_then(|d| d.as_str()).unwrap_or("");
                println!("  {} {} {}", "•".dimmed(), pname, desc.dimmed());
            }
        }
    }
    Ok(())
}

// ── instances ───────────────────────────────────────────────────

pub fn provision(client: &Client, instance_id: &str) -> Result<(), String> {
    let json = read(client.put(&instance_path(instance_id))?)?;
    println!("{} instance {}", "✓".green().bold(), instance_id.cyan());
    match json.get("dashboard_url").and_then(|d| d.as_str()) {
        Some(url) if !url.is_empty() => println!("  {} {}", "dashboard:".dimmed(), url),
        _ => {}
    }
    Ok(())
}

pub fn deprovision(client: &Client, instance_id: &str) -> Result<(), String> {
    let result = read(client.delete(&instance_path(instance_id))?);
    report_delete("instance", instance_id, result)
}

// ── bindings ────────────────────────────────────────────────────

pub fn bind(client: &Client, instance_id: &str, binding_id: &str) -> Result<(), String> {
    let json = read(client.put(&binding_path(instance_id, binding_id))?)?;
    println!(
        "{} binding {} on {}",
        "✓".green().bold(),
        binding_id.cyan(),
        instance_id.dimmed()
    );
    println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
    Ok(())
}

pub fn unbind(client: &Client, instance_id: &str, binding_id: &str) -> Result<(), String> {
    let result = read(client.delete(&binding_path(instance_id, binding_id))?);
    report_delete("binding", binding_id, result)
}

/// 410 is an idempotent no-op: say so, but keep the exit code distinct.
fn report_delete(kind: &str, id: &str, result: Result<Value, String>) -> Result<(), String> {
    match result {
        Ok(_) => {
            println!("{} {} {} removed", "✓".green().bold(), kind, id.cyan());
            Ok(())
        }
        Err(e) if e.starts_with("HTTP 410") => {
            println!("{} {} {} already absent", "○".yellow(), kind, id.cyan());
            Err(e)
        }
        Err(e) => Err(e),
    }
}

// ── health ──────────────────────────────────────────────────────

pub fn health(client: &Client) -> Result<(), String> {
    let resp = client.get("/healthz")?;
    let status = resp.status();
    let json: Value = resp.json().map_err(|e| format!("parse: {e}"))?;

    if status.is_success() && json.get("ok").and_then(|o| o.as_bool()) == Some(true) {
        println!("{} {}", "●".green(), "ok".green().bold());
    } else {
        println!("{} gate unhealthy (HTTP {})", "●".red(), status.as_u16());
    }

    Ok(())
}
