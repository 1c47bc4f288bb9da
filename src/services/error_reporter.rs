use std::error::Error;
use std::time::Duration;

use crate::services::email_service::EmailError;
use crate::utils::AppError;

/// Sink for errors that were recovered locally but should still be seen.
///
/// Fire-and-forget: implementations must not block the caller or fail.
pub trait ErrorReporter: Send + Sync {
    fn capture_exception(&self, error: &(dyn Error + 'static));
}

/// Writes captured errors to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogErrorReporter;

impl ErrorReporter for LogErrorReporter {
    fn capture_exception(&self, error: &(dyn Error + 'static)) {
        log::error!("❌ Captured error: {}", describe_chain(error));
    }
}

/// Connection details parsed from a Sentry DSN
/// (`scheme://PUBLIC_KEY@host[:port][/prefix]/PROJECT_ID`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentryDsn {
    pub public_key: String,
    pub project_id: String,
    pub store_url: String,
}

impl SentryDsn {
    pub fn parse(dsn: &str) -> Result<Self, AppError> {
        let url = reqwest::Url::parse(dsn)
            .map_err(|e| AppError::Internal(format!("Invalid Sentry DSN: {}", e)))?;

        let public_key = url.username();
        if public_key.is_empty() {
            return Err(AppError::Internal("Sentry DSN has no public key".to_string()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| AppError::Internal("Sentry DSN has no host".to_string()))?;

        let path = url.path().trim_end_matches('/');
        let (prefix, project_id) = path.rsplit_once('/').unwrap_or(("", path));
        if project_id.is_empty() {
            return Err(AppError::Internal("Sentry DSN has no project id".to_string()));
        }

        let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let store_url = format!(
            "{}://{}{}{}/api/{}/store/",
            url.scheme(),
            host,
            port,
            prefix,
            project_id
        );

        Ok(Self {
            public_key: public_key.to_string(),
            project_id: project_id.to_string(),
            store_url,
        })
    }

    fn auth_header(&self) -> String {
        format!(
            "Sentry sentry_key={},sentry_version=7,sentry_client={}/{}",
            self.public_key,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    }
}

/// Reports errors to a Sentry-compatible `store` endpoint.
///
/// Each report is posted from a spawned task; delivery problems are logged and dropped.
pub struct SentryReporter {
    dsn: SentryDsn,
    environment: String,
    client: reqwest::Client,
}

impl SentryReporter {
    pub fn new(dsn: &str, environment: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            dsn: SentryDsn::parse(dsn)?,
            environment: environment.to_string(),
            client,
        })
    }

    fn build_event(&self, error: &(dyn Error + 'static)) -> serde_json::Value {
        serde_json::json!({
            "event_id": uuid::Uuid::new_v4().simple().to_string(),
            "timestamp": chrono::Utc::now().timestamp(),
            "level": "error",
            "platform": "native",
            "logger": env!("CARGO_PKG_NAME"),
            "environment": self.environment,
            "exception": { "values": exception_values(error) },
        })
    }
}

impl ErrorReporter for SentryReporter {
    fn capture_exception(&self, error: &(dyn Error + 'static)) {
        log::error!("❌ Captured error: {}", describe_chain(error));

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("⚠️  No async runtime, Sentry report dropped");
                return;
            }
        };

        let event = self.build_event(error);
        let request = self
            .client
            .post(&self.dsn.store_url)
            .header("X-Sentry-Auth", self.dsn.auth_header())
            .json(&event);

        handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    log::debug!("📡 Error report accepted by Sentry");
                }
                Ok(resp) => log::warn!("⚠️  Sentry rejected error report: {}", resp.status()),
                Err(e) => log::warn!("⚠️  Failed to deliver error report: {}", e),
            }
        });
    }
}

/// Sentry exception values, innermost cause first.
fn exception_values(error: &(dyn Error + 'static)) -> Vec<serde_json::Value> {
    let mut values = Vec::new();
    let mut current: Option<&(dyn Error + 'static)> = Some(error);

    while let Some(err) = current {
        values.push(serde_json::json!({
            "type": error_type(err),
            "value": err.to_string(),
        }));
        current = err.source();
    }

    values.reverse();
    values
}

/// Type name of the error. Types raised in this service are named exactly;
/// foreign ones fall back to the leading identifier of their `Debug` output.
fn error_type(error: &(dyn Error + 'static)) -> String {
    if let Some(name) = known_type_name(error) {
        return name.to_string();
    }

    let debug = format!("{:?}", error);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

fn known_type_name(error: &(dyn Error + 'static)) -> Option<&'static str> {
    let full = if error.is::<EmailError>() {
        std::any::type_name::<EmailError>()
    } else if error.is::<AppError>() {
        std::any::type_name::<AppError>()
    } else if error.is::<reqwest::Error>() {
        std::any::type_name::<reqwest::Error>()
    } else {
        return None;
    };

    full.rsplit("::").next()
}

fn describe_chain(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        out.push_str(": ");
        out.push_str(&err.to_string());
        source = err.source();
    }
    out
}
