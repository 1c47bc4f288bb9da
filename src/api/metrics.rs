use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static APPLICATION_COUNT: AtomicU64 = AtomicU64::new(0);
static APPLICATION_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static EMAIL_FAILURE_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_application_count() {
    APPLICATION_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_application_error_count() {
    APPLICATION_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_email_failure_count() {
    EMAIL_FAILURE_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub mentorship_applications_total: u64,
    pub mentorship_application_errors_total: u64,
    pub mentorship_email_failures_total: u64,
}

fn snapshot() -> MetricsResponse {
    MetricsResponse {
        mentorship_applications_total: APPLICATION_COUNT.load(Ordering::Relaxed),
        mentorship_application_errors_total: APPLICATION_ERROR_COUNT.load(Ordering::Relaxed),
        mentorship_email_failures_total: EMAIL_FAILURE_COUNT.load(Ordering::Relaxed),
    }
}

fn render(m: &MetricsResponse) -> String {
    format!(
        "# HELP mentorship_applications_total Mentorship requests created\n\
         # TYPE mentorship_applications_total counter\n\
         mentorship_applications_total {}\n\
         \n\
         # HELP mentorship_application_errors_total Mentorship applications rejected or failed\n\
         # TYPE mentorship_application_errors_total counter\n\
         mentorship_application_errors_total {}\n\
         \n\
         # HELP mentorship_email_failures_total Mentorship notification emails that failed\n\
         # TYPE mentorship_email_failures_total counter\n\
         mentorship_email_failures_total {}\n",
        m.mentorship_applications_total,
        m.mentorship_application_errors_total,
        m.mentorship_email_failures_total
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus metrics (text exposition format)")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render(&snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exposition() {
        let text = render(&MetricsResponse {
            mentorship_applications_total: 3,
            mentorship_application_errors_total: 1,
            mentorship_email_failures_total: 0,
        });

        assert!(text.contains("mentorship_applications_total 3\n"));
        assert!(text.contains("mentorship_application_errors_total 1\n"));
        assert!(text.contains("# TYPE mentorship_email_failures_total counter"));
    }

    #[test]
    fn test_counters_only_grow() {
        let before = snapshot().mentorship_email_failures_total;
        increment_email_failure_count();
        assert!(snapshot().mentorship_email_failures_total > before);
    }
}
