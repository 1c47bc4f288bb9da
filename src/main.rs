mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::{
    AppServices, ErrorReporter, LogErrorReporter, MongoMentorshipRepository, MongoUserRepository,
    SendGridEmailSender, SentryReporter,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(to_io_error)?;

    log::info!("🚀 Starting Mentorship Service ({})...", config.environment);

    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| to_io_error(format!("Failed to connect to MongoDB: {}", e)))?;

    log::info!("✅ MongoDB connected successfully");

    let db_data = web::Data::new(db.clone());
    let services = web::Data::new(build_services(&config, db).map_err(to_io_error)?);
    let jwt = web::Data::new(config.jwt.clone());

    if config.email.api_key.is_none() {
        log::warn!("⚠️  SENDGRID_API_KEY not set, mentorship emails will fail and be reported");
    }

    let bind_addr = format!("{}:{}", config.host, config.port);
    log::info!("🌐 Server starting on {}", bind_addr);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_addr);

    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(services.clone())
            .app_data(jwt.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .route("/health", web::get().to(api::health::health_check))
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            .configure(api::mentorships::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}

fn build_services(config: &AppConfig, db: database::MongoDB) -> Result<AppServices, String> {
    let users = Arc::new(MongoUserRepository::new(db.clone()));

    let email = SendGridEmailSender::new(config.email.clone())
        .map_err(|e| format!("Failed to create email client: {}", e))?;

    let errors: Arc<dyn ErrorReporter> = match &config.sentry_dsn {
        Some(dsn) => {
            let reporter = SentryReporter::new(dsn, &config.environment).map_err(|e| e.to_string())?;
            log::info!("📡 Error reports go to Sentry");
            Arc::new(reporter)
        }
        None => Arc::new(LogErrorReporter),
    };

    Ok(AppServices {
        users: users.clone(),
        mentors: users,
        mentorships: Arc::new(MongoMentorshipRepository::new(db)),
        email: Arc::new(email),
        errors,
    })
}

fn to_io_error(e: impl ToString) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
