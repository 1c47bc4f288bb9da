use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::config::JwtConfig;
use crate::utils::AppError;

/// Verified bearer-token claims; `sub` is the caller's external auth id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub aud: String,
    pub iss: String,
}

pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    validation.set_issuer(&[config.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))
}

/// Rejects requests without a valid bearer token and exposes the verified
/// `Claims` to handlers through `web::ReqData<Claims>`.
///
/// Reads `web::Data<JwtConfig>` from app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match req.app_data::<web::Data<JwtConfig>>() {
            Some(config) => bearer_token(&req).and_then(|token| verify_token(token, config)),
            None => Err(AppError::Internal("JWT configuration missing".to_string())),
        };

        match verified {
            Ok(claims) => {
                log::debug!("🔐 Authenticated {} {} as {}", req.method(), req.path(), claims.sub);
                req.extensions_mut().insert(claims);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("❌ {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::{jwt_config, token_for};

    #[test]
    fn test_verify_round_trip() {
        let claims = verify_token(&token_for("auth0|u1"), &jwt_config()).unwrap();
        assert_eq!(claims.sub, "auth0|u1");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let mut config = jwt_config();
        config.secret = "another-secret".to_string();

        let err = verify_token(&token_for("auth0|u1"), &config).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let mut config = jwt_config();
        config.audience = "someone-else".to_string();

        assert!(verify_token(&token_for("auth0|u1"), &config).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify_token("not.a.jwt", &jwt_config()).is_err());
    }
}
