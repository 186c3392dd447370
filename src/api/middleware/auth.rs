use crate::api::error::ApiError;
use crate::config::AppConfig;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use std::{
    future::{ready, Future, Ready},
    pin::Pin,
    rc::Rc,
};
use tracing::warn;

/// Identity of the caller, resolved from the bearer key by [`ApiKeyAuth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(ApiError::Unauthorized),
        )
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

pub struct ApiKeyAuth;

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        // Health checks and CORS preflights carry no identity
        if req.method() == actix_web::http::Method::OPTIONS || req.path() == "/health" {
            return Box::pin(async move { srv.call(req).await.map(ServiceResponse::map_into_left_body) });
        }

        let config = match req.app_data::<actix_web::web::Data<AppConfig>>() {
            Some(c) => c,
            None => {
                warn!("AppConfig missing in app_data");
                let err = ApiError::Internal("configuration missing".to_string());
                let res = req.into_response(err.error_response()).map_into_right_body();
                return Box::pin(async move { Ok(res) });
            }
        };

        let user = bearer_token(&req)
            .and_then(|token| config.auth.user_for_key(token))
            .map(|user_id| AuthenticatedUser {
                user_id: user_id.to_string(),
            });

        match user {
            Some(user) => {
                req.extensions_mut().insert(user);
                Box::pin(async move { srv.call(req).await.map(ServiceResponse::map_into_left_body) })
            }
            None => {
                let res = req
                    .into_response(ApiError::Unauthorized.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
