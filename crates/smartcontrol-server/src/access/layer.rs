//! Tower layer enforcing a capability on a route
//!
//! The request body is buffered so the guard can read the actor payload, then
//! replayed to the handler unchanged. On allow the resolved [`Principal`] is
//! stored in the request extensions for the handler to extract.
//!
//! [`Principal`]: super::principal::Principal

use super::capability::Capability;
use super::credentials::actor_payload;
use super::guard::AccessGuard;
use crate::error::AppError;
use axum::{
    body::Body,
    extract::Request,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

#[derive(Clone)]
pub struct RequireCapability {
    guard: AccessGuard,
    capability: Capability,
}

impl RequireCapability {
    pub fn new(guard: AccessGuard, capability: Capability) -> Self {
        Self { guard, capability }
    }
}

impl<S> Layer<S> for RequireCapability {
    type Service = RequireCapabilityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireCapabilityService {
            inner,
            guard: self.guard.clone(),
            capability: self.capability,
        }
    }
}

#[derive(Clone)]
pub struct RequireCapabilityService<S> {
    inner: S,
    guard: AccessGuard,
    capability: Capability,
}

impl<S> Service<Request> for RequireCapabilityService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // the clone is not guaranteed ready, keep the polled service for this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let guard = self.guard.clone();
        let capability = self.capability;

        let span = tracing::info_span!(
            "access_guard",
            %capability,
            method = %request.method(),
            path = %request.uri().path(),
        );

        Box::pin(
            async move {
                let (parts, body) = request.into_parts();
                let bytes = match axum::body::to_bytes(body, guard.body_limit()).await {
                    Ok(bytes) => bytes,
                    Err(err) if exceeds_limit(&err) => {
                        tracing::warn!(limit = guard.body_limit(), "Request body over limit");
                        return Ok(AppError::PayloadTooLarge(format!(
                            "Request body exceeds {} bytes",
                            guard.body_limit()
                        ))
                        .into_response());
                    },
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to read request body");
                        return Ok(AppError::BadRequest(
                            "Request body could not be read".to_string(),
                        )
                        .into_response());
                    },
                };

                let payload = actor_payload(&parts, &bytes).await;
                match guard.authorize(payload.as_ref(), capability).await {
                    Ok(principal) => {
                        let mut request = Request::from_parts(parts, Body::from(bytes));
                        request.extensions_mut().insert(principal);
                        inner.call(request).await
                    },
                    Err(denied) => Ok(denied.into_response()),
                }
            }
            .instrument(span),
        )
    }
}
