//! Error sink: the single place where escaping faults become replies.
//!
//! Handlers and extractors raise [`Fault`]s with `?`. Actix renders them
//! through the production-safe [`ResponseError`](actix_web::ResponseError)
//! fallback and keeps the error on the response. This middleware finds those
//! responses, logs the fault once and re-renders it with the classifier
//! using the configured environment.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error};

use crate::config::Environment;
use crate::domain::Fault;
use crate::inbound::http::error::classify;
use crate::middleware::trace::TraceId;

/// Middleware factory re-rendering faults for an environment.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use starter_backend::config::Environment;
/// use starter_backend::middleware::ErrorSink;
///
/// let app = App::new().wrap(ErrorSink::new(Environment::Production));
/// ```
#[derive(Debug, Clone)]
pub struct ErrorSink {
    environment: Rc<Environment>,
}

impl ErrorSink {
    /// Create a sink classifying faults for `environment`.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment: Rc::new(environment),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorSink
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorSinkMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorSinkMiddleware {
            service,
            environment: Rc::clone(&self.environment),
        }))
    }
}

/// Service wrapper produced by [`ErrorSink`].
pub struct ErrorSinkMiddleware<S> {
    service: S,
    environment: Rc<Environment>,
}

fn log_fault(fault: &Fault, status: u16, path: &str) {
    let trace_id = TraceId::current().map_or_else(String::new, |id| id.to_string());
    if status >= 500 {
        error!(error = %fault, status, path, %trace_id, "request failed");
    } else {
        debug!(error = %fault, status, path, %trace_id, "request rejected");
    }
}

impl<S, B> Service<ServiceRequest> for ErrorSinkMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let environment = Rc::clone(&self.environment);
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let fault = res
                .response()
                .error()
                .and_then(|err| err.as_error::<Fault>())
                .cloned();
            let Some(fault) = fault else {
                return Ok(res.map_into_left_body());
            };

            let reply = classify(&fault, &environment);
            log_fault(&fault, reply.status_code, res.request().path());
            Ok(res.into_response(reply.into_response()).map_into_right_body())
        })
    }
}
