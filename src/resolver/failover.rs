// FailoverController - retry-with-next-endpoint policy over a registry cursor

use std::future::Future;
use std::sync::Arc;

use super::models::{Endpoint, FailoverContext, ServiceClass};
use super::registry::EndpointRegistry;
use super::traits::Notifier;

/// Pagination boundary; swallowed silently
pub const NEXTPAGE_ERROR: &str = "nextpage error";

/// The item genuinely does not exist; retrying elsewhere will not help
pub const NO_DATA_FOUND: &str = "No Data Found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailoverOutcome<T> {
    /// A retry against a later endpoint succeeded
    Recovered(T),
    /// Pagination boundary reached; nothing to report
    Boundary,
    /// Gave up; the user was notified and the cursor reset
    Exhausted(FailoverContext),
}

impl<T> FailoverOutcome<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Recovered(v) => Some(v),
            _ => None,
        }
    }
}

pub struct FailoverController {
    registry: Arc<EndpointRegistry>,
    class: ServiceClass,
    notifier: Arc<dyn Notifier>,
}

impl FailoverController {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        class: ServiceClass,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            class,
            notifier,
        }
    }

    pub fn service_class(&self) -> ServiceClass {
        self.class
    }

    /// Handle a failed fetch.
    ///
    /// `retry` re-issues the original request against the endpoint it is
    /// given and reports failure as an error message. It is retried on each
    /// remaining endpoint until it succeeds, hits a sentinel, or the list
    /// runs out.
    pub async fn with_failover<T, F, Fut>(
        &self,
        message: impl Into<String>,
        mut retry: F,
    ) -> FailoverOutcome<T>
    where
        F: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let mut ctx = FailoverContext {
            service_class: self.class,
            last_error_message: message.into(),
        };

        loop {
            if ctx.last_error_message == NEXTPAGE_ERROR {
                tracing::debug!(class = %self.class, "pagination boundary");
                return FailoverOutcome::Boundary;
            }

            if ctx.last_error_message != NO_DATA_FOUND && self.registry.advance(self.class) {
                let endpoint = match self.registry.current(self.class) {
                    Ok(endpoint) => endpoint,
                    Err(e) => {
                        ctx.last_error_message = e.to_string();
                        break;
                    }
                };

                tracing::warn!(
                    class = %self.class,
                    error = %ctx.last_error_message,
                    next = %endpoint.url,
                    "request failed, retrying on next endpoint"
                );

                match retry(endpoint).await {
                    Ok(value) => return FailoverOutcome::Recovered(value),
                    Err(message) => ctx.last_error_message = message,
                }
                continue;
            }

            break;
        }

        tracing::warn!(class = %self.class, error = %ctx.last_error_message, "giving up");
        self.notifier.notify(&ctx.last_error_message);
        self.registry.reset(self.class);
        FailoverOutcome::Exhausted(ctx)
    }

    /// Run `action` against the current endpoint, failing over on error
    pub async fn run<T, F, Fut>(&self, mut action: F) -> FailoverOutcome<T>
    where
        F: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let first = match self.registry.current(self.class) {
            Ok(endpoint) => action(endpoint).await,
            Err(e) => Err(e.to_string()),
        };

        match first {
            Ok(value) => FailoverOutcome::Recovered(value),
            Err(message) => self.with_failover(message, action).await,
        }
    }
}
