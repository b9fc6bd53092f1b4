// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Awaitable batched query execution.
//!
//! The host batches queued operations and runs them with a callback pair.
//! [`ClientContext::execute_query`] turns that into a future and routes
//! failures through the registered [`UnhandledErrorHandler`], which may
//! recover them into a success.

use crate::error::QueryError;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

/// Arguments of a successful batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSucceeded {
    /// Raw response payload, if the host exposes one
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Arguments of a failed batch, as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestFailed {
    /// Human readable message
    pub message: String,
    /// Server-side stack trace
    pub stack_trace: Option<String>,
    /// Numeric error code
    pub error_code: Option<i64>,
    /// Extra error details
    pub error_details: serde_json::Value,
    /// Server exception type name
    pub error_type_name: Option<String>,
    /// Server error value
    pub error_value: Option<String>,
    /// Request correlation id
    pub correlation_id: Option<String>,
}

impl RequestFailed {
    /// Failure with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Success callback handed to the host
pub type SuccessCallback = Box<dyn FnOnce(RequestSucceeded) + Send + 'static>;

/// Failure callback handed to the host
pub type FailureCallback = Box<dyn FnOnce(RequestFailed) + Send + 'static>;

/// Host runtime context able to execute the queued operations.
pub trait ClientRuntime: Send + Sync + 'static {
    /// Send the batch; call exactly one of the callbacks when done
    fn execute_query_async(&self, on_success: SuccessCallback, on_failure: FailureCallback);
}

impl<T: ClientRuntime + ?Sized> ClientRuntime for Arc<T> {
    fn execute_query_async(&self, on_success: SuccessCallback, on_failure: FailureCallback) {
        (**self).execute_query_async(on_success, on_failure)
    }
}

/// Successful outcome of [`ClientContext::execute_query`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// The host reported success
    Succeeded(RequestSucceeded),
    /// The host failed and the unhandled-error handler recovered with a value
    Recovered(serde_json::Value),
}

impl QueryResponse {
    /// Whether the batch succeeded without recovery
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResponse::Succeeded(_))
    }
}

/// Interceptor for query failures.
///
/// `Ok(value)` recovers the failure, `Err(failure)` rejects with it.
pub type UnhandledErrorHandler =
    Arc<dyn Fn(RequestFailed) -> BoxFuture<'static, Result<serde_json::Value, RequestFailed>> + Send + Sync>;

/// Slot holding the current unhandled-error handler.
#[derive(Default)]
pub struct ErrorHandlers {
    handler: RwLock<Option<UnhandledErrorHandler>>,
}

impl ErrorHandlers {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, replacing any previous one
    pub fn register<F, Fut>(&self, handler: F)
    where
        F: Fn(RequestFailed) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, RequestFailed>> + Send + 'static,
    {
        let handler: UnhandledErrorHandler = Arc::new(move |failed: RequestFailed| handler(failed).boxed());
        if self.handler.write().replace(handler).is_some() {
            debug!("replaced unhandled error handler");
        }
    }

    /// Whether a handler is installed
    pub fn is_registered(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Route a failure through the handler, if any
    pub async fn handle(&self, failed: RequestFailed) -> Result<QueryResponse, QueryError> {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => handler(failed)
                .await
                .map(QueryResponse::Recovered)
                .map_err(QueryError::Failed),
            None => Err(QueryError::Failed(failed)),
        }
    }
}

impl std::fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlers")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// A host client context with an awaitable `execute_query`.
pub struct ClientContext<R: ClientRuntime> {
    runtime: Arc<R>,
    handlers: Arc<ErrorHandlers>,
}

impl<R: ClientRuntime> Clone for ClientContext<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<R: ClientRuntime> ClientContext<R> {
    pub(crate) fn new(runtime: Arc<R>, handlers: Arc<ErrorHandlers>) -> Self {
        Self { runtime, handlers }
    }

    /// The wrapped host context
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    /// Execute the queued operations.
    ///
    /// A host failure goes to the unhandled-error handler; without one it
    /// is returned as [`QueryError::Failed`].
    #[instrument(skip(self))]
    pub async fn execute_query(&self) -> Result<QueryResponse, QueryError> {
        let (tx, rx) = oneshot::channel();
        let on_success = Arc::new(Mutex::new(Some(tx)));
        let on_failure = Arc::clone(&on_success);

        self.runtime.execute_query_async(
            Box::new(move |succeeded: RequestSucceeded| {
                if let Some(tx) = on_success.lock().take() {
                    let _ = tx.send(Ok(succeeded));
                }
            }),
            Box::new(move |failed: RequestFailed| {
                if let Some(tx) = on_failure.lock().take() {
                    let _ = tx.send(Err(failed));
                }
            }),
        );

        match rx.await {
            Ok(Ok(succeeded)) => Ok(QueryResponse::Succeeded(succeeded)),
            Ok(Err(failed)) => {
                debug!(message = %failed.message, "query failed, consulting handler");
                self.handlers.handle(failed).await
            }
            Err(_) => {
                warn!("host dropped the query callbacks");
                Err(QueryError::Abandoned)
            }
        }
    }
}

impl<R: ClientRuntime> std::fmt::Debug for ClientContext<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("handlers", &self.handlers)
            .finish()
    }
}
