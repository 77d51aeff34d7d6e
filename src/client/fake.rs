//! In-process transport for unit tests

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync;

/// Answers every request with a closure and remembers what was asked
pub(crate) struct FakeTransport {
    handler: Box<Handler>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.seen.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}
