#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use kascade::http_client::HttpClient;
use serde_json::Value;

/// Scripted HTTP client: pops one queued response per request and logs every
/// request for assertions.
#[derive(Clone, Default)]
pub struct MockClient {
    queue: Arc<Mutex<VecDeque<http::Response<Vec<u8>>>>>,
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    pub fn push_json(&self, status: u16, body: Value) {
        let response = http::Response::builder()
            .status(status)
            .body(serde_json::to_vec(&body).unwrap())
            .unwrap();
        self.queue.lock().unwrap().push_back(response);
    }

    pub fn take_log(&self) -> Vec<http::Request<Vec<u8>>> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().unwrap().push(request);
            Ok(queue.lock().unwrap().pop_front().expect("no queued response"))
        }
    }
}

/// Parses a logged request body as JSON.
pub fn body_json(request: &http::Request<Vec<u8>>) -> Value {
    serde_json::from_slice(request.body()).unwrap()
}
