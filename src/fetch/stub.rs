use super::client::HttpClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Answers requests from a fixed queue of `(status, body)` pairs and records
/// every URL it was asked for. An exhausted queue answers 404.
pub struct StubClient {
    responses: Mutex<VecDeque<(u16, String)>>,
    requested: Mutex<Vec<String>>,
}

impl StubClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.into()))
                    .collect(),
            ),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.requested.lock().unwrap().push(req.url().to_string());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((404, String::new()));

        let response = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(reqwest::Response::from(response))
    }
}
