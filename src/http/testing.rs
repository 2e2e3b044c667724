//! In-process stand-in for the playlstr server

use std::sync::{Arc, Mutex, mpsc::Sender};

use rouille::{Request, Response, Server};

use crate::{config::ServerUrl, http::client::ApiClient};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Answers every request with the `(status, body)` returned by a closure
pub struct MockServer {
    url: ServerUrl,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Option<Sender<()>>,
}

impl MockServer {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let server = Server::new("127.0.0.1:0", move |request: &Request| {
            let form = rouille::input::post::raw_urlencoded_post_input(request).unwrap_or_default();
            let request = RecordedRequest {
                method: request.method().to_string(),
                path: request.url(),
                form,
            };
            let (status, body) = respond(&request);
            recorded.lock().unwrap().push(request);
            Response::text(body).with_status_code(status)
        })
        .unwrap();

        let url = ServerUrl::parse(&format!("http://{}/", server.server_addr())).unwrap();
        let (_handle, stop) = server.stoppable();

        Self {
            url,
            requests,
            stop: Some(stop),
        }
    }

    pub fn url(&self) -> &ServerUrl {
        &self.url
    }

    pub fn client(&self) -> ApiClient {
        direct_client(self.url.clone()).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Client that ignores proxies configured in the environment
pub fn direct_client(url: ServerUrl) -> Result<ApiClient, reqwest::Error> {
    let http = reqwest::blocking::Client::builder().no_proxy().build()?;
    Ok(ApiClient::with_http_client(url, http))
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
