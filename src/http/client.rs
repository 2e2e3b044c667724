use std::time::Duration;

use log::info;
use reqwest::{StatusCode, blocking::Client};

use crate::{
    config::ServerUrl,
    domain::track::Track,
    http::error::{LinkError, UploadError, reason_text},
    settings::ClientId,
};

/// Blocking client for the playlstr server.
///
/// Every call is a single attempt. No timeout is set, so an unresponsive
/// server blocks the caller until the connection is dropped.
pub struct ApiClient {
    http: Client,
    server: ServerUrl,
}

impl ApiClient {
    pub fn new(server: ServerUrl) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self::with_http_client(server, http))
    }

    pub fn with_http_client(server: ServerUrl, http: Client) -> Self {
        Self { http, server }
    }

    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Binds `client_id` to the account that issued `code`
    pub fn link(&self, code: &str, client_id: &ClientId) -> Result<(), LinkError> {
        let url = self.server.link_endpoint();
        info!("POST {url}");

        let response = self
            .http
            .post(&url)
            .form(&[("link", code), ("client", client_id.as_str())])
            .send()?;

        let status = response.status();
        info!("Response: POST {url} {status}");
        if status == StatusCode::OK {
            return Ok(());
        }

        Err(LinkError::Rejected {
            status,
            body: response.text()?,
        })
    }

    /// Creates a playlist from `tracks`, returns the id the server assigned to it
    pub fn upload(
        &self,
        playlist_name: &str,
        tracks: &[Track],
        client_id: &ClientId,
    ) -> Result<String, UploadError> {
        let url = self.server.import_endpoint();
        let tracks_json = serde_json::to_string(tracks)?;
        info!("POST {url} playlist '{playlist_name}' with {} tracks", tracks.len());

        let response = self
            .http
            .post(&url)
            .form(&[
                ("playlist_name", playlist_name),
                ("tracks", tracks_json.as_str()),
                ("client_id", client_id.as_str()),
            ])
            .send()?;

        let status = response.status();
        info!("Response: POST {url} {status}");
        let body = response.text()?;

        if status == StatusCode::OK {
            Ok(body.trim().to_string())
        } else {
            Err(UploadError::Rejected {
                status,
                reason: reason_text(status, body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{
        config::ServerUrl,
        domain::track::Track,
        http::{
            error::{LinkError, UploadError},
            testing::{MockServer, direct_client},
        },
        settings::ClientId,
    };

    #[test]
    fn link_posts_code_and_client_id() {
        let server = MockServer::start(|_| (200, String::new()));
        let client_id = ClientId::from("abcdefghij0123456789");

        server.client().link("CODE42", &client_id).unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/client-link/");
        assert_eq!(requests[0].field("link"), Some("CODE42"));
        assert_eq!(requests[0].field("client"), Some("abcdefghij0123456789"));
    }

    #[test]
    fn rejected_link_carries_body() {
        let server = MockServer::start(|_| (403, "bad code".to_string()));

        let err = server
            .client()
            .link("WRONG", &ClientId::generate())
            .unwrap_err();

        match err {
            LinkError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, "bad code");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn upload_sends_form_and_returns_playlist_id() {
        let server = MockServer::start(|_| (200, "abc123\n".to_string()));
        let tracks = vec![
            Track {
                title: Some("Roygbiv".to_string()),
                ..Track::new("/music/roygbiv.flac")
            },
            Track::new("/music/missing.mp3"),
        ];

        let id = server
            .client()
            .upload("mix", &tracks, &ClientId::from("client0000000000000a"))
            .unwrap();

        assert_eq!(id, "abc123");
        let requests = server.requests();
        assert_eq!(requests[0].path, "/client-import/");
        assert_eq!(requests[0].field("playlist_name"), Some("mix"));
        assert_eq!(requests[0].field("client_id"), Some("client0000000000000a"));
        let sent: Vec<Track> =
            serde_json::from_str(requests[0].field("tracks").unwrap()).unwrap();
        assert_eq!(sent, tracks);
    }

    #[test]
    fn rejected_upload_surfaces_reason() {
        let server = MockServer::start(|_| (500, "server error".to_string()));

        let err = server
            .client()
            .upload("mix", &[], &ClientId::generate())
            .unwrap_err();

        match err {
            UploadError::Rejected { status, reason } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(reason, "server error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        // the listener is dropped, nothing accepts on `addr` any more
        let client = direct_client(ServerUrl::parse(&format!("http://{addr}")).unwrap()).unwrap();

        let err = client.link("CODE42", &ClientId::generate());

        assert!(matches!(err, Err(LinkError::Transport(_))));
    }
}
