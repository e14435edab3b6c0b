use crate::error::SubmitError;
use crate::submission::payload::SubmissionPayload;
use std::fmt;
use std::sync::Arc;

pub const ODATA_VERBOSE: &str = "application/json;odata=verbose";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub status: u16,
    pub body: String,
}

/// One outbound write of a form submission.
pub trait ListWriter: Send + Sync {
    fn create_item(&self, payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError>;

    /// Short description for logs; never includes secrets.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTarget {
    pub site_url: String,
    pub list_name: String,
}

impl ListTarget {
    pub fn items_url(&self) -> String {
        format!(
            "{}/_api/web/lists/getbytitle('{}')/items",
            self.site_url.trim_end_matches('/'),
            self.list_name.replace('\'', "''")
        )
    }
}

/// Static credentials passed through to the list endpoint as headers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl Credentials {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept", ODATA_VERBOSE.to_string()),
            ("Content-Type", ODATA_VERBOSE.to_string()),
            ("Authorization", format!("Bearer {}", self.access_token)),
        ];
        if let Some(client_id) = &self.client_id {
            headers.push(("client_id", client_id.clone()));
        }
        if let Some(client_secret) = &self.client_secret {
            headers.push(("client_secret", client_secret.clone()));
        }
        if let Some(redirect_uri) = &self.redirect_uri {
            headers.push(("redirect_uri", redirect_uri.clone()));
        }
        headers
    }
}

/// Writes list items straight to the SharePoint REST API.
pub struct SharePointWriter {
    agent: ureq::Agent,
    url: String,
    credentials: Credentials,
}

impl SharePointWriter {
    pub fn new(target: &ListTarget, credentials: Credentials) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            url: target.items_url(),
            credentials,
        }
    }
}

impl ListWriter for SharePointWriter {
    fn create_item(&self, payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError> {
        let body = payload.to_json_string()?;
        let mut request = self.agent.post(&self.url);
        for (name, value) in self.credentials.headers() {
            request = request.set(name, &value);
        }
        let response = request.send_string(&body)?;
        let status = response.status();
        let body = response.into_string()?;
        Ok(WriteReceipt { status, body })
    }

    fn describe(&self) -> String {
        format!("sharepoint {}", self.url)
    }
}

/// Hands the payload to a server-side proxy that owns token acquisition.
/// No credentials leave the client.
pub struct ProxyWriter {
    agent: ureq::Agent,
    url: String,
}

impl ProxyWriter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            url: url.into(),
        }
    }
}

impl ListWriter for ProxyWriter {
    fn create_item(&self, payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError> {
        let body = payload.to_json_string()?;
        let response = self
            .agent
            .post(&self.url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&body)?;
        let status = response.status();
        let body = response.into_string()?;
        Ok(WriteReceipt { status, body })
    }

    fn describe(&self) -> String {
        format!("proxy {}", self.url)
    }
}

/// Answers every write with the payload it was given. Nothing leaves the
/// process.
pub struct DryRunWriter;

impl ListWriter for DryRunWriter {
    fn create_item(&self, payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError> {
        Ok(WriteReceipt {
            status: 200,
            body: payload.to_json_pretty()?,
        })
    }

    fn describe(&self) -> String {
        "dry run".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    SharePoint {
        target: ListTarget,
        credentials: Credentials,
    },
    Proxy {
        url: String,
    },
    DryRun,
}

pub fn writer_for(config: &TransportConfig) -> Arc<dyn ListWriter> {
    match config {
        TransportConfig::SharePoint {
            target,
            credentials,
        } => Arc::new(SharePointWriter::new(target, credentials.clone())),
        TransportConfig::Proxy { url } => Arc::new(ProxyWriter::new(url.clone())),
        TransportConfig::DryRun => Arc::new(DryRunWriter),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Credentials, DryRunWriter, ListTarget, ListWriter, ProxyWriter, SharePointWriter,
    };
    use crate::core::value::FormValues;
    use crate::error::SubmitError;
    use crate::submission::payload::{PayloadOptions, SubmissionPayload};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    struct Captured {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    /// Accepts one connection, records the request and answers with `status`.
    fn one_shot_server(status: u16, reason: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_string(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut buf = vec![0u8; length];
            reader.read_exact(&mut buf).expect("body");

            let mut stream = stream;
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("respond");

            Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(buf).expect("utf8 body"),
            }
        });
        (format!("http://{addr}"), handle)
    }

    fn payload() -> SubmissionPayload {
        SubmissionPayload::from_values(&FormValues::new(), &PayloadOptions::default())
    }

    fn credentials() -> Credentials {
        Credentials {
            access_token: "tok".into(),
            client_id: Some("cid".into()),
            client_secret: Some("shh".into()),
            redirect_uri: Some("https://app.example/cb".into()),
        }
    }

    #[test]
    fn items_url_quotes_list_name() {
        let target = ListTarget {
            site_url: "https://tenant.sharepoint.com/sites/clinic/".into(),
            list_name: "Patient's Consents".into(),
        };
        assert_eq!(
            target.items_url(),
            "https://tenant.sharepoint.com/sites/clinic/_api/web/lists/getbytitle('Patient''s Consents')/items"
        );
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("tok"));
        assert!(!rendered.contains("shh"));
        assert!(rendered.contains("cid"));
    }

    #[test]
    fn sharepoint_writer_posts_verbose_json_with_credentials() {
        let (base, server) = one_shot_server(201, "Created", "{\"d\":{\"Id\":7}}");
        let target = ListTarget {
            site_url: base,
            list_name: "Consents".into(),
        };
        let writer = SharePointWriter::new(&target, credentials());

        let receipt = writer.create_item(&payload()).expect("write succeeds");
        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.body, "{\"d\":{\"Id\":7}}");

        let captured = server.join().expect("server thread");
        assert_eq!(
            captured.request_line,
            "POST /_api/web/lists/getbytitle('Consents')/items HTTP/1.1"
        );
        assert_eq!(captured.header("accept"), Some("application/json;odata=verbose"));
        assert_eq!(
            captured.header("content-type"),
            Some("application/json;odata=verbose")
        );
        assert_eq!(captured.header("authorization"), Some("Bearer tok"));
        assert_eq!(captured.header("client_id"), Some("cid"));
        assert_eq!(captured.header("client_secret"), Some("shh"));
        assert_eq!(captured.header("redirect_uri"), Some("https://app.example/cb"));

        let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
        assert!(body.get("Title").is_some());
    }

    #[test]
    fn rejected_token_surfaces_as_status_error() {
        let (base, server) = one_shot_server(401, "Unauthorized", "{\"error\":\"expired\"}");
        let target = ListTarget {
            site_url: base,
            list_name: "Consents".into(),
        };
        let writer = SharePointWriter::new(&target, credentials());

        let err = writer.create_item(&payload()).expect_err("401 is a failure");
        assert!(err.is_auth_rejection());
        let SubmitError::Status { status, body } = err else {
            panic!("expected status error");
        };
        assert_eq!(status, 401);
        assert!(body.contains("expired"));
        server.join().expect("server thread");
    }

    #[test]
    fn proxy_writer_sends_no_credentials() {
        let (base, server) = one_shot_server(200, "OK", "{}");
        let writer = ProxyWriter::new(format!("{base}/consents"));

        writer.create_item(&payload()).expect("write succeeds");

        let captured = server.join().expect("server thread");
        assert_eq!(captured.request_line, "POST /consents HTTP/1.1");
        assert_eq!(captured.header("authorization"), None);
        assert_eq!(captured.header("client_secret"), None);
        assert_eq!(captured.header("content-type"), Some("application/json"));
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let writer = ProxyWriter::new(format!("http://{addr}/consents"));
        let err = writer.create_item(&payload()).expect_err("nothing listens");
        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[test]
    fn dry_run_echoes_payload() {
        let receipt = DryRunWriter.create_item(&payload()).expect("always ok");
        assert_eq!(receipt.status, 200);
        assert!(receipt.body.contains("\"Title\""));
    }
}
