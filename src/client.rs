use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::EduError;
use crate::forms::{ContactRequest, NewsletterDraft, SubscribeRequest};
use crate::items::{ContactMessage, Subscriber, fill_missing_ids};

pub const SUBSCRIBE_SUCCESS: &str = "Thank you for subscribing! You'll receive updates at";
pub const SUBSCRIBE_REJECTED: &str = "Already subscribed or an error occurred.";
pub const CONTACT_SUCCESS: &str =
    "Thank you! Your message has been sent successfully. We'll get back to you soon.";
pub const CONTACT_REJECTED: &str = "Error sending message. Please try again.";
pub const NEWSLETTER_REJECTED: &str = "Error sending newsletter. Please try again.";

/// How public-site submissions treat a backend that cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Report network failures to the visitor as success.
    pub optimistic_offline: bool,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        SubmitPolicy {
            optimistic_offline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// Backend unreachable, accepted under the optimistic offline policy.
    AcceptedOffline,
    Rejected(String),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SubmitOutcome::Rejected(_))
    }
}

pub struct SiteClient {
    http: Client,
    base: String,
    policy: SubmitPolicy,
}

#[derive(Debug, Deserialize)]
struct NewsletterReceipt {
    #[serde(default)]
    sent_count: usize,
}

#[derive(Serialize)]
struct NewsletterRequest<'a> {
    topic: &'a str,
    body: &'a str,
    recipients: &'a str,
}

impl SiteClient {
    pub fn new(base: &str, timeout: Duration, policy: SubmitPolicy) -> Result<Self, EduError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(SiteClient {
            http,
            base: base.trim_end_matches('/').to_string(),
            policy,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub fn subscribe(&self, request: &SubscribeRequest) -> Result<SubmitOutcome, EduError> {
        self.submit("subscribers", request, SUBSCRIBE_REJECTED)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub fn send_contact(&self, request: &ContactRequest) -> Result<SubmitOutcome, EduError> {
        self.submit("messages", request, CONTACT_REJECTED)
    }

    fn submit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        rejected: &str,
    ) -> Result<SubmitOutcome, EduError> {
        let url = self.url(path);
        match self.http.post(&url).json(body).send() {
            Ok(resp) if resp.status().is_success() => {
                info!("POST {url} accepted ({})", resp.status());
                Ok(SubmitOutcome::Accepted)
            }
            Ok(resp) => {
                let status = resp.status();
                let reason = error_detail(resp).unwrap_or_else(|| rejected.to_string());
                warn!("POST {url} rejected ({status}): {reason}");
                Ok(SubmitOutcome::Rejected(reason))
            }
            Err(e) if self.policy.optimistic_offline => {
                warn!("POST {url} failed, accepting offline: {e}");
                Ok(SubmitOutcome::AcceptedOffline)
            }
            Err(e) => Err(EduError::HttpError(e)),
        }
    }

    /// Admin flow: every failure is reported, the offline policy does not apply.
    #[instrument(skip(self, draft), fields(topic = %draft.topic))]
    pub fn send_newsletter(&self, draft: &NewsletterDraft) -> Result<usize, EduError> {
        let url = self.url("newsletter");
        let request = NewsletterRequest {
            topic: &draft.topic,
            body: &draft.body,
            recipients: draft.recipients.as_str(),
        };
        let resp = self.http.post(&url).json(&request).send()?;
        if !resp.status().is_success() {
            let reason = error_detail(resp).unwrap_or_else(|| NEWSLETTER_REJECTED.to_string());
            return Err(EduError::Rejected(reason));
        }
        let receipt: NewsletterReceipt = resp.json()?;
        info!("Newsletter sent to {} subscribers", receipt.sent_count);
        Ok(receipt.sent_count)
    }

    #[instrument(skip(self))]
    pub fn fetch_subscribers(&self) -> Result<Vec<Subscriber>, EduError> {
        let mut subs: Vec<Subscriber> = self
            .http
            .get(self.url("subscribers"))
            .send()?
            .error_for_status()?
            .json()?;
        fill_missing_ids(&mut subs, |s| &mut s.id);
        debug!("Fetched {} subscribers", subs.len());
        Ok(subs)
    }

    #[instrument(skip(self))]
    pub fn fetch_messages(&self) -> Result<Vec<ContactMessage>, EduError> {
        let mut msgs: Vec<ContactMessage> = self
            .http
            .get(self.url("messages"))
            .send()?
            .error_for_status()?
            .json()?;
        fill_missing_ids(&mut msgs, |m| &mut m.id);
        debug!("Fetched {} messages", msgs.len());
        Ok(msgs)
    }
}

fn error_detail(resp: Response) -> Option<String> {
    let body: Value = resp.json().ok()?;
    body.get("detail")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    Unavailable(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => {
                write!(f, "Invalid username or password. Please try again.")
            }
            AuthError::Unavailable(reason) => write!(f, "Login service unavailable: {reason}"),
        }
    }
}

/// Checks admin credentials. Implementations live outside the delivered
/// client: the dashboard never carries a credential table.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<AdminSession, AuthError>;
}

/// Asks the backend at `POST {base}/admin/login`.
pub struct HttpAuthenticator {
    http: Client,
    url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

impl HttpAuthenticator {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, EduError> {
        Ok(HttpAuthenticator {
            http: Client::builder().timeout(timeout).build()?,
            url: format!("{}/admin/login", base.trim_end_matches('/')),
        })
    }
}

impl Authenticator for HttpAuthenticator {
    fn authenticate(&self, username: &str, password: &str) -> Result<AdminSession, AuthError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&LoginRequest { username, password })
            .send()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            info!("Admin {username} logged in");
            Ok(AdminSession {
                username: username.to_string(),
            })
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            warn!("Rejected admin login for {username}");
            Err(AuthError::InvalidCredentials)
        } else {
            Err(AuthError::Unavailable(format!("unexpected status {status}")))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::forms::ContactForm;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers exactly one request with `status` and `body`, handing the raw
    /// request back through the join handle.
    pub(crate) fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (base, handle)
    }

    pub(crate) fn dead_base() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/api")
    }

    fn client(base: &str, optimistic_offline: bool) -> SiteClient {
        SiteClient::new(base, Duration::from_secs(5), SubmitPolicy { optimistic_offline }).unwrap()
    }

    #[test]
    fn subscribe_posts_email_and_status() {
        let (base, server) = serve_once("201 Created", r#"{"id":"9"}"#);
        let outcome = client(&base, true)
            .subscribe(&SubscribeRequest::new("new@example.com").unwrap())
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /api/subscribers "));
        assert!(raw.contains(r#"{"email":"new@example.com","status":"active"}"#));
    }

    #[test]
    fn rejection_surfaces_backend_detail() {
        let (base, server) = serve_once("400 Bad Request", r#"{"detail":"Email already subscribed"}"#);
        let outcome = client(&base, true)
            .subscribe(&SubscribeRequest::new("dup@example.com").unwrap())
            .unwrap();
        server.join().unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected("Email already subscribed".into()));
    }

    #[test]
    fn rejection_without_detail_uses_default_copy() {
        let (base, server) = serve_once("500 Internal Server Error", "oops");
        let request = ContactForm::default()
            .first_name("A".into())
            .last_name("B".into())
            .email("a@b.io".into())
            .subject("S".into())
            .message("M".into())
            .validate()
            .unwrap();
        let outcome = client(&base, true).send_contact(&request).unwrap();
        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /api/messages "));
        assert!(raw.contains(r#""status":"unread""#));
        assert_eq!(outcome, SubmitOutcome::Rejected(CONTACT_REJECTED.into()));
    }

    #[test]
    fn offline_policy_decides_network_failures() {
        let base = dead_base();
        let request = SubscribeRequest::new("x@example.com").unwrap();
        assert_eq!(
            client(&base, true).subscribe(&request).unwrap(),
            SubmitOutcome::AcceptedOffline
        );
        assert!(matches!(
            client(&base, false).subscribe(&request),
            Err(EduError::HttpError(_))
        ));
    }

    #[test]
    fn newsletter_failures_are_errors_even_when_optimistic() {
        let draft = NewsletterDraft::default()
            .topic("T".into())
            .body("B".into());
        assert!(client(&dead_base(), true).send_newsletter(&draft).is_err());

        let (base, server) = serve_once("200 OK", r#"{"id":"n1","sent_count":4}"#);
        assert_eq!(client(&base, true).send_newsletter(&draft).unwrap(), 4);
        assert!(server.join().unwrap().contains(r#""recipients":"all""#));
    }

    #[test]
    fn fetch_subscribers_parses_backend_list() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":"a","email":"a@x.io","status":"active","subscribed_date":"2026-02-01T08:00:00"},{"email":"b@x.io","status":"inactive","subscribed_date":"2026-02-02"}]"#,
        );
        let subs = client(&base, true).fetch_subscribers().unwrap();
        server.join().unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].id, "2");
    }

    #[test]
    fn http_authenticator_maps_statuses() {
        let (base, server) = serve_once("401 Unauthorized", "{}");
        let auth = HttpAuthenticator::new(&base, Duration::from_secs(5)).unwrap();
        assert_eq!(auth.authenticate("admin", "wrong"), Err(AuthError::InvalidCredentials));
        assert!(server.join().unwrap().contains(r#""username":"admin""#));

        let (base, server) = serve_once("200 OK", "{}");
        let auth = HttpAuthenticator::new(&base, Duration::from_secs(5)).unwrap();
        assert_eq!(auth.authenticate("admin", "right").unwrap().username, "admin");
        server.join().unwrap();
    }
}
