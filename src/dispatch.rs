use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::client::{Authenticator, SiteClient};
use crate::domain::{EduError, Message};
use crate::export::import_subscribers_csv;
use crate::forms::NewsletterDraft;
use crate::items::{ContactMessage, Subscriber, mock_messages, mock_subscribers};

/// Supplies the two list collections.
pub trait ListSource: Send + Sync {
    fn subscribers(&self) -> Result<Vec<Subscriber>, EduError>;
    fn messages(&self) -> Result<Vec<ContactMessage>, EduError>;
}

pub struct MockSource;

impl ListSource for MockSource {
    fn subscribers(&self) -> Result<Vec<Subscriber>, EduError> {
        Ok(mock_subscribers())
    }

    fn messages(&self) -> Result<Vec<ContactMessage>, EduError> {
        Ok(mock_messages())
    }
}

/// Subscribers from a CSV file, demo messages.
pub struct CsvSource {
    pub path: PathBuf,
}

impl ListSource for CsvSource {
    fn subscribers(&self) -> Result<Vec<Subscriber>, EduError> {
        import_subscribers_csv(&self.path)
    }

    fn messages(&self) -> Result<Vec<ContactMessage>, EduError> {
        Ok(mock_messages())
    }
}

impl ListSource for SiteClient {
    fn subscribers(&self) -> Result<Vec<Subscriber>, EduError> {
        self.fetch_subscribers()
    }

    fn messages(&self) -> Result<Vec<ContactMessage>, EduError> {
        self.fetch_messages()
    }
}

/// Runs slow work on short-lived threads. Each job reports back with a
/// single `Message` on the shared channel.
///
/// Jobs are never deduplicated: two sends in a row are two requests.
pub struct Dispatcher {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    in_flight: Arc<AtomicUsize>,
    source: Arc<dyn ListSource>,
    client: Arc<SiteClient>,
    auth: Arc<dyn Authenticator>,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn ListSource>,
        client: Arc<SiteClient>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Dispatcher {
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            source,
            client,
            auth,
        }
    }

    /// Jobs started but not yet reported back.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn spawn<F>(&self, name: &'static str, job: F)
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        debug!("Starting job {name} ({} in flight)", self.in_flight());
        let spawned = thread::Builder::new()
            .name(format!("eduview-{name}"))
            .spawn(move || {
                let message = job();
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if tx.send(message).is_err() {
                    trace!("Job {name} finished after the receiver was dropped");
                }
            });
        if let Err(e) = spawned {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            error!("Could not start job {name}: {e}");
        }
    }

    pub fn login(&self, username: String, password: String) {
        let auth = Arc::clone(&self.auth);
        self.spawn("login", move || {
            let result = auth
                .authenticate(&username, &password)
                .map(|session| session.username)
                .map_err(|e| e.to_string());
            Message::LoginFinished(result)
        });
    }

    pub fn load_subscribers(&self) {
        let source = Arc::clone(&self.source);
        self.spawn("subscribers", move || {
            Message::SubscribersLoaded(source.subscribers().map_err(|e| e.to_string()))
        });
    }

    pub fn load_messages(&self) {
        let source = Arc::clone(&self.source);
        self.spawn("messages", move || {
            Message::MessagesLoaded(source.messages().map_err(|e| e.to_string()))
        });
    }

    pub fn send_newsletter(&self, draft: NewsletterDraft) {
        let client = Arc::clone(&self.client);
        self.spawn("newsletter", move || {
            let result = client.send_newsletter(&draft).map_err(|e| e.to_string());
            Message::NewsletterSent(draft, result)
        });
    }

    /// Next finished job, without blocking.
    pub fn try_next(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Next finished job, waiting up to `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Message> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
