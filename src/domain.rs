use std::fmt;
use std::io::Error;

use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::forms::NewsletterDraft;
use crate::items::{ContactMessage, Subscriber};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
pub const NOTICE_LIFETIME_SECS: u64 = 5;

pub const HELP_TEXT: &str = "\
 eduview - AntechLearn admin dashboard

 <Tab>        switch between Subscribers, Messages and Newsletter
 <Up>/<Down>  select row
 <Left>/<Right> or [ ]  previous / next page
 <Home>/<End> first / last page
 /            search the current list
 f            cycle status filter
 <Enter>      view subscriber / expand message
 r            mark message as read
 c            copy reply address to clipboard
 d            delete selected item (asks for confirmation)
 y / <Esc>    confirm / cancel a delete or logout
 e            export subscribers as CSV
 R            reload current list
 n / b        edit newsletter topic / body
 a            toggle newsletter recipients (all / active)
 p            preview newsletter
 s            send newsletter
 t            toggle theme
 L            logout (asks for confirmation)
 ?            this help
 <Esc>        close popup / cancel input
 q            quit
";

/// The two list kinds sharing the list-view pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Subscribers,
    Messages,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Subscribers => "subscribers",
            ListKind::Messages => "messages",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ListKind::Subscribers => "Subscribers",
            ListKind::Messages => "Messages",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CMDMode {
    Search,
    LoginUsername,
    LoginPassword,
    NewsletterTopic,
    NewsletterBody,
}

/// Everything the model reacts to: mapped key presses and results coming
/// back from worker threads.
#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    NextTab,
    PrevTab,
    Search,
    CycleFilter,
    Enter,
    Exit,
    Help,
    MarkRead,
    CopyEmail,
    Delete,
    Confirm,
    Export,
    Refresh,
    ToggleTheme,
    Logout,
    EditTopic,
    EditBody,
    ToggleRecipients,
    Preview,
    SendNewsletter,
    Resize(usize, usize),
    RawKey(KeyEvent),
    LoginFinished(Result<String, String>),
    SubscribersLoaded(Result<Vec<Subscriber>, String>),
    MessagesLoaded(Result<Vec<ContactMessage>, String>),
    /// The draft that was sent and the number of recipients reached.
    NewsletterSent(NewsletterDraft, Result<usize, String>),
}

/// A single failed form check, tied to the control that failed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidEmail,
    PasswordMismatch,
    PasswordTooShort(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Please fill in the {field} field."),
            ValidationError::InvalidEmail => write!(f, "Please enter a valid email address."),
            ValidationError::PasswordMismatch => {
                write!(f, "Passwords do not match. Please try again.")
            }
            ValidationError::PasswordTooShort(min) => {
                write!(f, "Password must be at least {min} characters long.")
            }
        }
    }
}

#[derive(Debug)]
pub enum EduError {
    IoError(Error),
    PolarsError(PolarsError),
    HttpError(reqwest::Error),
    YamlError(serde_yaml::Error),
    JsonError(serde_json::Error),
    Validation(ValidationError),
    ConfigError(String),
    LoadingFailed(String),
    Rejected(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for EduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EduError::IoError(e) => write!(f, "io error: {e}"),
            EduError::PolarsError(e) => write!(f, "csv error: {e}"),
            EduError::HttpError(e) => write!(f, "request failed: {e}"),
            EduError::YamlError(e) => write!(f, "invalid yaml: {e}"),
            EduError::JsonError(e) => write!(f, "invalid json: {e}"),
            EduError::Validation(e) => write!(f, "{e}"),
            EduError::ConfigError(msg) => write!(f, "config error: {msg}"),
            EduError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            EduError::Rejected(msg) => write!(f, "{msg}"),
            EduError::FileNotFound => write!(f, "file not found"),
            EduError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for EduError {}

impl From<Error> for EduError {
    fn from(err: Error) -> Self {
        EduError::IoError(err)
    }
}

impl From<PolarsError> for EduError {
    fn from(err: PolarsError) -> Self {
        EduError::PolarsError(err)
    }
}

impl From<reqwest::Error> for EduError {
    fn from(err: reqwest::Error) -> Self {
        EduError::HttpError(err)
    }
}

impl From<serde_yaml::Error> for EduError {
    fn from(err: serde_yaml::Error) -> Self {
        EduError::YamlError(err)
    }
}

impl From<serde_json::Error> for EduError {
    fn from(err: serde_json::Error) -> Self {
        EduError::JsonError(err)
    }
}

impl From<ValidationError> for EduError {
    fn from(err: ValidationError) -> Self {
        EduError::Validation(err)
    }
}
