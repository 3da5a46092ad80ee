use chrono::NaiveDate;

use crate::dates::format_relative;
use crate::domain::ListKind;
use crate::items::{ContactMessage, ListItem, MessageStatus, Subscriber, SubscriberStatus};
use crate::listview::{ListView, LoadState};

pub const PREVIEW_CHARS: usize = 100;

/// Buttons offered on a rendered item, keyed by the item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    View(String),
    Delete(String),
    MarkRead(String),
    Reply(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRow {
    pub index: usize,
    pub id: String,
    pub email: String,
    pub status: SubscriberStatus,
    pub date_label: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCard {
    pub index: usize,
    pub id: String,
    pub sender: String,
    pub email: String,
    pub subject: String,
    pub preview: String,
    pub body: String,
    pub date_label: String,
    pub unread: bool,
    pub actions: Vec<Action>,
}

/// What goes into the list slot. Every render replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFragment<R> {
    Rows(Vec<R>),
    /// The source has items, none of them on this page/filter.
    NoMatches,
    /// The source itself is empty.
    Empty,
    Loading,
    LoadFailed(String),
}

impl<R> ListFragment<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            ListFragment::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Copy shown in place of rows, if any.
    pub fn placeholder(&self, kind: ListKind) -> Option<String> {
        let noun = kind.as_str();
        match self {
            ListFragment::Rows(_) => None,
            ListFragment::NoMatches => Some(format!("No {noun} found")),
            ListFragment::Empty => Some(format!("No {noun} yet")),
            ListFragment::Loading => Some(format!("Loading {noun}...")),
            ListFragment::LoadFailed(_) => Some(format!("Error loading {noun}. Please try again.")),
        }
    }
}

pub trait Render: ListItem {
    type Row;

    /// `index` is the 1-based position in the filtered collection.
    fn render_row(&self, index: usize, today: NaiveDate) -> Self::Row;
}

impl Render for Subscriber {
    type Row = SubscriberRow;

    fn render_row(&self, index: usize, today: NaiveDate) -> SubscriberRow {
        SubscriberRow {
            index,
            id: self.id.clone(),
            email: self.email.clone(),
            status: self.status,
            date_label: format_relative(self.date(), today),
            actions: vec![Action::View(self.id.clone()), Action::Delete(self.id.clone())],
        }
    }
}

impl Render for ContactMessage {
    type Row = MessageCard;

    fn render_row(&self, index: usize, today: NaiveDate) -> MessageCard {
        MessageCard {
            index,
            id: self.id.clone(),
            sender: self.sender_name(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            preview: preview(&self.body),
            body: self.body.clone(),
            date_label: format_relative(self.date(), today),
            unread: self.status == MessageStatus::Unread,
            actions: vec![
                Action::MarkRead(self.id.clone()),
                Action::Reply(self.email.clone()),
                Action::Delete(self.id.clone()),
            ],
        }
    }
}

pub fn preview(body: &str) -> String {
    let head: String = body.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Maps the current page of `view` to its display fragment.
pub fn render<T: Render>(view: &ListView<T>, today: NaiveDate) -> ListFragment<T::Row> {
    match view.load_state() {
        LoadState::Loading => ListFragment::Loading,
        LoadState::Failed(reason) => ListFragment::LoadFailed(reason.clone()),
        LoadState::Loaded => {
            if view.source().is_empty() {
                return ListFragment::Empty;
            }
            let items = view.page_items();
            if items.is_empty() {
                return ListFragment::NoMatches;
            }
            ListFragment::Rows(
                items
                    .into_iter()
                    .map(|(pos, item)| item.render_row(pos + 1, today))
                    .collect(),
            )
        }
    }
}
