use arboard::Clipboard;
use chrono::{Datelike, Local, NaiveDate};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::client::AdminSession;
use crate::config::Settings;
use crate::dates::format_relative;
use crate::dispatch::Dispatcher;
use crate::domain::{
    CMDMode, EduError, HELP_TEXT, ListKind, Message, NOTICE_LIFETIME_SECS, ValidationError,
};
use crate::export::write_export;
use crate::forms::NewsletterDraft;
use crate::inputter::{InputResult, Inputter};
use crate::items::{ContactMessage, MessageStatus, Subscriber, SubscriberStatus};
use crate::listview::ListView;
use crate::pager::{Pager, build_pager};
use crate::render::{ListFragment, MessageCard, SubscriberRow, render};
use crate::store::{ClientStore, Theme};

/// Below this width the stats bar is hidden.
pub const COMPACT_WIDTH: usize = 80;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    LOGIN,
    LIST,
    CMDINPUT,
    CONFIRM,
    POPUP,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Subscribers,
    Messages,
    Newsletter,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Subscribers, Tab::Messages, Tab::Newsletter];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Subscribers => "Subscribers",
            Tab::Messages => "Messages",
            Tab::Newsletter => "Newsletter",
        }
    }

    fn kind(&self) -> Option<ListKind> {
        match self {
            Tab::Subscribers => Some(ListKind::Subscribers),
            Tab::Messages => Some(ListKind::Messages),
            Tab::Newsletter => None,
        }
    }

    fn next(self) -> Tab {
        match self {
            Tab::Subscribers => Tab::Messages,
            Tab::Messages => Tab::Newsletter,
            Tab::Newsletter => Tab::Subscribers,
        }
    }

    fn prev(self) -> Tab {
        match self {
            Tab::Subscribers => Tab::Newsletter,
            Tab::Messages => Tab::Subscribers,
            Tab::Newsletter => Tab::Messages,
        }
    }
}

/// Destructive actions wait here until confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete(ListKind, String),
    Logout,
}

impl PendingAction {
    fn question(&self) -> &'static str {
        match self {
            PendingAction::Delete(ListKind::Subscribers, _) => {
                "Are you sure you want to remove this subscriber?"
            }
            PendingAction::Delete(ListKind::Messages, _) => {
                "Are you sure you want to delete this message?"
            }
            PendingAction::Logout => "Are you sure you want to logout?",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_subscribers: usize,
    pub active_subscribers: usize,
    pub total_messages: usize,
    pub unread_messages: usize,
    pub total_sent: usize,
}

impl Stats {
    fn collect(
        subscribers: &ListView<Subscriber>,
        messages: &ListView<ContactMessage>,
        total_sent: usize,
    ) -> Self {
        Stats {
            total_subscribers: subscribers.source().len(),
            active_subscribers: subscribers
                .source()
                .iter()
                .filter(|s| s.status == SubscriberStatus::Active)
                .count(),
            total_messages: messages.source().len(),
            unread_messages: messages
                .source()
                .iter()
                .filter(|m| m.status == MessageStatus::Unread)
                .count(),
            total_sent,
        }
    }
}

/// Everything the UI needs to draw one frame.
pub struct UIData {
    pub tab: Tab,
    pub theme: Theme,
    pub admin: Option<String>,
    pub show_login: bool,
    pub login_username: String,
    pub login_error: Option<String>,
    pub stats: Stats,
    pub subscriber_rows: ListFragment<SubscriberRow>,
    pub message_cards: ListFragment<MessageCard>,
    pub list_title: String,
    pub pager: Pager,
    pub selected_row: usize,
    pub expanded: Option<String>,
    pub draft: NewsletterDraft,
    pub show_popup: bool,
    pub popup_title: String,
    pub popup_message: String,
    pub confirm_message: Option<String>,
    pub active_cmdinput: bool,
    pub cmd_mode: Option<CMDMode>,
    pub cmdinput: InputResult,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub in_flight: usize,
    pub compact: bool,
}

pub struct Model {
    config: Settings,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    tab: Tab,
    subscribers: ListView<Subscriber>,
    messages: ListView<ContactMessage>,
    curser_row: usize,
    expanded: Option<String>,
    store: ClientStore,
    dispatcher: Dispatcher,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    login_username: String,
    login_error: Option<String>,
    draft: NewsletterDraft,
    total_sent: usize,
    pending: Option<PendingAction>,
    popup_title: String,
    popup_message: String,
    status_message: String,
    status_is_error: bool,
    last_status_message_update: Instant,
    ui_width: usize,
    pinned_today: Option<NaiveDate>,
    uidata: UIData,
}

impl Model {
    pub fn init(config: &Settings, store: ClientStore, dispatcher: Dispatcher) -> Self {
        let clipboard = match Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Clipboard unavailable: {e}");
                None
            }
        };
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::LOGIN,
            previous_modus: Modus::LOGIN,
            tab: Tab::Subscribers,
            subscribers: ListView::new(ListKind::Subscribers, config.page_size),
            messages: ListView::new(ListKind::Messages, config.page_size),
            curser_row: 0,
            expanded: None,
            store,
            dispatcher,
            clipboard,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            login_username: String::new(),
            login_error: None,
            draft: NewsletterDraft::default(),
            total_sent: 0,
            pending: None,
            popup_title: String::new(),
            popup_message: String::new(),
            status_message: String::new(),
            status_is_error: false,
            last_status_message_update: Instant::now(),
            ui_width: COMPACT_WIDTH,
            pinned_today: None,
            uidata: UIData::empty(),
        };

        if model.store.is_authenticated() {
            info!("Admin session found, opening dashboard");
            model.open_dashboard();
        } else {
            model.enter_cmd_mode(CMDMode::LoginUsername);
        }
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn subscribers(&self) -> &ListView<Subscriber> {
        &self.subscribers
    }

    pub fn messages(&self) -> &ListView<ContactMessage> {
        &self.messages
    }

    pub fn draft(&self) -> &NewsletterDraft {
        &self.draft
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(&self.subscribers, &self.messages, self.total_sent)
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Freezes the calendar date used for labels and export names.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.pinned_today = Some(today);
        self.update_uidata();
    }

    /// Evaluated on every use so labels roll over at midnight.
    fn today(&self) -> NaiveDate {
        self.pinned_today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Applies every result the workers have reported so far.
    pub fn poll_workers(&mut self) -> Result<(), EduError> {
        while let Some(message) = self.dispatcher.try_next() {
            self.update(Some(message))?;
        }
        Ok(())
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), EduError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match msg {
                // Worker results are applied in every modus.
                Message::LoginFinished(result) => self.login_finished(result),
                Message::SubscribersLoaded(result) => self.subscribers_loaded(result),
                Message::MessagesLoaded(result) => self.messages_loaded(result),
                Message::NewsletterSent(draft, result) => self.newsletter_sent(draft, result),
                Message::Resize(width, _) => self.ui_width = width,
                msg => self.dispatch(msg),
            }
        }
        self.update_uidata();
        Ok(())
    }

    fn dispatch(&mut self, msg: Message) {
        match self.modus {
            Modus::LOGIN => match msg {
                Message::Quit => self.quit(),
                Message::Enter => self.enter_cmd_mode(CMDMode::LoginUsername),
                Message::Help => self.show_popup("Help", HELP_TEXT.to_string()),
                Message::ToggleTheme => self.toggle_theme(),
                _ => (),
            },
            Modus::LIST => match msg {
                Message::Quit => self.quit(),
                Message::NextTab => self.switch_tab(self.tab.next()),
                Message::PrevTab => self.switch_tab(self.tab.prev()),
                Message::Help => self.show_popup("Help", HELP_TEXT.to_string()),
                Message::ToggleTheme => self.toggle_theme(),
                Message::Logout => self.ask(PendingAction::Logout),
                Message::Refresh => self.refresh(),
                msg => match self.tab {
                    Tab::Subscribers | Tab::Messages => self.list_message(msg),
                    Tab::Newsletter => self.newsletter_message(msg),
                },
            },
            Modus::CONFIRM => match msg {
                Message::Confirm | Message::Enter => self.confirm(),
                Message::Exit | Message::Quit => self.cancel_pending(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.close_popup(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.last_input = self.input.read(key);
                    if self.last_input.finished {
                        self.handle_cmd_input();
                    }
                }
            }
        }
    }

    fn list_message(&mut self, msg: Message) {
        match msg {
            Message::MoveUp => self.curser_row = self.curser_row.saturating_sub(1),
            Message::MoveDown => {
                if self.curser_row + 1 < self.page_len() {
                    self.curser_row += 1;
                }
            }
            Message::NextPage => self.change_page(|kind, m| match kind {
                ListKind::Subscribers => m.subscribers.next_page(),
                ListKind::Messages => m.messages.next_page(),
            }),
            Message::PrevPage => self.change_page(|kind, m| match kind {
                ListKind::Subscribers => m.subscribers.prev_page(),
                ListKind::Messages => m.messages.prev_page(),
            }),
            Message::FirstPage => self.change_page(|kind, m| match kind {
                ListKind::Subscribers => m.subscribers.goto_page(1),
                ListKind::Messages => m.messages.goto_page(1),
            }),
            Message::LastPage => self.change_page(|kind, m| match kind {
                ListKind::Subscribers => m.subscribers.last_page(),
                ListKind::Messages => m.messages.last_page(),
            }),
            Message::Search => self.enter_cmd_mode(CMDMode::Search),
            Message::CycleFilter => self.cycle_filter(),
            Message::Enter => self.enter(),
            Message::Exit => self.exit(),
            Message::MarkRead => self.mark_read(),
            Message::CopyEmail => self.copy_email(),
            Message::Delete => {
                if let (Some(kind), Some(id)) = (self.tab.kind(), self.selected_id()) {
                    self.ask(PendingAction::Delete(kind, id));
                }
            }
            Message::Export => self.export(),
            _ => (),
        }
    }

    fn newsletter_message(&mut self, msg: Message) {
        match msg {
            Message::EditTopic => self.enter_cmd_mode(CMDMode::NewsletterTopic),
            Message::EditBody | Message::Enter => self.enter_cmd_mode(CMDMode::NewsletterBody),
            Message::ToggleRecipients => self.draft.recipients = self.draft.recipients.toggle(),
            Message::Preview => self.preview_newsletter(),
            Message::SendNewsletter => self.send_newsletter(),
            _ => (),
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn open_dashboard(&mut self) {
        self.modus = Modus::LIST;
        self.previous_modus = Modus::LIST;
        self.subscribers.set_loading();
        self.messages.set_loading();
        self.dispatcher.load_subscribers();
        self.dispatcher.load_messages();
    }

    fn refresh(&mut self) {
        match self.tab.kind() {
            Some(ListKind::Subscribers) => {
                self.subscribers.set_loading();
                self.dispatcher.load_subscribers();
            }
            Some(ListKind::Messages) => {
                self.messages.set_loading();
                self.dispatcher.load_messages();
            }
            None => {
                self.subscribers.set_loading();
                self.messages.set_loading();
                self.dispatcher.load_subscribers();
                self.dispatcher.load_messages();
            }
        }
        self.set_status_message("Reloading ...");
    }

    fn switch_tab(&mut self, tab: Tab) {
        trace!("Switching to tab {:?}", tab);
        self.tab = tab;
        self.curser_row = 0;
        self.expanded = None;
    }

    fn page_len(&self) -> usize {
        match self.tab.kind() {
            Some(ListKind::Subscribers) => self.subscribers.page_items().len(),
            Some(ListKind::Messages) => self.messages.page_items().len(),
            None => 0,
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.page_len();
        if self.curser_row >= len {
            self.curser_row = len.saturating_sub(1);
        }
    }

    fn change_page<F: FnOnce(ListKind, &mut Model)>(&mut self, change: F) {
        if let Some(kind) = self.tab.kind() {
            change(kind, self);
            self.curser_row = 0;
            self.expanded = None;
        }
    }

    fn selected_id(&self) -> Option<String> {
        match self.tab.kind()? {
            ListKind::Subscribers => self
                .subscribers
                .page_items()
                .get(self.curser_row)
                .map(|(_, s)| s.id.clone()),
            ListKind::Messages => self
                .messages
                .page_items()
                .get(self.curser_row)
                .map(|(_, m)| m.id.clone()),
        }
    }

    fn cycle_filter(&mut self) {
        match self.tab.kind() {
            Some(ListKind::Subscribers) => {
                let next = match self.subscribers.status_filter() {
                    None => Some(SubscriberStatus::Active),
                    Some(SubscriberStatus::Active) => Some(SubscriberStatus::Inactive),
                    Some(SubscriberStatus::Inactive) => None,
                };
                self.subscribers.set_status_filter(next);
            }
            Some(ListKind::Messages) => {
                let next = match self.messages.status_filter() {
                    None => Some(MessageStatus::Unread),
                    Some(MessageStatus::Unread) => Some(MessageStatus::Read),
                    Some(MessageStatus::Read) => None,
                };
                self.messages.set_status_filter(next);
            }
            None => return,
        }
        self.curser_row = 0;
        self.expanded = None;
    }

    fn enter(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.tab.kind() {
            Some(ListKind::Subscribers) => self.view_subscriber(&id),
            Some(ListKind::Messages) => {
                if self.expanded.as_deref() == Some(id.as_str()) {
                    self.expanded = None;
                } else {
                    self.expanded = Some(id);
                }
            }
            None => {}
        }
    }

    fn exit(&mut self) {
        if self.expanded.take().is_some() {
            return;
        }
        match self.tab.kind() {
            Some(ListKind::Subscribers) if !self.subscribers.query().is_empty() => {
                self.subscribers.set_query("");
                self.curser_row = 0;
            }
            Some(ListKind::Messages) if !self.messages.query().is_empty() => {
                self.messages.set_query("");
                self.curser_row = 0;
            }
            _ => {}
        }
    }

    fn view_subscriber(&mut self, id: &str) {
        let Some(sub) = self.subscribers.find(id) else {
            trace!("Subscriber {id} is gone");
            return;
        };
        let details = format!(
            "Email: {}\nStatus: {}\nSubscribed: {}",
            sub.email,
            sub.status,
            format_relative(sub.subscribed, self.today())
        );
        self.show_popup("Subscriber Details", details);
    }

    fn mark_read(&mut self) {
        if self.tab != Tab::Messages {
            return;
        }
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.messages.update(&id, |m| m.status = MessageStatus::Read) {
            self.clamp_cursor();
            self.set_status_message("Message marked as read");
        }
    }

    fn copy_email(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let email = match self.tab.kind() {
            Some(ListKind::Subscribers) => self.subscribers.find(&id).map(|s| s.email.clone()),
            Some(ListKind::Messages) => self.messages.find(&id).map(|m| m.email.clone()),
            None => None,
        };
        let Some(email) = email else {
            return;
        };
        let copied = match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(email.clone()) {
                Ok(_) => true,
                Err(e) => {
                    trace!("Error copying to clipboard: {:?}", e);
                    false
                }
            },
            None => false,
        };
        if copied {
            self.set_status_message(format!("Copied {email} to clipboard"));
        } else {
            self.set_error_message(format!("Clipboard unavailable, reply to {email}"));
        }
    }

    fn export(&mut self) {
        if self.tab != Tab::Subscribers {
            return;
        }
        match write_export(&self.config.export_dir, self.subscribers.source(), self.today()) {
            Ok(path) => self.set_status_message(format!(
                "Subscribers exported successfully! ({})",
                path.display()
            )),
            Err(e) => {
                error!("Export failed: {e}");
                self.set_error_message(format!("Export failed: {e}"));
            }
        }
    }

    fn ask(&mut self, action: PendingAction) {
        debug!("Asking to confirm {:?}", action);
        self.pending = Some(action);
        self.previous_modus = self.modus;
        self.modus = Modus::CONFIRM;
    }

    fn cancel_pending(&mut self) {
        trace!("Canceled {:?}", self.pending);
        self.pending = None;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CONFIRM;
    }

    fn confirm(&mut self) {
        let Some(action) = self.pending.take() else {
            self.modus = self.previous_modus;
            return;
        };
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CONFIRM;
        match action {
            PendingAction::Delete(ListKind::Subscribers, id) => {
                if self.subscribers.remove(&id).is_some() {
                    self.set_status_message("Subscriber removed successfully");
                }
            }
            PendingAction::Delete(ListKind::Messages, id) => {
                if self.messages.remove(&id).is_some() {
                    if self.expanded.as_deref() == Some(id.as_str()) {
                        self.expanded = None;
                    }
                    self.set_status_message("Message deleted successfully");
                }
            }
            PendingAction::Logout => self.logout(),
        }
        self.clamp_cursor();
    }

    fn logout(&mut self) {
        if let Err(e) = self.store.logout() {
            error!("Could not clear admin session: {e}");
            self.set_error_message(format!("Logout failed: {e}"));
            return;
        }
        self.login_username.clear();
        self.login_error = None;
        self.set_status_message("Logged out");
        self.modus = Modus::LOGIN;
        self.previous_modus = Modus::LOGIN;
        self.enter_cmd_mode(CMDMode::LoginUsername);
    }

    fn toggle_theme(&mut self) {
        match self.store.toggle_theme() {
            Ok(theme) => trace!("Theme {}", theme.as_str()),
            Err(e) => self.set_error_message(format!("Could not save theme: {e}")),
        }
    }

    fn show_popup(&mut self, title: &str, message: String) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_title = title.to_string();
        self.popup_message = message;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.popup_message.clear();
    }

    fn preview_newsletter(&mut self) {
        if self.draft.validate().is_err() {
            self.set_error_message("Please fill in topic and body before previewing");
            return;
        }
        let preview = format!(
            "{}\n{}\n\n{}\n\n© {} AntechLearn. All rights reserved.\nYou received this email because you subscribed to our newsletter.",
            self.draft.topic,
            "─".repeat(self.draft.topic.chars().count()),
            self.draft.body,
            self.today().year()
        );
        self.show_popup("Newsletter Preview", preview);
    }

    fn send_newsletter(&mut self) {
        if self.draft.validate().is_err() {
            self.set_error_message("Please fill in all fields");
            return;
        }
        info!("Sending newsletter '{}' to {}", self.draft.topic, self.draft.recipients.as_str());
        self.dispatcher.send_newsletter(self.draft.clone());
        self.set_status_message("Sending newsletter ...");
    }

    fn newsletter_sent(&mut self, draft: NewsletterDraft, result: Result<usize, String>) {
        match result {
            Ok(count) => {
                debug!("Newsletter reached {count} subscribers");
                self.total_sent += 1;
                if self.draft == draft {
                    self.draft.clear();
                }
                self.set_status_message(format!(
                    "Newsletter \"{}\" sent successfully to {} subscribers!",
                    draft.topic,
                    draft.recipients.as_str()
                ));
            }
            Err(e) => {
                error!("Newsletter failed: {e}");
                self.set_error_message("Error sending newsletter. Please try again.");
            }
        }
    }

    fn login_finished(&mut self, result: Result<String, String>) {
        match result {
            Ok(username) => {
                self.login_error = None;
                match self.store.login(&AdminSession {
                    username: username.clone(),
                }) {
                    Ok(_) => self.set_status_message(format!("Welcome, {username}!")),
                    Err(e) => {
                        error!("Could not persist admin session: {e}");
                        self.set_error_message(format!(
                            "Welcome, {username}! Session not saved, sign in again next time: {e}"
                        ));
                    }
                }
                self.open_dashboard();
            }
            Err(reason) => {
                warn!("Login failed: {reason}");
                self.login_error = Some(reason);
                self.enter_cmd_mode(CMDMode::LoginUsername);
            }
        }
    }

    fn subscribers_loaded(&mut self, result: Result<Vec<Subscriber>, String>) {
        match result {
            Ok(subs) => self.subscribers.load(subs),
            Err(e) => {
                error!("Loading subscribers failed: {e}");
                self.subscribers.fail(e);
                self.set_error_message("Error loading subscribers. Please try again.");
            }
        }
        self.clamp_cursor();
    }

    fn messages_loaded(&mut self, result: Result<Vec<ContactMessage>, String>) {
        match result {
            Ok(msgs) => self.messages.load(msgs),
            Err(e) => {
                error!("Loading messages failed: {e}");
                self.messages.fail(e);
                self.set_error_message("Error loading messages. Please try again.");
            }
        }
        self.clamp_cursor();
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        if self.modus != Modus::CMDINPUT {
            self.previous_modus = self.modus;
        }
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;

        self.input.clear();
        self.input.set_masked(mode == CMDMode::LoginPassword);
        self.input.set_multiline(mode == CMDMode::NewsletterBody);
        match mode {
            CMDMode::Search => match self.tab.kind() {
                Some(ListKind::Subscribers) => self.input.set(self.subscribers.query()),
                Some(ListKind::Messages) => self.input.set(self.messages.query()),
                None => {}
            },
            CMDMode::NewsletterTopic => self.input.set(&self.draft.topic),
            CMDMode::NewsletterBody => self.input.set(&self.draft.body),
            CMDMode::LoginUsername | CMDMode::LoginPassword => {}
        }
        self.last_input = self.input.get();
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.cmd_mode);
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let canceled = self.last_input.canceled;
        let cmd_input = self.last_input.input.clone();
        let mode = self.cmd_mode.take();
        if canceled {
            trace!("Input canceled");
            return;
        }
        match mode {
            Some(CMDMode::Search) => {
                match self.tab.kind() {
                    Some(ListKind::Subscribers) => self.subscribers.set_query(&cmd_input),
                    Some(ListKind::Messages) => self.messages.set_query(&cmd_input),
                    None => {}
                }
                self.curser_row = 0;
                self.expanded = None;
            }
            Some(CMDMode::LoginUsername) => {
                if cmd_input.trim().is_empty() {
                    self.login_error = Some(ValidationError::MissingField("username").to_string());
                    self.enter_cmd_mode(CMDMode::LoginUsername);
                } else {
                    self.login_username = cmd_input.trim().to_string();
                    self.enter_cmd_mode(CMDMode::LoginPassword);
                }
            }
            Some(CMDMode::LoginPassword) => {
                if cmd_input.is_empty() {
                    self.login_error = Some(ValidationError::MissingField("password").to_string());
                    self.enter_cmd_mode(CMDMode::LoginPassword);
                } else {
                    self.set_status_message("Signing in ...");
                    self.dispatcher.login(self.login_username.clone(), cmd_input);
                }
            }
            Some(CMDMode::NewsletterTopic) => self.draft.topic = cmd_input,
            Some(CMDMode::NewsletterBody) => self.draft.body = cmd_input,
            None => info!("Cmd mode is none!"),
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
        self.last_status_message_update = Instant::now();
    }

    fn set_error_message(&mut self, message: impl Into<String>) {
        self.set_status_message(message);
        self.status_is_error = true;
    }

    fn update_uidata(&mut self) {
        let today = self.today();
        let notice_alive = !self.status_message.is_empty()
            && self.last_status_message_update.elapsed()
                < Duration::from_secs(NOTICE_LIFETIME_SECS);

        let (list_title, pager) = match self.tab.kind() {
            Some(ListKind::Subscribers) => (
                list_title(
                    ListKind::Subscribers,
                    self.subscribers.filtered_len(),
                    self.subscribers.source().len(),
                    self.subscribers.query(),
                    self.subscribers.status_filter().map(|s| s.as_str()),
                ),
                self.subscribers.pager(),
            ),
            Some(ListKind::Messages) => (
                list_title(
                    ListKind::Messages,
                    self.messages.filtered_len(),
                    self.messages.source().len(),
                    self.messages.query(),
                    self.messages.status_filter().map(|s| s.as_str()),
                ),
                self.messages.pager(),
            ),
            None => (
                format!("Newsletter ({} characters)", self.draft.char_count()),
                build_pager(0, 1, self.config.page_size),
            ),
        };

        self.uidata = UIData {
            tab: self.tab,
            theme: self.store.theme(),
            admin: self.store.admin_username().map(str::to_string),
            show_login: self.modus == Modus::LOGIN
                || (self.modus == Modus::CMDINPUT && self.previous_modus == Modus::LOGIN),
            login_username: self.login_username.clone(),
            login_error: self.login_error.clone(),
            stats: self.stats(),
            subscriber_rows: render(&self.subscribers, today),
            message_cards: render(&self.messages, today),
            list_title,
            pager,
            selected_row: self.curser_row,
            expanded: self.expanded.clone(),
            draft: self.draft.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_title: self.popup_title.clone(),
            popup_message: self.popup_message.clone(),
            confirm_message: self.pending.as_ref().map(|p| p.question().to_string()),
            active_cmdinput: self.active_cmdinput,
            cmd_mode: self.cmd_mode,
            cmdinput: self.last_input.clone(),
            status_message: notice_alive.then(|| self.status_message.clone()),
            status_is_error: self.status_is_error,
            in_flight: self.dispatcher.in_flight(),
            compact: self.ui_width < COMPACT_WIDTH,
        };
    }
}

impl UIData {
    fn empty() -> Self {
        UIData {
            tab: Tab::Subscribers,
            theme: Theme::default(),
            admin: None,
            show_login: false,
            login_username: String::new(),
            login_error: None,
            stats: Stats::default(),
            subscriber_rows: ListFragment::Loading,
            message_cards: ListFragment::Loading,
            list_title: String::new(),
            pager: Pager::default(),
            selected_row: 0,
            expanded: None,
            draft: NewsletterDraft::default(),
            show_popup: false,
            popup_title: String::new(),
            popup_message: String::new(),
            confirm_message: None,
            active_cmdinput: false,
            cmd_mode: None,
            cmdinput: InputResult::default(),
            status_message: None,
            status_is_error: false,
            in_flight: 0,
            compact: false,
        }
    }
}

fn list_title(
    kind: ListKind,
    shown: usize,
    total: usize,
    query: &str,
    status: Option<&str>,
) -> String {
    let mut title = format!("{} ({shown} of {total})", kind.title());
    if let Some(status) = status {
        title.push_str(&format!(" · {status}"));
    }
    if !query.is_empty() {
        title.push_str(&format!(" · search '{query}'"));
    }
    title
}
