use std::time::Duration;

use chrono::{Local, NaiveDate};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::client::AdminSession;
use crate::config::Settings;
use crate::dispatch::tests::mock_dispatcher;
use crate::domain::Message;
use crate::export::export_file_name;
use crate::items::SubscriberStatus;
use crate::model::{Model, Status, Tab};
use crate::render::ListFragment;
use crate::store::{ClientStore, Theme};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
}

fn admin_store() -> ClientStore {
    let mut store = ClientStore::in_memory();
    store
        .login(&AdminSession {
            username: "admin".into(),
        })
        .unwrap();
    store
}

fn model_with(settings: &Settings, logged_in: bool) -> Model {
    let store = if logged_in {
        admin_store()
    } else {
        ClientStore::in_memory()
    };
    let mut model = Model::init(settings, store, mock_dispatcher());
    model.set_today(day(8));
    settle(&mut model);
    model
}

fn dashboard() -> Model {
    model_with(&Settings::default(), true)
}

/// Feeds worker results into the model until nothing is running.
fn settle(model: &mut Model) {
    loop {
        let wait = if model.dispatcher().in_flight() > 0 {
            Duration::from_secs(10)
        } else {
            Duration::from_millis(200)
        };
        match model.dispatcher().next_timeout(wait) {
            Some(message) => model.update(Some(message)).unwrap(),
            None => break,
        }
    }
}

fn send(model: &mut Model, message: Message) {
    model.update(Some(message)).unwrap();
}

fn type_line(model: &mut Model, text: &str) {
    for c in text.chars() {
        send(
            model,
            Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
        );
    }
    send(
        model,
        Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
    );
}

fn notice(model: &Model) -> Option<&str> {
    model.get_uidata().status_message.as_deref()
}

#[test]
fn login_opens_dashboard_and_loads_lists() {
    let mut model = model_with(&Settings::default(), false);
    assert!(model.get_uidata().show_login);
    assert!(model.raw_keyevents());

    type_line(&mut model, "admin");
    type_line(&mut model, "correct horse");
    settle(&mut model);

    assert!(model.is_logged_in());
    assert!(!model.get_uidata().show_login);
    assert_eq!(model.get_uidata().admin.as_deref(), Some("admin"));
    assert_eq!(model.subscribers().source().len(), 5);
    assert_eq!(model.messages().source().len(), 3);
}

#[test]
fn wrong_password_shows_error_and_asks_again() {
    let mut model = model_with(&Settings::default(), false);
    type_line(&mut model, "admin");
    type_line(&mut model, "guess");
    settle(&mut model);

    assert!(!model.is_logged_in());
    let data = model.get_uidata();
    assert!(data.show_login);
    assert_eq!(
        data.login_error.as_deref(),
        Some("Invalid username or password. Please try again.")
    );
}

#[test]
fn empty_username_is_rejected_locally() {
    let mut model = model_with(&Settings::default(), false);
    type_line(&mut model, "   ");
    assert_eq!(model.dispatcher().in_flight(), 0);
    assert!(model.get_uidata().login_error.is_some());
    assert!(model.raw_keyevents());
}

#[test]
fn stats_follow_loaded_lists() {
    let model = dashboard();
    let stats = model.stats();
    assert_eq!(stats.total_subscribers, 5);
    assert_eq!(stats.active_subscribers, 4);
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.unread_messages, 2);
    assert_eq!(stats.total_sent, 0);
}

#[test]
fn search_narrows_subscribers_and_hides_pager() {
    let mut model = dashboard();
    send(&mut model, Message::Search);
    type_line(&mut model, "jane");

    assert_eq!(model.subscribers().filtered_len(), 1);
    assert!(model.get_uidata().pager.is_empty());
    assert!(model.get_uidata().list_title.contains("search 'jane'"));

    send(&mut model, Message::Exit);
    assert_eq!(model.subscribers().query(), "");
    assert_eq!(model.subscribers().filtered_len(), 5);
}

#[test]
fn mark_read_drops_message_from_unread_filter() {
    let mut model = dashboard();
    send(&mut model, Message::NextTab);
    assert_eq!(model.tab(), Tab::Messages);

    send(&mut model, Message::CycleFilter);
    assert_eq!(model.messages().filtered_len(), 2);

    send(&mut model, Message::MarkRead);
    assert_eq!(model.messages().filtered_len(), 1);
    assert_eq!(notice(&model), Some("Message marked as read"));
    assert_eq!(model.stats().unread_messages, 1);
}

#[test]
fn confirmed_delete_keeps_order_of_the_rest() {
    let mut model = dashboard();
    send(&mut model, Message::NextTab);
    send(&mut model, Message::Delete);
    assert_eq!(
        model.get_uidata().confirm_message.as_deref(),
        Some("Are you sure you want to delete this message?")
    );

    send(&mut model, Message::Confirm);
    let ids: Vec<&str> = model.messages().source().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["2", "3"]);
    assert_eq!(notice(&model), Some("Message deleted successfully"));
    assert!(model.pending().is_none());
}

#[test]
fn canceled_delete_keeps_the_item() {
    let mut model = dashboard();
    send(&mut model, Message::MoveDown);
    send(&mut model, Message::Delete);
    assert!(model.pending().is_some());

    send(&mut model, Message::Exit);
    assert!(model.pending().is_none());
    assert_eq!(model.subscribers().source().len(), 5);

    send(&mut model, Message::Delete);
    send(&mut model, Message::Confirm);
    assert_eq!(model.subscribers().source().len(), 4);
    assert!(model.subscribers().find("2").is_none());
    assert_eq!(notice(&model), Some("Subscriber removed successfully"));
}

#[test]
fn newsletter_needs_topic_and_body() {
    let mut model = dashboard();
    send(&mut model, Message::PrevTab);
    assert_eq!(model.tab(), Tab::Newsletter);

    send(&mut model, Message::SendNewsletter);
    assert_eq!(notice(&model), Some("Please fill in all fields"));
    assert!(model.get_uidata().status_is_error);

    send(&mut model, Message::Preview);
    assert_eq!(
        notice(&model),
        Some("Please fill in topic and body before previewing")
    );

    send(&mut model, Message::EditTopic);
    type_line(&mut model, "February news");
    send(&mut model, Message::EditBody);
    type_line(&mut model, "New tutorials");
    assert_eq!(model.draft().topic, "February news");

    send(&mut model, Message::Preview);
    let data = model.get_uidata();
    assert!(data.show_popup);
    assert!(data.popup_message.contains("© 2026 AntechLearn"));
    send(&mut model, Message::Exit);
    assert!(!model.get_uidata().show_popup);
}

#[test]
fn failed_send_keeps_the_draft() {
    let mut model = dashboard();
    send(&mut model, Message::PrevTab);
    send(&mut model, Message::EditTopic);
    type_line(&mut model, "Topic");
    send(&mut model, Message::EditBody);
    type_line(&mut model, "Body");

    send(&mut model, Message::SendNewsletter);
    settle(&mut model);

    assert_eq!(
        notice(&model),
        Some("Error sending newsletter. Please try again.")
    );
    assert_eq!(model.draft().body, "Body");
    assert_eq!(model.stats().total_sent, 0);
}

#[test]
fn export_writes_csv_to_export_dir() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default().export_dir(dir.path().to_path_buf());
    let mut model = model_with(&settings, true);
    send(&mut model, Message::Export);

    assert!(notice(&model).unwrap().starts_with("Subscribers exported successfully!"));
    assert!(dir.path().join("subscribers_2026-02-08.csv").is_file());
}

#[test]
fn logout_asks_first() {
    let mut model = dashboard();
    send(&mut model, Message::Logout);
    assert_eq!(
        model.get_uidata().confirm_message.as_deref(),
        Some("Are you sure you want to logout?")
    );
    send(&mut model, Message::Confirm);
    assert!(!model.is_logged_in());
    assert!(model.get_uidata().show_login);
}

#[test]
fn theme_toggle_and_quit() {
    let mut model = dashboard();
    assert_eq!(model.get_uidata().theme, Theme::Light);
    send(&mut model, Message::ToggleTheme);
    assert_eq!(model.get_uidata().theme, Theme::Dark);

    send(&mut model, Message::Quit);
    assert_eq!(model.status, Status::QUITTING);
}

#[test]
fn newsletter_success_clears_only_an_unchanged_draft() {
    let mut model = dashboard();
    send(&mut model, Message::PrevTab);
    send(&mut model, Message::EditTopic);
    type_line(&mut model, "Topic");
    send(&mut model, Message::EditBody);
    type_line(&mut model, "Body");

    let sent = model.draft().clone();
    send(&mut model, Message::NewsletterSent(sent, Ok(3)));
    assert_eq!(model.stats().total_sent, 1);
    assert_eq!(model.draft().topic, "");
    assert_eq!(model.draft().body, "");
    assert_eq!(
        notice(&model),
        Some("Newsletter \"Topic\" sent successfully to all subscribers!")
    );
    assert!(!model.get_uidata().status_is_error);

    // Edited while the request was in flight.
    send(&mut model, Message::EditTopic);
    type_line(&mut model, "Second");
    send(&mut model, Message::EditBody);
    type_line(&mut model, "Draft");
    let sent = model.draft().clone();
    send(&mut model, Message::EditBody);
    type_line(&mut model, " v2");
    send(&mut model, Message::NewsletterSent(sent, Ok(3)));

    assert_eq!(model.stats().total_sent, 2);
    assert_eq!(model.draft().topic, "Second");
    assert_eq!(model.draft().body, "Draft v2");
}

#[test]
fn enter_shows_subscriber_details() {
    let mut model = dashboard();
    send(&mut model, Message::MoveDown);
    send(&mut model, Message::Enter);

    let data = model.get_uidata();
    assert!(data.show_popup);
    assert_eq!(data.popup_title, "Subscriber Details");
    assert!(data.popup_message.contains("Email: jane.smith@example.com"));
    assert!(data
        .popup_message
        .contains(&format!("Status: {}", SubscriberStatus::Active)));
    assert!(data.popup_message.contains("Subscribed: 5 days ago"));

    send(&mut model, Message::Exit);
    assert!(!model.get_uidata().show_popup);
}

#[test]
fn failed_load_renders_error_and_refresh_retries() {
    let mut model = dashboard();
    send(
        &mut model,
        Message::SubscribersLoaded(Err("connection refused".into())),
    );
    assert_eq!(
        model.get_uidata().subscriber_rows,
        ListFragment::LoadFailed("connection refused".into())
    );
    assert_eq!(
        notice(&model),
        Some("Error loading subscribers. Please try again.")
    );
    assert!(model.get_uidata().status_is_error);

    send(&mut model, Message::Refresh);
    assert_eq!(model.get_uidata().subscriber_rows, ListFragment::Loading);
    settle(&mut model);

    assert_eq!(model.subscribers().source().len(), 5);
    assert_eq!(model.get_uidata().subscriber_rows.rows().len(), 5);
}

#[test]
fn paging_moves_through_the_list_and_resets_cursor() {
    let settings = Settings::default().page_size(2);
    let mut model = model_with(&settings, true);
    assert_eq!(model.subscribers().total_pages(), 3);

    send(&mut model, Message::MoveDown);
    assert_eq!(model.get_uidata().selected_row, 1);

    send(&mut model, Message::NextPage);
    assert_eq!(model.subscribers().page(), 2);
    assert_eq!(model.get_uidata().selected_row, 0);
    assert_eq!(model.get_uidata().pager.current, 2);
    let rows = model.get_uidata().subscriber_rows.rows();
    assert_eq!(rows[0].email, "bob.wilson@example.com");
    assert_eq!(rows[0].index, 3);

    send(&mut model, Message::LastPage);
    assert_eq!(model.subscribers().page(), 3);
    assert_eq!(model.get_uidata().subscriber_rows.rows().len(), 1);

    // The cursor cannot leave a short last page.
    send(&mut model, Message::MoveDown);
    assert_eq!(model.get_uidata().selected_row, 0);

    send(&mut model, Message::NextPage);
    assert_eq!(model.subscribers().page(), 3);
    send(&mut model, Message::PrevPage);
    assert_eq!(model.subscribers().page(), 2);
    send(&mut model, Message::FirstPage);
    assert_eq!(model.subscribers().page(), 1);
}

#[test]
fn labels_follow_the_current_date() {
    let mut model = dashboard();
    model.set_today(day(2));
    assert_eq!(
        model.get_uidata().subscriber_rows.rows()[0].date_label,
        "Yesterday"
    );
    model.set_today(day(9));
    assert_eq!(
        model.get_uidata().subscriber_rows.rows()[0].date_label,
        "Feb 1, 2026"
    );
}

#[test]
fn unpinned_export_uses_the_clock() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default().export_dir(dir.path().to_path_buf());
    let mut model = Model::init(&settings, admin_store(), mock_dispatcher());
    settle(&mut model);

    let before = Local::now().date_naive();
    send(&mut model, Message::Export);
    let after = Local::now().date_naive();

    assert!(
        dir.path().join(export_file_name(before)).is_file()
            || dir.path().join(export_file_name(after)).is_file()
    );
}

#[test]
fn unsaved_session_is_reported_after_login() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = ClientStore::open(&blocker.join("state.yml")).unwrap();

    let mut model = Model::init(&Settings::default(), store, mock_dispatcher());
    type_line(&mut model, "admin");
    type_line(&mut model, "correct horse");
    settle(&mut model);

    assert!(model.is_logged_in());
    assert!(!model.get_uidata().show_login);
    let data = model.get_uidata();
    assert!(data.status_is_error);
    assert!(notice(&model).unwrap().contains("Session not saved"));
}
