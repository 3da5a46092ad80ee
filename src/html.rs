//! HTML fragments for the web front-end.
//!
//! Each function returns the full replacement content of one container
//! (`subscribersTable`, `messagesList`, `{kind}Pagination`, the preview
//! modal). Every interpolated text is escaped.

use crate::domain::ListKind;
use crate::items::SubscriberStatus;
use crate::pager::{Pager, PagerEntry};
use crate::render::{ListFragment, MessageCard, SubscriberRow};

/// Table body for the subscribers table.
pub fn subscriber_rows_html(fragment: &ListFragment<SubscriberRow>) -> String {
    let rows = match fragment {
        ListFragment::Rows(rows) => rows,
        ListFragment::Loading => {
            return format!(
                r#"<tr><td colspan="5" class="loading"><i class="fas fa-spinner fa-spin"></i> {}</td></tr>"#,
                placeholder(fragment, ListKind::Subscribers)
            );
        }
        ListFragment::Empty => {
            return format!(
                r#"<tr><td colspan="5" class="empty-state"><i class="fas fa-inbox"></i><p>{}</p></td></tr>"#,
                placeholder(fragment, ListKind::Subscribers)
            );
        }
        ListFragment::NoMatches => {
            return format!(
                r#"<tr><td colspan="5" class="empty-state"><p>{}</p></td></tr>"#,
                placeholder(fragment, ListKind::Subscribers)
            );
        }
        ListFragment::LoadFailed(_) => {
            return format!(
                r#"<tr><td colspan="5" class="alert alert-error">{}</td></tr>"#,
                placeholder(fragment, ListKind::Subscribers)
            );
        }
    };

    let mut out = String::new();
    for row in rows {
        let status_class = match row.status {
            SubscriberStatus::Active => "status-active",
            SubscriberStatus::Inactive => "status-inactive",
        };
        let id = html_escape(&row.id);
        out.push_str(&format!(
            r#"
        <tr data-id="{id}">
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td><span class="status-badge {status_class}">{}</span></td>
            <td class="table-actions">
                <button class="btn-icon" data-action="view" data-id="{id}" title="View">
                    <i class="fas fa-eye"></i>
                </button>
                <button class="btn-icon delete" data-action="delete" data-id="{id}" title="Delete">
                    <i class="fas fa-trash"></i>
                </button>
            </td>
        </tr>"#,
            row.index,
            html_escape(&row.email),
            html_escape(&row.date_label),
            row.status,
        ));
    }
    out
}

/// Card list for the messages panel.
pub fn message_list_html(fragment: &ListFragment<MessageCard>) -> String {
    let cards = match fragment {
        ListFragment::Rows(cards) => cards,
        ListFragment::Loading => {
            return format!(
                r#"<div class="loading"><i class="fas fa-spinner fa-spin"></i> {}</div>"#,
                placeholder(fragment, ListKind::Messages)
            );
        }
        ListFragment::Empty => {
            return format!(
                r#"<div class="empty-state"><i class="fas fa-inbox"></i><p>{}</p></div>"#,
                placeholder(fragment, ListKind::Messages)
            );
        }
        ListFragment::NoMatches => {
            return format!(
                r#"<div class="empty-state"><p>{}</p></div>"#,
                placeholder(fragment, ListKind::Messages)
            );
        }
        ListFragment::LoadFailed(_) => {
            return format!(
                r#"<div class="alert alert-error">{}</div>"#,
                placeholder(fragment, ListKind::Messages)
            );
        }
    };

    let mut out = String::new();
    for card in cards {
        let id = html_escape(&card.id);
        let (unread_class, badge) = if card.unread {
            (" unread", r#"<span class="status-badge status-active">New</span>"#)
        } else {
            ("", "")
        };
        out.push_str(&format!(
            r#"
        <div class="message-item{unread_class}" data-id="{id}" data-index="{}">
            <div class="message-header">
                <div class="message-sender">
                    <div class="message-name">{}</div>
                    <div class="message-email">{}</div>
                </div>
                <div class="message-meta">
                    <div class="message-date">{}</div>
                    {badge}
                </div>
            </div>
            <div class="message-subject"><strong>Subject:</strong> {}</div>
            <div class="message-preview">{}</div>
            <div class="message-body">
                <strong>Full Message:</strong><br><br>
                {}
            </div>
            <div class="message-actions">
                <button class="btn btn-secondary" data-action="mark-read" data-id="{id}">
                    <i class="fas fa-check"></i> Mark as Read
                </button>
                <a class="btn btn-primary" href="mailto:{}">
                    <i class="fas fa-reply"></i> Reply
                </a>
                <button class="btn btn-danger" data-action="delete" data-id="{id}">
                    <i class="fas fa-trash"></i> Delete
                </button>
            </div>
        </div>"#,
            card.index,
            html_escape(&card.sender),
            html_escape(&card.email),
            html_escape(&card.date_label),
            html_escape(&card.subject),
            html_escape(&card.preview),
            html_escape(&card.body),
            html_escape(&card.email),
        ));
    }
    out
}

/// Pagination buttons. Empty string when there is a single page.
pub fn pager_html(kind: ListKind, pager: &Pager) -> String {
    if pager.is_empty() {
        return String::new();
    }
    let kind = kind.as_str();
    let mut out = String::new();
    for entry in &pager.entries {
        let button = match entry {
            PagerEntry::Prev { target, enabled } => format!(
                r#"<button data-kind="{kind}" data-page="{target}"{}><i class="fas fa-chevron-left"></i></button>"#,
                disabled(*enabled)
            ),
            PagerEntry::Next { target, enabled } => format!(
                r#"<button data-kind="{kind}" data-page="{target}"{}><i class="fas fa-chevron-right"></i></button>"#,
                disabled(*enabled)
            ),
            PagerEntry::Page { number, active } => format!(
                r#"<button data-kind="{kind}" data-page="{number}" class="{}">{number}</button>"#,
                if *active { "active" } else { "" }
            ),
            PagerEntry::Ellipsis => "<button disabled>...</button>".to_string(),
        };
        out.push_str(&button);
        out.push('\n');
    }
    out
}

/// Body of the newsletter preview modal.
pub fn newsletter_preview_html(topic: &str, body: &str, year: i32) -> String {
    format!(
        r#"
        <div style="max-width: 600px; margin: 0 auto; font-family: Arial, sans-serif;">
            <h2 style="color: #4361ee; border-bottom: 3px solid #4361ee; padding-bottom: 10px;">{}</h2>
            <div style="margin-top: 20px; line-height: 1.8; color: #333;">
                {}
            </div>
            <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; color: #888; font-size: 0.9em;">
                <p>&copy; {year} AntechLearn. All rights reserved.</p>
                <p>You received this email because you subscribed to our newsletter.</p>
            </div>
        </div>
    "#,
        html_escape(topic),
        html_escape(body).replace('\n', "<br>")
    )
}

fn placeholder<R>(fragment: &ListFragment<R>, kind: ListKind) -> String {
    fragment.placeholder(kind).unwrap_or_default()
}

fn disabled(enabled: bool) -> &'static str {
    if enabled { "" } else { " disabled" }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{mock_messages, mock_subscribers};
    use crate::listview::ListView;
    use crate::pager::build_pager;
    use crate::render::render;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
    }

    #[test]
    fn subscriber_rows_escape_and_key_actions_by_id() {
        let mut subs = mock_subscribers();
        subs[0].email = "<script>@x.io".to_string();
        let mut view = ListView::new(ListKind::Subscribers, 10);
        view.load(subs);
        let html = subscriber_rows_html(&render(&view, today()));
        assert!(html.contains("&lt;script&gt;@x.io"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-action="delete" data-id="5""#));
        assert!(html.contains(r#"<span class="status-badge status-inactive">inactive</span>"#));
        assert_eq!(html.matches("<tr ").count(), 5);
    }

    #[test]
    fn empty_states_use_distinct_copy() {
        let empty: ListFragment<SubscriberRow> = ListFragment::Empty;
        let none: ListFragment<SubscriberRow> = ListFragment::NoMatches;
        assert!(subscriber_rows_html(&empty).contains("fa-inbox"));
        assert!(subscriber_rows_html(&empty).contains("No subscribers yet"));
        assert!(subscriber_rows_html(&none).contains("No subscribers found"));
        assert!(!subscriber_rows_html(&none).contains("fa-inbox"));
    }

    #[test]
    fn unread_messages_get_badge() {
        let mut view = ListView::new(ListKind::Messages, 10);
        view.load(mock_messages());
        let html = message_list_html(&render(&view, today()));
        assert_eq!(html.matches(">New</span>").count(), 2);
        assert!(html.contains("mailto:jane.smith@example.com"));
        assert!(html.contains("I&#39;m having trouble"));
    }

    #[test]
    fn pager_html_marks_disabled_and_active() {
        assert_eq!(pager_html(ListKind::Messages, &build_pager(5, 1, 10)), "");
        let html = pager_html(ListKind::Messages, &build_pager(50, 1, 10));
        assert!(html.contains(r#"data-page="1" disabled>"#));
        assert!(html.contains(r#"class="active">1</button>"#));
        assert!(html.contains("<button disabled>...</button>"));
        assert!(html.contains(r#"data-kind="messages" data-page="5" class="">5</button>"#));
    }

    #[test]
    fn preview_turns_newlines_into_breaks() {
        let html = newsletter_preview_html("Rust & you", "line one\nline two", 2026);
        assert!(html.contains("Rust &amp; you"));
        assert!(html.contains("line one<br>line two"));
        assert!(html.contains("&copy; 2026 AntechLearn"));
    }
}
