//! One-shot subcommands and the wiring shared with the dashboard.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tracing::{info, warn};

use crate::cli::Command;
use crate::client::{
    CONTACT_SUCCESS, HttpAuthenticator, SUBSCRIBE_SUCCESS, SiteClient, SubmitOutcome,
};
use crate::config::{DataSource, Settings, expand_path};
use crate::dispatch::{CsvSource, Dispatcher, ListSource, MockSource};
use crate::domain::{EduError, ListKind};
use crate::export::write_export;
use crate::forms::{ContactForm, NewsletterDraft, RegistrationForm, SubscribeRequest};
use crate::html::{message_list_html, newsletter_preview_html, pager_html, subscriber_rows_html};
use crate::items::{MessageStatus, SubscriberStatus};
use crate::listview::ListView;
use crate::render::render;

pub fn build_client(settings: &Settings) -> Result<SiteClient, EduError> {
    SiteClient::new(
        &settings.api_base,
        settings.request_timeout,
        settings.submit_policy(),
    )
}

pub fn build_source(settings: &Settings) -> Result<Arc<dyn ListSource>, EduError> {
    Ok(match settings.data_source {
        DataSource::Mock => Arc::new(MockSource),
        DataSource::Api => Arc::new(build_client(settings)?),
        DataSource::Csv => {
            let path = settings.subscribers_csv.clone().ok_or_else(|| {
                EduError::ConfigError("data_source 'csv' needs subscribers_csv".into())
            })?;
            Arc::new(CsvSource { path })
        }
    })
}

pub fn build_dispatcher(settings: &Settings) -> Result<Dispatcher, EduError> {
    let auth = HttpAuthenticator::new(&settings.api_base, settings.request_timeout)?;
    Ok(Dispatcher::new(
        build_source(settings)?,
        Arc::new(build_client(settings)?),
        Arc::new(auth),
    ))
}

fn submit_result(outcome: SubmitOutcome, success: String) -> Result<String, EduError> {
    match outcome {
        SubmitOutcome::Accepted => Ok(success),
        SubmitOutcome::AcceptedOffline => {
            warn!("Backend unreachable, reporting success anyway");
            Ok(success)
        }
        SubmitOutcome::Rejected(reason) => Err(EduError::Rejected(reason)),
    }
}

/// Runs every subcommand but the dashboard, writing its output to `out`.
pub fn run_command(
    command: Command,
    settings: &Settings,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<(), EduError> {
    match command {
        Command::Dashboard => Err(EduError::ConfigError(
            "the dashboard needs a terminal".into(),
        )),
        Command::Render {
            kind,
            query,
            status,
            page,
        } => {
            let html = render_html(settings, kind.into(), &query, status.as_deref(), page, today)?;
            writeln!(out, "{html}")?;
            Ok(())
        }
        Command::Export { out: dir } => {
            let dir = dir
                .as_deref()
                .map(expand_path)
                .unwrap_or_else(|| settings.export_dir.clone());
            let path = export(settings, dir, today)?;
            writeln!(out, "Subscribers exported successfully! ({})", path.display())?;
            Ok(())
        }
        Command::Subscribe { email } => {
            let request = SubscribeRequest::new(&email)?;
            let outcome = build_client(settings)?.subscribe(&request)?;
            let text = submit_result(outcome, format!("{SUBSCRIBE_SUCCESS} {}", request.email))?;
            writeln!(out, "{text}")?;
            Ok(())
        }
        Command::Contact {
            first_name,
            last_name,
            email,
            subject,
            message,
        } => {
            let request = ContactForm {
                first_name,
                last_name,
                email,
                subject,
                message,
            }
            .validate()?;
            let outcome = build_client(settings)?.send_contact(&request)?;
            let text = submit_result(outcome, CONTACT_SUCCESS.to_string())?;
            writeln!(out, "{text}")?;
            Ok(())
        }
        Command::Preview { topic, body } => {
            let draft = NewsletterDraft::default().topic(topic).body(body);
            if draft.validate().is_err() {
                return Err(EduError::Rejected(
                    "Please fill in topic and body before previewing".into(),
                ));
            }
            writeln!(
                out,
                "{}",
                newsletter_preview_html(&draft.topic, &draft.body, today.year())
            )?;
            Ok(())
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            RegistrationForm {
                name: name.clone(),
                email,
                password,
                confirm_password,
            }
            .validate()?;
            info!("Registration form for {name} is valid");
            writeln!(out, "Registration successful! Welcome, {name}!")?;
            Ok(())
        }
    }
}

fn export(settings: &Settings, dir: PathBuf, today: NaiveDate) -> Result<PathBuf, EduError> {
    let subs = build_source(settings)?.subscribers()?;
    write_export(&dir, &subs, today)
}

pub fn render_html(
    settings: &Settings,
    kind: ListKind,
    query: &str,
    status: Option<&str>,
    page: usize,
    today: NaiveDate,
) -> Result<String, EduError> {
    let source = build_source(settings)?;
    let invalid = |e: String| EduError::ConfigError(e);
    match kind {
        ListKind::Subscribers => {
            let mut view = ListView::new(kind, settings.page_size);
            view.load(source.subscribers()?);
            if let Some(status) = status {
                view.set_status_filter(Some(status.parse::<SubscriberStatus>().map_err(invalid)?));
            }
            view.set_query(query);
            view.goto_page(page);
            Ok(format!(
                "{}\n{}",
                subscriber_rows_html(&render(&view, today)),
                pager_html(view.kind(), &view.pager())
            ))
        }
        ListKind::Messages => {
            let mut view = ListView::new(kind, settings.page_size);
            view.load(source.messages()?);
            if let Some(status) = status {
                view.set_status_filter(Some(status.parse::<MessageStatus>().map_err(invalid)?));
            }
            view.set_query(query);
            view.goto_page(page);
            Ok(format!(
                "{}\n{}",
                message_list_html(&render(&view, today)),
                pager_html(view.kind(), &view.pager())
            ))
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
