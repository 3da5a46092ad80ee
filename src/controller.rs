use std::time::Duration;
use tracing::trace;

use crate::domain::{EduError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(event_poll_time: u64) -> Self {
        Self { event_poll_time }
    }

    /// Waits up to the poll time for terminal input. Worker results are
    /// picked up by `Model::poll_workers` on the same tick.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, EduError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Ok(Some(Message::RawKey(key)))
                } else {
                    Ok(Self::handle_key(key))
                }
            }
            Event::Resize(width, height) => {
                Ok(Some(Message::Resize(width as usize, height as usize)))
            }
            _ => Ok(None),
        }
    }

    pub fn handle_key(key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Right, _) | (KeyCode::Char(']'), _) => Some(Message::NextPage),
            (KeyCode::Left, _) | (KeyCode::Char('['), _) => Some(Message::PrevPage),
            (KeyCode::Home, _) => Some(Message::FirstPage),
            (KeyCode::End, _) => Some(Message::LastPage),
            (KeyCode::Tab, _) => Some(Message::NextTab),
            (KeyCode::BackTab, _) => Some(Message::PrevTab),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('f'), _) => Some(Message::CycleFilter),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Esc, _) | (KeyCode::Char('N'), _) => Some(Message::Exit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Char('r'), _) => Some(Message::MarkRead),
            (KeyCode::Char('c'), _) => Some(Message::CopyEmail),
            (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => Some(Message::Delete),
            (KeyCode::Char('y'), _) | (KeyCode::Char('Y'), _) => Some(Message::Confirm),
            (KeyCode::Char('e'), _) => Some(Message::Export),
            (KeyCode::Char('R'), _) => Some(Message::Refresh),
            (KeyCode::Char('t'), _) => Some(Message::ToggleTheme),
            (KeyCode::Char('L'), _) => Some(Message::Logout),
            (KeyCode::Char('n'), _) => Some(Message::EditTopic),
            (KeyCode::Char('b'), _) => Some(Message::EditBody),
            (KeyCode::Char('a'), _) => Some(Message::ToggleRecipients),
            (KeyCode::Char('p'), _) => Some(Message::Preview),
            (KeyCode::Char('s'), _) => Some(Message::SendNewsletter),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn map(code: KeyCode) -> Option<Message> {
        Controller::handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys_map_to_messages() {
        assert!(matches!(map(KeyCode::Char('q')), Some(Message::Quit)));
        assert!(matches!(map(KeyCode::Char(']')), Some(Message::NextPage)));
        assert!(matches!(map(KeyCode::Left), Some(Message::PrevPage)));
        assert!(matches!(map(KeyCode::Char('/')), Some(Message::Search)));
        assert!(matches!(map(KeyCode::Char('R')), Some(Message::Refresh)));
        assert!(matches!(map(KeyCode::Char('r')), Some(Message::MarkRead)));
        assert!(matches!(map(KeyCode::Char('y')), Some(Message::Confirm)));
        assert!(matches!(map(KeyCode::Esc), Some(Message::Exit)));
        assert!(map(KeyCode::Char('z')).is_none());
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(Controller::handle_key(key), Some(Message::Quit)));
    }
}
