use derive_setters::Setters;
use serde::Serialize;

use crate::domain::ValidationError;
use crate::items::{MessageStatus, SubscriberStatus};

pub const MIN_PASSWORD_LEN: usize = 8;

/// `local@domain.tld`-ish: an `@` with something before it and a dot after it.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let dot_ok = domain
        .find('.')
        .is_some_and(|pos| pos > 0 && pos + 1 < domain.len());
    if local.is_empty() || !dot_ok || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Body of `POST {base}/subscribers`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub status: SubscriberStatus,
}

impl SubscribeRequest {
    pub fn new(email: &str) -> Result<Self, ValidationError> {
        validate_email(email)?;
        Ok(SubscribeRequest {
            email: email.trim().to_string(),
            status: SubscriberStatus::Active,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Body of `POST {base}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
}

impl ContactForm {
    pub fn validate(&self) -> Result<ContactRequest, ValidationError> {
        required(&self.first_name, "first name")?;
        required(&self.last_name, "last name")?;
        required(&self.email, "email")?;
        required(&self.subject, "subject")?;
        required(&self.message, "message")?;
        validate_email(&self.email)?;
        Ok(ContactRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.clone(),
            status: MessageStatus::Unread,
        })
    }
}

#[derive(Debug, Clone, Default, Setters)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "name")?;
        required(&self.email, "email")?;
        validate_email(&self.email)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipients {
    #[default]
    All,
    Active,
}

impl Recipients {
    pub fn toggle(self) -> Self {
        match self {
            Recipients::All => Recipients::Active,
            Recipients::Active => Recipients::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recipients::All => "all",
            Recipients::Active => "active",
        }
    }
}

/// Newsletter being composed on the dashboard. Kept on failure so the
/// admin can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Setters)]
pub struct NewsletterDraft {
    pub recipients: Recipients,
    pub topic: String,
    pub body: String,
}

impl NewsletterDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.topic, "topic")?;
        required(&self.body, "body")?;
        Ok(())
    }

    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    pub fn clear(&mut self) {
        self.topic.clear();
        self.body.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_checks() {
        assert!(validate_email("jane.smith@example.com").is_ok());
        assert!(validate_email("  a@b.io ").is_ok());
        for bad in ["", "plain", "@example.com", "a@b", "a@.com", "a@b.", "a b@c.de"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn contact_form_requires_every_field() {
        let form = ContactForm::default()
            .first_name("Ada".to_string())
            .last_name("Lovelace".to_string())
            .email("ada@example.com".to_string())
            .subject("Hello".to_string());
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingField("message"));

        let request = form.message("Hi there".to_string()).validate().unwrap();
        assert_eq!(request.status, MessageStatus::Unread);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["first_name"], "Ada");
        assert_eq!(json["status"], "unread");
    }

    #[test]
    fn registration_password_rules() {
        let form = RegistrationForm::default()
            .name("Ada".to_string())
            .email("ada@example.com".to_string())
            .password("short".to_string())
            .confirm_password("other".to_string());
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
        let form = form.confirm_password("short".to_string());
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort(8)));
        let form = form
            .password("longenough".to_string())
            .confirm_password("longenough".to_string());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn subscribe_request_body() {
        let req = SubscribeRequest::new("x@y.org").unwrap();
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"email":"x@y.org","status":"active"}"#);
        assert!(SubscribeRequest::new("nope").is_err());
    }

    #[test]
    fn newsletter_draft_needs_topic_and_body() {
        let mut draft = NewsletterDraft::default().topic("Weekly".to_string());
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("body")));
        draft.body = "héllo".to_string();
        assert!(draft.validate().is_ok());
        assert_eq!(draft.char_count(), 5);
        assert_eq!(draft.recipients.toggle(), Recipients::Active);
    }
}
