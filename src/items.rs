use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// An entry of a list view. The id is the only key used for mutation.
pub trait ListItem {
    type Status: Copy + PartialEq + fmt::Debug;

    fn id(&self) -> &str;
    fn status(&self) -> Self::Status;
    fn date(&self) -> NaiveDate;

    /// Fields the search box looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// `needle` must already be lower case.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Active => "active",
            SubscriberStatus::Inactive => "inactive",
        }
    }
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SubscriberStatus::Active),
            "inactive" => Ok(SubscriberStatus::Inactive),
            other => Err(format!("unknown subscriber status '{other}'")),
        }
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unread" => Ok(MessageStatus::Unread),
            "read" => Ok(MessageStatus::Read),
            other => Err(format!("unknown message status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub status: SubscriberStatus,
    #[serde(
        rename = "subscribed_date",
        alias = "subscribedDate",
        deserialize_with = "lenient_date"
    )]
    pub subscribed: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub email: String,
    pub subject: String,
    #[serde(rename = "message")]
    pub body: String,
    pub status: MessageStatus,
    #[serde(
        rename = "created_at",
        alias = "date",
        deserialize_with = "lenient_date"
    )]
    pub received: NaiveDate,
}

impl ContactMessage {
    pub fn sender_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl ListItem for Subscriber {
    type Status = SubscriberStatus;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> SubscriberStatus {
        self.status
    }

    fn date(&self) -> NaiveDate {
        self.subscribed
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.email]
    }
}

impl ListItem for ContactMessage {
    type Status = MessageStatus;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> MessageStatus {
        self.status
    }

    fn date(&self) -> NaiveDate {
        self.received
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.subject,
            &self.body,
        ]
    }
}

// The backend sends full timestamps, the demo data plain dates.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("invalid date '{raw}': {e}"))
}

/// Items loaded without an id (CSV rows, sloppy backends) get their
/// 1-based position so mutations stay addressable. Ids stay unique.
pub fn fill_missing_ids<T, F>(items: &mut [T], id_of: F)
where
    F: Fn(&mut T) -> &mut String,
{
    let mut taken: HashSet<String> = items
        .iter_mut()
        .map(|item| id_of(item).clone())
        .filter(|id| !id.is_empty())
        .collect();
    for (pos, item) in items.iter_mut().enumerate() {
        let id = id_of(item);
        if id.is_empty() {
            let mut candidate = (pos + 1).to_string();
            let mut suffix = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}-{suffix}", pos + 1);
                suffix += 1;
            }
            taken.insert(candidate.clone());
            *id = candidate;
        }
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn mock_subscribers() -> Vec<Subscriber> {
    [
        ("1", "john.doe@example.com", SubscriberStatus::Active, day(2026, 2, 1)),
        ("2", "jane.smith@example.com", SubscriberStatus::Active, day(2026, 2, 3)),
        ("3", "bob.wilson@example.com", SubscriberStatus::Active, day(2026, 2, 5)),
        ("4", "alice.brown@example.com", SubscriberStatus::Active, day(2026, 2, 6)),
        ("5", "charlie.davis@example.com", SubscriberStatus::Inactive, day(2026, 1, 28)),
    ]
    .into_iter()
    .map(|(id, email, status, subscribed)| Subscriber {
        id: id.to_string(),
        email: email.to_string(),
        status,
        subscribed,
    })
    .collect()
}

pub fn mock_messages() -> Vec<ContactMessage> {
    vec![
        ContactMessage {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            subject: "Question about Python tutorial".to_string(),
            body: "Hi, I have a question about the Python functions tutorial. Could you please \
                   clarify how decorators work? I'm having trouble understanding the concept. \
                   Thank you!"
                .to_string(),
            status: MessageStatus::Unread,
            received: day(2026, 2, 8),
        },
        ContactMessage {
            id: "2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            subject: "Great content!".to_string(),
            body: "I just wanted to say thank you for creating such amazing programming \
                   tutorials. They have helped me learn so much. Keep up the great work!"
                .to_string(),
            status: MessageStatus::Read,
            received: day(2026, 2, 7),
        },
        ContactMessage {
            id: "3".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Wilson".to_string(),
            email: "bob.wilson@example.com".to_string(),
            subject: "Suggestion for new tutorial".to_string(),
            body: "Would it be possible to add a tutorial on async/await in JavaScript? I think \
                   many beginners would find it helpful. Thanks!"
                .to_string(),
            status: MessageStatus::Unread,
            received: day(2026, 2, 6),
        },
    ]
}
