use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::client::AdminSession;
use crate::domain::EduError;

pub const KEY_THEME: &str = "theme";
pub const KEY_IS_ADMIN: &str = "isAdmin";
pub const KEY_ADMIN_TOKEN: &str = "adminToken";
pub const KEY_ADMIN_USERNAME: &str = "adminUsername";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Client-side key/value state.
///
/// Durable keys are written to a YAML file on every change and survive
/// restarts; session keys live only as long as the process.
pub struct ClientStore {
    path: Option<PathBuf>,
    durable: BTreeMap<String, String>,
    session: HashMap<String, String>,
}

impl ClientStore {
    /// Opens the store backed by `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, EduError> {
        let durable = if path.is_file() {
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened client state {} ({} keys)", path.display(), durable.len());
        Ok(ClientStore {
            path: Some(path.to_path_buf()),
            durable,
            session: HashMap::new(),
        })
    }

    pub fn in_memory() -> Self {
        ClientStore {
            path: None,
            durable: BTreeMap::new(),
            session: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.durable.get(key).map(String::as_str)
    }

    pub fn session_get(&self, key: &str) -> Option<&str> {
        self.session.get(key).map(String::as_str)
    }

    pub fn theme(&self) -> Theme {
        match self.get(KEY_THEME) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, EduError> {
        let theme = self.theme().toggle();
        self.durable.insert(KEY_THEME.into(), theme.as_str().into());
        self.save()?;
        trace!("Theme is now {}", theme.as_str());
        Ok(theme)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get(KEY_IS_ADMIN) == Some("true")
            || self.session_get(KEY_ADMIN_TOKEN) == Some("authenticated")
    }

    pub fn admin_username(&self) -> Option<&str> {
        self.session_get(KEY_ADMIN_USERNAME)
    }

    pub fn login(&mut self, session: &AdminSession) -> Result<(), EduError> {
        self.durable.insert(KEY_IS_ADMIN.into(), "true".into());
        self.session.insert(KEY_ADMIN_TOKEN.into(), "authenticated".into());
        self.session
            .insert(KEY_ADMIN_USERNAME.into(), session.username.clone());
        self.save()?;
        info!("Stored admin session for {}", session.username);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), EduError> {
        self.durable.remove(KEY_IS_ADMIN);
        self.session.remove(KEY_ADMIN_TOKEN);
        self.session.remove(KEY_ADMIN_USERNAME);
        self.save()?;
        info!("Cleared admin session");
        Ok(())
    }

    fn save(&self) -> Result<(), EduError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(&self.durable)?)?;
        Ok(())
    }
}
