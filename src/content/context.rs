use crate::content::models::Language;
use tracing::info;

const LOG_TARGET: &str = "lectio_player::content::context";

/// Per-session language and identity, handed to the resolver at call time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    language: Language,
    access_token: Option<String>,
}

impl SessionContext {
    pub fn new(language: Language, access_token: Option<String>) -> Self {
        Self { language, access_token }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns true when the language actually changed, meaning content must be re-resolved.
    pub fn set_language(&mut self, language: Language) -> bool {
        if self.language == language {
            return false;
        }
        info!(target: LOG_TARGET, from = %self.language, to = %language, "Session language changed");
        self.language = language;
        true
    }

    pub fn set_access_token(&mut self, access_token: Option<String>) {
        self.access_token = access_token;
    }
}
