//! Interface language selection and change notifications.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::broadcast;

/// Supported interface languages: ISO 639-1 code and native name.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("EN", "English"),
    ("DE", "Deutsch"),
    ("ES", "Español"),
    ("FR", "Français"),
    ("IT", "Italiano"),
    ("NL", "Nederlands"),
    ("PL", "Polski"),
    ("PT", "Português"),
    ("RU", "Русский"),
    ("SV", "Svenska"),
    ("JA", "日本語"),
    ("ZH", "中文"),
];

/// Localization errors.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Read access to the active language.
pub trait Localization: Send + Sync {
    /// ISO 639-1 code of the active language, e.g. "EN".
    fn language_code(&self) -> String;
}

/// Holds the active language and notifies subscribers when it changes.
pub struct I18nService {
    current: Mutex<usize>,
    changed_tx: broadcast::Sender<()>,
}

impl I18nService {
    /// Create the service, falling back to English for unknown codes.
    pub fn new(code: &str) -> Self {
        let index = position(code).unwrap_or_else(|| {
            tracing::warn!("Unsupported language {}, using English", code);
            0
        });
        let (changed_tx, _) = broadcast::channel(16);

        Self {
            current: Mutex::new(index),
            changed_tx,
        }
    }

    /// Subscribe to language changes.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changed_tx.subscribe()
    }

    /// Display name of the active language.
    pub fn language_name(&self) -> &'static str {
        LANGUAGES[self.index()].1
    }

    /// Switch to a language. Notifies only when the language actually changes.
    pub fn set_language(&self, code: &str) -> Result<(), I18nError> {
        let index = position(code).ok_or_else(|| I18nError::UnsupportedLanguage(code.into()))?;
        self.switch_to(index);
        Ok(())
    }

    /// Move to the next supported language and return its code.
    pub fn cycle_language(&self) -> &'static str {
        let next = (self.index() + 1) % LANGUAGES.len();
        self.switch_to(next);
        LANGUAGES[next].0
    }

    fn switch_to(&self, index: usize) {
        let changed = {
            let mut current = match self.current.lock() {
                Ok(current) => current,
                Err(poisoned) => poisoned.into_inner(),
            };
            let changed = *current != index;
            *current = index;
            changed
        };

        if changed {
            tracing::info!("Language changed to {}", LANGUAGES[index].0);
            // No subscribers is fine
            let _ = self.changed_tx.send(());
        }
    }

    fn index(&self) -> usize {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Localization for I18nService {
    fn language_code(&self) -> String {
        LANGUAGES[self.index()].0.to_string()
    }
}

fn position(code: &str) -> Option<usize> {
    LANGUAGES
        .iter()
        .position(|(c, _)| c.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_falls_back_to_english() {
        let i18n = I18nService::new("xx");
        assert_eq!(i18n.language_code(), "EN");
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let i18n = I18nService::new("fr");
        assert_eq!(i18n.language_code(), "FR");
        assert_eq!(i18n.language_name(), "Français");
    }

    #[tokio::test]
    async fn test_change_notifies_once() {
        let i18n = I18nService::new("EN");
        let mut rx = i18n.subscribe();

        i18n.set_language("DE").unwrap();
        i18n.set_language("DE").unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejects_unsupported() {
        let i18n = I18nService::new("EN");
        assert!(matches!(
            i18n.set_language("KL"),
            Err(I18nError::UnsupportedLanguage(_))
        ));
        assert_eq!(i18n.language_code(), "EN");
    }

    #[test]
    fn test_cycle_wraps() {
        let (last, _) = LANGUAGES[LANGUAGES.len() - 1];
        let i18n = I18nService::new(last);
        assert_eq!(i18n.cycle_language(), "EN");
    }
}
