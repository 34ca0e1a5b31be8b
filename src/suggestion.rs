//! Password improvement suggestions.
//!
//! The game only talks to a [`PasswordAdvisor`]. [`LocalAdvisor`] is a
//! deterministic, offline implementation that applies simple composition
//! rules; it does not estimate strength.

use thiserror::Error;

const MIN_LENGTH: usize = 12;
const SYMBOLS: &[char] = &['!', '@', '#', '$', '%', '&', '*', '?'];
const PADDING: &str = "Vq7#Lm2$Xz9&Rk4!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub replacement: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("nothing to improve: the password is empty")]
    EmptyPassword,

    #[error("suggestion service unavailable: {0}")]
    Unavailable(String),
}

pub trait PasswordAdvisor {
    /// # Errors
    ///
    /// Implementations report failures as `SuggestionError`.
    fn suggest(&self, password: &str) -> Result<Suggestion, SuggestionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAdvisor;

impl PasswordAdvisor for LocalAdvisor {
    fn suggest(&self, password: &str) -> Result<Suggestion, SuggestionError> {
        if password.is_empty() {
            return Err(SuggestionError::EmptyPassword);
        }

        let mut chars: Vec<char> = password.chars().collect();
        let mut changes = Vec::new();
        // Seed for picking digits and symbols so the same input gives the same output.
        let seed: usize = chars.iter().map(|&c| c as usize).sum();

        if !chars.iter().any(char::is_ascii_uppercase) {
            if let Some(c) = chars.iter_mut().find(|c| c.is_ascii_lowercase()) {
                *c = c.to_ascii_uppercase();
                changes.push(format!("capitalised '{c}'"));
            } else {
                let extra = char::from(b'A' + (seed % 26) as u8);
                chars.push(extra);
                changes.push(format!("added the uppercase letter '{extra}'"));
            }
        }

        if !chars.iter().any(char::is_ascii_lowercase) {
            let extra = char::from(b'a' + ((seed / 7) % 26) as u8);
            chars.push(extra);
            changes.push(format!("added the lowercase letter '{extra}'"));
        }

        if !chars.iter().any(char::is_ascii_digit) {
            let extra = char::from(b'0' + (seed % 10) as u8);
            chars.push(extra);
            changes.push(format!("added the digit '{extra}'"));
        }

        if chars.iter().all(|c| c.is_alphanumeric()) {
            let extra = SYMBOLS[seed % SYMBOLS.len()];
            chars.push(extra);
            changes.push(format!("added the symbol '{extra}'"));
        }

        if chars.len() < MIN_LENGTH {
            let missing = MIN_LENGTH - chars.len();
            chars.extend(
                PADDING
                    .chars()
                    .cycle()
                    .skip(seed % PADDING.len())
                    .take(missing),
            );
            changes.push(format!("lengthened it to {MIN_LENGTH} characters"));
        }

        let explanation = if changes.is_empty() {
            "Already mixes cases, digits and symbols at a reasonable length; \
             avoid reusing it across sites."
                .to_string()
        } else {
            format!("Suggested changes: {}.", changes.join("; "))
        };

        Ok(Suggestion {
            replacement: chars.into_iter().collect(),
            explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition(s: &str) -> (bool, bool, bool, bool) {
        (
            s.chars().any(|c| c.is_ascii_uppercase()),
            s.chars().any(|c| c.is_ascii_lowercase()),
            s.chars().any(|c| c.is_ascii_digit()),
            s.chars().any(|c| !c.is_alphanumeric()),
        )
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(LocalAdvisor.suggest(""), Err(SuggestionError::EmptyPassword));
    }

    #[test]
    fn test_weak_password_gets_every_class() {
        let suggestion = LocalAdvisor.suggest("password").unwrap();
        assert_eq!(composition(&suggestion.replacement), (true, true, true, true));
        assert!(suggestion.replacement.chars().count() >= MIN_LENGTH);
        assert!(suggestion.replacement.starts_with("Password"));
        assert!(suggestion.explanation.starts_with("Suggested changes"));
    }

    #[test]
    fn test_digits_only() {
        let suggestion = LocalAdvisor.suggest("123456").unwrap();
        assert_eq!(composition(&suggestion.replacement), (true, true, true, true));
        assert!(suggestion.replacement.starts_with("123456"));
    }

    #[test]
    fn test_strong_password_unchanged() {
        let strong = "Tr0ub4dor&3-Horse";
        let suggestion = LocalAdvisor.suggest(strong).unwrap();
        assert_eq!(suggestion.replacement, strong);
        assert!(suggestion.explanation.starts_with("Already"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(LocalAdvisor.suggest("qwerty"), LocalAdvisor.suggest("qwerty"));
    }
}
