//! Password strength meter shown during signup.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// One point each for length >= 8, length >= 12, mixed case, a digit and a symbol.
    #[must_use]
    pub fn score(password: &str) -> u8 {
        let length = password.chars().count();
        let checks = [
            length >= 8,
            length >= 12,
            password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        checks.into_iter().map(u8::from).sum()
    }

    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        match Self::score(password) {
            0..=2 => Self::Weak,
            3 => Self::Medium,
            _ => Self::Strong,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weak => f.write_str("Weak"),
            Self::Medium => f.write_str("Medium"),
            Self::Strong => f.write_str("Strong"),
        }
    }
}
