//! Pattern rules: character-class and format checks applied to text values.
//!
//! Each built-in pattern carries the message screens show when it fails.
//! Custom patterns are compiled once when the rule is built; a pattern that
//! does not compile is rejected there rather than at validation time.

use crate::error::{FormError, Result};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

// ═══════════════════════════════════════════════════════════════════════════════
// Pre-compiled Regex Patterns
// ═══════════════════════════════════════════════════════════════════════════════

/// Lowercase letters, digits and inner hyphens (resource names).
static ALPHA_NUM_LOWER_HYPHEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("Invalid alphanumeric-lower regex")
});

/// Letters, digits, inner spaces and hyphens; must start and end alphanumeric.
static ALPHA_NUM_SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9- ]*[a-zA-Z0-9])?$")
        .expect("Invalid alphanumeric-space regex")
});

static ALPHA_NUM_SPACE_HYPHEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9 -]*$").expect("Invalid alphanumeric-space-hyphen regex")
});

static ALPHA_NUM_EXTENDED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9 .:/_-]*$").expect("Invalid extended alphanumeric regex")
});

static ALPHABETIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z ]+$").expect("Invalid alphabetic regex"));

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("Invalid numeric regex"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("Invalid email regex")
});

/// Free-text notes sent along with emails.
static EMAIL_NOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.,;_@:\- ]+$").expect("Invalid email note regex")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_\+.~#?&/=]*)$"
    ).expect("Invalid URL regex")
});

/// Dotted quad with an optional `/0`..`/32` prefix length.
static IPV4_CIDR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])(/(3[0-2]|[1-2]?[0-9]))?$",
    )
    .expect("Invalid IPv4 regex")
});

/// Card networks accepted by the payment screens, matched on the digits only.
static CARD_NETWORK_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("visa", r"^4[0-9]{12}(?:[0-9]{3})?$"),
        (
            "mastercard",
            r"^(?:5[1-5][0-9]{14}|(?:222[1-9]|22[3-9][0-9]|2[3-6][0-9]{2}|27[01][0-9]|2720)[0-9]{12})$",
        ),
        ("amex", r"^3[47][0-9]{13}$"),
        ("discover", r"^6(?:011|5[0-9]{2}|4[4-9][0-9])[0-9]{12}$"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("Invalid card network regex")))
    .collect()
});

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern Kinds
// ═══════════════════════════════════════════════════════════════════════════════

/// The patterns a `Rule::Pattern` can enforce.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Lowercase letters, digits and `-`, starting and ending alphanumeric.
    AlphaNumericLowerHyphen,
    /// Letters, digits, spaces and `-`, starting and ending alphanumeric.
    AlphaNumericSpace,
    /// Letters, digits, spaces and `-` anywhere.
    AlphaNumericSpaceHyphen,
    /// Letters, digits, spaces and `- _ . : /`.
    AlphaNumericExtended,
    /// Letters and spaces only.
    Alphabetic,
    /// Decimal digits only.
    NumericOnly,
    Email,
    /// Letters, digits, spaces and `. , ; : @ _ -`.
    EmailNote,
    Url,
    /// An IPv4 address or CIDR block, or the literal `any`.
    Ipv4Cidr,
    /// A payment card number of a supported network that passes the Luhn check.
    CreditCard,
    /// A caller-supplied regular expression.
    Custom(CustomPattern),
}

impl PatternKind {
    /// Build a custom pattern, compiling the expression.
    pub fn custom(pattern: &str) -> Result<Self> {
        Ok(Self::Custom(CustomPattern::new(pattern)?))
    }

    /// Look up a built-in pattern by its template name.
    pub fn builtin(name: &str) -> Option<Self> {
        let kind = match name {
            "alpha_numeric_lower_hyphen" => Self::AlphaNumericLowerHyphen,
            "alpha_numeric_space" => Self::AlphaNumericSpace,
            "alpha_numeric_space_hyphen" => Self::AlphaNumericSpaceHyphen,
            "alpha_numeric_extended" => Self::AlphaNumericExtended,
            "alphabetic" => Self::Alphabetic,
            "numeric_only" => Self::NumericOnly,
            "email" => Self::Email,
            "email_note" => Self::EmailNote,
            "url" => Self::Url,
            "ipv4_cidr" => Self::Ipv4Cidr,
            "credit_card" => Self::CreditCard,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether values checked by this pattern should be kept out of logs.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::CreditCard)
    }

    /// Check `text`, returning the failure message if it does not match.
    pub fn failure(&self, text: &str, label: &str) -> Option<String> {
        let matched = match self {
            Self::AlphaNumericLowerHyphen => ALPHA_NUM_LOWER_HYPHEN_REGEX.is_match(text),
            Self::AlphaNumericSpace => ALPHA_NUM_SPACE_REGEX.is_match(text),
            Self::AlphaNumericSpaceHyphen => ALPHA_NUM_SPACE_HYPHEN_REGEX.is_match(text),
            Self::AlphaNumericExtended => ALPHA_NUM_EXTENDED_REGEX.is_match(text),
            Self::Alphabetic => ALPHABETIC_REGEX.is_match(text),
            Self::NumericOnly => NUMERIC_REGEX.is_match(text),
            Self::Email => EMAIL_REGEX.is_match(text),
            Self::EmailNote => EMAIL_NOTE_REGEX.is_match(text),
            Self::Url => URL_REGEX.is_match(text),
            Self::Ipv4Cidr => text == "any" || IPV4_CIDR_REGEX.is_match(text),
            Self::CreditCard => return credit_card_failure(text),
            Self::Custom(custom) => custom.regex.is_match(text),
        };

        if matched {
            None
        } else {
            Some(self.message(label))
        }
    }

    /// The message shown when this pattern fails for a field labelled `label`.
    pub fn message(&self, label: &str) -> String {
        match self {
            Self::AlphaNumericLowerHyphen => {
                format!("Only lower case alphanumeric and hypen(-) allowed for {}.", label)
            }
            Self::AlphaNumericSpace => {
                format!("Only alphanumeric, space and hyphen(-) allowed for {}.", label)
            }
            Self::AlphaNumericSpaceHyphen => {
                format!("Only alphanumeric, space and hypen(-) allowed for {}.", label)
            }
            Self::AlphaNumericExtended => format!(
                "Only alphanumeric, space and special characters(- _ . : /) allowed for {}.",
                label
            ),
            Self::Alphabetic => "Only letters from A-Z or a-z are allowed.".to_string(),
            Self::NumericOnly => format!("Only numbers are allowed for {}.", label),
            Self::Email => "Invalid email address.".to_string(),
            Self::EmailNote => {
                "Only alphanumeric characters, spaces and symbols (   .   ,   ;   :  @   _   -  ) are allowed."
                    .to_string()
            }
            Self::Url => "Invalid URL".to_string(),
            Self::Ipv4Cidr => "Invalid IP".to_string(),
            Self::CreditCard => "Invalid card.".to_string(),
            Self::Custom(custom) => custom
                .message
                .clone()
                .unwrap_or_else(|| format!("Invalid format for {}.", label)),
        }
    }

    /// Short description of the pattern.
    pub fn description(&self) -> String {
        match self {
            Self::AlphaNumericLowerHyphen => "lowercase alphanumeric with hyphens".to_string(),
            Self::AlphaNumericSpace => "alphanumeric with spaces and hyphens".to_string(),
            Self::AlphaNumericSpaceHyphen => "alphanumeric, spaces and hyphens".to_string(),
            Self::AlphaNumericExtended => "alphanumeric with - _ . : /".to_string(),
            Self::Alphabetic => "letters only".to_string(),
            Self::NumericOnly => "digits only".to_string(),
            Self::Email => "email address".to_string(),
            Self::EmailNote => "email note".to_string(),
            Self::Url => "URL".to_string(),
            Self::Ipv4Cidr => "IPv4 address or CIDR".to_string(),
            Self::CreditCard => "payment card number".to_string(),
            Self::Custom(custom) => format!("pattern: {}", custom.regex.as_str()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Custom Pattern
// ═══════════════════════════════════════════════════════════════════════════════

/// A compiled caller-supplied regular expression with an optional message.
#[derive(Clone)]
pub struct CustomPattern {
    regex: Arc<Regex>,
    message: Option<String>,
}

impl CustomPattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| FormError::invalid_pattern(pattern, e))?;
        Ok(Self {
            regex: Arc::new(regex),
            message: None,
        })
    }

    /// Replace the default failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for CustomPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPattern")
            .field("regex", &self.regex.as_str())
            .field("message", &self.message)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payment Cards
// ═══════════════════════════════════════════════════════════════════════════════

fn credit_card_failure(text: &str) -> Option<String> {
    if text.chars().any(|c| !(c.is_ascii_digit() || c == ' ' || c == '-')) {
        return Some("Invalid card.".to_string());
    }

    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if !luhn_valid(&digits) {
        return Some("Invalid card.".to_string());
    }
    if card_network(&digits).is_none() {
        return Some("Card is not allowed.".to_string());
    }
    None
}

/// The network a card number belongs to, if it is one the screens accept.
pub fn card_network(digits: &str) -> Option<&'static str> {
    CARD_NETWORK_REGEXES
        .iter()
        .find(|(_, regex)| regex.is_match(digits))
        .map(|(name, _)| *name)
}

/// Luhn (ISO/IEC 7812-1) checksum over a string of ASCII digits.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
