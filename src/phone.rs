use std::fmt::Display;

use serde::Serialize;

pub const COUNTRY_CODE: &str = "+972";

/// Canonical comparison key for a phone number. Never fails: malformed input
/// still yields a key, it just won't match any account.
pub fn normalize(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if compact.starts_with(COUNTRY_CODE) {
        return compact;
    }

    match compact.strip_prefix('0') {
        Some(rest) if !rest.starts_with('0') => format!("{COUNTRY_CODE}{rest}"),
        _ => compact,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Phone {
    fn from(raw: &str) -> Self {
        Self(normalize(raw))
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
