use regex::Regex;

use crate::ParseError;

/// One recognized line of a profile export. Values are raw: no unescaping
/// and no numeric coercion happen here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLine<'a> {
    AccountType {
        id: &'a str,
        value: &'a str,
    },
    DisplayName {
        id: &'a str,
        value: &'a str,
    },
    PersonalBest {
        id: &'a str,
        boss: &'a str,
        value: &'a str,
    },
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    account_type: Regex,
    display_name: Regex,
    personal_best: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            account_type: key_pattern(r"^rsprofile\.rsprofile\.([A-Za-z0-9_]+)\.type$")?,
            display_name: key_pattern(r"^rsprofile\.rsprofile\.([A-Za-z0-9_]+)\.displayName$")?,
            // The boss label is the whole remainder of the key and may contain dots.
            personal_best: key_pattern(r"^personalbest\.rsprofile\.([A-Za-z0-9_]+)\.(.+)$")?,
        })
    }

    /// Matches a trimmed, non-comment line against the three known shapes in
    /// priority order. Anything else returns `None`.
    pub fn classify<'a>(&self, line: &'a str) -> Option<ProfileLine<'a>> {
        let (key, value) = split_key_value(line)?;
        let key = key.trim_end();
        let value = value.trim();

        if let Some(caps) = self.account_type.captures(key) {
            let id = caps.get(1)?.as_str();
            return (!value.is_empty()).then_some(ProfileLine::AccountType { id, value });
        }

        if let Some(caps) = self.display_name.captures(key) {
            let id = caps.get(1)?.as_str();
            return (!value.is_empty()).then_some(ProfileLine::DisplayName { id, value });
        }

        if let Some(caps) = self.personal_best.captures(key) {
            let id = caps.get(1)?.as_str();
            let boss = caps.get(2)?.as_str();
            return Some(ProfileLine::PersonalBest { id, boss, value });
        }

        None
    }
}

fn key_pattern(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern)
        .map_err(|e| ParseError::new("E1001", format!("invalid key pattern {pattern}: {e}")))
}

/// Splits at the first `=` that is not escaped with a backslash.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}
