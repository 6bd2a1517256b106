//! Line-oriented field extraction from profile front matter.
//!
//! Profiles are YAML, but they are read with literal label patterns rather
//! than a YAML parser: the event log was always produced that way and new
//! events must agree with it. A label matches anywhere in the text (first
//! occurrence wins), the value runs to the end of that line, a line only
//! counts when a newline terminates it, and carriage returns are dropped
//! from the value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Compiled label patterns, shared by every extractor.
static PATTERNS: Lazy<FieldPatterns> = Lazy::new(FieldPatterns::new);

struct FieldPatterns {
    uid: Regex,
    name: Regex,
    alias: Regex,
    team: Regex,
    github_labeled: Regex,
    github_url: Regex,
    twitter_legacy: Regex,
    twitter_labeled: Regex,
    twitter_url: Regex,
    twitter_or_x_url: Regex,
}

impl FieldPatterns {
    fn new() -> Self {
        Self {
            uid: Regex::new(r"uid: (?P<value>.*)\n").expect("valid uid pattern"),
            name: Regex::new(r"name: (?P<value>.*)\n").expect("valid name pattern"),
            alias: Regex::new(r"ms.author: (?P<value>.*)\n").expect("valid alias pattern"),
            team: Regex::new(r"team: (?P<value>.*)\n").expect("valid team pattern"),
            github_labeled: Regex::new(r"github: (http|https)://github.com/(?P<value>.*)\n")
                .expect("valid github pattern"),
            github_url: Regex::new(r"    url: (http|https)://github.com/(?P<value>.*)\n")
                .expect("valid github url pattern"),
            // Historical form: the GitHub label with a twitter.com host.
            twitter_legacy: Regex::new(r"github: (http|https)://twitter.com/(?P<value>.*)\n")
                .expect("valid legacy twitter pattern"),
            twitter_labeled: Regex::new(
                r"twitter: (http|https)://(twitter|x)\.com/(?P<value>.*)\n",
            )
            .expect("valid twitter pattern"),
            twitter_url: Regex::new(r"    url: (http|https)://twitter.com/(?P<value>.*)\n")
                .expect("valid twitter url pattern"),
            twitter_or_x_url: Regex::new(
                r"    url: (http|https)://(twitter|x)\.com/(?P<value>.*)\n",
            )
            .expect("valid twitter/x url pattern"),
        }
    }
}

/// Which label the first Twitter URL form is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TwitterLabel {
    /// `github: <scheme>://twitter.com/<handle>`, exactly as the existing
    /// log was produced. Keeps new events consistent with old ones.
    #[default]
    Legacy,
    /// `twitter: <scheme>://twitter.com/<handle>`; `x.com` hosts are
    /// accepted in both forms.
    Twitter,
}

impl TwitterLabel {
    /// Config/CLI spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Twitter => "twitter",
        }
    }
}

impl std::str::FromStr for TwitterLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "twitter" => Ok(Self::Twitter),
            other => Err(format!(
                "unknown twitter label mode '{other}' (expected 'legacy' or 'twitter')"
            )),
        }
    }
}

/// Fields read from one profile. Unknown values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    /// `uid:` value.
    pub uid: String,
    /// `name:` value.
    pub name: String,
    /// `ms.author:` value.
    pub alias: String,
    /// `team:` value.
    pub team: String,
    /// Path segment after `github.com/`.
    pub github_user_name: String,
    /// Path segment after `twitter.com/`.
    pub twitter_handle: String,
}

/// Reads [`ProfileFields`] out of profile text. Never fails.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    twitter: TwitterLabel,
}

impl FieldExtractor {
    /// Create an extractor using the given Twitter label mode.
    #[must_use]
    pub fn new(twitter: TwitterLabel) -> Self {
        match twitter {
            TwitterLabel::Legacy => {
                tracing::debug!(mode = twitter.as_str(), "Twitter handles read from legacy github: label");
            }
            TwitterLabel::Twitter => {
                tracing::info!(
                    mode = twitter.as_str(),
                    "Twitter handles read from twitter: label; results may differ from events already in the log"
                );
            }
        }
        Self { twitter }
    }

    /// The active Twitter label mode.
    #[must_use]
    pub const fn twitter_label(&self) -> TwitterLabel {
        self.twitter
    }

    /// Extract every known field.
    #[must_use]
    pub fn extract(&self, text: &str) -> ProfileFields {
        let p = &*PATTERNS;
        ProfileFields {
            uid: capture(&p.uid, text),
            name: capture(&p.name, text),
            alias: capture(&p.alias, text),
            team: capture(&p.team, text),
            github_user_name: first_non_empty(&p.github_labeled, &p.github_url, text),
            twitter_handle: match self.twitter {
                TwitterLabel::Legacy => first_non_empty(&p.twitter_legacy, &p.twitter_url, text),
                TwitterLabel::Twitter => {
                    first_non_empty(&p.twitter_labeled, &p.twitter_or_x_url, text)
                }
            },
        }
    }

    /// Read only the `uid:` value.
    #[must_use]
    pub fn read_uid(text: &str) -> String {
        capture(&PATTERNS.uid, text)
    }
}

fn capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().replace('\r', ""))
        .unwrap_or_default()
}

fn first_non_empty(primary: &Regex, fallback: &Regex, text: &str) -> String {
    let value = capture(primary, text);
    if value.is_empty() {
        capture(fallback, text)
    } else {
        value
    }
}
