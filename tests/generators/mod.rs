//! Synthetic profile and event generators.
//!
//! Profiles follow the layout of the real profile tree: a `YamlMime`
//! header, `uid`/`name` at the top, alias and team under `metadata`, and
//! social links under `connect`.

#![allow(dead_code)]

use advocate_events::model::{
    AdvocateAdded, AdvocateEvent, AdvocateModified, AdvocateRemoved, EventDate,
};
use chrono::{DateTime, Duration};

/// One synthetic advocate.
#[derive(Debug, Clone)]
pub struct Person {
    /// Stable UID.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Corporate alias.
    pub alias: String,
    /// GitHub user name.
    pub github: String,
    /// Team.
    pub team: String,
    /// Twitter handle, if linked.
    pub twitter: Option<String>,
}

impl Person {
    /// Deterministic person number `n`.
    pub fn numbered(n: usize) -> Self {
        Self {
            uid: format!("advocates.person-{n}"),
            name: format!("Person {n}"),
            alias: format!("pers{n}"),
            github: format!("person{n}"),
            team: ["cloud", "web", "data"][n % 3].to_string(),
            twitter: (n % 2 == 0).then(|| format!("person_{n}")),
        }
    }

    /// Profile file path under the default subtree.
    pub fn path(&self) -> String {
        format!("advocates/{}.yml", self.github)
    }

    /// Profile text.
    pub fn profile(&self) -> String {
        let mut text = format!(
            "### YamlMime:Profile\n\
             uid: {}\n\
             name: {}\n\
             metadata:\n  \
               title: {} - Cloud Advocate\n  \
               ms.author: {}\n  \
               team: {}\n\
             connect:\n  \
               - title: GitHub\n    \
                 url: https://github.com/{}\n",
            self.uid, self.name, self.name, self.alias, self.team, self.github
        );
        if let Some(twitter) = &self.twitter {
            text.push_str(&format!(
                "  - title: Twitter\n    url: https://twitter.com/{twitter}\n"
            ));
        }
        text
    }
}

/// Base date of generated events.
pub fn epoch() -> EventDate {
    DateTime::parse_from_rfc3339("2019-01-01T09:00:00-08:00").expect("valid epoch")
}

/// A log with `people` advocates: each is added, every third is modified
/// (moving to a new file) and every fifth is removed afterwards.
pub fn event_stream(people: usize) -> Vec<AdvocateEvent> {
    let mut events = Vec::new();
    let mut minute = 0;
    let mut next = || {
        minute += 1;
        epoch() + Duration::minutes(minute)
    };

    for n in 0..people {
        let person = Person::numbered(n);
        events.push(
            AdvocateAdded {
                name: person.name.clone(),
                github_user_name: person.github.clone(),
                team: person.team.clone(),
                alias: person.alias.clone(),
                twitter_handle: person.twitter.clone().unwrap_or_default(),
                uid: person.uid.clone(),
                event_date: next(),
                file_name: person.path(),
            }
            .into(),
        );
    }

    for n in (0..people).step_by(3) {
        let person = Person::numbered(n);
        events.push(
            AdvocateModified {
                new_name: format!("{} (renamed)", person.name),
                new_github_user_name: person.github.clone(),
                new_team: "devrel".to_string(),
                new_alias: person.alias.clone(),
                new_twitter_handle: String::new(),
                new_uid: person.uid.clone(),
                new_file_name: format!("advocates/moved-{}.yml", person.github),
                uid: person.uid.clone(),
                event_date: next(),
                file_name: person.path(),
            }
            .into(),
        );
    }

    for n in (0..people).step_by(5) {
        let person = Person::numbered(n);
        let file_name = if n % 3 == 0 {
            format!("advocates/moved-{}.yml", person.github)
        } else {
            person.path()
        };
        events.push(
            AdvocateRemoved {
                uid: person.uid.clone(),
                event_date: next(),
                file_name,
            }
            .into(),
        );
    }

    events
}
