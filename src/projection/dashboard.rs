//! Dashboard view: everyone who was ever in the tree, with join and leave
//! dates.

use super::{Aggregate, Removal};
use crate::model::{AdvocateAdded, AdvocateModified, AdvocateRemoved, DashboardAdvocate};

impl Aggregate for DashboardAdvocate {
    const VIEW: &'static str = "dashboard";

    fn uid(&self) -> &str {
        &self.uid
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn added(event: &AdvocateAdded) -> Self {
        Self {
            uid: event.uid.clone(),
            file_name: event.file_name.clone(),
            github_user_name: event.github_user_name.clone(),
            team: event.team.clone(),
            alias: event.alias.clone(),
            name: event.name.clone(),
            reddit_user_name: String::new(),
            added_date: Some(event.event_date),
            removed_date: None,
        }
    }

    /// A removed advocate who comes back is listed as active again.
    fn readded(&mut self, event: &AdvocateAdded) -> bool {
        if self.is_active() {
            return false;
        }
        *self = Self {
            reddit_user_name: std::mem::take(&mut self.reddit_user_name),
            ..Self::added(event)
        };
        true
    }

    fn synthesized() -> Self {
        Self::default()
    }

    fn modified(&mut self, event: &AdvocateModified) {
        self.uid.clone_from(&event.new_uid);
        self.file_name.clone_from(&event.new_file_name);
        self.github_user_name.clone_from(&event.new_github_user_name);
        self.team.clone_from(&event.new_team);
        self.alias.clone_from(&event.new_alias);
        self.name.clone_from(&event.new_name);
        // Synthesized rows are first seen here.
        if self.added_date.is_none() {
            self.added_date = Some(event.event_date);
        }
    }

    fn removed(&mut self, event: &AdvocateRemoved) -> Removal {
        self.removed_date = Some(event.event_date);
        Removal::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::ProjectionEngine;
    use crate::model::{CurrentAdvocate, DashboardAdvocate};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removed_is_stamped_not_deleted() {
        let events = vec![added("a", "advocates/a.yml", 1), removed("a", "advocates/a.yml", 3)];

        let dashboard = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        assert_eq!(dashboard.items.len(), 1);
        assert_eq!(dashboard.items[0].added_date, Some(at(1)));
        assert_eq!(dashboard.items[0].removed_date, Some(at(3)));
        assert!(!dashboard.items[0].is_active());

        let current = ProjectionEngine::fold::<CurrentAdvocate>(&events);
        assert!(current.items.is_empty());
    }

    #[test]
    fn test_readded_reactivates() {
        let events = vec![
            added("a", "advocates/a.yml", 1),
            removed("a", "advocates/a.yml", 2),
            added("a", "advocates/a.yml", 5),
        ];
        let dashboard = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        assert_eq!(dashboard.items.len(), 1);
        assert_eq!(dashboard.items[0].added_date, Some(at(5)));
        assert_eq!(dashboard.items[0].removed_date, None);
    }

    #[test]
    fn test_duplicate_added_while_active_keeps_first_date() {
        let events = vec![added("a", "advocates/a.yml", 1), added("a", "advocates/a.yml", 4)];
        let dashboard = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        assert_eq!(dashboard.items[0].added_date, Some(at(1)));
    }

    #[test]
    fn test_synthesized_row_gets_added_date() {
        let events = vec![modified("m", "advocates/m.yml", "m", "advocates/m.yml", 7)];
        let dashboard = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        assert_eq!(dashboard.items[0].added_date, Some(at(7)));
        assert_eq!(dashboard.items[0].alias, "m-alias");
    }

    #[test]
    fn test_publishable_filters_incomplete_rows() {
        let mut events = vec![added("a", "advocates/a.yml", 1)];
        if let crate::model::AdvocateEvent::Added(mut anonymous) = added("b", "advocates/b.yml", 2) {
            anonymous.alias = String::new();
            events.push(anonymous.into());
        }
        let dashboard = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        assert_eq!(dashboard.items.len(), 2);
        let publishable = dashboard.publishable();
        assert_eq!(publishable.len(), 1);
        assert_eq!(publishable[0].alias, "a-alias");

        let json = dashboard.publishable_json().unwrap();
        assert!(json.contains(r#""AddedDate":"2020-01-01T12:00:00+00:00""#));
        assert!(!json.contains("b-gh"));
    }
}
