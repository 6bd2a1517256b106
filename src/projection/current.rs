//! Current-state view: who is in the tree right now.

use super::{Aggregate, Removal};
use crate::model::{AdvocateAdded, AdvocateModified, AdvocateRemoved, CurrentAdvocate};

impl Aggregate for CurrentAdvocate {
    const VIEW: &'static str = "current";

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
            name: event.name.clone(),
            github_user_name: event.github_user_name.clone(),
            team: event.team.clone(),
            alias: event.alias.clone(),
            twitter_handle: event.twitter_handle.clone(),
        }
    }

    fn synthesized() -> Self {
        Self::default()
    }

    fn modified(&mut self, event: &AdvocateModified) {
        self.uid.clone_from(&event.new_uid);
        self.file_name.clone_from(&event.new_file_name);
        self.name.clone_from(&event.new_name);
        self.github_user_name.clone_from(&event.new_github_user_name);
        self.team.clone_from(&event.new_team);
        self.alias.clone_from(&event.new_alias);
        self.twitter_handle.clone_from(&event.new_twitter_handle);
    }

    fn removed(&mut self, _event: &AdvocateRemoved) -> Removal {
        Removal::Drop
    }
}
