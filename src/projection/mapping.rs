//! Account mappings read from a persisted projection.

use std::collections::HashSet;

use crate::error::{AdvocateError, Result};
use crate::model::AdvocateMapping;

/// Drop repeated mappings, keeping the first occurrence of each.
pub fn dedup_mappings(mappings: impl IntoIterator<Item = AdvocateMapping>) -> Vec<AdvocateMapping> {
    let mut seen = HashSet::new();
    mappings
        .into_iter()
        .filter(|mapping| seen.insert(mapping.clone()))
        .collect()
}

/// Parse a projection array (current or dashboard) as mappings.
///
/// Properties other than the mapping fields are ignored.
pub fn mappings_from_json(text: &str) -> Result<Vec<AdvocateMapping>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mappings: Vec<AdvocateMapping> =
        serde_json::from_str(text).map_err(|e| AdvocateError::SerializationError {
            context: "Failed to parse advocate projection".to_string(),
            source: e,
        })?;
    Ok(dedup_mappings(mappings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CurrentAdvocate;
    use crate::projection::{fixtures::added, ProjectionEngine};

    #[test]
    fn test_mappings_from_current_projection() {
        let text = r#"[
            {"UID":"1","FileName":"a.yml","Name":"A","GitHubUserName":"octo","Team":"Cloud","Alias":"oc","TwitterHandle":"t"},
            {"UID":"2","FileName":"b.yml","Name":"Other","GitHubUserName":"octo","Team":"Cloud","Alias":"oc","TwitterHandle":""},
            {"UID":"3","FileName":"c.yml","Name":"C","GitHubUserName":"cat","Team":"Web","Alias":"ca","TwitterHandle":""}
        ]"#;
        let mappings = mappings_from_json(text).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].name, "A");
        assert_eq!(mappings[1].github_user_name, "cat");
    }

    #[test]
    fn test_mappings_from_projection() {
        let events = vec![added("a", "advocates/a.yml", 1), added("b", "advocates/b.yml", 2)];
        let mappings = ProjectionEngine::fold::<CurrentAdvocate>(&events).mappings();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].alias, "a-alias");
    }

    #[test]
    fn test_invalid_projection_is_an_error() {
        assert!(mappings_from_json("{}").is_err());
    }
}
