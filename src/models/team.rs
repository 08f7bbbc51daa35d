//! Team model.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// A participant in a competition. Identity only, no behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Caller-assigned identifier
    pub id: TeamId,

    /// Display name
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let team = Team::new("lions", "Lions FC");
        assert_eq!(team.id.as_str(), "lions");
        assert_eq!(team.name, "Lions FC");
    }

    #[test]
    fn test_team_deserialization() {
        let team: Team = serde_json::from_str(r#"{"id":"t1","name":"Team One"}"#).unwrap();
        assert_eq!(team, Team::new("t1", "Team One"));
    }
}
