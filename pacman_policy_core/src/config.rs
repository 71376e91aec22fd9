use serde::{Deserialize, Serialize};

/// Distance thresholds and caps used by [`DecisionPolicy`](crate::policy::DecisionPolicy).
///
/// All distances are path distances in maze steps. Missing fields fall back to
/// the defaults when deserialized, so a config file only needs the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// A dangerous ghost closer than this triggers evasion.
    pub danger_distance: u32,
    /// A dangerous ghost closer than this makes a node close to fatal.
    pub very_dangerous_distance: u32,
    /// Edible ghosts closer than this attract the agent.
    pub chase_distance: u32,
    /// Radius around a power pill inside which luring happens.
    pub lure_distance: u32,
    /// Ghosts this close to the power pill are ready to be caught together.
    pub power_pill_activation: u32,
    /// The agent must be at most this far from the pill before committing to it.
    pub lure_commit_distance: u32,
    /// Captures per power window after which chasing and luring stop.
    pub max_consumed: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            danger_distance: 10,
            very_dangerous_distance: 5,
            chase_distance: 30,
            lure_distance: 15,
            power_pill_activation: 4,
            lure_commit_distance: 2,
            max_consumed: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{ "danger_distance": 12, "max_consumed": 2 }"#).unwrap();

        assert_eq!(config.danger_distance, 12);
        assert_eq!(config.max_consumed, 2);
        assert_eq!(config.chase_distance, 30);
        assert_eq!(config.lure_distance, 15);
    }

    #[test]
    fn empty_json_is_default() {
        let config: PolicyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PolicyConfig::default());
    }
}
