use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceKind};
use crate::models::ids::ObjectId;

/// A chatbot conversation script: steps plus the transitions between them.
///
/// Only the editable definition lives here; executing a flow is the
/// backend's job.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Flow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    #[serde(default)]
    pub steps: Vec<FlowStep>,
    #[serde(default)]
    pub transitions: Vec<FlowTransition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub step_type: String,
    #[serde(default)]
    pub is_entry_point: bool,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub current_step: ObjectId,
    pub next_step: ObjectId,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub condition_config: Value,
}

impl Flow {
    pub fn entry_step(&self) -> Option<&FlowStep> {
        self.steps.iter().find(|step| step.is_entry_point)
    }

    /// Outgoing transitions of a step, lowest priority value first.
    pub fn transitions_from(&self, step_id: &ObjectId) -> Vec<&FlowTransition> {
        let mut outgoing: Vec<&FlowTransition> = self
            .transitions
            .iter()
            .filter(|t| &t.current_step == step_id)
            .collect();
        outgoing.sort_by_key(|t| t.priority);
        outgoing
    }

    pub fn matches_keyword(&self, message: &str) -> bool {
        let message = message.trim().to_lowercase();
        self.trigger_keywords
            .iter()
            .any(|keyword| keyword.trim().to_lowercase() == message)
    }
}

impl Resource for Flow {
    const KIND: ResourceKind = ResourceKind::Flows;

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flow() -> Flow {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Warranty claim",
            "is_active": true,
            "trigger_keywords": ["Claim", "warranty"],
            "steps": [
                {"id": 10, "name": "greet", "step_type": "send_message", "is_entry_point": true},
                {"id": 11, "name": "ask_serial", "step_type": "question"},
                {"id": 12, "name": "handover", "step_type": "human_handover"}
            ],
            "transitions": [
                {"current_step": 10, "next_step": 12, "priority": 5},
                {"current_step": 10, "next_step": 11, "priority": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_entry_step() {
        let flow = sample_flow();
        assert_eq!(flow.entry_step().unwrap().name, "greet");
    }

    #[test]
    fn test_transitions_sorted_by_priority() {
        let flow = sample_flow();
        let outgoing = flow.transitions_from(&ObjectId::Number(10));
        let targets: Vec<&ObjectId> = outgoing.iter().map(|t| &t.next_step).collect();
        assert_eq!(targets, vec![&ObjectId::Number(11), &ObjectId::Number(12)]);
        assert!(flow.transitions_from(&ObjectId::Number(12)).is_empty());
    }

    #[test]
    fn test_keyword_match_ignores_case_and_whitespace() {
        let flow = sample_flow();
        assert!(flow.matches_keyword("  claim "));
        assert!(!flow.matches_keyword("hello"));
    }
}
