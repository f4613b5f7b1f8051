//! Helpers for turning untrusted model output into items backed by search hits.
//!
//! Everything here is pure: no I/O, no shared state.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{DomainError, GroundedItem, PointId, SearchHit};

/// Payload object proposed by the completion model.
pub type Proposal = Map<String, Value>;

/// One `- name: description` line per hit, in hit order.
pub fn render_context(hits: &[SearchHit]) -> String {
    let mut context = String::new();
    for hit in hits {
        context.push_str(&format!(
            "- {}: {}\n",
            display_field(hit, "name"),
            display_field(hit, "description")
        ));
    }
    context
}

fn display_field(hit: &SearchHit, key: &str) -> String {
    match hit.payload().get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "<nil>".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a product catalog assistant. Using only the products listed in the context, \
respond with a JSON array of the payloads of the products that best answer the question.

Each payload must contain exactly these fields:
- \"name\": string
- \"description\": string
- \"minimum_order\": integer
- \"price\": number
- \"price_currency\": string
- \"supply_ability\": integer

Never add \"id\" or \"score\" fields.
Never wrap the response in triple backticks or any Markdown formatting.
Copy name and description verbatim from the context.

Context:
{context}
Question: {question}

Respond ONLY with the raw JSON array of payloads."
    )
}

/// Remove a surrounding triple-backtick fence, with or without a language tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the model reply as a JSON array of objects.
pub fn parse_proposals(raw: &str) -> Result<Vec<Proposal>, DomainError> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str::<Vec<Proposal>>(cleaned).map_err(|e| {
        DomainError::parse(format!(
            "failed to parse model output as a JSON array of objects: {}\nRaw:\n{}",
            e, cleaned
        ))
    })
}

/// Keep only proposals whose (name, description) exactly matches a candidate.
///
/// Matched items are rebuilt from the candidate's stored payload, in proposal
/// order, and each candidate is emitted at most once. Unmatched proposals are
/// dropped without error.
pub fn ground(candidates: &[SearchHit], proposals: &[Proposal]) -> Vec<GroundedItem> {
    let mut consumed: HashSet<&PointId> = HashSet::new();
    let mut grounded = Vec::new();

    for proposal in proposals {
        let name = proposal.get("name").and_then(Value::as_str);
        let description = proposal.get("description").and_then(Value::as_str);
        let (Some(name), Some(description)) = (name, description) else {
            debug!("Dropping proposal without name/description: {:?}", proposal);
            continue;
        };

        let matched = candidates
            .iter()
            .find(|hit| hit.name() == Some(name) && hit.description() == Some(description));

        match matched {
            Some(hit) if consumed.insert(hit.id()) => {
                grounded.push(GroundedItem::from_hit(hit));
            }
            Some(hit) => {
                debug!("Skipping repeated proposal for point {}", hit.id());
            }
            None => {
                debug!("Dropping ungrounded proposal: {}", name);
            }
        }
    }

    grounded
}
