//! Raw upstream record types.
//!
//! The upstream API is semi-structured: the same fact can arrive under several
//! alternative fields depending on the record's age and kind. These types
//! deserialize permissively (everything defaults) and defer all
//! interpretation to the engine. The one place shape is unified at ingestion
//! is the vote duality: [`RawVote::ballot`] folds the structured and legacy
//! representations into a single [`Ballot`] so reconciliation never branches
//! on source shape.

use serde::Deserialize;

use crate::error::ModelError;

/// One upstream legislative-proposal record. Immutable input to the engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProposal {
    pub title: String,
    /// Proposal type code. Upstream uses `type` or `descType` interchangeably.
    #[serde(alias = "type", alias = "descType")]
    pub kind: String,
    /// Submission date of the proposal itself.
    pub date: String,
    /// Parliamentary-group authorship (one entry per group).
    pub group_authors: Vec<RawGroupAuthor>,
    /// Individual-deputy authorship.
    pub deputy_authors: Vec<RawDeputyAuthor>,
    /// "Other" authorship (government, citizens' initiative, regional
    /// assembly). Arrives as a single object or an array.
    pub other_authors: Option<OneOrMany<RawOtherAuthor>>,
    /// Generic authorship fallback carried by some record vintages.
    pub authors: Vec<RawGenericAuthor>,
    pub events: Vec<RawEvent>,
    pub attachments: Vec<RawAttachment>,
    pub publication_url: String,
    pub publication_date: String,
}

impl RawProposal {
    /// Deserialize an already-fetched payload. The only hard errors the
    /// engine raises: a structurally unparsable record or a missing title.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        let proposal: RawProposal =
            serde_json::from_value(value).map_err(|e| ModelError::Unparsable(e.to_string()))?;
        if proposal.title.trim().is_empty() {
            return Err(ModelError::MissingTitle);
        }
        Ok(proposal)
    }
}

/// Wrapper for fields that arrive as either a single object or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGroupAuthor {
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeputyAuthor {
    pub name: String,
    /// Party code of the deputy, when upstream carries it.
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOtherAuthor {
    pub name: String,
    pub acronym: String,
}

/// Generic author entry used by older records: a name plus a type tag
/// (`group`, `deputy`, `other`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGenericAuthor {
    pub name: String,
    #[serde(alias = "type")]
    pub kind: String,
}

/// One dated milestone ("phase occurrence") in the proposal's lifecycle.
/// Multiple events may share (name, date) and are merged by the consolidator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    pub id: String,
    pub name: String,
    pub date: String,
    pub observation: String,
    pub commissions: Vec<RawCommission>,
    pub votes: Vec<RawVote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCommission {
    pub name: String,
    pub observation: String,
    pub date: String,
    pub has_votes: bool,
    pub has_documents: bool,
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDocument {
    pub title: String,
    #[serde(alias = "type")]
    pub kind: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttachment {
    pub name: String,
    pub url: String,
}

/// One roll call, in either of the two upstream shapes: a structured
/// `parsedVote`, or legacy top-level lists under different names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVote {
    pub parsed_vote: Option<ParsedVote>,
    // Legacy shape.
    pub in_favor: Vec<String>,
    pub opposed: Vec<String>,
    pub abstained: Vec<String>,
    #[serde(alias = "unanime")]
    pub unanimous: bool,
    pub result: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedVote {
    pub favor: Vec<String>,
    pub against: Vec<String>,
    pub abstention: Vec<String>,
    #[serde(alias = "unanime")]
    pub unanimous: bool,
    pub result: String,
}

/// Unified internal vote shape. Reconciliation only ever sees this.
#[derive(Debug, Clone, Default)]
pub struct Ballot {
    pub favor: Vec<String>,
    pub against: Vec<String>,
    pub abstention: Vec<String>,
    pub unanimous: bool,
    pub result: String,
    pub date: String,
}

impl RawVote {
    /// Fold the structured/legacy duality into one [`Ballot`]. The structured
    /// form wins when present; its empty result string falls back to the
    /// vote-level one.
    pub fn ballot(&self) -> Ballot {
        match &self.parsed_vote {
            Some(parsed) => Ballot {
                favor: parsed.favor.clone(),
                against: parsed.against.clone(),
                abstention: parsed.abstention.clone(),
                unanimous: parsed.unanimous || self.unanimous,
                result: if parsed.result.trim().is_empty() {
                    self.result.clone()
                } else {
                    parsed.result.clone()
                },
                date: self.date.clone(),
            },
            None => Ballot {
                favor: self.in_favor.clone(),
                against: self.opposed.clone(),
                abstention: self.abstained.clone(),
                unanimous: self.unanimous,
                result: self.result.clone(),
                date: self.date.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_accepts_minimal_record() {
        let proposal = RawProposal::from_json(json!({ "title": "Housing act" })).unwrap();
        assert_eq!(proposal.title, "Housing act");
        assert!(proposal.events.is_empty());
    }

    #[test]
    fn from_json_rejects_missing_title() {
        let err = RawProposal::from_json(json!({ "title": "  " })).unwrap_err();
        assert!(matches!(err, ModelError::MissingTitle));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = RawProposal::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ModelError::Unparsable(_)));
    }

    #[test]
    fn kind_accepts_type_alias() {
        let proposal =
            RawProposal::from_json(json!({ "title": "T", "type": "Law proposal" })).unwrap();
        assert_eq!(proposal.kind, "Law proposal");
        let proposal =
            RawProposal::from_json(json!({ "title": "T", "descType": "Resolution" })).unwrap();
        assert_eq!(proposal.kind, "Resolution");
    }

    #[test]
    fn other_authors_single_object_or_array() {
        let single = RawProposal::from_json(
            json!({ "title": "T", "otherAuthors": { "name": "Government", "acronym": "GOV" } }),
        )
        .unwrap();
        assert_eq!(single.other_authors.unwrap().as_slice().len(), 1);

        let many = RawProposal::from_json(json!({
            "title": "T",
            "otherAuthors": [ { "name": "Government" }, { "name": "Citizens" } ]
        }))
        .unwrap();
        assert_eq!(many.other_authors.unwrap().as_slice().len(), 2);
    }

    #[test]
    fn ballot_prefers_structured_shape() {
        let vote: RawVote = serde_json::from_value(json!({
            "parsedVote": { "favor": ["PS"], "against": ["CH"], "abstention": [], "result": "Approved" },
            "inFavor": ["IGNORED"],
            "date": "2024-03-15"
        }))
        .unwrap();
        let ballot = vote.ballot();
        assert_eq!(ballot.favor, vec!["PS"]);
        assert_eq!(ballot.against, vec!["CH"]);
        assert_eq!(ballot.result, "Approved");
        assert_eq!(ballot.date, "2024-03-15");
    }

    #[test]
    fn ballot_falls_back_to_legacy_lists() {
        let vote: RawVote = serde_json::from_value(json!({
            "inFavor": ["PS", "BE"],
            "opposed": ["PSD"],
            "abstained": ["IL"],
            "result": "Approved",
            "date": "2020-07-01"
        }))
        .unwrap();
        let ballot = vote.ballot();
        assert_eq!(ballot.favor, vec!["PS", "BE"]);
        assert_eq!(ballot.against, vec!["PSD"]);
        assert_eq!(ballot.abstention, vec!["IL"]);
    }

    #[test]
    fn ballot_unanimous_flag_accepts_alias() {
        let vote: RawVote =
            serde_json::from_value(json!({ "unanime": true, "result": "Approved" })).unwrap();
        assert!(vote.ballot().unanimous);
    }

    #[test]
    fn structured_empty_result_falls_back_to_vote_level() {
        let vote: RawVote = serde_json::from_value(json!({
            "parsedVote": { "favor": ["PS"] },
            "result": "Approved in general"
        }))
        .unwrap();
        assert_eq!(vote.ballot().result, "Approved in general");
    }
}
