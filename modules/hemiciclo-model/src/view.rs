//! Normalized view model.
//!
//! Everything here is the engine's output: built once per raw fetch, never
//! mutated. A refresh produces a fresh [`FormattedProposal`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Synthetic voter-map key substituted for the whole party map when a vote is
/// recorded only as a unanimity flag. A sentinel, not a headcount: it must be
/// special-cased downstream and never weighted.
pub const ALL_PARTIES: &str = "All parties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePosition {
    Favor,
    Against,
    Abstention,
}

impl VotePosition {
    /// Fixed tie-break order for plurality resolution.
    pub const TIE_BREAK: [VotePosition; 3] = [
        VotePosition::Favor,
        VotePosition::Against,
        VotePosition::Abstention,
    ];
}

impl std::fmt::Display for VotePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotePosition::Favor => write!(f, "favor"),
            VotePosition::Against => write!(f, "against"),
            VotePosition::Abstention => write!(f, "abstention"),
        }
    }
}

/// An individual deputy's recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeputyVote {
    pub name: String,
    pub position: VotePosition,
}

/// An individual deputy listed as a proposal author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeputyAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

/// One consolidated timeline entry. Unique per (title, date), strictly
/// ascending by parsed date in the final timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineItem {
    /// Parsed calendar date; None when upstream supplied an unparsable date.
    pub date: Option<NaiveDate>,
    pub formatted_date: String,
    pub title: String,
    pub description: String,
    pub sub_items: Vec<TimelineSubItem>,
    /// Deep-link id `phase-{name}-{DD/MM/YYYY}`, present iff `has_vote`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<String>,
    pub has_vote: bool,
}

/// A merged commission entry under a timeline item.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineSubItem {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    pub has_votes: bool,
    pub has_documents: bool,
}

/// One roll call before reconciliation: raw list-derived counts plus the
/// voter→position map. Counts are over deputies, map keys over distinct
/// voters, so the two need not agree until reconciliation runs.
#[derive(Debug, Clone, Serialize)]
pub struct VoteRecord {
    pub favor: u32,
    pub against: u32,
    pub abstention: u32,
    pub votes: BTreeMap<String, VotePosition>,
    pub unanimous: bool,
    pub result: String,
    pub date: Option<NaiveDate>,
    pub formatted_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<String>,
}

/// A roll call after reconciliation: weighted, summable head counts that
/// supersede the raw list counts, plus the per-party audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledVote {
    pub favor: u32,
    pub against: u32,
    pub abstention: u32,
    /// Chamber total minus weighted participation, clamped at zero.
    /// Always zero for unanimous votes (the sentinel carries no headcount).
    pub absent: u32,
    pub unanimous: bool,
    pub parties: Vec<PartyBreakdown>,
    pub result: String,
    pub date: Option<NaiveDate>,
    pub formatted_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<String>,
}

/// One party's resolved stance within a reconciled vote.
#[derive(Debug, Clone, Serialize)]
pub struct PartyBreakdown {
    pub party: String,
    /// Displayed position: the official line, or the plurality among
    /// individually-listed voters when no line exists.
    pub position: VotePosition,
    #[serde(flatten)]
    pub detail: PartyPosition,
}

/// Whether a party's position comes from an official bloc vote or only from
/// individually-listed deputies. Modeled as a tagged variant so "no official
/// position" is never misread as "everyone defected".
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "line", rename_all = "snake_case")]
pub enum PartyPosition {
    OfficialLine {
        total_deputies: u32,
        /// Deputies voting the party line: `total - dissidents`, clamped at 0.
        voting_deputies: u32,
        dissidents: Vec<DeputyVote>,
    },
    IndividualOnly {
        voters: Vec<DeputyVote>,
    },
}

impl PartyBreakdown {
    /// Head count this entry contributes at its displayed position.
    /// The unanimous sentinel never reaches here (it is branched before
    /// weighting), so every entry weighs real deputies.
    pub fn weight(&self) -> u32 {
        match &self.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                dissidents,
            } => {
                if dissidents.is_empty() {
                    *total_deputies
                } else {
                    *voting_deputies
                }
            }
            PartyPosition::IndividualOnly { voters } => {
                voters.iter().filter(|v| v.position == self.position).count() as u32
            }
        }
    }
}

/// All roll calls of a proposal, newest first in `all`.
#[derive(Debug, Clone, Serialize)]
pub struct VotesOverview {
    pub has_votes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<ReconciledVote>,
    pub all: Vec<ReconciledVote>,
}

/// One downloadable-document reference.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    pub title: String,
    pub kind: String,
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCategory {
    Initial,
    General,
    Specialty,
    Final,
}

impl PhaseCategory {
    pub fn description(&self) -> &'static str {
        match self {
            PhaseCategory::Initial => "Submission and admission of the proposal",
            PhaseCategory::General => "Debate and vote on the general principles",
            PhaseCategory::Specialty => "Article-by-article committee review",
            PhaseCategory::Final => "Final vote, promulgation and publication",
        }
    }
}

impl std::fmt::Display for PhaseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseCategory::Initial => write!(f, "Initial"),
            PhaseCategory::General => write!(f, "General"),
            PhaseCategory::Specialty => write!(f, "Specialty"),
            PhaseCategory::Final => write!(f, "Final"),
        }
    }
}

/// Phase-based completion summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressInfo {
    pub percentage: u8,
    pub current_phase: String,
    pub category: PhaseCategory,
    pub description: &'static str,
}

/// Final merged output of all engine components.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedProposal {
    pub title: String,
    pub kind: String,
    pub status: String,
    pub date: String,
    pub last_update: String,
    pub party: String,
    pub authors: Vec<String>,
    pub deputies: Vec<DeputyAuthor>,
    pub timeline: Vec<TimelineItem>,
    pub votes: VotesOverview,
    pub documents: Vec<DocumentRef>,
    pub progress: ProgressInfo,
}
