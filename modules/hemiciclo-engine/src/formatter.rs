//! Top-level orchestration: one raw proposal in, one immutable
//! [`FormattedProposal`] out.
//!
//! Consolidation runs once and its output feeds votes, progress and
//! documents; no component depends on another's output beyond that shared
//! intermediate. The whole computation is pure and synchronous, so
//! concurrent calls (same proposal or not) are independent; a fresh roster
//! snapshot per call is fine.

use tracing::debug;

use hemiciclo_model::dates;
use hemiciclo_model::raw::RawProposal;
use hemiciclo_model::roster::Roster;
use hemiciclo_model::view::{FormattedProposal, ReconciledVote, VotesOverview};
use hemiciclo_model::ModelError;

use crate::authors::resolve_authors;
use crate::documents::extract_documents;
use crate::progress::compute_progress;
use crate::timeline::{consolidate, overall_status, to_timeline_items};
use crate::votes::{collect_vote_records, reconcile};

/// Status sentinel when the record carries no events at all.
const NO_ACTIVITY_STATUS: &str = "Unknown";

/// Normalize one raw proposal against a roster snapshot.
/// The only hard error: a missing title (upstream-contract violation).
/// Everything else degrades to documented sentinels.
pub fn format_proposal(
    proposal: &RawProposal,
    roster: &Roster,
) -> Result<FormattedProposal, ModelError> {
    if proposal.title.trim().is_empty() {
        return Err(ModelError::MissingTitle);
    }

    let authorship = resolve_authors(proposal);
    let phases = consolidate(&proposal.events);
    let timeline = to_timeline_items(&phases);

    let records = collect_vote_records(&phases);
    let mut reconciled: Vec<ReconciledVote> = records
        .iter()
        .map(|record| reconcile(record, roster))
        .collect();
    // Newest first; dateless votes last in encounter order.
    reconciled.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    let votes = VotesOverview {
        has_votes: !reconciled.is_empty(),
        latest: reconciled.first().cloned(),
        all: reconciled,
    };

    let documents = extract_documents(proposal, &phases);
    let progress = compute_progress(&phases);

    let (status, last_update) = overall_status(&proposal.events).unwrap_or_else(|| {
        (
            NO_ACTIVITY_STATUS.to_string(),
            dates::reformat_or_raw(&proposal.date),
        )
    });

    debug!(
        title = %proposal.title,
        timeline_items = timeline.len(),
        votes = votes.all.len(),
        documents = documents.len(),
        progress = progress.percentage,
        "Formatted proposal"
    );

    Ok(FormattedProposal {
        title: proposal.title.trim().to_string(),
        kind: proposal.kind.clone(),
        status,
        date: dates::reformat_or_raw(&proposal.date),
        last_update,
        party: authorship.party,
        authors: authorship.authors,
        deputies: authorship.deputies,
        timeline,
        votes,
        documents,
        progress,
    })
}
