//! Normalization engine for raw legislative-proposal records.
//!
//! One upstream payload in, one canonical
//! [`FormattedProposal`](hemiciclo_model::view::FormattedProposal) out:
//! de-duplicated timeline, authoritative authorship, reconciled vote
//! tallies and a phase-based completion percentage. Pure computation over
//! an already-fetched payload; fetching, caching and presentation live
//! elsewhere.

pub mod authors;
pub mod documents;
pub mod formatter;
pub mod progress;
pub mod timeline;
pub mod votes;

pub use authors::{resolve_authors, Authorship};
pub use documents::extract_documents;
pub use formatter::format_proposal;
pub use progress::{compute_progress, progress_for_phase};
pub use timeline::{consolidate, overall_status, to_timeline_items, ConsolidatedPhase};
pub use votes::{collect_vote_records, reconcile, VoterClassifier, VoterKey};
