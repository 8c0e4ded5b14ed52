//! Timeline consolidation.
//!
//! The upstream event list carries duplicate phase occurrences: the same
//! (name, date) pair can arrive several times with different ids, each
//! fragment holding part of the commissions and votes. Consolidation groups
//! fragments into one phase per (name, date), merges same-named commission
//! sub-entries, and derives the overall status from the chronologically
//! latest raw event.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use hemiciclo_model::dates;
use hemiciclo_model::raw::{Ballot, RawDocument, RawEvent};
use hemiciclo_model::view::{TimelineItem, TimelineSubItem};

/// Default sub-item description when a merged commission has no observation.
pub const DEFAULT_COMMISSION_DESCRIPTION: &str = "Parliamentary committee";

/// One consolidated phase: all raw events sharing (name, date), merged.
#[derive(Debug, Clone)]
pub struct ConsolidatedPhase {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub raw_date: String,
    /// Observation of the group's first member.
    pub observation: String,
    pub commissions: Vec<MergedCommission>,
    /// Unified ballots from every member, in encounter order.
    pub ballots: Vec<Ballot>,
    /// Raw-list index of the group's last member. Same-day status ties are
    /// resolved by raw ordering, so this survives consolidation.
    pub last_raw_index: usize,
}

impl ConsolidatedPhase {
    pub fn has_vote(&self) -> bool {
        !self.ballots.is_empty()
    }

    pub fn formatted_date(&self) -> String {
        dates::reformat_or_raw(&self.raw_date)
    }

    /// Deep-link id `phase-{name}-{DD/MM/YYYY}`, present iff the phase
    /// carries at least one vote. Other components rely on this exact format.
    pub fn vote_id(&self) -> Option<String> {
        if self.has_vote() {
            Some(format!("phase-{}-{}", self.name, self.formatted_date()))
        } else {
            None
        }
    }
}

/// One commission after merging same-named entries within a phase group.
#[derive(Debug, Clone)]
pub struct MergedCommission {
    pub name: String,
    /// Non-empty observations of every merged entry, joined with "; ".
    pub observation: String,
    /// Earliest date across merged entries, kept for display.
    pub date: Option<NaiveDate>,
    pub has_votes: bool,
    pub has_documents: bool,
    pub documents: Vec<RawDocument>,
}

/// Group raw events by (name, date) and merge each group into one phase.
/// Output is sorted ascending by parsed date (stable; ties and unparsable
/// dates keep encounter order, unparsable last).
pub fn consolidate(events: &[RawEvent]) -> Vec<ConsolidatedPhase> {
    let mut phases: Vec<ConsolidatedPhase> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for (raw_index, event) in events.iter().enumerate() {
        let date = dates::parse_flexible(&event.date);
        if date.is_none() && !event.date.trim().is_empty() {
            warn!(event = %event.name, date = %event.date, "Unparsable event date");
        }
        let key = (event.name.clone(), dates::reformat_or_raw(&event.date));

        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                phases.push(ConsolidatedPhase {
                    name: event.name.clone(),
                    date,
                    raw_date: event.date.clone(),
                    observation: event.observation.clone(),
                    commissions: Vec::new(),
                    ballots: Vec::new(),
                    last_raw_index: raw_index,
                });
                index.insert(key, phases.len() - 1);
                phases.len() - 1
            }
        };

        let phase = &mut phases[slot];
        phase.last_raw_index = raw_index;
        phase
            .ballots
            .extend(event.votes.iter().map(|vote| vote.ballot()));

        for commission in &event.commissions {
            merge_commission(phase, commission);
        }
    }

    // Stable ascending sort; unparsable dates go last in encounter order.
    phases.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    phases
}

fn merge_commission(phase: &mut ConsolidatedPhase, raw: &hemiciclo_model::raw::RawCommission) {
    let date = dates::parse_flexible(&raw.date);
    let observation = raw.observation.trim();

    if let Some(existing) = phase.commissions.iter_mut().find(|c| c.name == raw.name) {
        if !observation.is_empty() {
            if existing.observation.is_empty() {
                existing.observation = observation.to_string();
            } else {
                existing.observation.push_str("; ");
                existing.observation.push_str(observation);
            }
        }
        existing.has_votes |= raw.has_votes;
        existing.has_documents |= raw.has_documents || !raw.documents.is_empty();
        if let Some(d) = date {
            existing.date = Some(existing.date.map_or(d, |e| e.min(d)));
        }
        existing.documents.extend(raw.documents.iter().cloned());
    } else {
        phase.commissions.push(MergedCommission {
            name: raw.name.clone(),
            observation: observation.to_string(),
            date,
            has_votes: raw.has_votes,
            has_documents: raw.has_documents || !raw.documents.is_empty(),
            documents: raw.documents.clone(),
        });
    }
}

/// Project consolidated phases into the view-model timeline.
pub fn to_timeline_items(phases: &[ConsolidatedPhase]) -> Vec<TimelineItem> {
    phases
        .iter()
        .map(|phase| TimelineItem {
            date: phase.date,
            formatted_date: phase.formatted_date(),
            title: phase.name.clone(),
            description: phase.observation.clone(),
            sub_items: phase
                .commissions
                .iter()
                .map(|commission| TimelineSubItem {
                    name: commission.name.clone(),
                    description: if commission.observation.is_empty() {
                        DEFAULT_COMMISSION_DESCRIPTION.to_string()
                    } else {
                        commission.observation.clone()
                    },
                    formatted_date: commission.date.map(dates::format_display),
                    has_votes: commission.has_votes,
                    has_documents: commission.has_documents,
                })
                .collect(),
            vote_id: phase.vote_id(),
            has_vote: phase.has_vote(),
        })
        .collect()
}

/// Overall status: name and formatted date of the chronologically latest raw
/// event. Same-day ties are governed by raw ordering (later entry wins), not
/// by the sorted timeline. None when there are no events at all; the caller
/// falls back to the proposal's own date.
pub fn overall_status(events: &[RawEvent]) -> Option<(String, String)> {
    let mut best: Option<(usize, NaiveDate)> = None;
    for (i, event) in events.iter().enumerate() {
        if let Some(date) = dates::parse_flexible(&event.date) {
            match best {
                Some((_, best_date)) if date < best_date => {}
                _ => best = Some((i, date)),
            }
        }
    }

    let chosen = match best {
        Some((i, _)) => &events[i],
        // No parsable dates: the raw list's last entry is the best guess.
        None => events.last()?,
    };
    Some((chosen.name.clone(), dates::reformat_or_raw(&chosen.date)))
}
