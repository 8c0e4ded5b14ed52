//! Vote reconciliation.
//!
//! A roll call's voter lists mix two kinds of entry for the same fact: a bare
//! party code casting the bloc's official line ("PS"), and an
//! individually-annotated deputy ("João Silva (PS)") who voted against that
//! line or whose party cast no line at all. Reconciliation classifies every
//! key explicitly, resolves per-party deputy totals against the roster
//! snapshot, and produces weighted head counts that supersede the raw list
//! counts.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;

use hemiciclo_model::roster::{normalize_code, Roster};
use hemiciclo_model::view::{
    DeputyVote, PartyBreakdown, PartyPosition, ReconciledVote, VotePosition, VoteRecord,
    ALL_PARTIES,
};
use hemiciclo_model::{dates, raw::Ballot};

use crate::timeline::ConsolidatedPhase;

/// Party bucket for individually-annotated deputies whose annotation names
/// no recognizable group.
pub const INDEPENDENT_PARTY: &str = "Independent";

/// Lowercase connective particles common in Portuguese personal names.
const NAME_PARTICLES: &[&str] = &["da", "de", "do", "das", "dos", "e"];

/// Explicit classification of one voter-map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterKey {
    /// A bare party code casting the official line.
    Party(String),
    /// An individually-listed deputy, with their party when annotated.
    Deputy { name: String, party: Option<String> },
}

/// Classifies voter-map keys. The `Name (PARTY)` form is authoritative; bare
/// keys fall back to a personal-name heuristic before being read as a party
/// code. The heuristic is fuzzy by nature, which is why classification is an
/// explicit, separately-tested step.
pub struct VoterClassifier {
    annotated: Regex,
}

impl VoterClassifier {
    pub fn new() -> Self {
        Self {
            annotated: Regex::new(r"^(?P<name>.+?)\s*\((?P<party>[^()]+)\)$").expect("valid regex"),
        }
    }

    pub fn classify(&self, key: &str) -> VoterKey {
        let key = key.trim();
        if let Some(caps) = self.annotated.captures(key) {
            return VoterKey::Deputy {
                name: caps["name"].trim().to_string(),
                party: Some(caps["party"].trim().to_string()),
            };
        }
        if looks_like_personal_name(key) {
            return VoterKey::Deputy {
                name: key.to_string(),
                party: None,
            };
        }
        VoterKey::Party(key.to_string())
    }
}

impl Default for VoterClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// At least two words, every word shaped like a name part, and at least one
/// lowercase letter somewhere. "PS" and "CDS-PP" fail the shape test;
/// single-word party names like "Livre" fail the word-count test.
fn looks_like_personal_name(key: &str) -> bool {
    let words: Vec<&str> = key.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    words.iter().all(|w| is_name_word(w)) && key.chars().any(|c| c.is_lowercase())
}

fn is_name_word(word: &str) -> bool {
    if NAME_PARTICLES.contains(&word) {
        return true;
    }
    // Capitalized with a lowercase continuation; hyphenated surnames check
    // each segment ("Sá-Carneiro").
    word.split('-').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {
                let rest: Vec<char> = chars.collect();
                !rest.is_empty() && rest.iter().all(|c| c.is_lowercase() || *c == '\'')
            }
            _ => false,
        }
    })
}

/// Build one pre-reconciliation [`VoteRecord`] per ballot across consolidated
/// phases. The unanimous shorthand is substituted here: the entire map is
/// replaced by the synthetic `{"All parties": favor}` entry with `favor = 1`.
pub fn collect_vote_records(phases: &[ConsolidatedPhase]) -> Vec<VoteRecord> {
    let mut records = Vec::new();
    for phase in phases {
        for ballot in &phase.ballots {
            records.push(record_from_ballot(ballot, phase));
        }
    }
    records
}

fn record_from_ballot(ballot: &Ballot, phase: &ConsolidatedPhase) -> VoteRecord {
    let raw_date = if ballot.date.trim().is_empty() {
        phase.raw_date.clone()
    } else {
        ballot.date.clone()
    };
    let date = dates::parse_flexible(&raw_date);
    let formatted_date = dates::reformat_or_raw(&raw_date);

    if ballot.unanimous {
        // Sentinel, not a headcount: approved by acclamation.
        let mut votes = BTreeMap::new();
        votes.insert(ALL_PARTIES.to_string(), VotePosition::Favor);
        return VoteRecord {
            favor: 1,
            against: 0,
            abstention: 0,
            votes,
            unanimous: true,
            result: ballot.result.clone(),
            date,
            formatted_date,
            phase: Some(phase.name.clone()),
            vote_id: phase.vote_id(),
        };
    }

    let mut votes = BTreeMap::new();
    for (list, position) in [
        (&ballot.favor, VotePosition::Favor),
        (&ballot.against, VotePosition::Against),
        (&ballot.abstention, VotePosition::Abstention),
    ] {
        for voter in list {
            let voter = voter.trim();
            if voter.is_empty() {
                continue;
            }
            // First position wins for a duplicated voter key.
            votes.entry(voter.to_string()).or_insert(position);
        }
    }

    VoteRecord {
        favor: ballot.favor.len() as u32,
        against: ballot.against.len() as u32,
        abstention: ballot.abstention.len() as u32,
        votes,
        unanimous: false,
        result: ballot.result.clone(),
        date,
        formatted_date,
        phase: Some(phase.name.clone()),
        vote_id: phase.vote_id(),
    }
}

/// True iff, post-substitution, the record's map is exactly the synthetic
/// unanimity entry.
pub fn is_unanimous_display(record: &VoteRecord) -> bool {
    record.votes.len() == 1 && record.votes.contains_key(ALL_PARTIES)
}

/// Reconcile one roll call against the roster snapshot.
///
/// Per bare-party key: roster chain resolves the deputy total (falling back
/// to the count of individually-annotated deputies when the party is absent
/// from the roster); same-party annotated deputies are dissidents and
/// `voting_deputies = total - dissidents`, clamped at zero. Parties appearing
/// only through annotations get a plurality position over their individuals.
/// Weighted totals supersede the raw counts; the participation gap against
/// the chamber total is reported explicitly.
pub fn reconcile(record: &VoteRecord, roster: &Roster) -> ReconciledVote {
    if is_unanimous_display(record) {
        // The sentinel never enters weighted arithmetic.
        return ReconciledVote {
            favor: 1,
            against: 0,
            abstention: 0,
            absent: 0,
            unanimous: true,
            parties: Vec::new(),
            result: record.result.clone(),
            date: record.date,
            formatted_date: record.formatted_date.clone(),
            phase: record.phase.clone(),
            vote_id: record.vote_id.clone(),
        };
    }

    let classifier = VoterClassifier::new();

    // Split the map into bloc entries and per-party deputy lists. Deputy
    // parties are bucketed by normalized code so "CDS-PP" annotations attach
    // to a "CDS PP" bloc key.
    let mut blocs: Vec<(String, VotePosition)> = Vec::new();
    let mut deputies: BTreeMap<String, (String, Vec<DeputyVote>)> = BTreeMap::new();

    for (key, &position) in &record.votes {
        match classifier.classify(key) {
            VoterKey::Party(code) => blocs.push((code, position)),
            VoterKey::Deputy { name, party } => {
                let display = party.unwrap_or_else(|| INDEPENDENT_PARTY.to_string());
                let bucket = deputies
                    .entry(normalize_code(&display))
                    .or_insert_with(|| (display, Vec::new()));
                bucket.1.push(DeputyVote { name, position });
            }
        }
    }

    let mut parties: Vec<PartyBreakdown> = Vec::new();
    let mut favor = 0u32;
    let mut against = 0u32;
    let mut abstention = 0u32;
    let mut tally = |position: VotePosition, count: u32| match position {
        VotePosition::Favor => favor += count,
        VotePosition::Against => against += count,
        VotePosition::Abstention => abstention += count,
    };

    for (code, position) in blocs {
        let dissidents = deputies
            .remove(&normalize_code(&code))
            .map(|(_, list)| list)
            .unwrap_or_default();

        let total = match roster.deputies_for(&code) {
            Some(total) => total,
            // Absent from the roster: the annotated deputies are the only
            // evidence of the party's size.
            None => dissidents.len() as u32,
        };
        if (dissidents.len() as u32) > total {
            warn!(
                party = %code,
                total,
                dissidents = dissidents.len(),
                "Dissident count exceeds party size; clamping line votes to zero"
            );
        }
        let voting = total.saturating_sub(dissidents.len() as u32);

        tally(position, if dissidents.is_empty() { total } else { voting });
        for dissident in &dissidents {
            tally(dissident.position, 1);
        }

        parties.push(PartyBreakdown {
            party: code,
            position,
            detail: PartyPosition::OfficialLine {
                total_deputies: total,
                voting_deputies: voting,
                dissidents,
            },
        });
    }

    // Parties present only through individual annotations: no official line,
    // plurality position, every voter attributed individually.
    for (_, (display, voters)) in deputies {
        let position = plurality_position(&voters);
        for voter in &voters {
            tally(voter.position, 1);
        }
        parties.push(PartyBreakdown {
            party: display,
            position,
            detail: PartyPosition::IndividualOnly { voters },
        });
    }

    let participation = favor + against + abstention;
    let chamber = roster.chamber_total();
    if participation > chamber && chamber > 0 {
        warn!(
            participation,
            chamber, "Weighted participation exceeds chamber total"
        );
    }
    let absent = chamber.saturating_sub(participation);

    ReconciledVote {
        favor,
        against,
        abstention,
        absent,
        unanimous: false,
        parties,
        result: record.result.clone(),
        date: record.date,
        formatted_date: record.formatted_date.clone(),
        phase: record.phase.clone(),
        vote_id: record.vote_id.clone(),
    }
}

/// Plurality among individual voters; ties break favor → against →
/// abstention, in that fixed order.
fn plurality_position(voters: &[DeputyVote]) -> VotePosition {
    let mut counts: BTreeMap<VotePosition, usize> = BTreeMap::new();
    for voter in voters {
        *counts.entry(voter.position).or_default() += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    VotePosition::TIE_BREAK
        .into_iter()
        .find(|p| counts.get(p).copied().unwrap_or(0) == best)
        .unwrap_or(VotePosition::Favor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            [
                ("PS".to_string(), 77),
                ("PSD".to_string(), 78),
                ("CH".to_string(), 50),
                ("IL".to_string(), 8),
                ("CDS-PP".to_string(), 2),
            ],
        )
    }

    fn record(entries: &[(&str, VotePosition)]) -> VoteRecord {
        VoteRecord {
            favor: 0,
            against: 0,
            abstention: 0,
            votes: entries
                .iter()
                .map(|(k, p)| (k.to_string(), *p))
                .collect(),
            unanimous: false,
            result: "Approved".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            formatted_date: "15/03/2024".to_string(),
            phase: Some("Final global vote".to_string()),
            vote_id: Some("phase-Final global vote-15/03/2024".to_string()),
        }
    }

    // --- classifier tests ---

    #[test]
    fn classifies_annotated_deputy() {
        let c = VoterClassifier::new();
        assert_eq!(
            c.classify("João Silva (PS)"),
            VoterKey::Deputy {
                name: "João Silva".to_string(),
                party: Some("PS".to_string())
            }
        );
    }

    #[test]
    fn classifies_bare_party_codes() {
        let c = VoterClassifier::new();
        assert_eq!(c.classify("PS"), VoterKey::Party("PS".to_string()));
        assert_eq!(c.classify("CDS-PP"), VoterKey::Party("CDS-PP".to_string()));
        assert_eq!(c.classify("L"), VoterKey::Party("L".to_string()));
    }

    #[test]
    fn single_word_party_name_is_not_a_deputy() {
        // Party codes resembling names must not classify as deputies.
        let c = VoterClassifier::new();
        assert_eq!(c.classify("Livre"), VoterKey::Party("Livre".to_string()));
    }

    #[test]
    fn unannotated_personal_name_is_a_deputy() {
        let c = VoterClassifier::new();
        assert_eq!(
            c.classify("Maria dos Santos"),
            VoterKey::Deputy {
                name: "Maria dos Santos".to_string(),
                party: None
            }
        );
    }

    #[test]
    fn hyphenated_surname_is_a_deputy() {
        let c = VoterClassifier::new();
        assert_eq!(
            c.classify("Francisco Sá-Carneiro"),
            VoterKey::Deputy {
                name: "Francisco Sá-Carneiro".to_string(),
                party: None
            }
        );
    }

    #[test]
    fn multi_word_all_caps_is_a_party() {
        let c = VoterClassifier::new();
        assert_eq!(
            c.classify("CDS PP"),
            VoterKey::Party("CDS PP".to_string())
        );
    }

    // --- reconciliation tests ---

    #[test]
    fn dissident_splits_from_party_line() {
        // Bloc favor [PS, PSD], bloc against [CH], individual PS deputy
        // voting against the line.
        let rec = record(&[
            ("PS", VotePosition::Favor),
            ("PSD", VotePosition::Favor),
            ("CH", VotePosition::Against),
            ("João Silva (PS)", VotePosition::Against),
        ]);
        let out = reconcile(&rec, &roster());

        let ps = out.parties.iter().find(|p| p.party == "PS").unwrap();
        assert_eq!(ps.position, VotePosition::Favor);
        match &ps.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                dissidents,
            } => {
                assert_eq!(*total_deputies, 77);
                assert_eq!(*voting_deputies, 76);
                assert_eq!(
                    dissidents.as_slice(),
                    [DeputyVote {
                        name: "João Silva".to_string(),
                        position: VotePosition::Against
                    }]
                );
            }
            other => panic!("expected official line, got {other:?}"),
        }

        // Weighted: favor = 76 (PS line) + 78 (PSD), against = 50 (CH) + 1
        // (the dissident).
        assert_eq!(out.favor, 76 + 78);
        assert_eq!(out.against, 50 + 1);
        assert_eq!(out.abstention, 0);
    }

    #[test]
    fn line_plus_dissidents_always_sums_to_total() {
        let rec = record(&[
            ("IL", VotePosition::Abstention),
            ("Ana Prata (IL)", VotePosition::Favor),
            ("Rui Rocha (IL)", VotePosition::Against),
        ]);
        let out = reconcile(&rec, &roster());
        let il = out.parties.iter().find(|p| p.party == "IL").unwrap();
        match &il.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                dissidents,
            } => {
                assert_eq!(voting_deputies + dissidents.len() as u32, *total_deputies);
            }
            other => panic!("expected official line, got {other:?}"),
        }
    }

    #[test]
    fn party_absent_from_roster_uses_annotated_count_as_total() {
        let rec = record(&[
            ("XYZ", VotePosition::Favor),
            ("Ana Costa (XYZ)", VotePosition::Against),
            ("Rui Lopes (XYZ)", VotePosition::Against),
        ]);
        let out = reconcile(&rec, &roster());
        let xyz = out.parties.iter().find(|p| p.party == "XYZ").unwrap();
        match &xyz.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                ..
            } => {
                assert_eq!(*total_deputies, 2);
                assert_eq!(*voting_deputies, 0);
            }
            other => panic!("expected official line, got {other:?}"),
        }
        assert_eq!(out.favor, 0);
        assert_eq!(out.against, 2);
    }

    #[test]
    fn unknown_party_with_no_deputies_resolves_to_zero() {
        // Flagged open question: undeterminable roster size stays a hard zero.
        let rec = record(&[("XYZ", VotePosition::Favor)]);
        let out = reconcile(&rec, &roster());
        let xyz = out.parties.iter().find(|p| p.party == "XYZ").unwrap();
        match &xyz.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                dissidents,
            } => {
                assert_eq!(*total_deputies, 0);
                assert_eq!(*voting_deputies, 0);
                assert!(dissidents.is_empty());
            }
            other => panic!("expected official line, got {other:?}"),
        }
        assert_eq!(out.favor, 0);
    }

    #[test]
    fn individual_only_party_gets_plurality_position() {
        let rec = record(&[
            ("Ana Costa (PAN)", VotePosition::Favor),
            ("Rui Lopes (PAN)", VotePosition::Against),
            ("Eva Cruz (PAN)", VotePosition::Favor),
        ]);
        let out = reconcile(&rec, &roster());
        let pan = out.parties.iter().find(|p| p.party == "PAN").unwrap();
        assert_eq!(pan.position, VotePosition::Favor);
        match &pan.detail {
            PartyPosition::IndividualOnly { voters } => assert_eq!(voters.len(), 3),
            other => panic!("expected individual-only, got {other:?}"),
        }
        // Every individual attributed at their own position.
        assert_eq!(out.favor, 2);
        assert_eq!(out.against, 1);
    }

    #[test]
    fn individual_only_tie_breaks_favor_first() {
        let rec = record(&[
            ("Ana Costa (PAN)", VotePosition::Abstention),
            ("Rui Lopes (PAN)", VotePosition::Favor),
        ]);
        let out = reconcile(&rec, &roster());
        let pan = out.parties.iter().find(|p| p.party == "PAN").unwrap();
        assert_eq!(pan.position, VotePosition::Favor);
    }

    #[test]
    fn normalized_annotation_attaches_to_bloc() {
        // "CDS PP" annotation must attach to the "CDS-PP" bloc entry.
        let rec = record(&[
            ("CDS-PP", VotePosition::Favor),
            ("Nuno Melo (CDS PP)", VotePosition::Abstention),
        ]);
        let out = reconcile(&rec, &roster());
        let cds = out.parties.iter().find(|p| p.party == "CDS-PP").unwrap();
        match &cds.detail {
            PartyPosition::OfficialLine {
                total_deputies,
                voting_deputies,
                dissidents,
            } => {
                assert_eq!(*total_deputies, 2);
                assert_eq!(*voting_deputies, 1);
                assert_eq!(dissidents.len(), 1);
            }
            other => panic!("expected official line, got {other:?}"),
        }
    }

    #[test]
    fn dissident_overflow_clamps_to_zero() {
        let rec = record(&[
            ("CDS-PP", VotePosition::Favor),
            ("A Um (CDS-PP)", VotePosition::Against),
            ("B Dois (CDS-PP)", VotePosition::Against),
            ("C Tres (CDS-PP)", VotePosition::Against),
        ]);
        let out = reconcile(&rec, &roster());
        let cds = out.parties.iter().find(|p| p.party == "CDS-PP").unwrap();
        match &cds.detail {
            PartyPosition::OfficialLine {
                voting_deputies, ..
            } => assert_eq!(*voting_deputies, 0),
            other => panic!("expected official line, got {other:?}"),
        }
    }

    #[test]
    fn absence_is_chamber_shortfall() {
        let rec = record(&[("PS", VotePosition::Favor), ("CH", VotePosition::Against)]);
        let out = reconcile(&rec, &roster());
        let chamber = roster().chamber_total();
        assert_eq!(out.favor + out.against + out.abstention + out.absent, chamber);
        assert_eq!(out.absent, chamber - 77 - 50);
    }

    #[test]
    fn unannotated_deputy_lands_in_independent_bucket() {
        let rec = record(&[("Maria dos Santos", VotePosition::Favor)]);
        let out = reconcile(&rec, &roster());
        let ind = out
            .parties
            .iter()
            .find(|p| p.party == INDEPENDENT_PARTY)
            .unwrap();
        match &ind.detail {
            PartyPosition::IndividualOnly { voters } => assert_eq!(voters.len(), 1),
            other => panic!("expected individual-only, got {other:?}"),
        }
        assert_eq!(out.favor, 1);
    }

    #[test]
    fn unanimous_record_reduces_to_sentinel() {
        let mut rec = record(&[]);
        rec.votes
            .insert(ALL_PARTIES.to_string(), VotePosition::Favor);
        rec.favor = 1;
        rec.unanimous = true;

        assert!(is_unanimous_display(&rec));
        let out = reconcile(&rec, &roster());
        assert!(out.unanimous);
        assert_eq!(out.favor, 1);
        assert_eq!(out.against, 0);
        assert_eq!(out.abstention, 0);
        assert_eq!(out.absent, 0);
        assert!(out.parties.is_empty());
    }

    #[test]
    fn empty_roster_reports_no_absence() {
        let rec = record(&[("PS", VotePosition::Favor)]);
        let empty = Roster::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let out = reconcile(&rec, &empty);
        assert_eq!(out.absent, 0);
    }
}
