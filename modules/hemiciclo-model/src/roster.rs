//! Deputy-roster snapshot.
//!
//! A dated mapping of party code → seat count, supplied by the caller per
//! invocation. The engine treats it as read-only and tolerates a fresh
//! snapshot on every call. Party codes upstream are inconsistent about
//! punctuation and case ("CDS-PP" vs "CDS PP" vs "cds-pp"), so lookup falls
//! through exact → normalized → case-insensitive matching.

use std::collections::HashMap;

use chrono::NaiveDate;

/// Strip everything but alphanumerics and uppercase the rest.
/// "CDS-PP", "CDS PP" and "cds.pp" all normalize to "CDSPP".
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct Roster {
    date: NaiveDate,
    counts: HashMap<String, u32>,
    normalized: HashMap<String, u32>,
}

impl Roster {
    pub fn new(date: NaiveDate, counts: impl IntoIterator<Item = (String, u32)>) -> Self {
        let counts: HashMap<String, u32> = counts.into_iter().collect();
        let normalized = counts
            .iter()
            .map(|(code, &n)| (normalize_code(code), n))
            .collect();
        Self {
            date,
            counts,
            normalized,
        }
    }

    /// An empty snapshot: every lookup misses, chamber total is zero.
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, std::iter::empty())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Seat count for a party code: exact match, then normalized-code match,
    /// then case-insensitive exact match. None when the party is absent from
    /// the snapshot entirely.
    pub fn deputies_for(&self, code: &str) -> Option<u32> {
        if let Some(&n) = self.counts.get(code) {
            return Some(n);
        }
        if let Some(&n) = self.normalized.get(&normalize_code(code)) {
            return Some(n);
        }
        self.counts
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .map(|(_, &n)| n)
    }

    /// Total seats in the chamber at this snapshot's date.
    pub fn chamber_total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
