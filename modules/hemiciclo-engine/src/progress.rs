//! Phase-based completion percentage.
//!
//! A curated phase→percentage table covers the lifecycle's four bands;
//! phases missing from it fall back through a category-membership table,
//! then case-insensitive keyword matching, then a conservative default.
//! The tables are static slices so the whole fallback chain stays auditable
//! in one place.

use hemiciclo_model::view::{PhaseCategory, ProgressInfo};

use crate::timeline::ConsolidatedPhase;

/// Percentage when no fallback recognizes the phase.
pub const DEFAULT_PERCENTAGE: u8 = 20;

/// Curated table, in chronological order. Bands: initial 0–15, general
/// debate 15–40, specialty review 40–70, final/promulgation/publication
/// 70–100. Percentages are non-decreasing down the table.
const PHASE_TABLE: &[(&str, u8, PhaseCategory)] = &[
    ("Submission", 5, PhaseCategory::Initial),
    ("Admission", 10, PhaseCategory::Initial),
    ("Announcement", 15, PhaseCategory::Initial),
    ("Referral to committee (general)", 25, PhaseCategory::General),
    ("General debate", 30, PhaseCategory::General),
    ("General vote", 40, PhaseCategory::General),
    ("Referral to committee (specialty)", 45, PhaseCategory::Specialty),
    ("Specialty debate", 55, PhaseCategory::Specialty),
    ("Specialty vote", 65, PhaseCategory::Specialty),
    ("Final global vote", 70, PhaseCategory::Final),
    ("Decree sent to President", 80, PhaseCategory::Final),
    ("Promulgation", 90, PhaseCategory::Final),
    ("Publication", 100, PhaseCategory::Final),
];

/// Known phase names outside the curated table, mapped to a category only.
const CATEGORY_TABLE: &[(&str, PhaseCategory)] = &[
    ("Discussion scheduled", PhaseCategory::General),
    ("Joint general debate", PhaseCategory::General),
    ("Committee hearing", PhaseCategory::Specialty),
    ("Amendment proposals", PhaseCategory::Specialty),
    ("Committee report", PhaseCategory::Specialty),
    ("Sent for promulgation", PhaseCategory::Final),
    ("Referendum request", PhaseCategory::Final),
];

/// Mid-band value per category for the category-membership fallback.
fn category_midpoint(category: PhaseCategory) -> u8 {
    match category {
        PhaseCategory::Initial => 10,
        PhaseCategory::General => 30,
        PhaseCategory::Specialty => 60,
        PhaseCategory::Final => 85,
    }
}

/// Keyword fallback, checked in order: more specific keywords first.
const KEYWORD_TABLE: &[(&str, u8, PhaseCategory)] = &[
    ("publication", 100, PhaseCategory::Final),
    ("promulgation", 90, PhaseCategory::Final),
    ("final", 75, PhaseCategory::Final),
    ("specialty", 60, PhaseCategory::Specialty),
    ("general", 35, PhaseCategory::General),
    ("admission", 10, PhaseCategory::Initial),
];

/// Resolve one phase name through the full fallback chain.
pub fn progress_for_phase(name: &str) -> ProgressInfo {
    let trimmed = name.trim();

    for (phase, percentage, category) in PHASE_TABLE {
        if trimmed.eq_ignore_ascii_case(phase) {
            return info(trimmed, *percentage, *category);
        }
    }

    for (phase, category) in CATEGORY_TABLE {
        if trimmed.eq_ignore_ascii_case(phase) {
            return info(trimmed, category_midpoint(*category), *category);
        }
    }

    let lowered = trimmed.to_lowercase();
    for (keyword, percentage, category) in KEYWORD_TABLE {
        if lowered.contains(keyword) {
            return info(trimmed, *percentage, *category);
        }
    }

    info(trimmed, DEFAULT_PERCENTAGE, PhaseCategory::General)
}

/// Progress for a proposal: the consolidated phase with the latest raw date
/// is "current" (raw-order tie-break, same rule as the overall status).
/// No phases at all degrades to the default, not an error.
pub fn compute_progress(phases: &[ConsolidatedPhase]) -> ProgressInfo {
    let current = phases
        .iter()
        .filter(|p| p.date.is_some())
        .max_by_key(|p| (p.date, p.last_raw_index))
        .or_else(|| phases.last());

    match current {
        Some(phase) => progress_for_phase(&phase.name),
        None => info("", DEFAULT_PERCENTAGE, PhaseCategory::General),
    }
}

fn info(phase: &str, percentage: u8, category: PhaseCategory) -> ProgressInfo {
    ProgressInfo {
        percentage,
        current_phase: phase.to_string(),
        category,
        description: category.description(),
    }
}
