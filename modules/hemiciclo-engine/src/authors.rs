//! Author and primary-party resolution.
//!
//! Upstream records carry authorship under four alternative representations
//! depending on vintage and proposal kind. The first non-empty source wins
//! for the author list; the primary party resolves independently down the
//! same chain, terminating at the "Unknown" sentinel (a valid resolved
//! state, not an error).

use hemiciclo_model::raw::RawProposal;
use hemiciclo_model::view::DeputyAuthor;

/// Sentinel primary party when no source resolves one.
pub const UNKNOWN_PARTY: &str = "Unknown";

/// Generic-author type tag marking a parliamentary group.
const GROUP_KIND: &str = "group";

/// Resolved authorship of one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorship {
    /// Display names in discovery order. Duplicates allowed.
    pub authors: Vec<String>,
    /// Individual-deputy authors, collected regardless of which source won
    /// the author list.
    pub deputies: Vec<DeputyAuthor>,
    /// Primary party, or [`UNKNOWN_PARTY`].
    pub party: String,
}

/// Title-case a display name: each whitespace-delimited word capitalized,
/// remainder lower-cased. Party acronyms are never passed through here.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve authors, deputies and primary party from the raw record.
pub fn resolve_authors(proposal: &RawProposal) -> Authorship {
    let mut authors: Vec<String> = Vec::new();
    let mut deputies: Vec<DeputyAuthor> = Vec::new();
    let mut party: Option<String> = None;

    // 1. Parliamentary groups: each code joins the list, first code is the
    //    primary party.
    for group in &proposal.group_authors {
        let code = group.code.trim();
        if code.is_empty() {
            continue;
        }
        authors.push(title_case(code));
        if party.is_none() {
            party = Some(code.to_string());
        }
    }

    // 2. Individual deputies: always collected; they win the author list
    //    only when no group supplied it.
    for deputy in &proposal.deputy_authors {
        let name = deputy.name.trim();
        if name.is_empty() {
            continue;
        }
        let display = title_case(name);
        let deputy_party = {
            let code = deputy.code.trim();
            (!code.is_empty()).then(|| code.to_string())
        };
        deputies.push(DeputyAuthor {
            name: display,
            party: deputy_party,
        });
    }
    if authors.is_empty() {
        authors.extend(deputies.iter().map(|d| d.name.clone()));
    }

    // 3. "Other" authors (government, citizens' initiative): single object
    //    or array. The first one becomes the primary party if none resolved.
    if let Some(others) = &proposal.other_authors {
        let others_win_list = authors.is_empty();
        for other in others.as_slice() {
            let name = other.name.trim();
            let acronym = other.acronym.trim();
            let display = if !name.is_empty() {
                title_case(name)
            } else if !acronym.is_empty() {
                acronym.to_string()
            } else {
                continue;
            };
            if others_win_list {
                authors.push(display);
            }
            if party.is_none() {
                party = Some(if !acronym.is_empty() {
                    acronym.to_string()
                } else {
                    title_case(name)
                });
            }
        }
    }

    // 4. Generic fallback array: wins the author list only when nothing
    //    above filled it. The primary party resolves independently of who
    //    won the list, preferring group-typed entries; without one, the
    //    first entry stands in.
    if authors.is_empty() {
        for generic in &proposal.authors {
            let name = generic.name.trim();
            if name.is_empty() {
                continue;
            }
            authors.push(title_case(name));
        }
    }
    if party.is_none() {
        let group_entry = proposal.authors.iter().find(|a| {
            a.kind.trim().eq_ignore_ascii_case(GROUP_KIND) && !a.name.trim().is_empty()
        });
        let any_entry = proposal.authors.iter().find(|a| !a.name.trim().is_empty());
        if let Some(entry) = group_entry.or(any_entry) {
            party = Some(entry.name.trim().to_string());
        }
    }

    Authorship {
        authors,
        deputies,
        party: party.unwrap_or_else(|| UNKNOWN_PARTY.to_string()),
    }
}
