//! Downloadable-document extraction.
//!
//! Collects document references from three places: merged commission entries
//! across consolidated phases, the proposal's official publication, and raw
//! attachments. One combined list, newest first; dateless entries sort last
//! in encounter order.

use hemiciclo_model::dates;
use hemiciclo_model::raw::RawProposal;
use hemiciclo_model::view::DocumentRef;

use crate::timeline::ConsolidatedPhase;

const PUBLICATION_TITLE: &str = "Official Publication";
const DEFAULT_ATTACHMENT_TITLE: &str = "Attachment";

/// Extract every document reference with a usable URL.
pub fn extract_documents(
    proposal: &RawProposal,
    phases: &[ConsolidatedPhase],
) -> Vec<DocumentRef> {
    let mut documents: Vec<DocumentRef> = Vec::new();

    for phase in phases {
        for commission in &phase.commissions {
            for doc in &commission.documents {
                if doc.url.trim().is_empty() {
                    continue;
                }
                let title = if doc.title.trim().is_empty() {
                    format!("Document of {}", commission.name)
                } else {
                    doc.title.trim().to_string()
                };
                let date = dates::parse_flexible(&doc.date);
                documents.push(DocumentRef {
                    title,
                    kind: doc.kind.clone(),
                    date,
                    formatted_date: date.map(dates::format_display),
                    url: doc.url.trim().to_string(),
                });
            }
        }
    }

    if !proposal.publication_url.trim().is_empty() {
        let date = dates::parse_flexible(&proposal.publication_date);
        documents.push(DocumentRef {
            title: PUBLICATION_TITLE.to_string(),
            kind: "publication".to_string(),
            date,
            formatted_date: date.map(dates::format_display),
            url: proposal.publication_url.trim().to_string(),
        });
    }

    for attachment in &proposal.attachments {
        if attachment.url.trim().is_empty() {
            continue;
        }
        let title = if attachment.name.trim().is_empty() {
            DEFAULT_ATTACHMENT_TITLE.to_string()
        } else {
            attachment.name.trim().to_string()
        };
        documents.push(DocumentRef {
            title,
            kind: "attachment".to_string(),
            date: None,
            formatted_date: None,
            url: attachment.url.trim().to_string(),
        });
    }

    // Stable descending sort; dateless entries last.
    documents.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    documents
}
