//! Canonical Orderer
//!
//! Rebuilds the consolidated corpus in canonical book order. Books the
//! canon does not name are reported, then dropped or appended according
//! to `ExtrasPolicy`.

use serde::{Deserialize, Serialize};

use crate::canon::canonical_order;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::model::Corpus;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtrasPolicy {
    #[default]
    Drop,
    Append,
}

pub fn order_canonically(mut corpus: Corpus, extras: ExtrasPolicy, diags: &mut Diagnostics) -> Corpus {
    let mut ordered = Corpus::new();

    for entry in canonical_order() {
        match corpus.take(entry.name) {
            Some(book) => {
                ordered.insert(book);
            }
            None => diags.warn(
                DiagnosticKind::MissingCanonical,
                format!("Book '{}' from KJV order not found in the input JSON data.", entry.name),
                DiagnosticContext::book(entry.name),
            ),
        }
    }

    // Whatever is left was never consumed by the canonical pass.
    let mut leftovers: Vec<_> = corpus.into_iter().collect();
    if !leftovers.is_empty() {
        leftovers.sort_by(|a, b| a.name.cmp(&b.name));
        let listing: Vec<_> = leftovers.iter().map(|b| format!("  - {}", b.name)).collect();
        diags.warn(
            DiagnosticKind::NonCanonical,
            format!(
                "The following books were found in the JSON data but are not in the standard KJV order list:\n{}",
                listing.join("\n")
            ),
            DiagnosticContext::default(),
        );
        for book in &leftovers {
            diags.warn(
                DiagnosticKind::NonCanonical,
                format!("Non-canonical book '{}' {}", book.name, match extras {
                    ExtrasPolicy::Drop => "dropped from output.",
                    ExtrasPolicy::Append => "appended after the canonical books.",
                }),
                DiagnosticContext::book(&book.name),
            );
        }
        if extras == ExtrasPolicy::Append {
            for book in leftovers {
                ordered.insert(book);
            }
        }
    }

    tracing::debug!(books = ordered.len(), "canonical ordering finished");
    ordered
}
