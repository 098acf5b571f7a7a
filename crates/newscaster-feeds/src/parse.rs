//! Feed document parsing.

use feed_rs::parser;
use newscaster_core::{Entry, FetchError};

/// Parse an RSS or Atom document into entries, in document order.
///
/// The first link of an entry becomes its identifier. The description is
/// the summary if present, otherwise the content body.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<Entry>, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| Entry {
            link: entry.links.first().map(|l| l.href.clone()),
            title: entry.title.map(|t| t.content),
            description: entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body)),
        })
        .collect();

    Ok(entries)
}
