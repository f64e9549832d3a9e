//! Range-token parsing and index → recipient expansion.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::AddressRangeEntry;

static RANGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^NR(\d+)-(\d+)").unwrap());

/// Parse a note of the form `NR<start>-<end>` into an inclusive range.
///
/// Only the prefix has to match; trailing text is ignored. Returns `None` for
/// anything else, including overflowing numbers, a zero start and reversed
/// bounds.
pub fn parse_range_token(note: &str) -> Option<(u32, u32)> {
    let caps = RANGE_TOKEN.captures(note)?;
    let start: u32 = caps.get(1)?.as_str().parse().ok()?;
    let end: u32 = caps.get(2)?.as_str().parse().ok()?;
    if start == 0 || start > end {
        return None;
    }
    Some((start, end))
}

/// Build a range entry from a raw `note` and address. Malformed notes yield `None`.
pub fn range_entry(note: &str, recipient_address: &str) -> Option<AddressRangeEntry> {
    let (range_start, range_end) = parse_range_token(note)?;
    Some(AddressRangeEntry {
        range_start,
        range_end,
        recipient_address: recipient_address.to_string(),
    })
}

/// Recipient resolved for one file index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: String,
    /// Position of the supplying entry in the input sequence.
    pub source: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MappedRange {
    start: u32,
    end: u32,
    recipient: Recipient,
}

/// Immutable mapping from file index to recipient.
///
/// Ranges are kept as parsed rather than expanded, so a huge range in the
/// input costs one entry. Lookups scan from the last range backwards, which
/// gives later entries precedence on overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMap {
    ranges: Vec<MappedRange>,
}

impl AddressMap {
    /// Collect entries in order; a later entry overwrites earlier ones on overlap.
    ///
    /// `None` items stand for entries whose range token did not parse. They
    /// still occupy a position so `Recipient::source` indexes the original list.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a AddressRangeEntry>>,
    {
        let ranges = entries
            .into_iter()
            .enumerate()
            .filter_map(|(source, entry)| {
                let entry = entry?;
                Some(MappedRange {
                    start: entry.range_start,
                    end: entry.range_end,
                    recipient: Recipient {
                        address: entry.recipient_address.clone(),
                        source,
                    },
                })
            })
            .collect();
        Self { ranges }
    }

    /// Recipient for `index`. An empty address on the winning entry counts as
    /// unmapped.
    pub fn get(&self, index: u32) -> Option<&Recipient> {
        self.ranges
            .iter()
            .rev()
            .find(|range| (range.start..=range.end).contains(&index))
            .map(|range| &range.recipient)
            .filter(|recipient| !recipient.address.is_empty())
    }

    /// Number of parsed ranges.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }
}
