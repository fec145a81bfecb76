//! Hash slot range codec
//!
//! Converts between slot sets and the comma-separated range notation used by
//! `CLUSTER NODES` and the slot management commands, e.g. `0-5460,5462`.
//! Single slots are written bare, never as `n-n`.

use std::collections::BTreeSet;

use super::types::{SlotRange, SlotRangeError, SlotRangeErrorKind, TOTAL_SLOTS};

/// Group slots into maximal runs of consecutive values, ascending.
pub fn slot_ranges<'a, I>(slots: I) -> Vec<SlotRange>
where
    I: IntoIterator<Item = &'a u16>,
{
    let sorted: BTreeSet<u16> = slots.into_iter().copied().collect();

    let mut ranges: Vec<SlotRange> = Vec::new();
    for slot in sorted {
        match ranges.last_mut() {
            Some(range) if range.end.checked_add(1) == Some(slot) => range.end = slot,
            _ => ranges.push(SlotRange::new(slot, slot)),
        }
    }
    ranges
}

/// Encode slots in canonical range notation.
///
/// # Example
/// ```
/// use relumin_core::cluster::encode_slots;
/// use std::collections::BTreeSet;
///
/// let slots: BTreeSet<u16> = [1, 2, 3, 7, 9, 10].into_iter().collect();
/// assert_eq!(encode_slots(&slots), "1-3,7,9-10");
/// ```
pub fn encode_slots<'a, I>(slots: I) -> String
where
    I: IntoIterator<Item = &'a u16>,
{
    slot_ranges(slots)
        .iter()
        .map(SlotRange::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode slot tokens (`"7"`, `"0-5460"`) into a slot set.
///
/// Overlapping and duplicate tokens coalesce. The first bad token aborts the
/// call and is named in the error.
pub fn decode_slots<S: AsRef<str>>(tokens: &[S]) -> Result<BTreeSet<u16>, SlotRangeError> {
    let mut slots = BTreeSet::new();
    for token in tokens {
        let range = parse_slot_token(token.as_ref())?;
        slots.extend(range.start..=range.end);
    }
    Ok(slots)
}

/// Decode a comma-separated slot list such as the output of [`encode_slots`].
pub fn decode_slot_list(list: &str) -> Result<BTreeSet<u16>, SlotRangeError> {
    let tokens: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    decode_slots(&tokens)
}

/// Parse one `start-end` or single-slot token.
pub(crate) fn parse_slot_token(token: &str) -> Result<SlotRange, SlotRangeError> {
    let trimmed = token.trim();
    let segments: Vec<&str> = trimmed.split('-').collect();

    let (start, end) = match segments.as_slice() {
        [single] => {
            let slot = parse_slot(single, token)?;
            (slot, slot)
        }
        [start, end] => (parse_slot(start, token)?, parse_slot(end, token)?),
        _ => {
            return Err(SlotRangeError::new(
                token,
                SlotRangeErrorKind::InvalidFormat,
            ));
        }
    };

    if start > end {
        return Err(SlotRangeError::new(
            token,
            SlotRangeErrorKind::StartAfterEnd,
        ));
    }

    Ok(SlotRange::new(start, end))
}

fn parse_slot(segment: &str, token: &str) -> Result<u16, SlotRangeError> {
    // u16::from_str accepts a leading '+', the wire format never does
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SlotRangeError::new(
            token,
            SlotRangeErrorKind::InvalidFormat,
        ));
    }

    match segment.parse::<u16>() {
        Ok(slot) if slot < TOTAL_SLOTS => Ok(slot),
        _ => Err(SlotRangeError::new(token, SlotRangeErrorKind::OutOfRange)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(slots: &[u16]) -> BTreeSet<u16> {
        slots.iter().copied().collect()
    }

    #[test]
    fn test_encode_empty_and_single() {
        assert_eq!(encode_slots(&set(&[])), "");
        assert_eq!(encode_slots(&set(&[5])), "5");
    }

    #[test]
    fn test_encode_runs() {
        assert_eq!(encode_slots(&set(&[1, 2, 3, 7, 9, 10])), "1-3,7,9-10");
        assert_eq!(encode_slots(&set(&[0, 16383])), "0,16383");
        assert_eq!(encode_slots(&set(&[4, 5])), "4-5");
    }

    #[test]
    fn test_encode_accepts_unsorted_input() {
        let slots = vec![10u16, 3, 9, 1, 2, 2];
        assert_eq!(encode_slots(&slots), "1-3,9-10");
    }

    #[test]
    fn test_encode_full_range() {
        let all: BTreeSet<u16> = (0..TOTAL_SLOTS).collect();
        assert_eq!(encode_slots(&all), "0-16383");
    }

    #[test]
    fn test_encode_never_emits_singleton_range() {
        let slots = set(&[1, 3, 5, 6, 8, 100, 102, 103, 104]);
        let encoded = encode_slots(&slots);
        for token in encoded.split(',') {
            if let Some((start, end)) = token.split_once('-') {
                assert_ne!(start, end, "singleton rendered as range in {encoded}");
            }
        }
        assert_eq!(encoded, "1,3,5-6,8,100,102-104");
    }

    #[test]
    fn test_decode_ranges() {
        assert_eq!(
            decode_slots(&["1-3", "7", "9-10"]).unwrap(),
            set(&[1, 2, 3, 7, 9, 10])
        );
    }

    #[test]
    fn test_decode_trims_and_coalesces() {
        assert_eq!(
            decode_slots(&[" 1-4 ", "3-5", "5"]).unwrap(),
            set(&[1, 2, 3, 4, 5])
        );
    }

    #[test]
    fn test_decode_start_after_end() {
        let err = decode_slots(&["5-3"]).unwrap_err();
        assert_eq!(err.token, "5-3");
        assert_eq!(err.kind, SlotRangeErrorKind::StartAfterEnd);
    }

    #[test]
    fn test_decode_non_numeric() {
        let err = decode_slots(&["abc"]).unwrap_err();
        assert_eq!(err.token, "abc");
        assert_eq!(err.kind, SlotRangeErrorKind::InvalidFormat);

        let err = decode_slots(&["1-x"]).unwrap_err();
        assert_eq!(err.token, "1-x");
    }

    #[test]
    fn test_decode_malformed_segments() {
        for token in ["1-2-3", "-1", "1-", "", "+5"] {
            let err = decode_slots(&[token]).unwrap_err();
            assert_eq!(err.kind, SlotRangeErrorKind::InvalidFormat, "{token}");
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        let err = decode_slots(&["16380-16384"]).unwrap_err();
        assert_eq!(err.kind, SlotRangeErrorKind::OutOfRange);
        assert!(decode_slots(&["99999999"]).is_err());
        assert!(decode_slots(&["16383"]).is_ok());
    }

    #[test]
    fn test_decode_stops_at_first_bad_token() {
        let err = decode_slots(&["1-3", "oops", "9-5"]).unwrap_err();
        assert_eq!(err.token, "oops");
    }

    #[test]
    fn test_round_trip_is_canonical() {
        let decoded = decode_slots(&["9-10", "1", "2-3", "7", "3"]).unwrap();
        let encoded = encode_slots(&decoded);
        assert_eq!(encoded, "1-3,7,9-10");
        assert_eq!(decode_slot_list(&encoded).unwrap(), decoded);
    }

    #[test]
    fn test_decode_slot_list_skips_empty_segments() {
        assert_eq!(decode_slot_list("0-2,,5,").unwrap(), set(&[0, 1, 2, 5]));
        assert!(decode_slot_list("").unwrap().is_empty());
    }

    #[test]
    fn test_slot_ranges() {
        let ranges = slot_ranges(&set(&[0, 1, 2, 10]));
        assert_eq!(ranges, vec![SlotRange::new(0, 2), SlotRange::new(10, 10)]);
        assert!(slot_ranges(&set(&[])).is_empty());
    }
}
