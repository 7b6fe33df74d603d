//! Channel list parsing.
//!
//! Channel lists are written as comma-separated channel numbers and
//! inclusive ranges, for example `1-11,36,40,44`.

use winnow::ascii::dec_uint;
use winnow::combinator::{opt, preceded, separated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use super::addr::{AddrError, Result};

type PResult<T> = std::result::Result<T, ErrMode<ContextError>>;

fn channel_range(input: &mut &str) -> PResult<(u16, u16)> {
    let start: u16 = dec_uint.parse_next(input)?;
    let end: Option<u16> = opt(preceded('-', dec_uint)).parse_next(input)?;
    Ok((start, end.unwrap_or(start)))
}

fn channel_ranges(input: &mut &str) -> PResult<Vec<(u16, u16)>> {
    separated(1.., channel_range, ',').parse_next(input)
}

/// Parse a channel list into a sorted, de-duplicated list of channel numbers.
///
/// Whitespace is ignored. A range whose start is above its end is rejected.
pub fn parse_channel_list(s: &str) -> Result<Vec<u16>> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    let ranges = channel_ranges
        .parse(compact.as_str())
        .map_err(|_| AddrError::InvalidChannelList(s.to_string()))?;

    let mut channels = Vec::new();
    for (start, end) in ranges {
        if start > end {
            return Err(AddrError::InvalidChannelList(s.to_string()));
        }
        channels.extend(start..=end);
    }

    channels.sort_unstable();
    channels.dedup();
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_channels() {
        assert_eq!(parse_channel_list("1,6,11").unwrap(), vec![1, 6, 11]);
    }

    #[test]
    fn test_ranges_and_singles() {
        assert_eq!(
            parse_channel_list("1-3, 36,40").unwrap(),
            vec![1, 2, 3, 36, 40]
        );
    }

    #[test]
    fn test_overlap_is_deduplicated() {
        assert_eq!(parse_channel_list("1-4,3-5").unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_lists() {
        assert!(parse_channel_list("").is_err());
        assert!(parse_channel_list("5-1").is_err());
        assert!(parse_channel_list("1,,2").is_err());
        assert!(parse_channel_list("a-b").is_err());
        assert!(parse_channel_list("1-").is_err());
    }
}
