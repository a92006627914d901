//! Offset ("friend") lists: channel sequences spread across a trigger strip.
//!
//! `"1 thru 4"` yields channels 1, 2, 3, 4 fired one after another.
//! Parenthesized groups run concurrently: `"(1-3)(5-7)"` yields three
//! commands, each combining one channel from every group.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on channels a single group may expand to.
pub const MAX_CHANNELS_PER_GROUP: usize = 10_000;

const RANGE_KEYWORDS: &[&str] = &["through", "thru", "-", "tthru", "throu", "--", "por"];

static DIGIT_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)-(\d)").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());
static GROUPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendParseError {
    /// A range keyword next to something that is not a channel number.
    InvalidRangeBound(String),
    /// A range wider than `MAX_CHANNELS_PER_GROUP`.
    RangeTooLarge { start: u32, end: u32 },
}

impl fmt::Display for FriendParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRangeBound(token) => write!(f, "invalid range bound: {:?}", token),
            Self::RangeTooLarge { start, end } => {
                write!(f, "range {} thru {} is too large", start, end)
            }
        }
    }
}

impl std::error::Error for FriendParseError {}

fn is_range_keyword(token: &str) -> bool {
    RANGE_KEYWORDS.contains(&token)
}

fn parse_channel(token: &str) -> Option<u32> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn push_range(channels: &mut Vec<u32>, start: u32, end: u32) -> Result<(), FriendParseError> {
    let span = start.abs_diff(end) as usize + 1;
    if channels.len() + span > MAX_CHANNELS_PER_GROUP {
        return Err(FriendParseError::RangeTooLarge { start, end });
    }
    if start <= end {
        channels.extend(start..=end);
    } else {
        channels.extend((end..=start).rev());
    }
    Ok(())
}

/// Parse one sequential group into channel numbers.
///
/// Tokens are separated by commas or whitespace. `a thru b` (or `a-b`)
/// expands inclusively, descending when `a > b`. Words that are neither
/// numbers nor range keywords are ignored, as is a keyword with nothing on
/// one side.
pub fn parse_channels(input: &str) -> Result<Vec<u32>, FriendParseError> {
    let spaced = DIGIT_DASH.replace_all(input, "${1} - ${2}");
    let tokens: Vec<&str> = SEPARATORS
        .split(&spaced)
        .filter(|t| !t.is_empty())
        .collect();

    let mut channels = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let keyword_follows = i + 2 < tokens.len() && is_range_keyword(tokens[i + 1]);

        if keyword_follows {
            let start = parse_channel(token)
                .ok_or_else(|| FriendParseError::InvalidRangeBound(token.to_string()))?;
            let end = parse_channel(tokens[i + 2])
                .ok_or_else(|| FriendParseError::InvalidRangeBound(tokens[i + 2].to_string()))?;
            push_range(&mut channels, start, end)?;
            i += 3;
            continue;
        }

        if let Some(channel) = parse_channel(token) {
            if channels.len() >= MAX_CHANNELS_PER_GROUP {
                return Err(FriendParseError::RangeTooLarge {
                    start: channel,
                    end: channel,
                });
            }
            channels.push(channel);
        }
        i += 1;
    }
    Ok(channels)
}

/// Split an offset list into concurrent groups.
///
/// Without parentheses the whole input is a single sequential group.
pub fn parse_concurrent_groups(input: &str) -> Result<Vec<Vec<u32>>, FriendParseError> {
    let groups: Vec<&str> = GROUPS
        .captures_iter(input)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if groups.is_empty() {
        return Ok(vec![parse_channels(input)?]);
    }
    groups.into_iter().map(parse_channels).collect()
}

/// Replace the first free-standing integer in `template` with `channel`.
pub fn substitute_channel(template: &str, channel: u32) -> String {
    FIRST_INTEGER
        .replace(template, channel.to_string().as_str())
        .into_owned()
}

/// Expand `friend_list` against the `template` command.
///
/// Each group produces one command per channel; groups are zipped by
/// position (the shortest group bounds the result) and the commands at a
/// position are joined with a space.
pub fn offset_commands(template: &str, friend_list: &str) -> Result<Vec<String>, FriendParseError> {
    let groups = parse_concurrent_groups(friend_list)?;
    let per_group: Vec<Vec<String>> = groups
        .iter()
        .map(|channels| {
            channels
                .iter()
                .map(|&c| substitute_channel(template, c))
                .collect()
        })
        .collect();

    let len = per_group.iter().map(Vec::len).min().unwrap_or(0);
    Ok((0..len)
        .map(|i| {
            per_group
                .iter()
                .map(|cmds| cmds[i].as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_channels() {
        assert_eq!(parse_channels("1, 4 7").unwrap(), vec![1, 4, 7]);
    }

    #[test]
    fn ascending_and_descending_ranges() {
        assert_eq!(parse_channels("1 thru 4").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(parse_channels("4-1").unwrap(), vec![4, 3, 2, 1]);
        assert_eq!(parse_channels("10 through 12, 20").unwrap(), vec![10, 11, 12, 20]);
    }

    #[test]
    fn range_does_not_repeat_start_or_skip_next() {
        assert_eq!(parse_channels("1 thru 3 9").unwrap(), vec![1, 2, 3, 9]);
    }

    #[test]
    fn unknown_words_are_ignored() {
        assert_eq!(parse_channels("Chan 5 and 6").unwrap(), vec![5, 6]);
        assert_eq!(parse_channels("thru 5").unwrap(), vec![5]);
    }

    #[test]
    fn bad_range_bound_is_an_error() {
        assert_eq!(
            parse_channels("x thru 5"),
            Err(FriendParseError::InvalidRangeBound("x".to_string()))
        );
        assert!(parse_channels("(1-3").is_err());
    }

    #[test]
    fn huge_range_is_rejected() {
        assert!(matches!(
            parse_channels("1 thru 4000000000"),
            Err(FriendParseError::RangeTooLarge { .. })
        ));
    }

    #[test]
    fn groups_without_parentheses() {
        assert_eq!(parse_concurrent_groups("1-3").unwrap(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn groups_with_parentheses() {
        assert_eq!(
            parse_concurrent_groups("(1-3)(5-7)").unwrap(),
            vec![vec![1, 2, 3], vec![5, 6, 7]]
        );
    }

    #[test]
    fn substitutes_first_integer_only() {
        assert_eq!(substitute_channel("Chan 1 at 50 Enter", 9), "Chan 9 at 50 Enter");
        assert_eq!(substitute_channel("Chan at Full", 9), "Chan at Full");
        assert_eq!(substitute_channel("Group1 at 5", 9), "Group1 at 9");
    }

    #[test]
    fn sequential_offsets() {
        let cmds = offset_commands("Chan 1 at Full Enter", "1-3").unwrap();
        assert_eq!(
            cmds,
            vec![
                "Chan 1 at Full Enter",
                "Chan 2 at Full Enter",
                "Chan 3 at Full Enter"
            ]
        );
    }

    #[test]
    fn concurrent_offsets_are_zipped() {
        let cmds = offset_commands("Chan 1 at Full Enter", "(1-3)(5-7)").unwrap();
        assert_eq!(
            cmds,
            vec![
                "Chan 1 at Full Enter Chan 5 at Full Enter",
                "Chan 2 at Full Enter Chan 6 at Full Enter",
                "Chan 3 at Full Enter Chan 7 at Full Enter",
            ]
        );
    }

    #[test]
    fn uneven_groups_truncate_to_shortest() {
        let cmds = offset_commands("Chan 1", "(1-3)(8)").unwrap();
        assert_eq!(cmds, vec!["Chan 1 Chan 8"]);
    }
}
