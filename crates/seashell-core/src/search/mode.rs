use std::fmt;
use std::str::FromStr;

/// Where a query must sit within the term it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Every match.
    #[default]
    Any,
    /// The query is a whole word.
    Exact,
    /// The query starts a word but does not end it.
    Start,
    /// The query ends a word but does not start it.
    End,
    /// The query neither starts nor ends a word.
    Middle,
}

impl SearchMode {
    pub const ALL: [SearchMode; 5] = [
        SearchMode::Any,
        SearchMode::Exact,
        SearchMode::Start,
        SearchMode::End,
        SearchMode::Middle,
    ];

    /// Classify a match by whether it touches a word start and a word end.
    pub fn matches(self, at_start: bool, at_end: bool) -> bool {
        match self {
            SearchMode::Any => true,
            SearchMode::Exact => at_start && at_end,
            SearchMode::Start => at_start && !at_end,
            SearchMode::End => !at_start && at_end,
            SearchMode::Middle => !at_start && !at_end,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::Exact => "exact",
            SearchMode::Start => "start",
            SearchMode::End => "end",
            SearchMode::Middle => "middle",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search mode {0:?} (expected any, exact, start, end or middle)")]
pub struct ParseSearchModeError(String);

impl FromStr for SearchMode {
    type Err = ParseSearchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSearchModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_partition_the_classifications() {
        for at_start in [false, true] {
            for at_end in [false, true] {
                let hits = SearchMode::ALL[1..]
                    .iter()
                    .filter(|m| m.matches(at_start, at_end))
                    .count();
                assert_eq!(hits, 1);
                assert!(SearchMode::Any.matches(at_start, at_end));
            }
        }
    }

    #[test]
    fn parse_and_display() {
        for mode in SearchMode::ALL {
            assert_eq!(mode.to_string().parse::<SearchMode>(), Ok(mode));
        }
        assert_eq!("EXACT".parse::<SearchMode>(), Ok(SearchMode::Exact));
        assert!("fuzzy".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::default(), SearchMode::Any);
    }
}
