//! Calendar versioning
//!
//! A project supplies a pattern built from the tokens `YYYY`, `YY`, `0Y`,
//! `MM`, `0M`, `DD`, `0D`, `MINOR`, `MICRO` and `MODIFIER`; every other
//! character is a literal delimiter. The pattern is scanned token by token
//! against the version text:
//!
//! - `YYYY` takes exactly four digits, `0Y`/`0M`/`0D` exactly two
//! - `YY` takes up to three digits (years since 2000), `MM`/`DD` up to two
//! - `MINOR` and `MICRO` take every following digit
//! - `MODIFIER` must come last and takes the rest: a tag followed by an
//!   optional number, as in `rc1`
//!
//! Once the version text is exhausted, only delimiters, `MINOR`, `MICRO` and
//! `MODIFIER` may remain in the pattern.

use std::cmp::Ordering;

use crate::version::error::VersionError;
use crate::version::schemes::{Modifier, cmp_modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    FullYear,
    ShortYear,
    PaddedYear,
    Month,
    PaddedMonth,
    Day,
    PaddedDay,
    Minor,
    Micro,
    Modifier,
}

/// Longest names first so `YYYY` wins over `YY` and `MODIFIER` over `MM`
const TOKENS: [(&str, Token); 10] = [
    ("MODIFIER", Token::Modifier),
    ("MINOR", Token::Minor),
    ("MICRO", Token::Micro),
    ("YYYY", Token::FullYear),
    ("YY", Token::ShortYear),
    ("0Y", Token::PaddedYear),
    ("MM", Token::Month),
    ("0M", Token::PaddedMonth),
    ("DD", Token::Day),
    ("0D", Token::PaddedDay),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    Token(Token),
    Literal(char),
}

impl Item {
    /// Items allowed to stay unmatched after the version text ran out
    fn is_optional(&self) -> bool {
        matches!(
            self,
            Item::Literal(_) | Item::Token(Token::Minor | Token::Micro | Token::Modifier)
        )
    }
}

fn tokenize(pattern: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        match TOKENS.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, token)) => {
                items.push(Item::Token(*token));
                rest = &rest[name.len()..];
            }
            None => {
                items.push(Item::Literal(c));
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    items
}

/// Version parsed against a calendar pattern
#[derive(Debug, Clone, Default)]
pub struct CalendarVersion {
    pub year: Option<u64>,
    pub month: Option<u64>,
    pub day: Option<u64>,
    pub minor: Option<u64>,
    pub micro: Option<u64>,
    pub modifier: Option<Modifier>,
}

struct Scanner<'a> {
    pattern: &'a str,
    version: &'a str,
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn error(&self, reason: impl Into<String>) -> VersionError {
        VersionError::pattern(self.pattern, self.version, reason)
    }

    /// Take between `min` and `max` leading digits
    fn digits(&mut self, min: usize, max: usize, what: &str) -> Result<u64, VersionError> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len < min {
            return Err(if min == max {
                self.error(format!("expected {min} digits for {what}"))
            } else {
                self.error(format!("expected digits for {what}"))
            });
        }
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        digits
            .parse()
            .map_err(|_| self.error(format!("{what} {digits} is out of range")))
    }

    fn ranged(
        &mut self,
        min: usize,
        max: usize,
        what: &str,
        range: std::ops::RangeInclusive<u64>,
    ) -> Result<u64, VersionError> {
        let value = self.digits(min, max, what)?;
        if !range.contains(&value) {
            return Err(self.error(format!("{what} {value} is out of range")));
        }
        Ok(value)
    }

    fn modifier(&mut self) -> Result<Modifier, VersionError> {
        let split = self
            .rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (tag, number) = self.rest.split_at(split);
        if tag.is_empty() {
            return Err(self.error("modifier has no tag"));
        }
        if !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error(format!("unexpected text after modifier number: {number}")));
        }
        self.rest = "";
        Ok(Modifier::new(tag, number))
    }
}

impl CalendarVersion {
    pub fn parse(pattern: Option<&str>, version: &str) -> Result<Self, VersionError> {
        let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
            return Err(VersionError::pattern("", version, "no version pattern"));
        };

        let items = tokenize(pattern);
        let mut scanner = Scanner {
            pattern,
            version,
            rest: version,
        };

        if let Some(pos) = items
            .iter()
            .position(|item| *item == Item::Token(Token::Modifier))
        {
            if pos + 1 != items.len() {
                return Err(scanner.error("MODIFIER must be the last token of the pattern"));
            }
        }

        let mut parsed = CalendarVersion::default();

        for (i, item) in items.iter().enumerate() {
            if scanner.rest.is_empty() {
                if items[i..].iter().all(Item::is_optional) {
                    break;
                }
                return Err(scanner.error("version is shorter than the pattern"));
            }

            match item {
                Item::Literal(expected) => match scanner.rest.strip_prefix(*expected) {
                    Some(rest) => scanner.rest = rest,
                    None => return Err(scanner.error(format!("expected '{expected}'"))),
                },
                Item::Token(token) => match token {
                    Token::FullYear => parsed.year = Some(scanner.digits(4, 4, "year")?),
                    Token::ShortYear => {
                        parsed.year = Some(2000 + scanner.digits(1, 3, "year")?);
                    }
                    Token::PaddedYear => {
                        parsed.year = Some(2000 + scanner.digits(2, 2, "year")?);
                    }
                    Token::Month => parsed.month = Some(scanner.ranged(1, 2, "month", 1..=12)?),
                    Token::PaddedMonth => {
                        parsed.month = Some(scanner.ranged(2, 2, "month", 1..=12)?);
                    }
                    Token::Day => parsed.day = Some(scanner.ranged(1, 2, "day", 1..=31)?),
                    Token::PaddedDay => {
                        parsed.day = Some(scanner.ranged(2, 2, "day", 1..=31)?);
                    }
                    Token::Minor => parsed.minor = Some(scanner.digits(1, usize::MAX, "minor")?),
                    Token::Micro => parsed.micro = Some(scanner.digits(1, usize::MAX, "micro")?),
                    Token::Modifier => parsed.modifier = Some(scanner.modifier()?),
                },
            }
        }

        if !scanner.rest.is_empty() {
            return Err(scanner.error(format!("unexpected trailing text: {}", scanner.rest)));
        }

        Ok(parsed)
    }

    pub fn is_prerelease(&self) -> bool {
        self.modifier.is_some()
    }

    fn fields(&self) -> [Option<u64>; 5] {
        [self.year, self.month, self.day, self.minor, self.micro]
    }
}

impl Ord for CalendarVersion {
    /// Fields missing on either side are skipped; the modifier always decides last.
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.fields().into_iter().zip(other.fields()) {
            if let (Some(a), Some(b)) = (a, b) {
                if a != b {
                    return a.cmp(&b);
                }
            }
        }
        cmp_modifiers(self.modifier.as_ref(), other.modifier.as_ref())
    }
}

impl PartialOrd for CalendarVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CalendarVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CalendarVersion {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cal(pattern: &str, version: &str) -> CalendarVersion {
        CalendarVersion::parse(Some(pattern), version).unwrap()
    }

    #[test]
    fn tokenize_prefers_longest_token() {
        assert_eq!(
            tokenize("YYYY.0M-MODIFIER"),
            vec![
                Item::Token(Token::FullYear),
                Item::Literal('.'),
                Item::Token(Token::PaddedMonth),
                Item::Literal('-'),
                Item::Token(Token::Modifier),
            ]
        );
        assert_eq!(
            tokenize("YYMMDD"),
            vec![
                Item::Token(Token::ShortYear),
                Item::Token(Token::Month),
                Item::Token(Token::Day),
            ]
        );
    }

    #[rstest]
    #[case("YYYY.0M.DD", "2019.04.23", Some(2019), Some(4), Some(23), None, None)]
    #[case("YYYY0M0D", "20191018", Some(2019), Some(10), Some(18), None, None)]
    #[case("YY.MM.MINOR", "19.4.12", Some(2019), Some(4), None, Some(12), None)]
    #[case("0Y.0M", "09.11", Some(2009), Some(11), None, None, None)]
    #[case("YYYY.MINOR.MICRO", "2020.3.141", Some(2020), None, None, Some(3), Some(141))]
    #[case("YYYY.MINOR.MICRO", "2020.3", Some(2020), None, None, Some(3), None)]
    #[case("vYYYY_MM", "v2021_7", Some(2021), Some(7), None, None, None)]
    fn parse_extracts_fields(
        #[case] pattern: &str,
        #[case] version: &str,
        #[case] year: Option<u64>,
        #[case] month: Option<u64>,
        #[case] day: Option<u64>,
        #[case] minor: Option<u64>,
        #[case] micro: Option<u64>,
    ) {
        let parsed = cal(pattern, version);
        assert_eq!(
            (parsed.year, parsed.month, parsed.day, parsed.minor, parsed.micro),
            (year, month, day, minor, micro)
        );
        assert!(parsed.modifier.is_none());
    }

    #[rstest]
    #[case("YYYY.0M.DD-MODIFIER", "2019.04.23-rc1", Some(("rc", Some("1"))))]
    #[case("YYYY.0M.DD-MODIFIER", "2019.04.23-beta", Some(("beta", None)))]
    #[case("YYYY.0M.DD-MODIFIER", "2019.04.23-Alpha12", Some(("alpha", Some("12"))))]
    #[case("YYYY.0M.DD-MODIFIER", "2019.04.23", None)]
    #[case("YYYY.MINOR.MODIFIER", "2019.2.dev3", Some(("dev", Some("3"))))]
    fn parse_extracts_modifier(
        #[case] pattern: &str,
        #[case] version: &str,
        #[case] expected: Option<(&str, Option<&str>)>,
    ) {
        let parsed = cal(pattern, version);
        assert_eq!(
            parsed.modifier,
            expected.map(|(tag, number)| Modifier {
                tag: tag.to_string(),
                number: number.map(str::to_string),
            })
        );
    }

    #[rstest]
    #[case(None, "2019.04.23", "no version pattern")]
    #[case(Some(""), "2019.04.23", "no version pattern")]
    #[case(Some("YYYY.0M.DD"), "2019-04-23", "expected '.'")]
    #[case(Some("YYYY.0M.DD"), "2019.4.23", "expected 2 digits for month")]
    #[case(Some("YYYY.0M.DD"), "2019.13.23", "month 13 is out of range")]
    #[case(Some("YYYY.0M.DD"), "2019.04.32", "day 32 is out of range")]
    #[case(Some("YYYY.0M.DD"), "19.04.23", "expected 4 digits for year")]
    #[case(Some("YYYY.0M.DD"), "2019.04", "version is shorter than the pattern")]
    #[case(Some("YYYY.0M"), "2019.04.23", "unexpected trailing text: .23")]
    #[case(Some("YYYY.MINOR"), "2019.x", "expected digits for minor")]
    #[case(Some("MODIFIER.YYYY"), "rc1.2019", "MODIFIER must be the last token of the pattern")]
    #[case(Some("YYYY-MODIFIER"), "2019-12", "modifier has no tag")]
    #[case(Some("YYYY-MODIFIER"), "2019-rc1b", "unexpected text after modifier number: 1b")]
    fn parse_reports_pattern_errors(
        #[case] pattern: Option<&str>,
        #[case] version: &str,
        #[case] reason: &str,
    ) {
        match CalendarVersion::parse(pattern, version) {
            Err(VersionError::Pattern { reason: actual, .. }) => assert_eq!(actual, reason),
            other => panic!("expected pattern error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("YYYY.0M.DD", &["2019.04.23", "2019.04.24", "2020.01.01"])]
    #[case("YYYY0M0D", &["20191018", "20191213"])]
    #[case("YYYY.MINOR.MICRO", &["2020.1.9", "2020.1.10", "2020.2.0", "2021.0.0"])]
    #[case(
        "YYYY.0M.DD-MODIFIER",
        &["2019.04.23-alpha1", "2019.04.23-beta1", "2019.04.23-pre1", "2019.04.23-rc1", "2019.04.23"]
    )]
    #[case(
        "YYYY.0M.DD-MODIFIER",
        &["2019.04.23-rc", "2019.04.23-rc1", "2019.04.23-rc2", "2019.04.24-alpha"]
    )]
    fn ordering_is_ascending(#[case] pattern: &str, #[case] versions: &[&str]) {
        for pair in versions.windows(2) {
            assert!(
                cal(pattern, pair[0]) < cal(pattern, pair[1]),
                "{} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn missing_fields_are_skipped() {
        let short = cal("YYYY.MINOR.MICRO", "2020.3");
        let long = cal("YYYY.MINOR.MICRO", "2020.3.7");
        assert_eq!(short, long);
        assert!(cal("YYYY.MINOR.MICRO", "2020.4") > long);
    }

    #[test]
    fn release_outranks_modifier_of_same_date() {
        let release = cal("YYYY.0M.DD-MODIFIER", "2019.04.23");
        let candidate = cal("YYYY.0M.DD-MODIFIER", "2019.04.23-rc9");
        assert!(release > candidate);
        assert!(!release.is_prerelease());
        assert!(candidate.is_prerelease());
    }
}
