//! Growth-rate pattern matching over recognized text.

use crate::error::Result;
use regex::Regex;
use tally_protocol::defaults::MAX_SAFE_READING;
use tally_protocol::ExtractedReading;

/// Label followed by an optional separator and a run of digits/commas.
/// `[0-9]` rather than `\d` so non-ASCII digits never match.
const GROWTH_RATE_PATTERN: &str = r"(?i)growth\s*rate[:\s]*([0-9,]+)";

/// Finds "Growth Rate: 12,345" style readings in OCR output.
#[derive(Debug, Clone)]
pub struct ReadingParser {
    pattern: Regex,
}

impl ReadingParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(GROWTH_RATE_PATTERN)?,
        })
    }

    /// The first label/number pair decides the reading. A digit run that is
    /// only commas, or that exceeds [`MAX_SAFE_READING`], yields `None`; later
    /// matches are never consulted.
    pub fn parse(&self, text: &str) -> Option<ExtractedReading> {
        let run = self.pattern.captures(text)?.get(1)?;
        parse_digit_run(run.as_str()).map(|value| ExtractedReading::new(text, value))
    }
}

fn parse_digit_run(run: &str) -> Option<u64> {
    let digits: String = run.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    (value <= MAX_SAFE_READING).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<ExtractedReading> {
        ReadingParser::new().unwrap().parse(text)
    }

    #[test]
    fn test_comma_grouped_reading() {
        let reading = parse("Growth Rate: 12,345").unwrap();
        assert_eq!(reading.value, 12345);
        assert_eq!(reading.formatted, "12,345");
        assert_eq!(reading.raw_text, "Growth Rate: 12,345");
    }

    #[test]
    fn test_label_is_case_insensitive_and_separator_optional() {
        assert_eq!(parse("GROWTH RATE 50000").unwrap().value, 50000);
        assert_eq!(parse("growthrate:7").unwrap().value, 7);
        assert_eq!(parse("Growth\nRate:\n  1,000").unwrap().value, 1000);
    }

    #[test]
    fn test_reading_inside_noisy_text() {
        let text = "Alliance Profile\nPower 9,999,999\nGrowth Rate: 1,234,567\nKills 12";
        let reading = parse(text).unwrap();
        assert_eq!(reading.value, 1_234_567);
        assert_eq!(reading.formatted, "1,234,567");
        assert_eq!(reading.raw_text, text);
    }

    #[test]
    fn test_missing_label_is_not_found() {
        assert!(parse("Power: 12,345").is_none());
        assert!(parse("").is_none());
        assert!(parse("Growth Rate: none yet").is_none());
    }

    #[test]
    fn test_sloppy_grouping_is_normalized() {
        let reading = parse("Growth Rate: 1,23,45").unwrap();
        assert_eq!(reading.value, 12345);
        assert_eq!(reading.formatted, "12,345");
    }

    #[test]
    fn test_commas_only_run_is_not_found() {
        assert!(parse("Growth Rate: ,,,").is_none());
        assert!(parse("Growth Rate: , Growth Rate: 42").is_none());
    }

    #[test]
    fn test_overflow_is_not_found() {
        assert!(parse("Growth Rate: 9,007,199,254,740,992").is_none());
        assert!(parse("Growth Rate: 99999999999999999999999").is_none());
        assert_eq!(
            parse("Growth Rate: 9,007,199,254,740,991").unwrap().value,
            9_007_199_254_740_991
        );
    }

    #[test]
    fn test_only_first_match_counts() {
        assert!(parse("Growth Rate: 99999999999999999999\nGrowth Rate: 5").is_none());
        assert_eq!(parse("Growth Rate: 7\nGrowth Rate: 5").unwrap().value, 7);
    }

    #[test]
    fn test_leading_zeros() {
        let reading = parse("Growth Rate: 000,120").unwrap();
        assert_eq!(reading.value, 120);
        assert_eq!(reading.formatted, "120");
    }
}
