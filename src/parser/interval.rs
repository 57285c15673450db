// Disambiguates an `INTERVAL '...'` literal between the datetime-interval
// and year-month-interval kinds. The grammar alone can't tell them apart —
// both share the same `INTERVAL string-literal` production — so the
// decision is made from the unit words inside the literal text.

#[derive(Debug, Clone, PartialEq)]
pub enum IntervalLiteral {
    DatetimeInterval(String),
    YearMonthInterval(String),
}

const YEAR_MONTH_UNITS: &[&str] = &["year", "years", "month", "months"];
const DATETIME_UNITS: &[&str] = &[
    "day", "days", "hour", "hours", "minute", "minutes", "second", "seconds",
];

/// Classifies `text` (the quoted body of an `INTERVAL '...'` literal, not
/// including the quotes) by scanning for a known unit word. A bare
/// `'3 years 2 months'` form is year-month; a bare `'3 days'` or
/// `'1 12:30:00'` form is datetime. Mixed units (neither side's exclusive
/// vocabulary wins outright) default to datetime, the broader of the two
/// representations.
pub fn classify(text: &str) -> IntervalLiteral {
    let lowered = text.to_ascii_lowercase();
    let has_year_month = YEAR_MONTH_UNITS.iter().any(|unit| contains_word(&lowered, unit));
    let has_datetime = DATETIME_UNITS.iter().any(|unit| contains_word(&lowered, unit));

    if has_year_month && !has_datetime {
        IntervalLiteral::YearMonthInterval(text.to_string())
    } else {
        IntervalLiteral::DatetimeInterval(text.to_string())
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_ascii_alphanumeric()).any(|tok| tok == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_year_month_text_classifies_as_year_month() {
        assert_eq!(
            classify("3 years 2 months"),
            IntervalLiteral::YearMonthInterval("3 years 2 months".to_string())
        );
    }

    #[test]
    fn pure_datetime_text_classifies_as_datetime() {
        assert_eq!(
            classify("1 12:30:00"),
            IntervalLiteral::DatetimeInterval("1 12:30:00".to_string())
        );
        assert_eq!(
            classify("5 days"),
            IntervalLiteral::DatetimeInterval("5 days".to_string())
        );
    }

    #[test]
    fn text_with_no_recognized_unit_defaults_to_datetime() {
        assert_eq!(
            classify("00:00:01"),
            IntervalLiteral::DatetimeInterval("00:00:01".to_string())
        );
    }
}
