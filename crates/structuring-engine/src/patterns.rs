//! Regex patterns and text helpers shared by the stages

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    static ref LEADING_DIGITS: Regex = Regex::new(r"^\d+").unwrap();

    /// "VII/2024", "Mei / 2024", "5/2024"
    static ref MONTH_YEAR: Regex = Regex::new(r"^([A-Za-z0-9]+)\s*/\s*(\d{4})$").unwrap();

    /// "/2024", "/ 2024"
    static ref SLASH_YEAR: Regex = Regex::new(r"^/\s*(\d{4})$").unwrap();

    static ref BARE_YEAR: Regex = Regex::new(r"^\d{4}$").unwrap();

    static ref SLASH_SPACING: Regex = Regex::new(r"\s*/\s*").unwrap();

    static ref REPEATED_SLASH: Regex = Regex::new(r"/+").unwrap();
}

/// Collapse whitespace runs (newlines, tabs) to one space and trim
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Leading numeric run of `text`, e.g. "50" from "50 orang"
pub fn leading_number(text: &str) -> Option<&str> {
    LEADING_DIGITS.find(text.trim()).map(|m| m.as_str())
}

/// True for a 4-digit year inside `min..=max`
pub fn is_year_in_range(text: &str, min: u32, max: u32) -> bool {
    let text = text.trim();
    BARE_YEAR.is_match(text)
        && text
            .parse::<u32>()
            .map(|year| (min..=max).contains(&year))
            .unwrap_or(false)
}

/// Fragment a date entity contributes to a document number, if it looks like
/// the tail of one: `month-or-roman/year`, `/year`, or a bare year.
pub fn date_suffix(text: &str, min_year: u32, max_year: u32) -> Option<String> {
    let text = text.trim();
    if let Some(caps) = MONTH_YEAR.captures(text) {
        return Some(format!("{}/{}", &caps[1], &caps[2]));
    }
    if let Some(caps) = SLASH_YEAR.captures(text) {
        return Some(caps[1].to_string());
    }
    if is_year_in_range(text, min_year, max_year) {
        return Some(text.to_string());
    }
    None
}

/// Remove spacing around `/` and collapse repeated slashes
pub fn normalize_slashes(text: &str) -> String {
    let tightened = SLASH_SPACING.replace_all(text.trim(), "/");
    REPEATED_SLASH.replace_all(&tightened, "/").into_owned()
}
