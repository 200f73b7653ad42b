//! Month-name normalization across the locales seen in provider exports.
//!
//! Multi-row headers frequently carry a year row over a localized month
//! row; both header combination and period parsing normalize month tokens
//! through this table before comparing them.

/// English three-letter abbreviations in calendar order.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Normalize a month token to its English three-letter abbreviation.
///
/// Covers English, Finnish, Swedish and German names, plus any token that
/// already contains an English abbreviation (e.g. "Jan-20", "September").
pub fn normalize_month(token: &str) -> Option<&'static str> {
    let lower = token.trim().to_lowercase();
    let mapped = match lower.as_str() {
        // Finnish
        "tammikuu" => Some("jan"),
        "helmikuu" => Some("feb"),
        "maaliskuu" => Some("mar"),
        "huhtikuu" => Some("apr"),
        "toukokuu" => Some("may"),
        "kesäkuu" => Some("jun"),
        "heinäkuu" => Some("jul"),
        "elokuu" => Some("aug"),
        "syyskuu" => Some("sep"),
        "lokakuu" => Some("oct"),
        "marraskuu" => Some("nov"),
        "joulukuu" => Some("dec"),
        // Swedish
        "januari" => Some("jan"),
        "februari" => Some("feb"),
        "mars" => Some("mar"),
        "maj" => Some("may"),
        "juni" => Some("jun"),
        "juli" => Some("jul"),
        "augusti" => Some("aug"),
        "oktober" => Some("oct"),
        // German
        "januar" => Some("jan"),
        "februar" => Some("feb"),
        "märz" => Some("mar"),
        "maerz" => Some("mar"),
        "mai" => Some("may"),
        "dezember" => Some("dec"),
        // English full names
        "january" => Some("jan"),
        "february" => Some("feb"),
        "march" => Some("mar"),
        "april" => Some("apr"),
        "june" => Some("jun"),
        "july" => Some("jul"),
        "august" => Some("aug"),
        "september" => Some("sep"),
        "october" => Some("oct"),
        "november" => Some("nov"),
        "december" => Some("dec"),
        _ => None,
    };
    if mapped.is_some() {
        return mapped;
    }
    MONTH_ABBREVIATIONS
        .iter()
        .find(|abbrev| lower.contains(*abbrev))
        .copied()
}

/// Calendar number (1-12) for an English abbreviation.
pub fn month_number(abbrev: &str) -> Option<u32> {
    let lower = abbrev.trim().to_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|candidate| *candidate == lower)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_localized_names() {
        assert_eq!(normalize_month("Tammikuu"), Some("jan"));
        assert_eq!(normalize_month("augusti"), Some("aug"));
        assert_eq!(normalize_month("März"), Some("mar"));
        assert_eq!(normalize_month("September"), Some("sep"));
        assert_eq!(normalize_month("total"), None);
    }

    #[test]
    fn embedded_abbreviations_match() {
        assert_eq!(normalize_month("Jan-20"), Some("jan"));
        assert_eq!(normalize_month("2020 Dec"), Some("dec"));
    }

    #[test]
    fn month_numbers_are_calendar_ordered() {
        assert_eq!(month_number("jan"), Some(1));
        assert_eq!(month_number("DEC"), Some(12));
        assert_eq!(month_number("xyz"), None);
    }
}
