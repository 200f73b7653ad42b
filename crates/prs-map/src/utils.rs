//! Utility functions for mapping operations.

/// Normalizes text for comparison by lowercasing and replacing separators
/// with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_case() {
        assert_eq!(normalize_text("  Order_No. "), "order no");
        assert_eq!(normalize_text("Net-Sales/Total"), "net sales total");
        assert_eq!(normalize_text("Order #"), "order #");
    }
}
