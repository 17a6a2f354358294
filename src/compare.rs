//! `compare` output: a difference count, or the numbered list when verbose.

use serde_json::Value;
use yacs_core::diff;

/// Differences between the stored expectation (`A`) and a freshly
/// processed document (`B`).
pub fn compare(expected: &Value, actual: &Value) -> Vec<String> {
    diff(expected, actual)
}

pub fn render_report(differences: &[String], verbose: bool) -> String {
    if !verbose {
        return format!("The files have {} differences\n", differences.len());
    }

    if differences.is_empty() {
        return "The files are equal.\n".to_string();
    }

    differences
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{}. {}\n", i + 1, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expected_is_side_a() {
        let differences = compare(&json!({"old": 1}), &json!({"new": 1}));
        assert_eq!(
            differences,
            vec!["/new => find only in B", "/old => find only in A"]
        );
    }

    #[test]
    fn test_summary_counts_only() {
        let differences = vec!["/a => find only in A".to_string(), "/b => find only in B".to_string()];
        assert_eq!(render_report(&differences, false), "The files have 2 differences\n");
        assert_eq!(render_report(&[], false), "The files have 0 differences\n");
    }

    #[test]
    fn test_verbose_lists_records() {
        let differences = vec!["/a => find only in A".to_string(), "/b => find only in B".to_string()];
        assert_eq!(
            render_report(&differences, true),
            "1. /a => find only in A\n2. /b => find only in B\n"
        );
        assert_eq!(render_report(&[], true), "The files are equal.\n");
    }
}
