//! String normalisation utilities shared by the analyzers.
//! Cell values are compared case-folded and trimmed, the way SDRF curators read them.

/// Case-folds and trims a cell value for comparison.
#[inline]
pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Returns true if the normalized value is one of the given tokens.
pub(crate) fn is_token(value: &str, tokens: &[String]) -> bool {
    let value = normalize(value);
    tokens.iter().any(|token| normalize(token) == value)
}

/// Returns true if the value is empty after trimming.
#[inline]
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Case-insensitive prefix test, used for `SN=` pool definitions.
pub(crate) fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Splits a comma-separated list, dropping blank entries.
pub(crate) fn split_list(value: &str) -> impl Iterator<Item = &str> + '_ {
    value.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Lower-cased term of an SDRF header: the text inside `prefix[...]`, or the whole header.
pub(crate) fn column_term(column_name: &str) -> String {
    let name = column_name.trim().to_lowercase();
    match (name.find('['), name.rfind(']')) {
        (Some(open), Some(close)) if open < close => name[open + 1..close].trim().to_owned(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Not Available "), "not available");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_is_token() {
        let tokens = vec!["n/a".to_owned(), "NA".to_owned()];
        assert!(is_token(" N/A", &tokens));
        assert!(is_token("na", &tokens));
        assert!(!is_token("nan", &tokens));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("sn=S1,S2", "SN="));
        assert!(starts_with_ignore_case("SN=", "SN="));
        assert!(!starts_with_ignore_case("S", "SN="));
        assert!(!starts_with_ignore_case("pooled", "SN="));
    }

    #[test]
    fn test_column_term() {
        assert_eq!(column_term("Characteristics[ Organism Part ]"), "organism part");
        assert_eq!(column_term("source name"), "source name");
        assert_eq!(column_term("comment[label"), "comment[label");
    }

    #[test]
    fn test_split_list() {
        let parts: Vec<&str> = split_list(" S1, S2 ,,S3 ").collect();
        assert_eq!(parts, vec!["S1", "S2", "S3"]);
    }
}
