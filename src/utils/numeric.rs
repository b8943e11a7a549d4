//! Textual rendering and matching of statistic values.
//!
//! Pages print numbers with grouping separators and locale-variant decimal
//! marks; extracted values are plain JSON numbers. Matching tries the plain
//! rendering first, then a grouping-insensitive pass, then a decimal-comma
//! variant.

/// Render a value the way it travels on the wire: no grouping separators and
/// no trailing `.0` (Rust's shortest float formatting already drops it).
pub fn canonical_form(value: f64) -> String {
    format!("{}", value)
}

/// Thousands-grouped rendering of the integer part, e.g. `75000` -> `75,000`.
pub fn grouped_form(value: f64) -> String {
    let canonical = canonical_form(value);
    let (sign, unsigned) = match canonical.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", canonical.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// True iff some accepted textual form of `value` occurs in `window`:
/// the plain rendering, the thousands-grouped rendering ("75,000"), or the
/// decimal-comma rendering ("1,1").
pub fn value_occurs_in(window: &str, value: f64) -> bool {
    let plain = canonical_form(value);
    if window.contains(&plain) {
        return true;
    }

    if window.contains(&grouped_form(value)) {
        return true;
    }

    plain.contains('.') && window.contains(&plain.replace('.', ","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_drops_trailing_zero_fraction() {
        assert_eq!(canonical_form(75000.0), "75000");
        assert_eq!(canonical_form(2.0), "2");
        assert_eq!(canonical_form(1.5), "1.5");
        assert_eq!(canonical_form(-3.25), "-3.25");
    }

    #[test]
    fn test_grouped_form() {
        assert_eq!(grouped_form(75000.0), "75,000");
        assert_eq!(grouped_form(1234567.0), "1,234,567");
        assert_eq!(grouped_form(999.0), "999");
        assert_eq!(grouped_form(1234.5), "1,234.5");
        assert_eq!(grouped_form(-75000.0), "-75,000");
    }

    #[test]
    fn test_plain_value_matches() {
        assert!(value_occurs_in("temperatures rose by 1.5 degrees", 1.5));
        assert!(value_occurs_in("counted 42 incidents", 42.0));
    }

    #[test]
    fn test_grouped_value_matches_plain_rendering() {
        // The page prints "75,000"; the extracted value renders as "75000".
        let window = "Over 75,000 people across 77 countries participated";
        assert!(value_occurs_in(window, 75000.0));
        assert!(value_occurs_in("a budget of 1,234,567 dollars", 1234567.0));
    }

    #[test]
    fn test_decimal_comma_variant_matches() {
        assert!(value_occurs_in("eine Erwärmung von 1,5 Grad", 1.5));
    }

    #[test]
    fn test_absent_value_does_not_match() {
        assert!(!value_occurs_in("no numbers here", 7.0));
        assert!(!value_occurs_in("the year 2023 saw growth", 75000.0));
    }
}
