//! Display formatting for evaluation results.

use rhai::Dynamic;

/// Format an evaluation result for cell display.
/// Returns None when the value has no finite display form (NaN/infinity),
/// which callers surface as an evaluation failure.
pub fn format_dynamic(value: &Dynamic) -> Option<String> {
    if value.is_unit() {
        Some(String::new())
    } else if let Ok(n) = value.as_int() {
        Some(n.to_string())
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(b) = value.as_bool() {
        Some(if b { "TRUE" } else { "FALSE" }.to_string())
    } else if let Ok(s) = value.clone().into_string() {
        Some(s)
    } else {
        Some(format!("{:?}", value))
    }
}

/// Format a float: integral values render without a decimal point.
pub fn format_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        None
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        Some(format!("{:.0}", n))
    } else {
        Some(n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_int() {
        assert_eq!(format_dynamic(&Dynamic::from(10i64)), Some("10".to_string()));
    }

    #[test]
    fn test_format_integral_float() {
        assert_eq!(format_dynamic(&Dynamic::from(10.0f64)), Some("10".to_string()));
    }

    #[test]
    fn test_format_fractional_float() {
        assert_eq!(format_dynamic(&Dynamic::from(2.5f64)), Some("2.5".to_string()));
    }

    #[test]
    fn test_format_bool_and_string() {
        assert_eq!(format_dynamic(&Dynamic::from(true)), Some("TRUE".to_string()));
        assert_eq!(
            format_dynamic(&Dynamic::from("hi".to_string())),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_format_non_finite_is_failure() {
        assert_eq!(format_number(f64::NAN), None);
        assert_eq!(format_number(f64::INFINITY), None);
    }
}
