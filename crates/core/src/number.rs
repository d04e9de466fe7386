//! Float rendering shared by explanations, param display and feature vectors
//!
//! Values always render as decimals: whole numbers keep a trailing `.0`
//! (`1.0`, not `1`) and nothing is printed in exponent form, so the output
//! parses back to the same `f32` with `str::parse`.

/// Render an `f32` as a decimal string
pub fn format_f32(value: f32) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Render an `f64` as a decimal string
pub fn format_f64(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_whole_numbers_keep_decimal() {
        assert_eq!(format_f32(1.0), "1.0");
        assert_eq!(format_f32(0.0), "0.0");
        assert_eq!(format_f32(-5.0), "-5.0");
        assert_eq!(format_f64(3.0), "3.0");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(format_f32(0.5), "0.5");
        assert_eq!(format_f32(0.1), "0.1");
        assert_eq!(format_f32(-2.25), "-2.25");
    }

    #[test]
    fn test_no_exponent() {
        assert!(!format_f32(1e-7).contains('e'));
        assert!(!format_f32(1e20).contains('e'));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_f32(f32::NAN), "NaN");
        assert_eq!(format_f32(f32::INFINITY), "inf");
    }

    proptest! {
        #[test]
        fn prop_parse_back(v in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
            let rendered = format_f32(v);
            let parsed: f32 = rendered.parse().unwrap();
            prop_assert_eq!(parsed, v);
        }
    }
}
