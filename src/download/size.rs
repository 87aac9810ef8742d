//! Human-readable size reporting.

use super::constants::BYTES_PER_MEGABYTE;

/// Significant figures used when reporting image sizes.
pub const SIZE_SIGNIFICANT_FIGURES: i32 = 3;

/// Formats a byte count as megabytes with three significant figures.
///
/// ```
/// use iiif_core::download::format_megabytes;
///
/// assert_eq!(format_megabytes(1_572_864), "1.50");
/// assert_eq!(format_megabytes(0), "0.00");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_megabytes(bytes: u64) -> String {
    to_precision(bytes as f64 / BYTES_PER_MEGABYTE, SIZE_SIGNIFICANT_FIGURES)
}

/// Rounds to `digits` significant figures, switching to exponent notation
/// when the magnitude is below 1e-6 or has more integer digits than `digits`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn to_precision(value: f64, digits: i32) -> String {
    let fraction_digits = (digits - 1) as usize;
    if value == 0.0 || !value.is_finite() {
        return format!("{:.fraction_digits$}", 0.0);
    }

    let mut exponent = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits - 1 - exponent);
    let rounded = (value * scale).round() / scale;
    if rounded.abs() >= 10f64.powi(exponent + 1) {
        exponent += 1;
    }

    if exponent < -6 || exponent >= digits {
        let mantissa = rounded / 10f64.powi(exponent);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa:.fraction_digits$}e{sign}{}", exponent.abs())
    } else {
        let decimals = (digits - 1 - exponent).max(0) as usize;
        format!("{rounded:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_precision_common_magnitudes() {
        assert_eq!(to_precision(1.5, 3), "1.50");
        assert_eq!(to_precision(12.345, 3), "12.3");
        assert_eq!(to_precision(123.456, 3), "123");
        assert_eq!(to_precision(0.000_123_4, 3), "0.000123");
    }

    #[test]
    fn test_to_precision_carry_into_next_magnitude() {
        assert_eq!(to_precision(9.999, 3), "10.0");
        assert_eq!(to_precision(0.099_96, 3), "0.100");
    }

    #[test]
    fn test_to_precision_exponent_form() {
        assert_eq!(to_precision(1234.5, 3), "1.23e+3");
        assert_eq!(to_precision(0.000_000_123, 3), "1.23e-7");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00");
        assert_eq!(format_megabytes(1024 * 1024), "1.00");
        assert_eq!(format_megabytes(3_355_443), "3.20");
        assert_eq!(format_megabytes(2048), "0.00195");
    }
}
