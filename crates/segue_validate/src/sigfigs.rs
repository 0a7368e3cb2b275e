//! Significant-figure aware comparison of numbers typed as text.
//!
//! A submission is compared at the precision the student typed, bounded by
//! the question's minimum and maximum. Trailing zeros of an integer such as
//! `100` are counted as significant.

/// Allowed range of significant figures for one question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigFigBounds {
    /// Fewest significant figures a comparison uses.
    pub min: u32,
    /// Most significant figures a comparison uses.
    pub max: u32,
}

impl SigFigBounds {
    /// Builds bounds from a question's optional settings, using `default` for
    /// whichever is unset.
    ///
    /// A maximum below the minimum is raised to it.
    pub fn new(min: Option<u32>, max: Option<u32>, default: u32) -> Self {
        let min = min.unwrap_or(default).max(1);
        let max = max.unwrap_or(default).max(min);
        Self { min, max }
    }

    /// Returns the number of significant figures to compare `submitted` at.
    ///
    /// Text that is not a number compares at the maximum.
    pub fn for_submission(&self, submitted: &str) -> u32 {
        count_significant_figures(submitted).map_or(self.max, |n| n.clamp(self.min, self.max))
    }
}

/// Counts the significant figures of a decimal number written as text.
///
/// Accepts an optional sign and exponent (`-1.20e3`). Returns `None` for text
/// that is not a plain decimal number.
pub fn count_significant_figures(text: &str) -> Option<u32> {
    let text = text.trim();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    if let Some(exponent) = exponent {
        exponent.parse::<i32>().ok()?;
    }

    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !fraction.map_or(true, digits_only) {
        return None;
    }
    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return None;
    }

    let digits: String = whole.chars().chain(fraction.unwrap_or("").chars()).collect();
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        // All zeros: only the places after the point carry precision.
        let places = fraction.map_or(0, str::len) as u32;
        return Some(places.max(1));
    }
    Some(significant.len() as u32)
}

/// Returns `true` if two numbers agree when both are rounded to `sig_figs`
/// significant figures. Text that does not parse as a number never matches.
pub fn numeric_values_match(expected: &str, submitted: &str, sig_figs: u32) -> bool {
    match (rounded(expected, sig_figs), rounded(submitted, sig_figs)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn rounded(text: &str, sig_figs: u32) -> Option<String> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let precision = sig_figs.max(1) as usize - 1;
    Some(format!("{value:.precision$e}"))
}
