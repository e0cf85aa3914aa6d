//! Terminal styling and number formatting for the text report.

/// ANSI escape codes used by the text report.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for trip names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary details (lengths, factors).
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for mode labels.
    pub const CYAN: &str = "\x1b[36m";
    /// Green for the lowest total of a report.
    pub const GREEN: &str = "\x1b[32m";
    /// Orange (256-color) for emission amounts.
    pub const ORANGE: &str = "\x1b[38;5;208m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub green: &'static str,
    pub orange: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            green: colors::GREEN,
            orange: colors::ORANGE,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            cyan: "",
            green: "",
            orange: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, `plain()` otherwise.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be used.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format an integer with thousand separators, e.g. `1,234,567`.
///
/// ```
/// # use tripcarbon_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Emission amount with one decimal, e.g. `1,234.5 kgCO2e`.
#[must_use]
pub fn format_kg(kg: f64) -> String {
    let tenths = (kg.max(0.0) * 10.0).round() as u64;
    format!(
        "{}.{} kgCO2e",
        format_with_separators(tenths / 10),
        tenths % 10
    )
}

/// Distance rounded to the kilometre, e.g. `1,032 km`.
#[must_use]
pub fn format_km(km: f64) -> String {
    format!("{} km", format_with_separators(km.max(0.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators() {
        assert_eq!(format_with_separators(0), "0");
        assert_eq!(format_with_separators(1000), "1,000");
        assert_eq!(format_with_separators(1_000_000_000), "1,000,000,000");
    }

    #[test]
    fn kilograms_keep_one_decimal() {
        assert_eq!(format_kg(0.0), "0.0 kgCO2e");
        assert_eq!(format_kg(21.76), "21.8 kgCO2e");
        assert_eq!(format_kg(1234.54), "1,234.5 kgCO2e");
    }

    #[test]
    fn kilometres_are_rounded() {
        assert_eq!(format_km(391.6), "392 km");
        assert_eq!(format_km(5840.2), "5,840 km");
    }

    #[test]
    fn plain_palette_is_empty() {
        let p = ColorPalette::plain();
        assert!(p.reset.is_empty());
        assert!(p.orange.is_empty());
        assert!(!ColorPalette::colored().reset.is_empty());
    }
}
