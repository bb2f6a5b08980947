//! Styled markers for terminal output.

use console::{style, StyledObject};

/// Green ✓, printed when a job finishes.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Cyan →, used ahead of a progress bar.
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Yellow !, for clamped page ranges and other job warnings.
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Dim arrow in front of job log lines.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// `✓ <present>` in green, or `✗ <absent>` in red.
pub fn availability(ok: bool, present: &str, absent: &str) -> StyledObject<String> {
    if ok {
        style(format!("✓ {}", present)).green()
    } else {
        style(format!("✗ {}", absent)).red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_render() {
        for icon in [success(), info(), warn(), error(), dim_arrow()] {
            assert!(!icon.to_string().is_empty());
        }
    }

    #[test]
    fn test_availability_picks_label() {
        assert!(availability(true, "found", "not found")
            .to_string()
            .contains("✓ found"));
        assert!(availability(false, "found", "not found")
            .to_string()
            .contains("✗ not found"));
    }
}
