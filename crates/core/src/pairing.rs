//! Rising/falling pairing heuristic
//!
//! Correlates two edge identifiers (`rising17`, `falling17`, ...) as the two
//! halves of one pulse on the same line. Not consulted by the debounce gate;
//! it is kept for diagnostics and multi-line fusion.

/// Returns true when `first` is a rising edge and `second` a falling edge on
/// the same line
///
/// Line identity is the last two characters, which covers one- and two-digit
/// line numbers written as a suffix. Order matters: `(falling, rising)` is
/// never a pair. Identifiers shorter than two characters are never paired.
pub fn are_paired(first: &str, second: &str) -> bool {
    let (Some(first_suffix), Some(second_suffix)) = (suffix2(first), suffix2(second)) else {
        return false;
    };

    let same_line = first_suffix == second_suffix;
    let rise_then_fall = first.starts_with('r') && second.starts_with('f');

    same_line && rise_then_fall
}

/// Last two characters, or None if the identifier is too short
fn suffix2(id: &str) -> Option<[char; 2]> {
    let mut rev = id.chars().rev();
    let last = rev.next()?;
    let before = rev.next()?;
    Some([before, last])
}
