//! Phone number normalisation for the messaging channel.

/// Normalise a raw phone number to E.164.
///
/// Non-digit characters other than a leading `+` are dropped. Numbers without a
/// country code default to India (+91): an 11-digit number with a trunk `0`, or
/// a bare 10-digit subscriber number. Returns `None` when no digits remain.
pub fn to_e164(raw: &str) -> Option<String> {
    let has_plus = raw.trim_start().starts_with('+');
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if has_plus {
        return Some(format!("+{digits}"));
    }
    let normalised = match digits.len() {
        11 if digits.starts_with('0') => format!("+91{}", &digits[1..]),
        10 => format!("+91{digits}"),
        _ => format!("+{digits}"),
    };
    Some(normalised)
}
