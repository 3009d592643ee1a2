//! Mod-10 (Luhn) checksum validation for card-like digit runs.

/// Shortest digit run considered.
pub const MIN_DIGITS: usize = 13;

/// Longest digit run considered.
pub const MAX_DIGITS: usize = 19;

/// Returns `true` if `candidate` is a 13-19 digit number passing the mod-10
/// checksum.
///
/// Spaces and dashes are stripped first. Any other non-digit character makes
/// the candidate invalid. Starting from the rightmost digit, every second
/// digit is doubled (subtracting 9 when the result exceeds 9) and the sum
/// must be divisible by 10.
pub fn luhn_valid(candidate: &str) -> bool {
    let mut digits = Vec::with_capacity(candidate.len());
    for c in candidate.chars() {
        match c {
            ' ' | '-' => continue,
            '0'..='9' => digits.push(c as u32 - '0' as u32),
            _ => return false,
        }
    }

    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
