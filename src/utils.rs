/// Finds a valid UTF-8 boundary within the given string, limited by a maximum byte count.
///
/// Slicing the string at the returned index will **not break UTF-8 encoding**.
/// Used to take a bounded sample of a text before probing its script.
///
/// # How it works
/// - If the string is already shorter than `max_byte_count`, the full length is returned.
/// - Otherwise, it backtracks from `max_byte_count` until it reaches a valid UTF-8 start byte
///   (i.e., not a continuation byte `0b10xxxxxx`).
///
/// # Example
/// ```rust
/// use hanzi_conv::utils::find_max_utf8_length;
///
/// let input = "繁簡轉換器"; // Each Chinese character takes 3 bytes
/// let safe_index = find_max_utf8_length(input, 7);
/// assert_eq!(safe_index, 6);
/// assert_eq!(&input[..safe_index], "繁簡");
/// ```
pub fn find_max_utf8_length(sv: &str, max_byte_count: usize) -> usize {
    // 1. No longer than max byte count
    if sv.len() <= max_byte_count {
        return sv.len();
    }
    // 2. Longer than byte count
    let mut byte_count = max_byte_count;
    while byte_count > 0 && !sv.is_char_boundary(byte_count) {
        byte_count -= 1;
    }
    byte_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_kept_whole() {
        assert_eq!(find_max_utf8_length("abc", 200), 3);
        assert_eq!(find_max_utf8_length("", 0), 0);
    }

    #[test]
    fn cut_lands_on_char_boundary() {
        let s = "a汉字"; // 1 + 3 + 3 bytes
        assert_eq!(find_max_utf8_length(s, 1), 1);
        assert_eq!(find_max_utf8_length(s, 3), 1);
        assert_eq!(find_max_utf8_length(s, 4), 4);
        assert_eq!(find_max_utf8_length(s, 6), 4);
    }

    #[test]
    fn astral_chars_are_not_split() {
        let s = "𬴂𬴂"; // 4 bytes each
        assert_eq!(find_max_utf8_length(s, 5), 4);
        assert_eq!(find_max_utf8_length(s, 3), 0);
    }
}
