use once_cell::sync::Lazy;

/// Characters that are never converted in either direction.
///
/// Their Simplified/Traditional correspondence is ambiguous at the single
/// character level (干 ⇄ 乾/幹, 了 ⇄ 瞭, 表 ⇄ 錶, ...), so the converter leaves
/// them untouched. The list is an empirical correction list and is kept verbatim.
pub const EXCLUDE: &str = "千干曲了表蒙迭舍克";

/// Compact set of characters excluded from conversion.
///
/// # Design
///
/// * **BMP fast path**: all code points `U+0000..=U+FFFF` are stored in a
///   65,536-bit table (`[u64; 1024]`, ~8 KB). Membership is one shift and AND.
/// * **Astral characters**: `U+10000..` live in a small sorted list and are
///   found by binary search. CJK extension characters are rare in exclusion
///   lists, so the list is usually empty.
#[derive(Clone)]
pub struct ExcludeSet {
    bmp_bits: Box<[u64; 1024]>,
    astral: Vec<char>,
}

impl ExcludeSet {
    /// Builds a set from every character of `chars`.
    ///
    /// ```
    /// use hanzi_conv::exclude_set::ExcludeSet;
    /// let set = ExcludeSet::from_chars("了表");
    /// assert!(set.contains('了'));
    /// assert!(!set.contains('说'));
    /// ```
    pub fn from_chars(chars: &str) -> Self {
        let mut set = ExcludeSet {
            bmp_bits: Box::new([0u64; 1024]),
            astral: Vec::new(),
        };
        set.insert_all(chars);
        set
    }

    /// Returns a new set holding `self` plus every character of `extra`.
    ///
    /// `self` is not modified; the base exclusion set stays shared and immutable.
    pub fn with_extra(&self, extra: &str) -> Self {
        let mut set = self.clone();
        set.insert_all(extra);
        set
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let u = c as u32;
        if u <= 0xFFFF {
            let i = (u >> 6) as usize;
            let b = u & 63;
            return ((self.bmp_bits[i] >> b) & 1) == 1;
        }
        self.astral.binary_search(&c).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.astral.is_empty() && self.bmp_bits.iter().all(|&w| w == 0)
    }

    /// Number of distinct characters in the set.
    pub fn len(&self) -> usize {
        let bmp: u32 = self.bmp_bits.iter().map(|w| w.count_ones()).sum();
        bmp as usize + self.astral.len()
    }

    fn insert_all(&mut self, chars: &str) {
        for ch in chars.chars() {
            let u = ch as u32;
            if u <= 0xFFFF {
                let i = (u >> 6) as usize;
                let b = u & 63;
                self.bmp_bits[i] |= 1u64 << b;
            } else if let Err(pos) = self.astral.binary_search(&ch) {
                self.astral.insert(pos, ch);
            }
        }
    }
}

impl std::fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("len", &self.len())
            .field("astral", &self.astral)
            .finish()
    }
}

/// Global base exclusion set built from [`EXCLUDE`].
///
/// Initialization happens once at runtime via [`Lazy`]; lookups afterwards are
/// lock-free and O(1).
pub static BASE_EXCLUDE_SET: Lazy<ExcludeSet> = Lazy::new(|| ExcludeSet::from_chars(EXCLUDE));

/// Tests `c` against the global [`BASE_EXCLUDE_SET`].
///
/// ```
/// use hanzi_conv::exclude_set::is_excluded;
/// assert!(is_excluded('干'));
/// assert!(!is_excluded('汉'));
/// ```
#[inline]
pub fn is_excluded(c: char) -> bool {
    BASE_EXCLUDE_SET.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_set_holds_all_nine() {
        assert_eq!(BASE_EXCLUDE_SET.len(), 9);
        for c in EXCLUDE.chars() {
            assert!(is_excluded(c), "{} should be excluded", c);
        }
    }

    #[test]
    fn with_extra_leaves_base_untouched() {
        let merged = BASE_EXCLUDE_SET.with_extra("汉语");
        assert!(merged.contains('汉'));
        assert!(merged.contains('干'));
        assert_eq!(merged.len(), 11);
        assert!(!BASE_EXCLUDE_SET.contains('汉'));
        assert_eq!(BASE_EXCLUDE_SET.len(), 9);
    }

    #[test]
    fn astral_chars_are_tracked() {
        let set = ExcludeSet::from_chars("𠀀𬴂𠀀");
        assert!(set.contains('𬴂'));
        assert!(set.contains('𠀀'));
        assert!(!set.contains('𠀁'));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_set() {
        let set = ExcludeSet::from_chars("");
        assert!(set.is_empty());
        assert!(!set.contains('a'));
        assert!(!ExcludeSet::from_chars("a").is_empty());
    }
}
