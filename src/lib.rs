//! # hanzi-conv
//!
//! Character-level conversion between Simplified and Traditional Chinese.
//!
//! Every character of the input is either replaced by its counterpart from a
//! fixed two-column table or passed through unchanged, so the output always has
//! exactly as many characters as the input. A short list of characters whose
//! correspondence is ambiguous ([`EXCLUDE`]) is never converted.
//!
//! ## Example
//!
//! ```
//! use hanzi_conv::{same, to_simplified, to_traditional};
//!
//! assert_eq!(to_simplified("繁簡轉換器"), "繁简转换器");
//! assert_eq!(to_traditional("繁简转换器"), "繁簡轉換器");
//! assert!(same("繁简转换器", "繁簡轉換器"));
//! ```
//!
//! For a custom table or to control parallel conversion, build a [`HanziConv`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

pub mod char_map;
pub mod error;
pub mod exclude_set;
pub mod utils;

pub use crate::char_map::CharMap;
pub use crate::error::ConversionError;
pub use crate::exclude_set::{ExcludeSet, BASE_EXCLUDE_SET, EXCLUDE};

use crate::utils::find_max_utf8_length;

/// Inputs of at least this many bytes take the parallel path when parallelism is on.
pub const PARALLEL_THRESHOLD: usize = 1_000_000;

// Characters per rayon task
const CHUNK_SIZE: usize = 64 * 1024;

static DEFAULT_CONVERTER: Lazy<HanziConv> = Lazy::new(HanziConv::new);

// ASCII punctuation, digits, letters and whitespace
static STRIP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!-/:-@\[-`{-~\t\n\v\f\r 0-9A-Za-z_]").unwrap());

/// Conversion direction, selected by config name.
///
/// ```
/// use hanzi_conv::Direction;
///
/// let d: Direction = "t2s".parse().unwrap();
/// assert_eq!(d, Direction::T2S);
/// assert_eq!(d.to_string(), "t2s");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Simplified → Traditional
    S2T,
    /// Traditional → Simplified
    T2S,
}

impl Direction {
    pub const CONFIG_LIST: [&'static str; 2] = ["s2t", "t2s"];

    pub fn from_to_traditional(to_traditional: bool) -> Self {
        if to_traditional {
            Direction::S2T
        } else {
            Direction::T2S
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::S2T => "s2t",
            Direction::T2S => "t2s",
        }
    }
}

impl FromStr for Direction {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s2t" => Ok(Direction::S2T),
            "t2s" => Ok(Direction::T2S),
            _ => Err(ConversionError::InvalidConfig(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
enum MapSource {
    Default,
    Custom(Arc<CharMap>),
}

/// Simplified/Traditional converter.
///
/// Holds no per-call state: the table (shared, read-only) and the parallelism
/// switch. Cloning is cheap and the converter is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct HanziConv {
    source: MapSource,
    is_parallel: bool,
}

impl HanziConv {
    /// Converter over the embedded default table.
    pub fn new() -> Self {
        HanziConv {
            source: MapSource::Default,
            is_parallel: true,
        }
    }

    /// Converter over a caller-supplied table.
    pub fn with_char_map(char_map: Arc<CharMap>) -> Self {
        debug!("Using custom character map with {} entries", char_map.len());
        HanziConv {
            source: MapSource::Custom(char_map),
            is_parallel: true,
        }
    }

    pub fn char_map(&self) -> &CharMap {
        match &self.source {
            MapSource::Default => CharMap::default_map(),
            MapSource::Custom(map) => map,
        }
    }

    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    /// Converts `text` to Traditional if `to_traditional`, else to Simplified.
    ///
    /// Characters in [`EXCLUDE`] or in `extra_exclude` are copied unchanged, as is
    /// every character the table does not cover. `extra_exclude` applies to this
    /// call only.
    ///
    /// ```
    /// use hanzi_conv::HanziConv;
    ///
    /// let conv = HanziConv::new();
    /// assert_eq!(conv.convert("汉语", true, None), "漢語");
    /// assert_eq!(conv.convert("汉语", true, Some("语")), "漢语");
    /// ```
    pub fn convert(&self, text: &str, to_traditional: bool, extra_exclude: Option<&str>) -> String {
        let exclude: Cow<'_, ExcludeSet> = match extra_exclude {
            Some(extra) if !extra.is_empty() => Cow::Owned(BASE_EXCLUDE_SET.with_extra(extra)),
            _ => Cow::Borrowed(&*BASE_EXCLUDE_SET),
        };
        self.convert_by(text, Direction::from_to_traditional(to_traditional), &exclude)
    }

    /// Like [`HanziConv::convert`] over raw bytes, which must be valid UTF-8.
    ///
    /// # Errors
    /// [`ConversionError::Encoding`] for malformed UTF-8; nothing is converted.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        to_traditional: bool,
        extra_exclude: Option<&str>,
    ) -> Result<String, ConversionError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.convert(text, to_traditional, extra_exclude))
    }

    /// Converts by config name (`"s2t"` or `"t2s"`).
    pub fn convert_with_config(&self, text: &str, config: &str) -> Result<String, ConversionError> {
        let direction: Direction = config.parse()?;
        Ok(self.convert_by(text, direction, &BASE_EXCLUDE_SET))
    }

    pub fn to_simplified(&self, text: &str) -> String {
        self.convert_by(text, Direction::T2S, &BASE_EXCLUDE_SET)
    }

    pub fn to_traditional(&self, text: &str) -> String {
        self.convert_by(text, Direction::S2T, &BASE_EXCLUDE_SET)
    }

    /// True if both texts read the same once converted to Simplified.
    ///
    /// ```
    /// use hanzi_conv::HanziConv;
    ///
    /// let conv = HanziConv::new();
    /// assert!(conv.same("繁简转换器", "繁簡轉換器"));
    /// assert!(!conv.same("你好", "再见"));
    /// ```
    pub fn same(&self, text1: &str, text2: &str) -> bool {
        self.to_simplified(text1) == self.to_simplified(text2)
    }

    /// Guesses the script of `input`.
    ///
    /// Returns `1` for Traditional, `2` for Simplified, `0` for neither (no
    /// convertible characters, or empty input). Only the first 200 bytes left
    /// after stripping ASCII letters, digits, punctuation and whitespace are
    /// inspected.
    pub fn zho_check(&self, input: &str) -> i8 {
        if input.is_empty() {
            return 0;
        }
        let stripped = STRIP_REGEX.replace_all(input, "");
        let max_bytes = find_max_utf8_length(&stripped, 200);
        let sample = &stripped[..max_bytes];

        if sample != self.to_simplified(sample) {
            1
        } else if sample != self.to_traditional(sample) {
            2
        } else {
            0
        }
    }

    fn convert_by(&self, text: &str, direction: Direction, exclude: &ExcludeSet) -> String {
        if text.is_empty() {
            return String::new();
        }
        let table = self.char_map().table(direction);
        let map_char = |c: char| -> char {
            if exclude.contains(c) {
                c
            } else {
                table.get(&c).copied().unwrap_or(c)
            }
        };

        if self.is_parallel && text.len() >= PARALLEL_THRESHOLD {
            let chars: Vec<char> = text.chars().collect();
            chars
                .par_chunks(CHUNK_SIZE)
                .map(|chunk| {
                    let mut out = String::with_capacity(chunk.len() * 3);
                    out.extend(chunk.iter().map(|&c| map_char(c)));
                    out
                })
                .collect()
        } else {
            let mut result = String::with_capacity(text.len());
            result.extend(text.chars().map(map_char));
            result
        }
    }
}

impl Default for HanziConv {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts with the default table. See [`HanziConv::convert`].
pub fn convert(text: &str, to_traditional: bool, extra_exclude: Option<&str>) -> String {
    DEFAULT_CONVERTER.convert(text, to_traditional, extra_exclude)
}

/// Converts UTF-8 bytes with the default table. See [`HanziConv::convert_bytes`].
pub fn convert_bytes(
    bytes: &[u8],
    to_traditional: bool,
    extra_exclude: Option<&str>,
) -> Result<String, ConversionError> {
    DEFAULT_CONVERTER.convert_bytes(bytes, to_traditional, extra_exclude)
}

pub fn to_simplified(text: &str) -> String {
    DEFAULT_CONVERTER.to_simplified(text)
}

pub fn to_traditional(text: &str) -> String {
    DEFAULT_CONVERTER.to_traditional(text)
}

pub fn same(text1: &str, text2: &str) -> bool {
    DEFAULT_CONVERTER.same(text1, text2)
}
