//! Module for loading and holding the Simplified/Traditional character table.
//!
//! The table is two parallel, equally long character sequences: position `i` of
//! the simplified sequence and position `i` of the traditional sequence denote
//! the same character in the two scripts. [`CharMap`] keeps the sequences in
//! their original order and derives per-direction hash lookups from them on first
//! use.
//!
//! The default table ships embedded in the binary (`dicts/STCharacters.txt`) and
//! is parsed at most once per process via [`CharMap::default_map`].

use log::{debug, warn};
use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_cbor::from_slice;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use zstd::{decode_all, Decoder, Encoder};

use crate::error::ConversionError;
use crate::Direction;

static DEFAULT_CHAR_MAP: Lazy<CharMap> = Lazy::new(|| {
    let char_map = CharMap::from_pairs_str(include_str!("dicts/STCharacters.txt"));
    debug!(
        "Loaded default character map with {} entries",
        char_map.len()
    );
    char_map
});

/// Two parallel character tables plus a lazily built constant-time lookup.
///
/// # Invariants
/// - `simplified.len() == traditional.len()`; every constructor and every
///   deserialization path checks this.
/// - When a character occurs more than once in the source table of a direction,
///   the **first** occurrence decides the substitute, exactly as a left-to-right
///   scan of the table would.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "RawCharMap")]
pub struct CharMap {
    simplified: Vec<char>,
    traditional: Vec<char>,
    #[serde(skip)]
    lookup: OnceCell<Lookup>,
}

#[derive(Deserialize)]
struct RawCharMap {
    simplified: Vec<char>,
    traditional: Vec<char>,
}

impl TryFrom<RawCharMap> for CharMap {
    type Error = ConversionError;

    fn try_from(raw: RawCharMap) -> Result<Self, Self::Error> {
        CharMap::new(raw.simplified, raw.traditional)
    }
}

#[derive(Debug, Clone)]
struct Lookup {
    s2t: FxHashMap<char, char>,
    t2s: FxHashMap<char, char>,
}

impl Lookup {
    fn build(simplified: &[char], traditional: &[char]) -> Self {
        let mut s2t = FxHashMap::default();
        let mut t2s = FxHashMap::default();
        s2t.reserve(simplified.len());
        t2s.reserve(traditional.len());

        for (&s, &t) in simplified.iter().zip(traditional.iter()) {
            // First entry wins on duplicates
            s2t.entry(s).or_insert(t);
            t2s.entry(t).or_insert(s);
        }

        Lookup { s2t, t2s }
    }
}

impl CharMap {
    /// Builds a map from two parallel tables.
    ///
    /// # Errors
    /// [`ConversionError::TableMismatch`] if the tables differ in length.
    pub fn new(simplified: Vec<char>, traditional: Vec<char>) -> Result<Self, ConversionError> {
        if simplified.len() != traditional.len() {
            return Err(ConversionError::TableMismatch {
                simplified: simplified.len(),
                traditional: traditional.len(),
            });
        }

        Ok(CharMap {
            simplified,
            traditional,
            lookup: OnceCell::new(),
        })
    }

    /// Builds a map from two parallel strings, one character per table entry.
    ///
    /// # Example
    /// ```
    /// use hanzi_conv::char_map::CharMap;
    /// use hanzi_conv::Direction;
    ///
    /// let map = CharMap::from_strs("汉语", "漢語").unwrap();
    /// assert_eq!(map.lookup('语', Direction::S2T), Some('語'));
    /// assert_eq!(map.lookup('漢', Direction::T2S), Some('汉'));
    /// ```
    pub fn from_strs(simplified: &str, traditional: &str) -> Result<Self, ConversionError> {
        Self::new(simplified.chars().collect(), traditional.chars().collect())
    }

    /// Parses a two-column table: one `simplified<whitespace>traditional` pair per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line whose first two
    /// columns are not single characters is logged and skipped; extra columns
    /// (alternative traditional forms) are ignored.
    pub fn from_pairs_str(content: &str) -> Self {
        let mut simplified = Vec::new();
        let mut traditional = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let pair = match parts.as_slice() {
                [s, t, ..] => single_char(s).zip(single_char(t)),
                _ => None,
            };

            match pair {
                Some((s, t)) => {
                    simplified.push(s);
                    traditional.push(t);
                }
                None => warn!("Invalid line format at {}: {}", line_no + 1, line),
            }
        }

        CharMap {
            simplified,
            traditional,
            lookup: OnceCell::new(),
        }
    }

    /// Loads a two-column table from a plaintext file. See [`CharMap::from_pairs_str`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            ConversionError::IoError(format!("Failed to read file {}: {}", path.display(), err))
        })?;

        Ok(Self::from_pairs_str(&content))
    }

    /// Process-wide default map parsed from the embedded table.
    ///
    /// Parsing happens on first call only; concurrent first callers block on
    /// the same initialization and all observe the same map.
    pub fn default_map() -> &'static CharMap {
        &DEFAULT_CHAR_MAP
    }

    pub fn len(&self) -> usize {
        self.simplified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplified.is_empty()
    }

    pub fn simplified(&self) -> &[char] {
        &self.simplified
    }

    pub fn traditional(&self) -> &[char] {
        &self.traditional
    }

    /// Looks up the counterpart of `c` for `direction`. Exclusions are not applied.
    #[inline]
    pub fn lookup(&self, c: char, direction: Direction) -> Option<char> {
        self.table(direction).get(&c).copied()
    }

    /// Source-to-target hash table for `direction`, built on first access.
    pub(crate) fn table(&self, direction: Direction) -> &FxHashMap<char, char> {
        let lookup = self
            .lookup
            .get_or_init(|| Lookup::build(&self.simplified, &self.traditional));
        match direction {
            Direction::S2T => &lookup.s2t,
            Direction::T2S => &lookup.t2s,
        }
    }

    /// Serializes the table to CBOR bytes.
    pub fn to_cbor_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        serde_cbor::to_vec(self).map_err(|err| {
            ConversionError::ParseError(format!("Failed to serialize to CBOR: {}", err))
        })
    }

    /// Deserializes a table from CBOR bytes, re-checking table lengths.
    pub fn from_cbor_bytes(bytes: &[u8]) -> Result<Self, ConversionError> {
        from_slice(bytes)
            .map_err(|err| ConversionError::ParseError(format!("Failed to parse CBOR: {}", err)))
    }

    /// Serialize table to CBOR file
    pub fn serialize_to_cbor<P: AsRef<Path>>(&self, path: P) -> Result<(), ConversionError> {
        let cbor_data = self.to_cbor_bytes()?;
        fs::write(&path, cbor_data).map_err(|err| {
            ConversionError::IoError(format!("Failed to write CBOR file: {}", err))
        })
    }

    /// Deserialize table from CBOR file
    pub fn deserialize_from_cbor<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let cbor_data = fs::read(&path).map_err(|err| {
            ConversionError::IoError(format!("Failed to read CBOR file: {}", err))
        })?;
        Self::from_cbor_bytes(&cbor_data)
    }

    /// Writes the table as Zstd-compressed CBOR.
    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<(), ConversionError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, 3)?;
        serde_cbor::to_writer(&mut encoder, self)
            .map_err(|e| ConversionError::ParseError(e.to_string()))?;
        encoder.finish()?;
        Ok(())
    }

    /// Reads a table written by [`CharMap::save_compressed`].
    pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = Decoder::new(reader)?;
        serde_cbor::from_reader(&mut decoder)
            .map_err(|e| ConversionError::ParseError(e.to_string()))
    }

    /// Decodes an in-memory Zstd-compressed CBOR table (e.g. an `include_bytes!` blob).
    pub fn from_zstd_bytes(compressed: &[u8]) -> Result<Self, ConversionError> {
        let decompressed = decode_all(Cursor::new(compressed)).map_err(|err| {
            ConversionError::IoError(format!("Failed to decompress Zstd: {}", err))
        })?;
        Self::from_cbor_bytes(&decompressed)
    }
}

fn single_char(cell: &str) -> Option<char> {
    let mut chars = cell.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_is_loaded_once() {
        let a = CharMap::default_map();
        let b = CharMap::default_map();
        assert!(std::ptr::eq(a, b));
        assert!(a.len() > 900);
        assert_eq!(a.simplified().len(), a.traditional().len());
    }

    #[test]
    fn default_map_known_pairs() {
        let map = CharMap::default_map();
        assert_eq!(map.lookup('简', Direction::S2T), Some('簡'));
        assert_eq!(map.lookup('轉', Direction::T2S), Some('转'));
        assert_eq!(map.lookup('a', Direction::S2T), None);
    }

    #[test]
    fn first_entry_wins_on_duplicates() {
        let map = CharMap::from_strs("发发台台", "發髮臺颱").unwrap();
        assert_eq!(map.lookup('发', Direction::S2T), Some('發'));
        assert_eq!(map.lookup('台', Direction::S2T), Some('臺'));
        assert_eq!(map.lookup('髮', Direction::T2S), Some('发'));
        assert_eq!(map.lookup('颱', Direction::T2S), Some('台'));
    }

    #[test]
    fn mismatched_tables_are_rejected() {
        let err = CharMap::from_strs("汉语", "漢").unwrap_err();
        match err {
            ConversionError::TableMismatch {
                simplified,
                traditional,
            } => {
                assert_eq!(simplified, 2);
                assert_eq!(traditional, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn pairs_parser_skips_bad_lines() {
        let content = "# header\n汉\t漢\n\n语 語 语\n坏行\n书书\t書\n说\t說\n";
        let map = CharMap::from_pairs_str(content);
        assert_eq!(map.simplified(), &['汉', '语', '说']);
        assert_eq!(map.traditional(), &['漢', '語', '說']);
    }

    #[test]
    fn cbor_bytes_keep_order_and_rebuild_lookup() {
        let map = CharMap::from_strs("发发", "發髮").unwrap();
        let bytes = map.to_cbor_bytes().unwrap();
        let back = CharMap::from_cbor_bytes(&bytes).unwrap();
        assert_eq!(back.traditional(), &['發', '髮']);
        assert_eq!(back.lookup('发', Direction::S2T), Some('發'));
    }

    #[test]
    fn cbor_with_unequal_tables_fails() {
        #[derive(Serialize)]
        struct Lopsided {
            simplified: Vec<char>,
            traditional: Vec<char>,
        }
        let bytes = serde_cbor::to_vec(&Lopsided {
            simplified: vec!['汉', '语'],
            traditional: vec!['漢'],
        })
        .unwrap();

        assert!(matches!(
            CharMap::from_cbor_bytes(&bytes),
            Err(ConversionError::ParseError(_))
        ));
    }

    #[test]
    fn garbage_zstd_is_an_error() {
        assert!(CharMap::from_zstd_bytes(b"not zstd").is_err());
    }
}
