//! SMDH icon metadata
//!
//! Layout (little-endian):
//! - 0x0000: magic "SMDH", version (u16), reserved (u16)
//! - 0x0008: 16 application title entries, 0x200 bytes each
//!   (short title 0x40 units, long title 0x80 units, publisher 0x40 units)
//! - 0x2008: settings block; region lockout mask at 0x2018
//! - 0x2040: small and large icon bitmaps, ending at 0x36C0

use crate::error::FormatError;
use crate::reader::ByteReader;

/// Magic number at the start of every SMDH block
pub const SMDH_MAGIC: [u8; 4] = *b"SMDH";

/// Size of the fixed SMDH layout
pub const SMDH_SIZE: usize = 0x36C0;

/// Number of title entries
pub const TITLE_COUNT: usize = 16;

/// Length of a short title in UTF-16 code units
pub const SHORT_TITLE_LEN: usize = 0x40;

/// Length of a long title in UTF-16 code units
pub const LONG_TITLE_LEN: usize = 0x80;

/// Length of a publisher name in UTF-16 code units
pub const PUBLISHER_LEN: usize = 0x40;

const TITLES_OFFSET: usize = 0x8;
const REGION_LOCKOUT_OFFSET: usize = 0x2018;

/// Language index into the title table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum TitleLanguage {
    /// Japanese
    Japanese = 0,
    /// English
    English = 1,
    /// French
    French = 2,
    /// German
    German = 3,
    /// Italian
    Italian = 4,
    /// Spanish
    Spanish = 5,
    /// Simplified Chinese
    SimplifiedChinese = 6,
    /// Korean
    Korean = 7,
    /// Dutch
    Dutch = 8,
    /// Portuguese
    Portuguese = 9,
    /// Russian
    Russian = 10,
    /// Traditional Chinese
    TraditionalChinese = 11,
}

/// One language's title strings, as fixed-length UTF-16 buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    /// Short title
    pub short_title: Vec<u16>,
    /// Long title
    pub long_title: Vec<u16>,
    /// Publisher
    pub publisher: Vec<u16>,
}

impl TitleEntry {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            short_title: reader.read_utf16(SHORT_TITLE_LEN)?,
            long_title: reader.read_utf16(LONG_TITLE_LEN)?,
            publisher: reader.read_utf16(PUBLISHER_LEN)?,
        })
    }
}

/// Decoded SMDH block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smdh {
    /// Magic bytes as found in the data
    pub magic: [u8; 4],
    /// Format version
    pub version: u16,
    /// Title table indexed by [`TitleLanguage`]
    pub titles: Vec<TitleEntry>,
    /// Region lockout bitmask (bit i allows region i)
    pub region_lockout: u32,
}

impl Smdh {
    /// Check that `data` is large enough and carries the SMDH magic
    pub fn is_valid(data: &[u8]) -> bool {
        data.len() >= SMDH_SIZE && data[..4] == SMDH_MAGIC
    }

    /// Decode an SMDH block.
    ///
    /// Only the size is checked here; callers that need a genuine SMDH
    /// should also check [`Smdh::has_valid_magic`].
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < SMDH_SIZE {
            return Err(FormatError::Truncated {
                what: "SMDH",
                expected: SMDH_SIZE,
                actual: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        let magic = reader.read_array::<4>()?;
        let version = reader.read_u16()?;

        reader.seek(TITLES_OFFSET)?;
        let mut titles = Vec::with_capacity(TITLE_COUNT);
        for _ in 0..TITLE_COUNT {
            titles.push(TitleEntry::decode(&mut reader)?);
        }

        reader.seek(REGION_LOCKOUT_OFFSET)?;
        let region_lockout = reader.read_u32()?;

        Ok(Self {
            magic,
            version,
            titles,
            region_lockout,
        })
    }

    /// Whether the decoded magic matches [`SMDH_MAGIC`]
    pub fn has_valid_magic(&self) -> bool {
        self.magic == SMDH_MAGIC
    }

    /// Fixed-length short title buffer for a language
    pub fn short_title(&self, language: TitleLanguage) -> &[u16] {
        &self.titles[language as usize].short_title
    }

    /// Short title as text, cut at the first NUL
    pub fn short_title_text(&self, language: TitleLanguage) -> String {
        utf16_until_nul(self.short_title(language))
    }

    /// Long title as text, cut at the first NUL
    pub fn long_title_text(&self, language: TitleLanguage) -> String {
        utf16_until_nul(&self.titles[language as usize].long_title)
    }

    /// Publisher as text, cut at the first NUL
    pub fn publisher_text(&self, language: TitleLanguage) -> String {
        utf16_until_nul(&self.titles[language as usize].publisher)
    }
}

/// Convert a fixed-length UTF-16 buffer to a string, discarding everything
/// from the first NUL unit on
pub fn utf16_until_nul(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}
