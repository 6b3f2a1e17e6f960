//! Console region codes

/// Number of region slots in an SMDH region-lockout mask
pub const REGION_COUNT: u32 = 7;

/// Console region, numbered as in the SMDH region-lockout mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Region {
    /// Japan
    Japan = 0,
    /// North America
    NorthAmerica = 1,
    /// Europe
    Europe = 2,
    /// Australia
    Australia = 3,
    /// China
    China = 4,
    /// Korea
    Korea = 5,
    /// Taiwan
    Taiwan = 6,
}

impl Region {
    /// Region for a numeric code, if it is in range
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Japan),
            1 => Some(Self::NorthAmerica),
            2 => Some(Self::Europe),
            3 => Some(Self::Australia),
            4 => Some(Self::China),
            5 => Some(Self::Korea),
            6 => Some(Self::Taiwan),
            _ => None,
        }
    }

    /// Numeric region code
    pub fn code(self) -> u32 {
        self as u32
    }
}
