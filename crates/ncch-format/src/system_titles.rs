//! Region lookup for built-in system titles
//!
//! System titles carry no usable region lockout in their SMDH, so their
//! region is inferred from which regional variant of the title id is being
//! booted.

use crate::region::Region;

/// Title id high word of system applications
const SYSTEM_APPLICATION_HIGH: u32 = 0x0004_0010;
/// Title id high word of system applets
const SYSTEM_APPLET_HIGH: u32 = 0x0004_0030;

/// Regions matching the columns of [`SystemTitle::low_ids`]
const VARIANT_REGIONS: [Region; 6] = [
    Region::Japan,
    Region::NorthAmerica,
    Region::Europe,
    Region::China,
    Region::Korea,
    Region::Taiwan,
];

/// A system title and its regional variants
#[derive(Debug, Clone, Copy)]
pub struct SystemTitle {
    /// Display name
    pub name: &'static str,
    /// Title id high word shared by every variant
    pub category: u32,
    /// Low words for JPN, USA, EUR, CHN, KOR, TWN; 0 where no variant exists
    pub low_ids: [u32; 6],
}

/// System applications follow a fixed stride between regional variants
const fn system_application(name: &'static str, jpn_low: u32) -> SystemTitle {
    SystemTitle {
        name,
        category: SYSTEM_APPLICATION_HIGH,
        low_ids: [
            jpn_low,
            jpn_low + 0x1000,
            jpn_low + 0x2000,
            jpn_low + 0x6000,
            jpn_low + 0x7000,
            jpn_low + 0x8000,
        ],
    }
}

const fn system_applet(name: &'static str, low_ids: [u32; 6]) -> SystemTitle {
    SystemTitle {
        name,
        category: SYSTEM_APPLET_HIGH,
        low_ids,
    }
}

/// Known system titles
pub static SYSTEM_TITLES: &[SystemTitle] = &[
    system_applet(
        "HOME Menu",
        [0x8202, 0x8F02, 0x9802, 0xA102, 0xA902, 0xB102],
    ),
    system_applet(
        "Camera applet",
        [0x8402, 0x9002, 0x9902, 0xA202, 0xAA02, 0xB202],
    ),
    system_applet(
        "Instruction Manual",
        [0x8602, 0x9202, 0x9B02, 0xA402, 0xAC02, 0xB402],
    ),
    system_applet(
        "Game Notes",
        [0x8702, 0x9302, 0x9C02, 0xA502, 0xAD02, 0xB502],
    ),
    system_applet(
        "Internet Browser",
        [0x8802, 0x9402, 0x9D02, 0xA602, 0xAE02, 0xB602],
    ),
    system_applet(
        "Friend List",
        [0x8D02, 0x9602, 0x9F02, 0xA702, 0xAF02, 0xB702],
    ),
    system_applet(
        "Notifications",
        [0x8E02, 0x9702, 0xA002, 0xA802, 0xB002, 0xB802],
    ),
    system_applet(
        "Software Keyboard",
        [0xC002, 0xC802, 0xD002, 0xD802, 0xDE02, 0xE402],
    ),
    system_applet(
        "Mii Selector",
        [0xC003, 0xC803, 0xD003, 0xD803, 0xDE03, 0xE403],
    ),
    system_applet(
        "Error Display",
        [0xC008, 0xC808, 0xD008, 0xD808, 0xDE08, 0xE408],
    ),
    system_application("System Settings", 0x0002_0000),
    system_application("Download Play", 0x0002_0100),
    system_application("Activity Log", 0x0002_0200),
    system_application("Health and Safety Information", 0x0002_0300),
    system_application("Nintendo 3DS Camera", 0x0002_0400),
    system_application("Nintendo 3DS Sound", 0x0002_0500),
    system_application("Mii Maker", 0x0002_0700),
    system_application("StreetPass Mii Plaza", 0x0002_0800),
    SystemTitle {
        name: "Nintendo eShop",
        category: SYSTEM_APPLICATION_HIGH,
        low_ids: [0x0002_0900, 0x0002_1900, 0x0002_2900, 0, 0x0002_7900, 0x0002_8900],
    },
];

/// Region of a system title, or `None` if the id is not a known system title.
///
/// The high word selects the category; within it only the low word is
/// compared.
pub fn system_title_region(title_id: u64) -> Option<Region> {
    let category = (title_id >> 32) as u32;
    if category != SYSTEM_APPLICATION_HIGH && category != SYSTEM_APPLET_HIGH {
        return None;
    }
    let low = title_id as u32;

    SYSTEM_TITLES
        .iter()
        .filter(|title| title.category == category)
        .find_map(|title| {
            title
                .low_ids
                .iter()
                .position(|&id| id != 0 && id == low)
                .map(|column| VARIANT_REGIONS[column])
        })
}
