//! Region lockout resolution

use crate::config::RegionSetting;
use crate::services::ConfigStore;
use log::debug;
use ncch_format::region::REGION_COUNT;
use ncch_format::{system_title_region, Smdh};

/// Regions allowed by a lockout mask, in ascending order
pub fn regions_from_lockout(mask: u32) -> Vec<u32> {
    (0..REGION_COUNT)
        .filter(|region| mask & (1 << region) != 0)
        .collect()
}

/// Preferred regions for a title.
///
/// Uses the SMDH lockout mask when the icon is large enough, otherwise the
/// system title table. `None` means nothing is known and the configuration
/// should be left alone.
pub fn preferred_regions(icon: Option<&[u8]>, program_id: u64) -> Option<Vec<u32>> {
    if let Some(smdh) = icon.and_then(|data| Smdh::decode(data).ok()) {
        return Some(regions_from_lockout(smdh.region_lockout));
    }

    system_title_region(program_id).map(|region| vec![region.code()])
}

/// Update the preferred regions when the region setting is automatic
pub fn apply_region_lockout(
    setting: RegionSetting,
    icon: Option<&[u8]>,
    program_id: u64,
    config: &mut dyn ConfigStore,
) {
    if setting != RegionSetting::Auto {
        return;
    }

    match preferred_regions(icon, program_id) {
        Some(regions) => {
            debug!("Preferred regions for {:016X}: {:?}", program_id, regions);
            config.set_preferred_regions(&regions);
        }
        None => debug!("No region information for {:016X}", program_id),
    }
}
