//! Display title from SMDH icon metadata

use crate::error::{LoaderError, LoaderResult};
use ncch_format::{Smdh, TitleLanguage};

/// Language whose short title is shown and broadcast
pub const DISPLAY_LANGUAGE: TitleLanguage = TitleLanguage::English;

/// Short title from an SMDH block
pub fn title_from_icon(icon: &[u8]) -> LoaderResult<String> {
    if !Smdh::is_valid(icon) {
        return Err(LoaderError::InvalidFormat(
            "missing or invalid SMDH icon".to_string(),
        ));
    }

    let smdh = Smdh::decode(icon)?;
    Ok(smdh.short_title_text(DISPLAY_LANGUAGE))
}
