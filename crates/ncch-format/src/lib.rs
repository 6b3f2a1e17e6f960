//! NCCH Container Layouts
//!
//! This crate provides bounds-checked decoders for the parts of an NCCH
//! executable container that the application loader depends on:
//! the extended header, SMDH icon metadata, the GBA Virtual Console
//! trailer, file-type identification, and the system title region table.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod exheader;
pub mod file_type;
pub mod reader;
pub mod region;
pub mod smdh;
pub mod system_titles;
pub mod trailer;

pub use error::FormatError;
pub use exheader::{
    CodeSetInfo, ExHeader, KernelCaps, ResourceLimitCategory, SegmentDescriptor, SystemLocalCaps,
};
pub use file_type::{identify_type, FileType};
pub use reader::{ByteReader, DecodeError};
pub use region::Region;
pub use smdh::{Smdh, TitleLanguage};
pub use system_titles::system_title_region;
pub use trailer::is_gba_virtual_console;

/// Size of a memory page on the target system.
pub const PAGE_SIZE: u32 = 0x1000;
