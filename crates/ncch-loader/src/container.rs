//! Container collaborator interface
//!
//! Parsing an NCCH (signature checks, decryption, ExeFS/RomFS extraction)
//! happens behind [`Container`]. The loader only uses the typed accessors.

use ncch_format::{ExHeader, FormatError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// ExeFS section holding the executable code
pub const SECTION_CODE: &str = ".code";
/// ExeFS section holding the SMDH icon metadata
pub const SECTION_ICON: &str = "icon";
/// ExeFS section holding the HOME Menu banner
pub const SECTION_BANNER: &str = "banner";
/// ExeFS section holding the boot logo
pub const SECTION_LOGO: &str = "logo";

/// Errors reported by a container
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Container was never opened
    #[error("Container has not been opened")]
    NotOpened,

    /// Container file does not exist
    #[error("Container not found: {0}")]
    NotFound(PathBuf),

    /// Container is encrypted and no keys are available
    #[error("Container is encrypted")]
    Encrypted,

    /// Requested ExeFS section or RomFS is absent
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    /// Container data is malformed
    #[error("Invalid container: {0}")]
    InvalidFormat(String),

    /// Structure decoding error
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of applying a code patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// A patch was found and applied
    Applied,
    /// No patch exists for this container
    NotUsed,
}

/// Random access to a container's embedded filesystem (RomFS)
pub trait RomFsReader: Send + Sync {
    /// Total size of the filesystem image in bytes
    fn len(&self) -> u64;

    /// Whether the image is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read into `buf` starting at `offset`, returning the number of bytes read
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize>;
}

/// A parsed NCCH container.
///
/// `load` must be idempotent: loading an already loaded container succeeds
/// without doing any work.
pub trait Container {
    /// Point the container at a file.
    ///
    /// Any previously loaded state is discarded; the next `load` parses the
    /// new file. `dump_romfs` works on an opened container without `load`.
    fn open(&mut self, path: &Path);

    /// Parse headers and prepare section access
    fn load(&mut self) -> Result<(), ContainerError>;

    /// Program id from the NCCH header
    fn program_id(&self) -> Result<u64, ContainerError>;

    /// Extdata id from the ExHeader storage info
    fn extdata_id(&self) -> Result<u64, ContainerError>;

    /// Whether the NCCH header marks the content as executable
    fn is_executable(&self) -> Result<bool, ContainerError>;

    /// Decoded extended header
    fn exheader(&self) -> Result<&ExHeader, ContainerError>;

    /// Read a named ExeFS section
    fn read_section(&self, name: &str) -> Result<Vec<u8>, ContainerError>;

    /// Open the RomFS
    fn romfs(&self) -> Result<Arc<dyn RomFsReader>, ContainerError>;

    /// Apply the container's code patch (IPS/BPS) to `code`
    fn apply_code_patch(&self, code: &mut Vec<u8>) -> Result<PatchOutcome, ContainerError>;

    /// Extract the RomFS to a directory
    fn dump_romfs(&self, target: &Path) -> Result<(), ContainerError>;
}
