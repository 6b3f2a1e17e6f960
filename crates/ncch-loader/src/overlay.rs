//! Base/update container overlay
//!
//! An installed update title replaces the base title's code and header.
//! RomFS reads fall back from the update to the base independently of
//! which container governs the header.

use crate::container::{Container, ContainerError, RomFsReader};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bits OR-ed into a program id to form its update title id
pub const UPDATE_MASK: u64 = 0x0000_000E_0000_0000;

/// Update title id for a base program id
pub fn update_title_id(program_id: u64) -> u64 {
    program_id | UPDATE_MASK
}

/// Resolves installed title ids to content files
pub trait TitleLocator {
    /// Path of the title's executable content
    fn content_path(&self, title_id: u64) -> PathBuf;
}

/// Locates titles installed on the emulated SD card
#[derive(Debug, Clone)]
pub struct SdmcTitleLocator {
    sdmc_dir: PathBuf,
}

impl SdmcTitleLocator {
    /// Locator rooted at an SD card directory
    pub fn new(sdmc_dir: impl Into<PathBuf>) -> Self {
        Self {
            sdmc_dir: sdmc_dir.into(),
        }
    }
}

impl TitleLocator for SdmcTitleLocator {
    fn content_path(&self, title_id: u64) -> PathBuf {
        let high = (title_id >> 32) as u32;
        let low = title_id as u32;
        self.sdmc_dir
            .join("title")
            .join(format!("{:08x}", high))
            .join(format!("{:08x}", low))
            .join("content")
            .join("00000000.app")
    }
}

/// Which container governs header and ExeFS reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlaySelection {
    /// The title as booted
    #[default]
    Base,
    /// Its installed update
    Update,
}

/// A base container, its update slot, and the current selection
pub struct ContainerPair<C> {
    base: C,
    update: C,
    selection: OverlaySelection,
    resolved: bool,
}

impl<C: Container> ContainerPair<C> {
    /// Pair a base container with an (unopened) update container
    pub fn new(base: C, update: C) -> Self {
        Self {
            base,
            update,
            selection: OverlaySelection::Base,
            resolved: false,
        }
    }

    /// Current selection
    pub fn selection(&self) -> OverlaySelection {
        self.selection
    }

    /// The base container
    pub fn base(&self) -> &C {
        &self.base
    }

    /// The base container, mutably
    pub fn base_mut(&mut self) -> &mut C {
        &mut self.base
    }

    /// The update container
    pub fn update(&self) -> &C {
        &self.update
    }

    /// The selected container
    pub fn active(&self) -> &C {
        match self.selection {
            OverlaySelection::Base => &self.base,
            OverlaySelection::Update => &self.update,
        }
    }

    /// The selected container, mutably
    pub fn active_mut(&mut self) -> &mut C {
        match self.selection {
            OverlaySelection::Base => &mut self.base,
            OverlaySelection::Update => &mut self.update,
        }
    }

    /// Open and load the update for `program_id`, selecting it on success.
    ///
    /// Update failures are not errors. The selection is fixed after the
    /// first call; later calls return it unchanged.
    pub fn resolve_update(
        &mut self,
        program_id: u64,
        locator: &dyn TitleLocator,
    ) -> OverlaySelection {
        if self.resolved {
            return self.selection;
        }
        self.resolved = true;

        let path = locator.content_path(update_title_id(program_id));
        self.update.open(&path);
        match self.update.load() {
            Ok(()) => {
                debug!("Using update title at {}", path.display());
                self.selection = OverlaySelection::Update;
            }
            Err(e) => debug!("No update title at {}: {}", path.display(), e),
        }
        self.selection
    }

    /// RomFS from the update, falling back to the base
    pub fn read_update_romfs(&self) -> Result<Arc<dyn RomFsReader>, ContainerError> {
        self.update.romfs().or_else(|e| {
            debug!("Update RomFS unavailable ({}), using base RomFS", e);
            self.base.romfs()
        })
    }

    /// Dump the RomFS of the update for `program_id`.
    ///
    /// A selected update is already open on that title and is dumped in
    /// place; re-opening it would discard the state the overlay reads from.
    /// Otherwise the idle update container is pointed at the title first.
    pub fn dump_update_romfs(
        &mut self,
        program_id: u64,
        locator: &dyn TitleLocator,
        target: &Path,
    ) -> Result<(), ContainerError> {
        if self.selection == OverlaySelection::Update {
            return self.update.dump_romfs(target);
        }

        let path = locator.content_path(update_title_id(program_id));
        self.update.open(&path);
        self.update.dump_romfs(target)
    }
}
