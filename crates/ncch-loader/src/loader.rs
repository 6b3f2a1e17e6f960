//! Application loader
//!
//! [`AppLoader`] owns the base and update containers of one title and
//! boots it exactly once:
//! 1. load the base container and resolve the update overlay
//! 2. report the title to telemetry and the multiplayer room
//! 3. lay out the process image and create, configure and run the process
//! 4. derive the preferred console regions

use crate::caps::ProcessSetup;
use crate::config::{LoaderConfig, RegionSetting};
use crate::container::{
    Container, RomFsReader, SECTION_BANNER, SECTION_CODE, SECTION_ICON, SECTION_LOGO,
};
use crate::error::{LoaderError, LoaderResult};
use crate::image::build_process_image;
use crate::overlay::{ContainerPair, OverlaySelection, SdmcTitleLocator, TitleLocator};
use crate::region::apply_region_lockout;
use crate::services::{ConfigStore, FieldType, GameInfo, Process, Services};
use crate::title::title_from_icon;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loader for one NCCH title and its optional update
pub struct AppLoader<C> {
    filepath: PathBuf,
    containers: ContainerPair<C>,
    locator: Box<dyn TitleLocator>,
    region: RegionSetting,
    is_loaded: bool,
}

impl<C: Container> AppLoader<C> {
    /// Create a loader for the title at `filepath`.
    ///
    /// `base` is opened on `filepath`; `update` is opened during
    /// [`AppLoader::load`] once the program id is known.
    pub fn new(filepath: impl Into<PathBuf>, mut base: C, update: C, config: &LoaderConfig) -> Self {
        let filepath = filepath.into();
        base.open(&filepath);
        Self {
            filepath,
            containers: ContainerPair::new(base, update),
            locator: Box::new(SdmcTitleLocator::new(config.loader.sdmc_dir.clone())),
            region: config.loader.region,
            is_loaded: false,
        }
    }

    /// Replace the locator used to find update titles
    pub fn with_locator(mut self, locator: impl TitleLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Path of the title being loaded
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Whether `load` has run
    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Container currently governing header and ExeFS reads
    pub fn overlay(&self) -> OverlaySelection {
        self.containers.selection()
    }

    /// Load the title and start its process.
    ///
    /// A loader boots at most once; on error it must be discarded.
    pub fn load(&mut self, services: &mut Services<'_>) -> LoaderResult<Box<dyn Process>> {
        if self.is_loaded {
            return Err(LoaderError::AlreadyLoaded);
        }

        self.containers.base_mut().load()?;

        let program_id = self.read_program_id()?;
        let program_id_text = format!("{:016X}", program_id);
        info!("Program ID: {}", program_id_text);

        self.containers.resolve_update(program_id, self.locator.as_ref());

        if let Some(telemetry) = services.telemetry.as_deref_mut() {
            telemetry.record_field(FieldType::Session, "ProgramId", &program_id_text);
        }

        if let Some(room) = services.room.as_deref_mut() {
            let game_info = GameInfo {
                id: program_id,
                name: self.read_title().unwrap_or_default(),
            };
            room.send_game_info(&game_info);
        }

        self.is_loaded = true;

        let process = self.load_exec(services)?;

        self.parse_region_lockout_info(program_id, &mut *services.config);

        Ok(process)
    }

    fn load_exec(&self, services: &mut Services<'_>) -> LoaderResult<Box<dyn Process>> {
        if !self.is_loaded {
            return Err(LoaderError::NotLoaded);
        }

        let code = self.read_code()?;
        let program_id = self.read_program_id()?;

        let overlay = self.containers.active();
        let header = overlay.exheader()?;
        let image = build_process_image(code, &header.codeset_info, program_id, |code| {
            overlay.apply_code_patch(code)
        })?;
        let setup = ProcessSetup::from_exheader(header)?;

        let mut process = services.kernel.create_process(image);
        setup.apply(&*services.kernel, process.as_mut());

        // On hardware this goes through FS:Reg
        services
            .fs
            .register(process.process_id(), process.program_id(), &self.filepath);

        setup.run(process.as_mut());
        Ok(process)
    }

    fn parse_region_lockout_info(&self, program_id: u64, config: &mut dyn ConfigStore) {
        let icon = self.read_icon().ok();
        apply_region_lockout(self.region, icon.as_deref(), program_id, config);
    }

    fn ensure_base_loaded(&mut self) -> LoaderResult<()> {
        if !self.is_loaded {
            self.containers.base_mut().load()?;
        }
        Ok(())
    }

    /// Old 3DS memory mode requested by the title
    pub fn load_kernel_system_mode(&mut self) -> LoaderResult<u8> {
        self.ensure_base_loaded()?;
        Ok(self.containers.active().exheader()?.system_local_caps.system_mode)
    }

    /// New 3DS mode requested by the title
    pub fn load_kernel_n3ds_mode(&mut self) -> LoaderResult<u8> {
        self.ensure_base_loaded()?;
        Ok(self.containers.active().exheader()?.system_local_caps.n3ds_mode)
    }

    /// Whether the governing container holds executable content
    pub fn is_executable(&mut self) -> LoaderResult<bool> {
        let overlay = self.containers.active_mut();
        overlay.load()?;
        Ok(overlay.is_executable()?)
    }

    fn read_section(&self, name: &str) -> LoaderResult<Vec<u8>> {
        Ok(self.containers.active().read_section(name)?)
    }

    /// Raw `.code` section
    pub fn read_code(&self) -> LoaderResult<Vec<u8>> {
        self.read_section(SECTION_CODE)
    }

    /// Raw SMDH icon section
    pub fn read_icon(&self) -> LoaderResult<Vec<u8>> {
        self.read_section(SECTION_ICON)
    }

    /// Raw banner section
    pub fn read_banner(&self) -> LoaderResult<Vec<u8>> {
        self.read_section(SECTION_BANNER)
    }

    /// Raw logo section
    pub fn read_logo(&self) -> LoaderResult<Vec<u8>> {
        self.read_section(SECTION_LOGO)
    }

    /// Program id of the base title
    pub fn read_program_id(&self) -> LoaderResult<u64> {
        Ok(self.containers.base().program_id()?)
    }

    /// Extdata id of the base title
    pub fn read_extdata_id(&self) -> LoaderResult<u64> {
        Ok(self.containers.base().extdata_id()?)
    }

    /// RomFS of the base title
    pub fn read_romfs(&self) -> LoaderResult<Arc<dyn RomFsReader>> {
        Ok(self.containers.base().romfs()?)
    }

    /// RomFS of the update, or of the base if the update has none
    pub fn read_update_romfs(&self) -> LoaderResult<Arc<dyn RomFsReader>> {
        Ok(self.containers.read_update_romfs()?)
    }

    /// Extract the base title's RomFS
    pub fn dump_romfs(&self, target: &Path) -> LoaderResult<()> {
        Ok(self.containers.base().dump_romfs(target)?)
    }

    /// Extract the update title's RomFS
    pub fn dump_update_romfs(&mut self, target: &Path) -> LoaderResult<()> {
        let program_id = self.read_program_id()?;
        self.containers
            .dump_update_romfs(program_id, self.locator.as_ref(), target)?;
        Ok(())
    }

    /// Short English title from the SMDH icon
    pub fn read_title(&self) -> LoaderResult<String> {
        let icon = self.read_icon().unwrap_or_default();
        title_from_icon(&icon)
    }
}
