//! Test harness for loader integration tests
//!
//! Provides in-memory containers keyed by path and recording fakes for
//! every service the loader talks to. All fakes append to one shared
//! event log so tests can check both what happened and in which order.

#![allow(dead_code)]

use ncch_format::exheader::NUM_KERNEL_CAP_DESCRIPTORS;
use ncch_format::smdh::SMDH_SIZE;
use ncch_format::{ExHeader, ResourceLimitCategory, SegmentDescriptor};
use ncch_loader::{
    ConfigStore, Container, ContainerError, FieldType, FsRegistry, GameInfo, Kernel,
    LoaderConfig, PatchOutcome, Process, ProcessImage, ResourceLimit, RomFsReader, RoomMember,
    Telemetry,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PROGRAM_ID: u64 = 0x0004_0000_0012_3400;
pub const BASE_PATH: &str = "/games/title.cxi";
pub const SDMC_DIR: &str = "/sd";
pub const UPDATE_PATH: &str = "/sd/title/0004000e/00123400/content/00000000.app";

// ============================================================================
// Containers
// ============================================================================

/// How a fake title reacts to a code patch request
#[derive(Debug, Clone)]
pub enum FakePatch {
    None,
    /// Write `value` at `offset` of the code buffer
    Write { offset: usize, value: u8 },
    Fail,
}

/// Contents of one installed title
#[derive(Debug, Clone)]
pub struct FakeTitle {
    pub program_id: u64,
    pub extdata_id: u64,
    pub executable: bool,
    pub exheader: ExHeader,
    pub sections: HashMap<String, Vec<u8>>,
    pub romfs: Option<Vec<u8>>,
    pub patch: FakePatch,
}

impl FakeTitle {
    /// A bootable application with one page per segment and an icon
    pub fn application(program_id: u64) -> Self {
        let mut sections = HashMap::new();
        sections.insert(".code".to_string(), vec![0xC0; 0x3000]);
        sections.insert("icon".to_string(), smdh_icon("Base", 0b100_0001));
        sections.insert("banner".to_string(), b"CBMD".to_vec());
        sections.insert("logo".to_string(), b"LOGO".to_vec());

        Self {
            program_id,
            extdata_id: program_id & 0xFFFF_FFFF,
            executable: true,
            exheader: exheader("Base", [1, 1, 1], 1),
            sections,
            romfs: Some(b"base romfs".to_vec()),
            patch: FakePatch::None,
        }
    }
}

/// Titles reachable by path, shared by every fake container of a test
#[derive(Debug, Clone, Default)]
pub struct TitleStore {
    titles: Arc<HashMap<PathBuf, FakeTitle>>,
}

impl TitleStore {
    pub fn new(titles: Vec<(&str, FakeTitle)>) -> Self {
        Self {
            titles: Arc::new(
                titles
                    .into_iter()
                    .map(|(path, title)| (PathBuf::from(path), title))
                    .collect(),
            ),
        }
    }

    pub fn container(&self) -> FakeContainer {
        FakeContainer {
            store: self.clone(),
            path: None,
            title: None,
        }
    }
}

pub struct FakeContainer {
    store: TitleStore,
    path: Option<PathBuf>,
    title: Option<FakeTitle>,
}

impl FakeContainer {
    fn loaded(&self) -> Result<&FakeTitle, ContainerError> {
        self.title
            .as_ref()
            .ok_or_else(|| ContainerError::InvalidFormat("container not loaded".to_string()))
    }
}

impl Container for FakeContainer {
    fn open(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
        self.title = None;
    }

    fn load(&mut self) -> Result<(), ContainerError> {
        if self.title.is_some() {
            return Ok(());
        }
        let path = self.path.clone().ok_or(ContainerError::NotOpened)?;
        let title = self
            .store
            .titles
            .get(&path)
            .cloned()
            .ok_or(ContainerError::NotFound(path))?;
        self.title = Some(title);
        Ok(())
    }

    fn program_id(&self) -> Result<u64, ContainerError> {
        Ok(self.loaded()?.program_id)
    }

    fn extdata_id(&self) -> Result<u64, ContainerError> {
        Ok(self.loaded()?.extdata_id)
    }

    fn is_executable(&self) -> Result<bool, ContainerError> {
        Ok(self.loaded()?.executable)
    }

    fn exheader(&self) -> Result<&ExHeader, ContainerError> {
        Ok(&self.loaded()?.exheader)
    }

    fn read_section(&self, name: &str) -> Result<Vec<u8>, ContainerError> {
        self.loaded()?
            .sections
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::SectionNotFound(name.to_string()))
    }

    fn romfs(&self) -> Result<Arc<dyn RomFsReader>, ContainerError> {
        let data = self
            .loaded()?
            .romfs
            .clone()
            .ok_or_else(|| ContainerError::SectionNotFound("romfs".to_string()))?;
        Ok(Arc::new(MemoryRomFs(data)))
    }

    fn apply_code_patch(&self, code: &mut Vec<u8>) -> Result<PatchOutcome, ContainerError> {
        match self.loaded()?.patch {
            FakePatch::None => Ok(PatchOutcome::NotUsed),
            FakePatch::Write { offset, value } => {
                code[offset] = value;
                Ok(PatchOutcome::Applied)
            }
            FakePatch::Fail => Err(ContainerError::InvalidFormat("corrupt patch".to_string())),
        }
    }

    fn dump_romfs(&self, target: &Path) -> Result<(), ContainerError> {
        // Dumping works on an opened container even if it was never loaded
        let path = self.path.as_ref().ok_or(ContainerError::NotOpened)?;
        let title = self
            .store
            .titles
            .get(path)
            .ok_or_else(|| ContainerError::NotFound(path.clone()))?;
        let data = title
            .romfs
            .as_ref()
            .ok_or_else(|| ContainerError::SectionNotFound("romfs".to_string()))?;
        std::fs::write(target.join("romfs.bin"), data)?;
        Ok(())
    }
}

pub struct MemoryRomFs(pub Vec<u8>);

impl RomFsReader for MemoryRomFs {
    fn len(&self) -> u64 {
        self.0.len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        let start = (offset as usize).min(self.0.len());
        let count = buf.len().min(self.0.len() - start);
        buf[..count].copy_from_slice(&self.0[start..start + count]);
        Ok(count)
    }
}

/// Read a whole RomFS into memory
pub fn read_all(romfs: &dyn RomFsReader) -> Vec<u8> {
    let mut buf = vec![0u8; romfs.len() as usize];
    let read = romfs.read_at(0, &mut buf).unwrap();
    buf.truncate(read);
    buf
}

// ============================================================================
// Fixtures
// ============================================================================

pub const TEXT_ADDR: u32 = 0x0010_0000;
pub const RO_ADDR: u32 = 0x0020_0000;
pub const DATA_ADDR: u32 = 0x0030_0000;

pub fn exheader(name: &str, pages: [u32; 3], bss_size: u32) -> ExHeader {
    let mut header = ExHeader::default();
    let info = &mut header.codeset_info;
    info.name[..name.len()].copy_from_slice(name.as_bytes());
    info.text = SegmentDescriptor {
        address: TEXT_ADDR,
        num_max_pages: pages[0],
        code_size: 0,
    };
    info.ro = SegmentDescriptor {
        address: RO_ADDR,
        num_max_pages: pages[1],
        code_size: 0,
    };
    info.data = SegmentDescriptor {
        address: DATA_ADDR,
        num_max_pages: pages[2],
        code_size: 0,
    };
    info.stack_size = 0x4000;
    info.bss_size = bss_size;

    let caps = &mut header.system_local_caps;
    caps.priority = 0x30;
    caps.ideal_processor = 0;
    caps.resource_limit_category = ResourceLimitCategory::Application as u8;
    caps.system_mode = 0;
    caps.n3ds_mode = 0;

    for (i, word) in header.kernel_caps.descriptors.iter_mut().enumerate() {
        *word = 0xFF00_0000 | (NUM_KERNEL_CAP_DESCRIPTORS - i) as u32;
    }
    header
}

/// SMDH block with an English short title and a region lockout mask
pub fn smdh_icon(title: &str, region_lockout: u32) -> Vec<u8> {
    let units: Vec<u16> = title.encode_utf16().collect();
    smdh_icon_units(&units, region_lockout)
}

pub fn smdh_icon_units(units: &[u16], region_lockout: u32) -> Vec<u8> {
    let mut icon = vec![0u8; SMDH_SIZE];
    icon[..4].copy_from_slice(b"SMDH");
    let english = 0x8 + 0x200;
    for (i, unit) in units.iter().enumerate() {
        icon[english + i * 2..english + i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    icon[0x2018..0x201C].copy_from_slice(&region_lockout.to_le_bytes());
    icon
}

pub fn config() -> LoaderConfig {
    let mut config = LoaderConfig::default();
    config.loader.sdmc_dir = PathBuf::from(SDMC_DIR);
    config
}

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ProcessCreated { pid: u32, image: ProcessImage },
    ResourceLimit { pid: u32, category: ResourceLimitCategory },
    IdealProcessor { pid: u32, processor: u8 },
    Capabilities { pid: u32, words: Vec<u32> },
    Run { pid: u32, priority: i32, stack_size: u32 },
    FsRegister { pid: u32, program_id: u64, path: PathBuf },
    PreferredRegions(Vec<u32>),
    Telemetry { field_type: FieldType, key: String, value: String },
    GameInfo(GameInfo),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub struct FakeKernel {
    pub log: EventLog,
    next_pid: u32,
}

pub struct FakeProcess {
    log: EventLog,
    pid: u32,
    program_id: u64,
}

impl Process for FakeProcess {
    fn process_id(&self) -> u32 {
        self.pid
    }

    fn program_id(&self) -> u64 {
        self.program_id
    }

    fn set_resource_limit(&mut self, limit: Arc<ResourceLimit>) {
        self.log.lock().push(Event::ResourceLimit {
            pid: self.pid,
            category: limit.category,
        });
    }

    fn set_ideal_processor(&mut self, processor: u8) {
        self.log.lock().push(Event::IdealProcessor {
            pid: self.pid,
            processor,
        });
    }

    fn install_capabilities(&mut self, descriptors: &[u32]) {
        self.log.lock().push(Event::Capabilities {
            pid: self.pid,
            words: descriptors.to_vec(),
        });
    }

    fn run(&mut self, priority: i32, stack_size: u32) {
        self.log.lock().push(Event::Run {
            pid: self.pid,
            priority,
            stack_size,
        });
    }
}

impl Kernel for FakeKernel {
    fn create_process(&mut self, image: ProcessImage) -> Box<dyn Process> {
        let pid = self.next_pid;
        self.next_pid += 1;
        let program_id = image.program_id;
        self.log.lock().push(Event::ProcessCreated { pid, image });
        Box::new(FakeProcess {
            log: self.log.clone(),
            pid,
            program_id,
        })
    }

    fn resource_limit(&self, category: ResourceLimitCategory) -> Arc<ResourceLimit> {
        Arc::new(ResourceLimit {
            category,
            max_priority: 0x18,
            max_commit: 0x0400_0000,
            max_threads: 32,
        })
    }
}

pub struct FakeFs(pub EventLog);

impl FsRegistry for FakeFs {
    fn register(&mut self, process_id: u32, program_id: u64, source_path: &Path) {
        self.0.lock().push(Event::FsRegister {
            pid: process_id,
            program_id,
            path: source_path.to_path_buf(),
        });
    }
}

pub struct FakeConfig(pub EventLog);

impl ConfigStore for FakeConfig {
    fn set_preferred_regions(&mut self, regions: &[u32]) {
        self.0.lock().push(Event::PreferredRegions(regions.to_vec()));
    }
}

pub struct FakeTelemetry(pub EventLog);

impl Telemetry for FakeTelemetry {
    fn record_field(&mut self, field_type: FieldType, key: &str, value: &str) {
        self.0.lock().push(Event::Telemetry {
            field_type,
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

pub struct FakeRoom(pub EventLog);

impl RoomMember for FakeRoom {
    fn send_game_info(&mut self, info: &GameInfo) {
        self.0.lock().push(Event::GameInfo(info.clone()));
    }
}

/// One of every fake service, all writing to the same log
pub struct FakeSystem {
    pub log: EventLog,
    pub kernel: FakeKernel,
    pub fs: FakeFs,
    pub config: FakeConfig,
    pub telemetry: FakeTelemetry,
    pub room: FakeRoom,
}

impl FakeSystem {
    pub fn new() -> Self {
        let log = EventLog::default();
        Self {
            kernel: FakeKernel {
                log: log.clone(),
                next_pid: 10,
            },
            fs: FakeFs(log.clone()),
            config: FakeConfig(log.clone()),
            telemetry: FakeTelemetry(log.clone()),
            room: FakeRoom(log.clone()),
            log,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().clone()
    }

    pub fn created_images(&self) -> Vec<ProcessImage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::ProcessCreated { image, .. } => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.log.lock().iter().filter(|event| matches(event)).count()
    }
}
