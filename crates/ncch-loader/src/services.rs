//! System services the loader hands work to.
//!
//! The loader never reaches for global state: the caller wires these
//! collaborators into a [`Services`] bundle for each load.

use crate::image::ProcessImage;
use ncch_format::ResourceLimitCategory;
use std::path::Path;
use std::sync::Arc;

/// Resource limits attached to a process.
///
/// Built by [`Kernel::resource_limit`] and handed to the process unchanged;
/// the loader only picks the category. The limit values are enforced by
/// the kernel implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimit {
    /// Category this limit set was built for
    pub category: ResourceLimitCategory,
    /// Highest thread priority the process may use
    pub max_priority: u32,
    /// Maximum committed memory in bytes
    pub max_commit: u64,
    /// Maximum number of threads
    pub max_threads: u32,
}

/// A created, not yet running process
pub trait Process {
    /// Kernel-assigned process id
    fn process_id(&self) -> u32;

    /// Program id of the code set the process was created from
    fn program_id(&self) -> u64;

    /// Attach resource limits
    fn set_resource_limit(&mut self, limit: Arc<ResourceLimit>);

    /// Set the preferred CPU core
    fn set_ideal_processor(&mut self, processor: u8);

    /// Parse kernel capability descriptors, in order
    fn install_capabilities(&mut self, descriptors: &[u32]);

    /// Start the main thread
    fn run(&mut self, priority: i32, stack_size: u32);
}

/// Process-execution subsystem
pub trait Kernel {
    /// Create a process from a laid-out image, taking ownership of it
    fn create_process(&mut self, image: ProcessImage) -> Box<dyn Process>;

    /// Resource limits for a category
    fn resource_limit(&self, category: ResourceLimitCategory) -> Arc<ResourceLimit>;
}

/// Filesystem service registration (what FS:Reg does on hardware)
pub trait FsRegistry {
    /// Associate a process with the program and file it was loaded from
    fn register(&mut self, process_id: u32, program_id: u64, source_path: &Path);
}

/// Persistent system configuration
pub trait ConfigStore {
    /// Replace the preferred console regions
    fn set_preferred_regions(&mut self, regions: &[u32]);
}

/// Telemetry field scope.
///
/// Mirrors the scopes a telemetry session accepts; the loader itself
/// records under [`FieldType::Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Application information
    App,
    /// Emulation session information
    Session,
    /// Performance information
    Performance,
    /// User feedback
    UserFeedback,
    /// User configuration
    UserConfig,
    /// User system information
    UserSystem,
}

/// Best-effort telemetry sink
pub trait Telemetry {
    /// Record a field; failures are the sink's concern
    fn record_field(&mut self, field_type: FieldType, key: &str, value: &str);
}

/// Game announced to a multiplayer room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    /// Program id
    pub id: u64,
    /// Short title, empty when unavailable
    pub name: String,
}

/// Member of an active multiplayer room
pub trait RoomMember {
    /// Announce the running game; best effort
    fn send_game_info(&mut self, info: &GameInfo);
}

/// Collaborators used during a load
pub struct Services<'a> {
    /// Execution subsystem
    pub kernel: &'a mut dyn Kernel,
    /// Filesystem registration service
    pub fs: &'a mut dyn FsRegistry,
    /// Configuration store
    pub config: &'a mut dyn ConfigStore,
    /// Telemetry session, if any
    pub telemetry: Option<&'a mut dyn Telemetry>,
    /// Multiplayer room member, if a session is active
    pub room: Option<&'a mut dyn RoomMember>,
}

impl<'a> Services<'a> {
    /// Bundle the required collaborators
    pub fn new(
        kernel: &'a mut dyn Kernel,
        fs: &'a mut dyn FsRegistry,
        config: &'a mut dyn ConfigStore,
    ) -> Self {
        Self {
            kernel,
            fs,
            config,
            telemetry: None,
            room: None,
        }
    }

    /// Attach a telemetry session
    pub fn with_telemetry(mut self, telemetry: &'a mut dyn Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Attach a multiplayer room member
    pub fn with_room(mut self, room: &'a mut dyn RoomMember) -> Self {
        self.room = Some(room);
        self
    }
}
