//! NCCH Application Loader
//!
//! This crate turns a parsed NCCH container into a running process:
//! - Overlay resolution between a base title and its update
//! - Process image layout (code, rodata, data + bss) and code patching
//! - Translation of ExHeader capabilities into process setup
//! - Region lockout and title extraction from SMDH icon metadata
//!
//! Collaborators (container parsing, kernel, filesystem, configuration,
//! telemetry, multiplayer) are traits passed in by the caller.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod caps;
pub mod config;
pub mod container;
pub mod error;
pub mod image;
pub mod loader;
pub mod overlay;
pub mod region;
pub mod services;
pub mod title;

pub use caps::ProcessSetup;
pub use config::{ConfigError, LoaderConfig, LoaderSettings, RegionSetting};
pub use container::{Container, ContainerError, PatchOutcome, RomFsReader};
pub use error::{LoaderError, LoaderResult};
pub use image::{build_process_image, ProcessImage, Segment};
pub use loader::AppLoader;
pub use overlay::{ContainerPair, OverlaySelection, SdmcTitleLocator, TitleLocator, UPDATE_MASK};
pub use services::{
    ConfigStore, FieldType, FsRegistry, GameInfo, Kernel, Process, ResourceLimit, RoomMember,
    Services, Telemetry,
};
