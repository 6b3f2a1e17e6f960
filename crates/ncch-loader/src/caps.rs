//! ExHeader capabilities to process setup

use crate::error::LoaderResult;
use crate::services::{Kernel, Process};
use ncch_format::exheader::NUM_KERNEL_CAP_DESCRIPTORS;
use ncch_format::{ExHeader, ResourceLimitCategory};

/// Process parameters taken from an ExHeader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSetup {
    /// Resource limit category
    pub resource_limit_category: ResourceLimitCategory,
    /// Preferred CPU core
    pub ideal_processor: u8,
    /// Main thread priority
    pub priority: i32,
    /// Main thread stack size
    pub stack_size: u32,
    /// Kernel capability descriptors, in header order
    pub kernel_caps: [u32; NUM_KERNEL_CAP_DESCRIPTORS],
}

impl ProcessSetup {
    /// Read the setup fields from a header
    pub fn from_exheader(header: &ExHeader) -> LoaderResult<Self> {
        let caps = &header.system_local_caps;
        Ok(Self {
            resource_limit_category: caps.resource_limit_category()?,
            ideal_processor: caps.ideal_processor,
            priority: i32::from(caps.priority),
            stack_size: header.codeset_info.stack_size,
            kernel_caps: header.kernel_caps.descriptors,
        })
    }

    /// Configure a freshly created process. Does not start it.
    pub fn apply(&self, kernel: &dyn Kernel, process: &mut dyn Process) {
        process.set_resource_limit(kernel.resource_limit(self.resource_limit_category));
        process.set_ideal_processor(self.ideal_processor);
        process.install_capabilities(&self.kernel_caps);
    }

    /// Start the process's main thread
    pub fn run(&self, process: &mut dyn Process) {
        process.run(self.priority, self.stack_size);
    }
}
