//! Extended header (ExHeader) layout
//!
//! Only the fields the loader consumes are decoded:
//! - code-set info (process name, segment descriptors, stack and bss sizes)
//! - ARM11 system local capabilities (priority, processor, modes, limits)
//! - ARM11 kernel capability descriptors

use crate::error::FormatError;
use crate::reader::ByteReader;

/// Size of the extended header proper (without the access descriptor)
pub const EXHEADER_SIZE: usize = 0x400;

/// Number of ARM11 kernel capability descriptor words
pub const NUM_KERNEL_CAP_DESCRIPTORS: usize = 28;

const CODESET_INFO_OFFSET: usize = 0x000;
const SYSTEM_LOCAL_CAPS_OFFSET: usize = 0x200;
const KERNEL_CAPS_OFFSET: usize = 0x370;

// Offsets relative to the system local caps block
const N3DS_MODE_OFFSET: usize = 0x0D;
const RESOURCE_LIMIT_CATEGORY_OFFSET: usize = 0x16F;

/// Address and size of one code-set segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentDescriptor {
    /// Target virtual address
    pub address: u32,
    /// Number of pages reserved for the segment
    pub num_max_pages: u32,
    /// Size of the segment's data in bytes
    pub code_size: u32,
}

impl SegmentDescriptor {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            address: reader.read_u32()?,
            num_max_pages: reader.read_u32()?,
            code_size: reader.read_u32()?,
        })
    }
}

/// Code-set information block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSetInfo {
    /// Process name, NUL padded
    pub name: [u8; 8],
    /// Code (.text) segment
    pub text: SegmentDescriptor,
    /// Main thread stack size
    pub stack_size: u32,
    /// Read-only data segment
    pub ro: SegmentDescriptor,
    /// Data segment
    pub data: SegmentDescriptor,
    /// Raw (unaligned) bss size
    pub bss_size: u32,
}

impl CodeSetInfo {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let name = reader.read_array::<8>()?;
        // flags and remaster version
        reader.read_bytes(8)?;
        let text = SegmentDescriptor::decode(reader)?;
        let stack_size = reader.read_u32()?;
        let ro = SegmentDescriptor::decode(reader)?;
        reader.read_bytes(4)?;
        let data = SegmentDescriptor::decode(reader)?;
        let bss_size = reader.read_u32()?;

        Ok(Self {
            name,
            text,
            stack_size,
            ro,
            data,
            bss_size,
        })
    }

    /// Process name up to the first NUL byte
    pub fn process_name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// Resource limit category requested by a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResourceLimitCategory {
    /// Regular application
    Application = 0,
    /// System applet
    SysApplet = 1,
    /// Library applet
    LibApplet = 2,
    /// Anything else (system modules)
    Other = 3,
}

impl TryFrom<u8> for ResourceLimitCategory {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Application),
            1 => Ok(Self::SysApplet),
            2 => Ok(Self::LibApplet),
            3 => Ok(Self::Other),
            other => Err(FormatError::InvalidResourceLimitCategory(other)),
        }
    }
}

/// ARM11 system local capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemLocalCaps {
    /// Program id as recorded in the header
    pub program_id: u64,
    /// Kernel core version
    pub core_version: u32,
    /// New 3DS CPU/memory mode
    pub n3ds_mode: u8,
    /// Preferred CPU core (flags bits 0-1)
    pub ideal_processor: u8,
    /// Allowed CPU cores (flags bits 2-3)
    pub affinity_mask: u8,
    /// Old 3DS memory mode (flags bits 4-7)
    pub system_mode: u8,
    /// Main thread priority
    pub priority: u8,
    /// Raw resource limit category
    pub resource_limit_category: u8,
}

impl SystemLocalCaps {
    fn decode(reader: &mut ByteReader<'_>, base: usize) -> Result<Self, FormatError> {
        reader.seek(base)?;
        let program_id = reader.read_u64()?;
        let core_version = reader.read_u32()?;

        reader.seek(base + N3DS_MODE_OFFSET)?;
        let n3ds_mode = reader.read_u8()?;
        let flags = reader.read_u8()?;
        let priority = reader.read_u8()?;

        reader.seek(base + RESOURCE_LIMIT_CATEGORY_OFFSET)?;
        let resource_limit_category = reader.read_u8()?;

        Ok(Self {
            program_id,
            core_version,
            n3ds_mode,
            ideal_processor: flags & 0x3,
            affinity_mask: (flags >> 2) & 0x3,
            system_mode: flags >> 4,
            priority,
            resource_limit_category,
        })
    }

    /// Typed resource limit category
    pub fn resource_limit_category(&self) -> Result<ResourceLimitCategory, FormatError> {
        ResourceLimitCategory::try_from(self.resource_limit_category)
    }
}

/// ARM11 kernel capability descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelCaps {
    /// Descriptor words in header order
    pub descriptors: [u32; NUM_KERNEL_CAP_DESCRIPTORS],
}

impl KernelCaps {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let mut descriptors = [0u32; NUM_KERNEL_CAP_DESCRIPTORS];
        for word in descriptors.iter_mut() {
            *word = reader.read_u32()?;
        }
        Ok(Self { descriptors })
    }
}

/// Decoded extended header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExHeader {
    /// Code-set information
    pub codeset_info: CodeSetInfo,
    /// ARM11 system local capabilities
    pub system_local_caps: SystemLocalCaps,
    /// ARM11 kernel capabilities
    pub kernel_caps: KernelCaps,
}

impl ExHeader {
    /// Decode an extended header from its on-disk bytes
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < EXHEADER_SIZE {
            return Err(FormatError::Truncated {
                what: "ExHeader",
                expected: EXHEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        reader.seek(CODESET_INFO_OFFSET)?;
        let codeset_info = CodeSetInfo::decode(&mut reader)?;
        let system_local_caps = SystemLocalCaps::decode(&mut reader, SYSTEM_LOCAL_CAPS_OFFSET)?;
        reader.seek(KERNEL_CAPS_OFFSET)?;
        let kernel_caps = KernelCaps::decode(&mut reader)?;

        Ok(Self {
            codeset_info,
            system_local_caps,
            kernel_caps,
        })
    }
}
