//! Process image layout
//!
//! The `.code` section is laid out as one contiguous buffer:
//!
//! ```text
//! offset 0                 code    (text pages * PAGE_SIZE)
//! end of code              rodata  (ro pages * PAGE_SIZE)
//! end of rodata            data    (data pages * PAGE_SIZE + page-aligned bss)
//! ```
//!
//! Buffer offsets only locate bytes in the buffer; target addresses come
//! verbatim from the ExHeader.

use crate::container::{ContainerError, PatchOutcome};
use crate::error::{LoaderError, LoaderResult};
use log::{debug, error};
use ncch_format::{is_gba_virtual_console, CodeSetInfo, PAGE_SIZE};

/// One segment of a process image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    /// Offset of the segment inside [`ProcessImage::memory`]
    pub offset: usize,
    /// Target virtual address
    pub addr: u32,
    /// Size in bytes
    pub size: u32,
}

impl Segment {
    /// Buffer offset one past the end of the segment, if it fits in `usize`
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.size as usize)
    }

    fn next_offset(&self) -> LoaderResult<usize> {
        self.end().ok_or_else(|| {
            LoaderError::InvalidFormat(format!(
                "segment at {:#x} with size {:#x} overflows",
                self.offset, self.size
            ))
        })
    }
}

/// Laid-out executable ready for process creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessImage {
    /// Process name from the code-set info
    pub name: String,
    /// Program id of the base title
    pub program_id: u64,
    /// Code segment
    pub code: Segment,
    /// Read-only data segment
    pub rodata: Segment,
    /// Data segment, bss included
    pub data: Segment,
    /// Entry point address
    pub entrypoint: u32,
    /// Backing bytes for all three segments
    pub memory: Vec<u8>,
}

/// Round `size` up to a whole number of pages
pub fn page_align(size: u32) -> LoaderResult<u32> {
    size.checked_next_multiple_of(PAGE_SIZE)
        .ok_or_else(|| LoaderError::InvalidFormat(format!("size {:#x} overflows", size)))
}

fn pages_to_bytes(pages: u32) -> LoaderResult<u32> {
    pages
        .checked_mul(PAGE_SIZE)
        .ok_or_else(|| LoaderError::InvalidFormat(format!("page count {:#x} overflows", pages)))
}

/// Build a process image from a `.code` section.
///
/// `apply_patch` runs once the bss has been appended, so patches may write
/// into the bss region. [`PatchOutcome::NotUsed`] is not an error.
pub fn build_process_image<F>(
    mut code: Vec<u8>,
    info: &CodeSetInfo,
    program_id: u64,
    apply_patch: F,
) -> LoaderResult<ProcessImage>
where
    F: FnOnce(&mut Vec<u8>) -> Result<PatchOutcome, ContainerError>,
{
    if is_gba_virtual_console(&code) {
        error!("Encountered unsupported GBA Virtual Console code section");
        return Err(LoaderError::UnsupportedLegacyPayload);
    }

    // TODO: bss is added to the page-aligned data size; verify against
    // hardware whether it should extend the unaligned size instead.
    let bss_size = page_align(info.bss_size)?;
    code.resize(code.len() + bss_size as usize, 0);

    let code_segment = Segment {
        offset: 0,
        addr: info.text.address,
        size: pages_to_bytes(info.text.num_max_pages)?,
    };
    let rodata = Segment {
        offset: code_segment.next_offset()?,
        addr: info.ro.address,
        size: pages_to_bytes(info.ro.num_max_pages)?,
    };
    let data = Segment {
        offset: rodata.next_offset()?,
        addr: info.data.address,
        size: pages_to_bytes(info.data.num_max_pages)?
            .checked_add(bss_size)
            .ok_or_else(|| LoaderError::InvalidFormat("data segment overflows".to_string()))?,
    };

    match apply_patch(&mut code) {
        Ok(PatchOutcome::Applied) => debug!("Applied code patch"),
        Ok(PatchOutcome::NotUsed) => {}
        Err(e) => return Err(LoaderError::Patch(e)),
    }

    Ok(ProcessImage {
        name: info.process_name(),
        program_id,
        code: code_segment,
        rodata,
        data,
        entrypoint: code_segment.addr,
        memory: code,
    })
}
