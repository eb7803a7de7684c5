//! # Memory Sources
//!
//! Where snapshot bytes come from.
//!
//! The dumper does not care whether bytes are copied out of a stopped
//! process or out of a dump file on disk, so both sit behind
//! [`MemorySource`]:
//!
//! - [`ProcessMemory`]: a live process (Linux `process_vm_readv`)
//! - [`SliceMemory`]: a byte image mapped at a base address
//!
//! ## Platform Support
//!
//! - **Linux**: `process_vm_readv(2)`, needs ptrace permission on the target
//! - **Other platforms**: live reads return [`MemplotError::Unsupported`]

use crate::error::{MemplotError, Result};
use crate::types::{Address, ProcessId};

/// Anything bytes can be copied out of
pub trait MemorySource
{
    /// Read exactly `len` bytes starting at `addr`
    ///
    /// ## Errors
    ///
    /// - `MemoryRead`: the range is unmapped or only partially readable
    /// - `Unsupported`: the source cannot read on this platform
    fn read_memory(&self, addr: Address, len: usize) -> Result<Vec<u8>>;
}

/// Memory of a live process
#[derive(Debug, Clone, Copy)]
pub struct ProcessMemory
{
    pid: ProcessId,
}

impl ProcessMemory
{
    pub fn new(pid: ProcessId) -> Self
    {
        ProcessMemory { pid }
    }

    pub fn pid(&self) -> ProcessId
    {
        self.pid
    }
}

impl MemorySource for ProcessMemory
{
    #[cfg(target_os = "linux")]
    fn read_memory(&self, addr: Address, len: usize) -> Result<Vec<u8>>
    {
        if len == 0 {
            return Ok(Vec::new());
        }

        let remote_base = usize::try_from(addr.value()).map_err(|_| MemplotError::MemoryRead {
            address: addr,
            len,
            reason: "address does not fit in a pointer".to_string(),
        })?;

        let mut buffer = vec![0u8; len];
        let local = libc::iovec {
            iov_base: buffer.as_mut_ptr().cast::<libc::c_void>(),
            iov_len: len,
        };
        let remote = libc::iovec {
            iov_base: remote_base as *mut libc::c_void,
            iov_len: len,
        };

        // SAFETY: `local` points at `buffer`, which is exactly `len` bytes and
        // outlives the call. The remote iovec is only interpreted by the kernel
        // in the target's address space.
        let copied = unsafe { libc::process_vm_readv(self.pid.0 as libc::pid_t, &local, 1, &remote, 1, 0) };

        if copied < 0 {
            let err = std::io::Error::last_os_error();
            return Err(MemplotError::MemoryRead {
                address: addr,
                len,
                reason: err.to_string(),
            });
        }
        if copied as usize != len {
            return Err(MemplotError::MemoryRead {
                address: addr,
                len,
                reason: format!("short read of {copied} bytes"),
            });
        }

        tracing::trace!(pid = self.pid.0, %addr, len, "copied process memory");
        Ok(buffer)
    }

    #[cfg(not(target_os = "linux"))]
    fn read_memory(&self, _addr: Address, _len: usize) -> Result<Vec<u8>>
    {
        Err(MemplotError::Unsupported(format!(
            "reading live memory of process {} is only implemented on Linux",
            self.pid
        )))
    }
}

/// A byte image that pretends to live at `base`
///
/// Used for raw dumps taken by another tool and for tests.
#[derive(Debug, Clone)]
pub struct SliceMemory
{
    base: Address,
    bytes: Vec<u8>,
}

impl SliceMemory
{
    pub fn new(base: Address, bytes: Vec<u8>) -> Self
    {
        SliceMemory { base, bytes }
    }

    pub fn base(&self) -> Address
    {
        self.base
    }

    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }
}

impl MemorySource for SliceMemory
{
    fn read_memory(&self, addr: Address, len: usize) -> Result<Vec<u8>>
    {
        let out_of_range = || MemplotError::MemoryRead {
            address: addr,
            len,
            reason: format!("outside image {}..+{:#x}", self.base, self.bytes.len()),
        };

        let start = addr
            .offset_from(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(out_of_range)?;
        let end = start.checked_add(len).ok_or_else(out_of_range)?;
        self.bytes.get(start..end).map(<[u8]>::to_vec).ok_or_else(out_of_range)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_slice_memory_reads_inside_image()
    {
        let memory = SliceMemory::new(Address::new(0x1000), (0u8..16).collect());
        assert_eq!(memory.read_memory(Address::new(0x1004), 4).unwrap(), vec![4, 5, 6, 7]);
        assert_eq!(memory.read_memory(Address::new(0x1000), 16).unwrap().len(), 16);
    }

    #[test]
    fn test_slice_memory_rejects_out_of_range()
    {
        let memory = SliceMemory::new(Address::new(0x1000), vec![0; 16]);
        assert!(matches!(
            memory.read_memory(Address::new(0x0fff), 1),
            Err(MemplotError::MemoryRead { .. })
        ));
        assert!(matches!(
            memory.read_memory(Address::new(0x1008), 9),
            Err(MemplotError::MemoryRead { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_process_memory_reads_own_process()
    {
        let data: [u32; 4] = [1, 2, 3, 0xdead_beef];
        let memory = ProcessMemory::new(ProcessId::from(std::process::id()));
        let bytes = memory
            .read_memory(Address::new(data.as_ptr() as u64), std::mem::size_of_val(&data))
            .unwrap();
        let expected: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        assert_eq!(bytes, expected);
    }
}
