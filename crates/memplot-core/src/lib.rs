//! # memplot-core
//!
//! Turns raw array memory of a debugged process into images and files.
//!
//! A debugger hands us a value (`name`, address, native type). From there:
//! - [`inference`] derives a dtype and shape from the native type
//! - [`snapshot`] copies exactly that many bytes out of the process
//! - [`array`] rebuilds a typed n-dimensional array from the bytes
//! - [`registry`] picks the output transform the user selected
//! - [`transforms`] rasterise or serialise the array
//! - [`dumper`] drives all of the above for a [`host::DumperHost`]
//!
//! Values can also come from a binary's debug info ([`dwarf`]) or from a
//! hand-written C declaration ([`cdecl`]).
//!
//! ## Platform Support
//!
//! - **Linux**: live reads through `process_vm_readv`
//! - **Elsewhere**: offline dumps only; live reads report `Unsupported`
//!
//! ## Why unsafe code is needed
//!
//! Reading another process's memory goes through a raw system call that
//! takes pointers into both address spaces. It is wrapped in
//! [`memory::ProcessMemory`], which checks the copied length before handing
//! out the bytes.

#![allow(unsafe_code)] // Required for process_vm_readv

pub mod array;
pub mod cdecl;
pub mod config;
pub mod dumper;
pub mod dwarf;
pub mod error;
pub mod host;
pub mod inference;
pub mod memory;
pub mod prelude;
pub mod registry;
pub mod snapshot;
pub mod transforms;
pub mod types;

pub use array::TypedArray;
pub use config::Config;
pub use dumper::{ArrayDumper, LayoutOverrides};
// Re-export commonly used types
pub use error::{MemplotError, Result};
pub use host::{DumperHost, SubItem};
pub use inference::{infer_layout, Inference};
pub use registry::{FormatRegistry, OutputArtifact, RegistryTable};
pub use types::{Address, ArrayLayout, DType, DebugValue, ProcessId, Shape, TypeDescriptor};
