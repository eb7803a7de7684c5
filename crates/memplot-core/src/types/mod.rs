//! # Types
//!
//! Plain data types shared by the dumper: addresses, native type
//! descriptors, dtypes and shapes.

pub mod address;
pub mod descriptor;
pub mod dtype;
pub mod process;
pub mod shape;

// Re-export all public types
pub use address::Address;
pub use descriptor::{DebugValue, TypeDescriptor, TypeKind};
pub use dtype::{DType, NumericKind};
pub use process::ProcessId;
pub use shape::{ArrayLayout, Shape};
