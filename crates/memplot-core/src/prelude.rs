//! Common module for library exports

pub use crate::array::TypedArray;
pub use crate::cdecl::parse_c_type;
pub use crate::config::{Config, Interpolation, Origin, PlotOptions};
pub use crate::dumper::{ArrayDumper, LayoutOverrides};
pub use crate::dwarf::SymbolIndex;
pub use crate::error::{MemplotError, Result};
pub use crate::host::{catch_errors, Display, DumperHost, SubItem};
pub use crate::inference::{infer_layout, Inference, UnsupportedReason};
pub use crate::memory::{MemorySource, ProcessMemory, SliceMemory};
pub use crate::registry::{
    FormatRegistry, OutputArtifact, RegistryTable, Transform, TransformRequest, ARRAY_EXPORT_TAG, IMAGE_PLOT_TAG,
};
pub use crate::snapshot::MemorySnapshot;
pub use crate::types::{Address, ArrayLayout, DType, DebugValue, ProcessId, Shape, TypeDescriptor, TypeKind};
