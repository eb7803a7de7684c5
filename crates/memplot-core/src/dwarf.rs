//! # DWARF Value Resolution
//!
//! Finds global variables in a binary's debug info and describes their
//! types as [`TypeDescriptor`]s, so the dumper can run without a debugger
//! supplying the value.
//!
//! ## What is understood
//!
//! - `DW_TAG_variable` with a static `DW_OP_addr` / `DW_OP_addrx` location
//!   (declarations completed through `DW_AT_specification` included)
//! - Base types by `DW_AT_encoding`
//! - `typedef`, `const`, `volatile`, `restrict` and `_Atomic`, which are
//!   looked through; a typedef of an anonymous type lends it its name
//! - Arrays with one `DW_TAG_subrange_type` per dimension, outermost first
//! - Structures, classes, unions, enums and pointers as opaque kinds
//!
//! ## Load bias
//!
//! Addresses in the file are link-time addresses. For position-independent
//! executables the runtime address is `file address + bias`, see
//! [`SymbolIndex::bias_for_process`].

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{
    constants, AttributeValue, DebuggingInformationEntry, Dwarf, EndianArcSlice, Operation, Reader, RunTimeEndian,
    SectionId, Unit, UnitOffset, UnitSectionOffset,
};
use object::{Object, ObjectKind, ObjectSection, ObjectSegment};

use crate::error::{MemplotError, Result};
use crate::types::{Address, DebugValue, ProcessId, TypeDescriptor, TypeKind};

type OwnedReader = EndianArcSlice<RunTimeEndian>;

const MAX_TYPE_REF_DEPTH: usize = 32;

/// Debug info of one binary, indexed by compilation unit
pub struct SymbolIndex
{
    path: PathBuf,
    dwarf: Dwarf<OwnedReader>,
    units: Vec<Unit<OwnedReader>>,
    position_independent: bool,
    first_vaddr: u64,
    load_bias: u64,
}

impl std::fmt::Debug for SymbolIndex
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("SymbolIndex")
            .field("path", &self.path)
            .field("units", &self.units.len())
            .field("position_independent", &self.position_independent)
            .field("load_bias", &format_args!("{:#x}", self.load_bias))
            .finish()
    }
}

impl SymbolIndex
{
    /// Parse `path` and all of its compilation units
    ///
    /// ## Errors
    ///
    /// - `Io` if the file cannot be read
    /// - `Object` if it is not a supported object file
    /// - `Dwarf` if the debug info is malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let file = object::File::parse(&*data)?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let dwarf = Dwarf::load(|id| load_section(&file, id, endian))?;
        let first_vaddr = file.segments().map(|segment| segment.address()).min().unwrap_or(0);
        let position_independent = file.kind() == ObjectKind::Dynamic;

        Self::from_dwarf(path, dwarf, position_independent, first_vaddr)
    }

    /// Index already loaded DWARF sections
    fn from_dwarf(path: &Path, dwarf: Dwarf<OwnedReader>, position_independent: bool, first_vaddr: u64) -> Result<Self>
    {
        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| MemplotError::dwarf("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| MemplotError::dwarf("parsing compilation unit", err))?,
            );
        }

        tracing::debug!(
            path = %path.display(),
            units = units.len(),
            position_independent,
            "loaded debug info"
        );

        Ok(SymbolIndex {
            path: path.to_path_buf(),
            dwarf,
            units,
            position_independent,
            first_vaddr,
            load_bias: 0,
        })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn unit_count(&self) -> usize
    {
        self.units.len()
    }

    /// Whether the binary is relocated at load time (PIE or shared object)
    pub fn is_position_independent(&self) -> bool
    {
        self.position_independent
    }

    pub fn load_bias(&self) -> u64
    {
        self.load_bias
    }

    /// Offset added to every file address returned by [`find_variable`](Self::find_variable)
    pub fn set_load_bias(&mut self, bias: u64)
    {
        self.load_bias = bias;
    }

    /// Bias for a binary whose first segment was mapped at `base`
    pub fn bias_for_base(&self, base: Address) -> u64
    {
        base.value().wrapping_sub(self.first_vaddr & !0xfff)
    }

    /// Bias that `pid` applied to this binary, read from `/proc/<pid>/maps`
    ///
    /// Fixed-address executables always get 0.
    ///
    /// ## Errors
    ///
    /// - `Io` if the maps file cannot be read
    /// - `SymbolNotFound` if the binary is not mapped in the process
    pub fn bias_for_process(&self, pid: ProcessId) -> Result<u64>
    {
        if !self.position_independent {
            return Ok(0);
        }

        let maps = fs::read_to_string(format!("/proc/{pid}/maps"))?;
        let binary = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        load_bias_from_maps(&maps, &binary, self.first_vaddr).ok_or_else(|| {
            MemplotError::SymbolNotFound(format!("{} is not mapped in process {pid}", binary.display()))
        })
    }

    /// Look up a global variable by name
    ///
    /// Returns `Ok(None)` when no variable with a static location has that
    /// name. The address already includes the load bias.
    pub fn find_variable(&self, name: &str) -> Result<Option<DebugValue>>
    {
        for unit in &self.units {
            if let Some(value) = self.find_in_unit(unit, name)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn find_in_unit(&self, unit: &Unit<OwnedReader>, name: &str) -> Result<Option<DebugValue>>
    {
        let mut cursor = unit.entries();
        while let Some((_delta, entry)) = cursor
            .next_dfs()
            .map_err(|err| MemplotError::dwarf("traversing DIE tree", err))?
        {
            if entry.tag() != constants::DW_TAG_variable {
                continue;
            }
            let Some(address) = self.static_location(unit, entry)? else {
                continue;
            };

            // Out-of-line definitions carry the location while the name and
            // type live on the declaration they point at.
            let declaration = match entry
                .attr_value(constants::DW_AT_specification)
                .map_err(|err| MemplotError::dwarf("reading DW_AT_specification", err))?
            {
                Some(AttributeValue::UnitRef(offset)) => Some(
                    unit.entry(offset)
                        .map_err(|err| MemplotError::dwarf("resolving variable declaration", err))?,
                ),
                _ => None,
            };

            let entry_name = match self.entry_name(unit, entry)? {
                Some(found) => Some(found),
                None => match &declaration {
                    Some(decl) => self.entry_name(unit, decl)?,
                    None => None,
                },
            };
            if entry_name.as_deref() != Some(name) {
                continue;
            }

            let type_ref = match self.type_ref(entry)? {
                Some(value) => Some(value),
                None => match &declaration {
                    Some(decl) => self.type_ref(decl)?,
                    None => None,
                },
            };
            let ty = match type_ref {
                Some(value) => self.build_type(unit, value, 0)?,
                None => TypeDescriptor::new("void", 0, TypeKind::Other),
            };

            let address = Address::new(address.wrapping_add(self.load_bias));
            tracing::debug!(name, %address, ty = %ty, "resolved variable");
            return Ok(Some(DebugValue::new(name, address, ty)));
        }
        Ok(None)
    }

    /// File address of a variable whose location is a single address operation
    fn static_location(
        &self,
        unit: &Unit<OwnedReader>,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> Result<Option<u64>>
    {
        let Some(AttributeValue::Exprloc(expr)) = entry
            .attr_value(constants::DW_AT_location)
            .map_err(|err| MemplotError::dwarf("reading DW_AT_location", err))?
        else {
            return Ok(None);
        };

        let mut ops = expr.operations(unit.encoding());
        let first = ops
            .next()
            .map_err(|err| MemplotError::dwarf("decoding location expression", err))?;
        let address = match first {
            Some(Operation::Address { address }) => address,
            Some(Operation::AddressIndex { index }) => self
                .dwarf
                .address(unit, index)
                .map_err(|err| MemplotError::dwarf("reading .debug_addr", err))?,
            _ => return Ok(None),
        };

        // Anything after the address (TLS, arithmetic) is not a plain global.
        let rest = ops
            .next()
            .map_err(|err| MemplotError::dwarf("decoding location expression", err))?;
        Ok(rest.is_none().then_some(address))
    }

    fn type_ref(
        &self,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> Result<Option<AttributeValue<OwnedReader>>>
    {
        entry
            .attr_value(constants::DW_AT_type)
            .map_err(|err| MemplotError::dwarf("reading DW_AT_type", err))
    }

    fn build_type(
        &self,
        unit: &Unit<OwnedReader>,
        value: AttributeValue<OwnedReader>,
        depth: usize,
    ) -> Result<TypeDescriptor>
    {
        if depth >= MAX_TYPE_REF_DEPTH {
            return Ok(TypeDescriptor::new("<nested too deep>", 0, TypeKind::Other));
        }

        match value {
            AttributeValue::UnitRef(offset) => self.build_type_at(unit, offset, depth + 1),
            AttributeValue::DebugInfoRef(offset) => {
                let target = UnitSectionOffset::from(offset);
                match self.find_unit_for_offset(target) {
                    Some((target_unit, unit_offset)) => self.build_type_at(target_unit, unit_offset, depth + 1),
                    None => Ok(TypeDescriptor::new("<unresolved>", 0, TypeKind::Other)),
                }
            }
            _ => Ok(TypeDescriptor::new("<unresolved>", 0, TypeKind::Other)),
        }
    }

    fn build_type_at(&self, unit: &Unit<OwnedReader>, offset: UnitOffset<usize>, depth: usize) -> Result<TypeDescriptor>
    {
        let entry = unit
            .entry(offset)
            .map_err(|err| MemplotError::dwarf("resolving type reference", err))?;
        let name = self.entry_name(unit, &entry)?;
        let byte_size = self.byte_size(&entry)?;

        match entry.tag() {
            constants::DW_TAG_base_type => {
                let encoding = entry
                    .attr_value(constants::DW_AT_encoding)
                    .map_err(|err| MemplotError::dwarf("reading DW_AT_encoding", err))?;
                let kind = match encoding {
                    Some(AttributeValue::Encoding(ate)) => base_kind(ate),
                    _ => TypeKind::Other,
                };
                Ok(TypeDescriptor::new(
                    name.unwrap_or_else(|| "<anonymous>".to_string()),
                    byte_size.unwrap_or(0),
                    kind,
                ))
            }
            // A typedef names what it wraps when that has no name of its own.
            constants::DW_TAG_typedef => {
                let mut ty = match self.type_ref(&entry)? {
                    Some(inner) => self.build_type(unit, inner, depth)?,
                    None => TypeDescriptor::new("void", 0, TypeKind::Other),
                };
                if let Some(name) = name {
                    if ty.name.starts_with("<anonymous") {
                        ty.name = name;
                    }
                }
                Ok(ty)
            }
            constants::DW_TAG_const_type
            | constants::DW_TAG_volatile_type
            | constants::DW_TAG_restrict_type
            | constants::DW_TAG_atomic_type => match self.type_ref(&entry)? {
                Some(inner) => self.build_type(unit, inner, depth),
                None => Ok(TypeDescriptor::new("void", 0, TypeKind::Other)),
            },
            constants::DW_TAG_array_type => {
                let element = match self.type_ref(&entry)? {
                    Some(inner) => self.build_type(unit, inner, depth)?,
                    None => TypeDescriptor::new("void", 0, TypeKind::Other),
                };
                let extents = self.subrange_extents(unit, offset)?;
                if extents.is_empty() {
                    let name = format!("{} []", element.name);
                    return Ok(TypeDescriptor::new(name, 0, TypeKind::Other));
                }
                Ok(extents
                    .iter()
                    .rev()
                    .fold(element, |inner, &extent| TypeDescriptor::array(inner, extent)))
            }
            constants::DW_TAG_structure_type | constants::DW_TAG_class_type => Ok(TypeDescriptor::structure(
                name.unwrap_or_else(|| "<anonymous struct>".to_string()),
                byte_size.unwrap_or(0),
            )),
            constants::DW_TAG_union_type | constants::DW_TAG_enumeration_type => Ok(TypeDescriptor::new(
                name.unwrap_or_else(|| "<anonymous>".to_string()),
                byte_size.unwrap_or(0),
                TypeKind::Other,
            )),
            constants::DW_TAG_pointer_type => {
                let target = match self.type_ref(&entry)? {
                    Some(inner) => self.build_type(unit, inner, depth)?.name,
                    None => "void".to_string(),
                };
                Ok(TypeDescriptor::new(
                    format!("{target} *"),
                    byte_size.unwrap_or_else(|| u64::from(unit.encoding().address_size)),
                    TypeKind::Pointer,
                ))
            }
            _ => Ok(TypeDescriptor::new(
                name.unwrap_or_else(|| format!("<{}>", entry.tag())),
                byte_size.unwrap_or(0),
                TypeKind::Other,
            )),
        }
    }

    /// One extent per `DW_TAG_subrange_type` child, in declaration order
    ///
    /// An unbounded subrange (flexible array member) yields no extents.
    fn subrange_extents(&self, unit: &Unit<OwnedReader>, offset: UnitOffset<usize>) -> Result<Vec<u64>>
    {
        let mut extents = Vec::new();
        let mut tree = unit
            .entries_tree(Some(offset))
            .map_err(|err| MemplotError::dwarf("building array tree", err))?;
        let root = tree
            .root()
            .map_err(|err| MemplotError::dwarf("navigating array root", err))?;
        let mut children = root.children();
        while let Some(child) = children
            .next()
            .map_err(|err| MemplotError::dwarf("iterating array subranges", err))?
        {
            let entry = child.entry();
            if entry.tag() != constants::DW_TAG_subrange_type {
                continue;
            }

            let count = entry
                .attr(constants::DW_AT_count)
                .map_err(|err| MemplotError::dwarf("reading DW_AT_count", err))?
                .and_then(|attr| attr.udata_value());
            let extent = match count {
                Some(count) => count,
                None => {
                    let upper = entry
                        .attr(constants::DW_AT_upper_bound)
                        .map_err(|err| MemplotError::dwarf("reading DW_AT_upper_bound", err))?
                        .and_then(|attr| attr.udata_value());
                    let lower = entry
                        .attr(constants::DW_AT_lower_bound)
                        .map_err(|err| MemplotError::dwarf("reading DW_AT_lower_bound", err))?
                        .and_then(|attr| attr.udata_value())
                        .unwrap_or(0);
                    match upper {
                        Some(upper) if upper >= lower => upper - lower + 1,
                        _ => return Ok(Vec::new()),
                    }
                }
            };
            extents.push(extent);
        }
        Ok(extents)
    }

    fn byte_size(&self, entry: &DebuggingInformationEntry<'_, '_, OwnedReader>) -> Result<Option<u64>>
    {
        Ok(entry
            .attr(constants::DW_AT_byte_size)
            .map_err(|err| MemplotError::dwarf("reading DW_AT_byte_size", err))?
            .and_then(|attr| attr.udata_value()))
    }

    fn entry_name(
        &self,
        unit: &Unit<OwnedReader>,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> Result<Option<String>>
    {
        let Some(attr) = entry
            .attr(constants::DW_AT_name)
            .map_err(|err| MemplotError::dwarf("reading DW_AT_name", err))?
        else {
            return Ok(None);
        };

        let reader = self
            .dwarf
            .attr_string(unit, attr.value())
            .map_err(|err| MemplotError::dwarf("resolving DWARF string", err))?;
        let name = match reader.to_string() {
            Ok(cow) => cow.into_owned(),
            Err(_) => reader
                .to_string_lossy()
                .map_err(|err| MemplotError::dwarf("decoding DWARF string", err))?
                .into_owned(),
        };
        Ok(Some(name))
    }

    fn find_unit_for_offset(&self, target: UnitSectionOffset<usize>) -> Option<(&Unit<OwnedReader>, UnitOffset<usize>)>
    {
        self.units
            .iter()
            .find_map(|unit| target.to_unit_offset(unit).map(|offset| (unit, offset)))
    }
}

fn base_kind(encoding: constants::DwAte) -> TypeKind
{
    match encoding {
        constants::DW_ATE_signed | constants::DW_ATE_signed_char => TypeKind::Int { signed: true },
        constants::DW_ATE_unsigned | constants::DW_ATE_unsigned_char | constants::DW_ATE_UTF => {
            TypeKind::Int { signed: false }
        }
        constants::DW_ATE_float => TypeKind::Float,
        constants::DW_ATE_complex_float => TypeKind::Complex,
        constants::DW_ATE_boolean => TypeKind::Bool,
        _ => TypeKind::Other,
    }
}

/// Section bytes by ELF name, falling back to the Mach-O `__debug_*` spelling
fn load_section(file: &object::File<'_>, id: SectionId, endian: RunTimeEndian) -> Result<OwnedReader>
{
    let elf_name = id.name();
    let macho_name = elf_name.strip_prefix('.').map(|rest| format!("__{rest}"));

    let section = file
        .section_by_name(elf_name)
        .or_else(|| macho_name.as_deref().and_then(|name| file.section_by_name(name)));

    let data: Arc<[u8]> = match section {
        Some(section) => match section.uncompressed_data()? {
            Cow::Borrowed(bytes) => Arc::from(bytes),
            Cow::Owned(vec) => vec.into(),
        },
        None => Arc::from(Vec::new()),
    };
    Ok(EndianArcSlice::new(data, endian))
}

/// Bias of `binary` given the text of a `/proc/<pid>/maps` file
///
/// Uses the lowest mapping of the binary, which covers its first loadable
/// segment at `first_vaddr`.
pub fn load_bias_from_maps(maps: &str, binary: &Path, first_vaddr: u64) -> Option<u64>
{
    maps.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let range = fields.next()?;
            let _perms = fields.next()?;
            let offset = u64::from_str_radix(fields.next()?, 16).ok()?;
            let _dev = fields.next()?;
            let _inode = fields.next()?;
            let path: Vec<&str> = fields.collect();
            if path.is_empty() || Path::new(&path.join(" ")) != binary {
                return None;
            }
            let start = u64::from_str_radix(range.split('-').next()?, 16).ok()?;
            Some((start, offset))
        })
        .min_by_key(|(start, _)| *start)
        .and_then(|(start, offset)| start.checked_sub(offset)?.checked_sub(first_vaddr & !0xfff))
}

#[cfg(test)]
mod tests
{
    use super::*;

    const MAPS: &str = "\
55d0c4a00000-55d0c4a05000 r--p 00000000 fd:01 1180 /usr/bin/sample app
55d0c4a05000-55d0c4a20000 r-xp 00005000 fd:01 1180 /usr/bin/sample app
7f1e2c000000-7f1e2c021000 rw-p 00000000 00:00 0
7f1e2d200000-7f1e2d228000 r--p 00000000 fd:01 2210 /usr/lib/libc.so.6
";

    #[test]
    fn test_bias_from_lowest_mapping()
    {
        let bias = load_bias_from_maps(MAPS, Path::new("/usr/bin/sample app"), 0);
        assert_eq!(bias, Some(0x55d0_c4a0_0000));
    }

    #[test]
    fn test_bias_accounts_for_first_vaddr()
    {
        let bias = load_bias_from_maps(MAPS, Path::new("/usr/bin/sample app"), 0x1000);
        assert_eq!(bias, Some(0x55d0_c49f_f000));
    }

    #[test]
    fn test_bias_for_unmapped_binary()
    {
        assert_eq!(load_bias_from_maps(MAPS, Path::new("/usr/bin/other"), 0), None);
    }

    #[test]
    fn test_base_encodings()
    {
        assert_eq!(base_kind(constants::DW_ATE_float), TypeKind::Float);
        assert_eq!(base_kind(constants::DW_ATE_unsigned_char), TypeKind::Int { signed: false });
        assert_eq!(base_kind(constants::DW_ATE_signed), TypeKind::Int { signed: true });
        assert_eq!(base_kind(constants::DW_ATE_complex_float), TypeKind::Complex);
        assert_eq!(base_kind(constants::DW_ATE_address), TypeKind::Other);
    }

    mod synthetic
    {
        use gimli::write::{
            Address as WriteAddress, AttributeValue as Value, DwarfUnit, EndianVec, Expression, Sections, UnitEntryId,
        };
        use gimli::{Encoding, Format};

        use super::*;
        use crate::inference::{infer_layout, Inference, UnsupportedReason};
        use crate::types::{ArrayLayout, DType, Shape};

        /// Debug info of a C unit declaring:
        ///
        /// ```c
        /// typedef float real;
        /// typedef struct { float x, y; } Point;
        /// const float kernel[3][3];   // at 0x4000
        /// Point pts[3];               // at 0x5000
        /// real samples[4];            // at 0x6000
        /// ```
        fn c_unit() -> SymbolIndex
        {
            let encoding = Encoding {
                format: Format::Dwarf32,
                version: 4,
                address_size: 8,
            };
            let mut dwarf = DwarfUnit::new(encoding);
            let root = dwarf.unit.root();
            let mut add = |parent: UnitEntryId, tag, attrs: Vec<(constants::DwAt, Value)>| {
                let id = dwarf.unit.add(parent, tag);
                let entry = dwarf.unit.get_mut(id);
                for (name, value) in attrs {
                    entry.set(name, value);
                }
                id
            };

            let float = add(root, constants::DW_TAG_base_type, vec![
                (constants::DW_AT_name, Value::String(b"float".to_vec())),
                (constants::DW_AT_encoding, Value::Encoding(constants::DW_ATE_float)),
                (constants::DW_AT_byte_size, Value::Udata(4)),
            ]);
            let real = add(root, constants::DW_TAG_typedef, vec![
                (constants::DW_AT_name, Value::String(b"real".to_vec())),
                (constants::DW_AT_type, Value::UnitRef(float)),
            ]);
            let point_struct = add(root, constants::DW_TAG_structure_type, vec![(
                constants::DW_AT_byte_size,
                Value::Udata(8),
            )]);
            let point = add(root, constants::DW_TAG_typedef, vec![
                (constants::DW_AT_name, Value::String(b"Point".to_vec())),
                (constants::DW_AT_type, Value::UnitRef(point_struct)),
            ]);

            let grid = add(root, constants::DW_TAG_array_type, vec![(constants::DW_AT_type, Value::UnitRef(float))]);
            add(grid, constants::DW_TAG_subrange_type, vec![(constants::DW_AT_count, Value::Udata(3))]);
            add(grid, constants::DW_TAG_subrange_type, vec![(constants::DW_AT_upper_bound, Value::Udata(2))]);
            let const_grid = add(root, constants::DW_TAG_const_type, vec![(constants::DW_AT_type, Value::UnitRef(grid))]);

            let points = add(root, constants::DW_TAG_array_type, vec![(constants::DW_AT_type, Value::UnitRef(point))]);
            add(points, constants::DW_TAG_subrange_type, vec![(constants::DW_AT_count, Value::Udata(3))]);

            let reals = add(root, constants::DW_TAG_array_type, vec![(constants::DW_AT_type, Value::UnitRef(real))]);
            add(reals, constants::DW_TAG_subrange_type, vec![(constants::DW_AT_count, Value::Udata(4))]);

            for (name, ty, address) in [("kernel", const_grid, 0x4000), ("pts", points, 0x5000), ("samples", reals, 0x6000)] {
                let mut location = Expression::new();
                location.op_addr(WriteAddress::Constant(address));
                add(root, constants::DW_TAG_variable, vec![
                    (constants::DW_AT_name, Value::String(name.as_bytes().to_vec())),
                    (constants::DW_AT_type, Value::UnitRef(ty)),
                    (constants::DW_AT_location, Value::Exprloc(location)),
                ]);
            }

            let mut sections = Sections::new(EndianVec::new(RunTimeEndian::Little));
            dwarf.write(&mut sections).unwrap();
            let loaded = Dwarf::load(|id| -> Result<OwnedReader> {
                let bytes = sections.get(id).map(|section| section.slice().to_vec()).unwrap_or_default();
                Ok(EndianArcSlice::new(Arc::from(bytes), RunTimeEndian::Little))
            })
            .unwrap();
            SymbolIndex::from_dwarf(Path::new("c-unit"), loaded, false, 0).unwrap()
        }

        #[test]
        fn test_const_two_dimensional_array()
        {
            let index = c_unit();
            assert_eq!(index.unit_count(), 1);
            let value = index.find_variable("kernel").unwrap().unwrap();
            assert_eq!(value.address, Address::new(0x4000));
            assert_eq!(value.ty.name, "float [3][3]");
            assert_eq!(value.ty.byte_size, 36);
            assert_eq!(
                infer_layout(&value.ty),
                Inference::Array(ArrayLayout::new(Shape::new(&[3, 3]), DType::Float32))
            );
        }

        #[test]
        fn test_typedef_names_anonymous_struct()
        {
            let value = c_unit().find_variable("pts").unwrap().unwrap();
            assert_eq!(value.ty.name, "Point [3]");
            assert_eq!(value.ty.byte_size, 24);
            assert!(matches!(
                infer_layout(&value.ty),
                Inference::Unsupported(UnsupportedReason::NonNumericElement(_))
            ));
        }

        #[test]
        fn test_typedef_of_named_type_is_looked_through()
        {
            let value = c_unit().find_variable("samples").unwrap().unwrap();
            assert_eq!(value.ty.name, "float [4]");
            assert_eq!(
                infer_layout(&value.ty),
                Inference::Array(ArrayLayout::new(Shape::new(&[4]), DType::Float32))
            );
        }

        #[test]
        fn test_load_bias_is_added()
        {
            let mut index = c_unit();
            index.set_load_bias(0x5555_0000_0000);
            let value = index.find_variable("kernel").unwrap().unwrap();
            assert_eq!(value.address, Address::new(0x5555_0000_4000));
            assert_eq!(index.find_variable("missing").unwrap(), None);
        }
    }

    #[test]
    fn test_load_rejects_non_object_files()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-binary");
        fs::write(&path, b"plain text, no headers").unwrap();
        assert!(matches!(SymbolIndex::load(&path), Err(MemplotError::Object(_))));
    }

    #[test]
    fn test_load_missing_file()
    {
        assert!(matches!(
            SymbolIndex::load("/nonexistent/memplot/binary"),
            Err(MemplotError::Io(_))
        ));
    }
}
