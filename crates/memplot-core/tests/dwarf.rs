//! Symbol resolution against the debug info of this test binary
//!
//! The globals below are found by name in the running executable, the same
//! way `memplot inspect` finds them in a target process.

#![cfg(target_os = "linux")]

use std::hint::black_box;

use memplot_core::dwarf::SymbolIndex;
use memplot_core::inference::{infer_layout, Inference, UnsupportedReason};
use memplot_core::types::{Address, ArrayLayout, DType, ProcessId, Shape};

#[repr(C)]
pub struct Sample
{
    pub x: f32,
    pub y: f32,
}

#[no_mangle]
pub static MEMPLOT_TEST_GRID: [[f32; 4]; 3] = [[0.0, 1.0, 2.0, 3.0], [4.0, 5.0, 6.0, 7.0], [8.0, 9.0, 10.0, 11.0]];

#[no_mangle]
pub static MEMPLOT_TEST_COUNTS: [u16; 5] = [1, 2, 3, 4, 5];

#[no_mangle]
pub static MEMPLOT_TEST_SAMPLES: [Sample; 3] = [
    Sample { x: 0.0, y: 1.0 },
    Sample { x: 2.0, y: 3.0 },
    Sample { x: 4.0, y: 5.0 },
];

fn own_index() -> SymbolIndex
{
    black_box(&MEMPLOT_TEST_GRID);
    black_box(&MEMPLOT_TEST_COUNTS);
    black_box(&MEMPLOT_TEST_SAMPLES);

    let exe = std::env::current_exe().unwrap();
    let mut index = SymbolIndex::load(&exe).unwrap();
    let bias = index.bias_for_process(ProcessId::from(std::process::id())).unwrap();
    index.set_load_bias(bias);
    index
}

#[test]
fn test_two_dimensional_static_array()
{
    let index = own_index();
    let value = index.find_variable("MEMPLOT_TEST_GRID").unwrap().unwrap();

    assert_eq!(value.address, Address::new(MEMPLOT_TEST_GRID.as_ptr() as u64));
    assert_eq!(value.ty.byte_size, 48);
    assert_eq!(
        infer_layout(&value.ty),
        Inference::Array(ArrayLayout::new(Shape::new(&[3, 4]), DType::Float32))
    );
}

#[test]
fn test_immutable_integer_array()
{
    let value = own_index().find_variable("MEMPLOT_TEST_COUNTS").unwrap().unwrap();

    assert_eq!(value.address, Address::new(MEMPLOT_TEST_COUNTS.as_ptr() as u64));
    assert_eq!(
        infer_layout(&value.ty),
        Inference::Array(ArrayLayout::new(Shape::new(&[5]), DType::UInt16))
    );
}

#[test]
fn test_struct_array_is_described_but_not_plottable()
{
    let value = own_index().find_variable("MEMPLOT_TEST_SAMPLES").unwrap().unwrap();

    assert!(value.ty.name.contains("Sample"), "{}", value.ty.name);
    assert!(value.ty.name.ends_with("[3]"), "{}", value.ty.name);
    assert_eq!(value.ty.byte_size, 24);
    assert!(matches!(
        infer_layout(&value.ty),
        Inference::Unsupported(UnsupportedReason::NonNumericElement(_))
    ));
}

#[test]
fn test_unknown_symbol_is_none()
{
    assert!(own_index().find_variable("memplot_no_such_global").unwrap().is_none());
}
