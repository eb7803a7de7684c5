//! Property tests for inference and reconstruction

use memplot_core::array::TypedArray;
use memplot_core::error::MemplotError;
use memplot_core::inference::{infer_layout, Inference};
use memplot_core::registry::{FormatRegistry, RegistryTable, Transform, ARRAY_EXPORT_TAG};
use memplot_core::types::{ArrayLayout, DType, Shape, TypeDescriptor};
use proptest::prelude::*;

fn numeric_element() -> impl Strategy<Value = TypeDescriptor>
{
    prop_oneof![
        (prop::sample::select(vec![1u64, 2, 4, 8]), any::<bool>())
            .prop_map(|(size, signed)| TypeDescriptor::int("int", size, signed)),
        prop::sample::select(vec![4u64, 8]).prop_map(|size| TypeDescriptor::float("float", size)),
        prop::sample::select(vec![8u64, 16]).prop_map(|size| TypeDescriptor::complex("complex", size)),
    ]
}

fn nest(element: TypeDescriptor, dims: &[usize]) -> TypeDescriptor
{
    dims.iter()
        .rev()
        .fold(element, |inner, &extent| TypeDescriptor::array(inner, extent as u64))
}

proptest! {
    #[test]
    fn prop_inferred_layout_covers_the_whole_array(
        element in numeric_element(),
        dims in prop::collection::vec(1usize..6, 1..4),
    )
    {
        let width = element.byte_size;
        let ty = nest(element, &dims);

        let Inference::Array(layout) = infer_layout(&ty) else {
            panic!("{ty} should be supported");
        };
        prop_assert_eq!(layout.shape.dims(), dims.as_slice());
        prop_assert_eq!(layout.dtype.width() as u64, width);
        prop_assert_eq!(layout.shape.num_elements().unwrap() as u64 * width, ty.byte_size);
        prop_assert_eq!(layout.byte_len().unwrap() as u64, ty.byte_size);
    }

    #[test]
    fn prop_non_numeric_elements_are_unsupported(
        size in 1u64..32,
        dims in prop::collection::vec(1usize..6, 1..4),
    )
    {
        let ty = nest(TypeDescriptor::structure("Sample", size), &dims);
        prop_assert!(matches!(infer_layout(&ty), Inference::Unsupported(_)));
    }

    #[test]
    fn prop_reconstruction_rejects_wrong_byte_counts(
        count in 1usize..32,
        delta in 1usize..8,
        shorter in any::<bool>(),
    )
    {
        let layout = ArrayLayout::new(Shape::new(&[count]), DType::Float32);
        let expected = layout.byte_len().unwrap();
        let actual = if shorter { expected.saturating_sub(delta) } else { expected + delta };
        prop_assume!(actual != expected);

        let result = TypedArray::from_bytes(&vec![0u8; actual], &layout);
        let is_mismatch = matches!(
            result,
            Err(MemplotError::SizeMismatch { expected: e, actual: a, .. }) if e == expected && a == actual
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn prop_select_is_one_based(index in 0usize..10)
    {
        let registry = RegistryTable::builtin().lookup(ARRAY_EXPORT_TAG).unwrap();
        let result = registry.get(index);
        if (1..=registry.len()).contains(&index) {
            let expected = registry.names().nth(index - 1).unwrap();
            prop_assert_eq!(result.unwrap().0, expected);
        } else {
            let out_of_range = matches!(result, Err(MemplotError::FormatIndexOutOfRange { .. }));
            prop_assert!(out_of_range);
        }
    }
}

#[test]
fn test_custom_registry_preserves_registration_order()
{
    fn noop(_: &TypedArray, _: &mut dyn std::io::Write) -> memplot_core::Result<()>
    {
        Ok(())
    }

    let mut registry = FormatRegistry::new("test::Ordered");
    for name in ["Zeta", "Alpha", "Mid"] {
        registry
            .register(
                name,
                Transform::Export {
                    extension: ".bin",
                    write: noop,
                },
            )
            .unwrap();
    }
    assert_eq!(registry.formats(), "Zeta,Alpha,Mid");
}
