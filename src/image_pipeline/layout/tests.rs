use crate::image_pipeline::common::error::ConversionError;
use crate::image_pipeline::layout::{
    AxisPlan, DatatypeRegistry, DatatypeTag, ElementKind, ImageDescriptor, SampleFormat,
    deinterleave,
};

fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u16_values(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[test]
fn test_standard_registry_supports_only_uint16() {
    let registry = DatatypeRegistry::standard();

    assert!(registry.is_supported(&DatatypeTag::Uint16));
    assert_eq!(registry.element_size(&DatatypeTag::Uint16).unwrap(), 2);
    assert_eq!(
        registry.element_kind(&DatatypeTag::Uint16).unwrap().format,
        SampleFormat::Unsigned16
    );

    let rejected = [
        DatatypeTag::Uint8,
        DatatypeTag::Sint16,
        DatatypeTag::Uint32,
        DatatypeTag::Real32,
        DatatypeTag::Complex64,
        DatatypeTag::Unrecognized("integer/unsigned/12".to_string()),
    ];
    for tag in rejected {
        assert!(!registry.is_supported(&tag));
        match registry.element_size(&tag) {
            Err(ConversionError::UnsupportedTypeError(reported)) => assert_eq!(reported, tag),
            other => panic!("expected UnsupportedTypeError for {}, got {:?}", tag, other),
        }
    }
}

#[test]
fn test_registry_extension() {
    let mut registry = DatatypeRegistry::empty();
    assert!(!registry.is_supported(&DatatypeTag::Uint16));

    registry.register(
        DatatypeTag::Sint16,
        ElementKind {
            size: 2,
            format: SampleFormat::Unsigned16,
        },
    );
    assert_eq!(registry.element_size(&DatatypeTag::Sint16).unwrap(), 2);
}

#[test]
fn test_storage_size_is_independent_of_support() {
    assert_eq!(DatatypeTag::Real64.storage_size(), Some(8));
    assert_eq!(DatatypeTag::Complex64.storage_size(), Some(16));
    assert_eq!(DatatypeTag::Unrecognized("x".into()).storage_size(), None);
}

#[test]
fn test_axis_plan_rotates_channel_last() {
    let cases: [(&[usize], &[usize]); 4] = [
        (&[3], &[3]),
        (&[3, 640], &[640, 3]),
        (&[3, 640, 480], &[640, 480, 3]),
        (&[2, 5, 7, 11, 13], &[5, 7, 11, 13, 2]),
    ];

    for (source, expected) in cases {
        let plan = AxisPlan::from_source_extents(source).unwrap();
        assert_eq!(plan.extents(), expected);
        assert_eq!(plan.rank(), source.len());
        assert_eq!(plan.channel_count(), source[0]);
        assert_eq!(
            plan.extents().iter().product::<usize>(),
            source.iter().product::<usize>()
        );
        assert_eq!(plan.element_count(), source.iter().product::<usize>());
    }
}

#[test]
fn test_axis_plan_rank_one_has_single_spatial_element() {
    let plan = AxisPlan::from_source_extents(&[4]).unwrap();
    assert_eq!(plan.channel_count(), 4);
    assert_eq!(plan.spatial_count(), 1);
}

#[test]
fn test_axis_plan_rejects_empty_and_zero_extents() {
    assert!(matches!(
        AxisPlan::from_source_extents(&[]),
        Err(ConversionError::ShapeMismatchError(_))
    ));
    assert!(matches!(
        AxisPlan::from_source_extents(&[3, 0, 4]),
        Err(ConversionError::ShapeMismatchError(_))
    ));
    assert!(matches!(
        AxisPlan::from_source_extents(&[2, usize::MAX, 2]),
        Err(ConversionError::ShapeMismatchError(_))
    ));
}

#[test]
fn test_deinterleave_two_channel_scenario() {
    // [p00c0, p00c1, p01c0, p01c1, p10c0, p10c1, p11c0, p11c1]
    let interleaved = u16_bytes(&[100, 200, 101, 201, 110, 210, 111, 211]);

    let plan = AxisPlan::from_source_extents(&[2, 2, 2]).unwrap();
    assert_eq!(plan.extents(), &[2, 2, 2]);

    let planar = deinterleave(&interleaved, 2, plan.channel_count()).unwrap();
    assert_eq!(
        u16_values(&planar),
        vec![100, 101, 110, 111, 200, 201, 210, 211]
    );
}

#[test]
fn test_deinterleave_single_channel_is_identity() {
    let source: Vec<u8> = (0..=255u8).collect();
    for element_size in [1, 2, 4, 8] {
        let planar = deinterleave(&source, element_size, 1).unwrap();
        assert_eq!(planar, source);
    }
}

#[test]
fn test_deinterleave_touches_every_position_once() {
    // Tag every element with its own index, then check the output is a
    // permutation that follows the planar formula.
    for channels in 1..=5usize {
        for spatial in 1..=7usize {
            let count = channels * spatial;
            let source: Vec<u32> = (0..count as u32).collect();
            let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();

            let planar = deinterleave(&bytes, 4, channels).unwrap();
            let out: Vec<u32> = planar
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();

            let mut seen = vec![false; count];
            for c in 0..channels {
                for s in 0..spatial {
                    let value = out[c * spatial + s] as usize;
                    assert_eq!(value, s * channels + c);
                    assert!(!seen[value]);
                    seen[value] = true;
                }
            }
            assert!(seen.iter().all(|&hit| hit));
        }
    }
}

#[test]
fn test_deinterleave_inverse_with_swapped_roles() {
    let channels = 3;
    let spatial = 10;
    let source: Vec<u8> = (0..(channels * spatial * 2) as u8).collect();

    let planar = deinterleave(&source, 2, channels).unwrap();
    assert_ne!(planar, source);

    let restored = deinterleave(&planar, 2, spatial).unwrap();
    assert_eq!(restored, source);
}

#[test]
fn test_deinterleave_rejects_uneven_channel_count() {
    let source = u16_bytes(&[1, 2, 3, 4, 5, 6, 7]);
    assert!(matches!(
        deinterleave(&source, 2, 2),
        Err(ConversionError::ShapeMismatchError(_))
    ));
}

#[test]
fn test_deinterleave_rejects_partial_elements_and_zero_parameters() {
    assert!(matches!(
        deinterleave(&[1, 2, 3], 2, 1),
        Err(ConversionError::ShapeMismatchError(_))
    ));
    assert!(matches!(
        deinterleave(&[1, 2], 0, 1),
        Err(ConversionError::ShapeMismatchError(_))
    ));
    assert!(matches!(
        deinterleave(&[1, 2], 2, 0),
        Err(ConversionError::ShapeMismatchError(_))
    ));
}

#[test]
fn test_descriptor_validation() {
    let descriptor = ImageDescriptor {
        extents: vec![2, 3, 4],
        datatype: DatatypeTag::Uint16,
        data: vec![0u8; 2 * 3 * 4 * 2],
    };
    assert_eq!(descriptor.rank(), 3);
    assert!(descriptor.validate(2).is_ok());
    assert!(matches!(
        descriptor.validate(4),
        Err(ConversionError::ShapeMismatchError(_))
    ));

    let short = ImageDescriptor {
        data: vec![0u8; 10],
        ..descriptor
    };
    assert!(matches!(
        short.validate(2),
        Err(ConversionError::ShapeMismatchError(_))
    ));
}
