use mesh_insitu::data::array::{ElementVisitor, Element, dispatch};
use mesh_insitu::data::try_get_pointer;
use mesh_insitu::prelude::*;

#[test]
fn aos_and_soa_expose_the_same_single_component_values() {
    let values = vec![1.5f32, -2.0, 3.25, 0.0];
    let aos = DataArray::aos("v", 1, values.clone()).unwrap();
    let soa = DataArray::soa("v", vec![values.clone()]).unwrap();
    let a = get_pointer::<f32>(Some(&aos)).unwrap();
    let s = get_pointer::<f32>(Some(&soa)).unwrap();
    assert_eq!(a, s);
    assert_eq!(a, &values[..]);
}

#[test]
fn aos_returns_interleaved_buffer() {
    let arr = DataArray::aos("xyz", 3, vec![1i64, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(arr.n_tuples(), 2);
    assert_eq!(get_pointer::<i64>(Some(&arr)), Some(&[1i64, 2, 3, 4, 5, 6][..]));
}

#[test]
fn soa_returns_first_component() {
    let arr = DataArray::soa("xy", vec![vec![1u32, 2], vec![10, 20]]).unwrap();
    assert_eq!(get_pointer::<u32>(Some(&arr)), Some(&[1u32, 2][..]));
    assert_eq!(arr.value(1, 1), Some(20.0));
}

#[test]
fn unsupported_inputs_yield_none() {
    let constant = DataArray::constant("c", ScalarType::F64, 1, 10, 4.0);
    assert_eq!(get_pointer::<f64>(Some(&constant)), None);
    assert_eq!(get_pointer::<f64>(None), None);
    assert!(matches!(
        try_get_pointer::<f64>(Some(&constant)),
        Err(MeshError::UnsupportedLayout { layout, .. }) if layout == constant.storage().layout_name()
    ));
    assert_eq!(try_get_pointer::<f64>(None), Err(MeshError::NullArray));
}

#[test]
fn element_type_must_match() {
    let arr = DataArray::aos("ids", 1, vec![1i32, 2, 3]).unwrap();
    assert_eq!(get_pointer::<i64>(Some(&arr)), None);
    assert_eq!(
        try_get_pointer::<f32>(Some(&arr)),
        Err(MeshError::ElementTypeMismatch {
            name: "ids".into(),
            expected: ScalarType::F32,
            found: ScalarType::I32,
        })
    );
}

#[test]
fn mutable_access_writes_through() {
    let mut arr = DataArray::aos("w", 1, vec![0u8; 4]).unwrap();
    get_pointer_mut::<u8>(Some(&mut arr)).unwrap()[2] = 9;
    assert_eq!(get_pointer::<u8>(Some(&arr)), Some(&[0u8, 0, 9, 0][..]));
    let mut constant = DataArray::constant("c", ScalarType::U8, 1, 4, 1.0);
    assert!(get_pointer_mut::<u8>(Some(&mut constant)).is_none());
}

#[test]
fn array_length_must_divide_components() {
    assert!(matches!(
        DataArray::aos("bad", 3, vec![1.0f64; 4]),
        Err(MeshError::ArrayLengthMismatch { .. })
    ));
    assert!(matches!(
        DataArray::soa("bad", vec![vec![1.0f64; 2], vec![1.0]]),
        Err(MeshError::ArrayLengthMismatch { .. })
    ));
}

#[test]
fn dispatch_visits_every_scalar_type() {
    struct Name;
    impl ElementVisitor for Name {
        type Output = ScalarType;
        fn visit<T: Element>(self) -> ScalarType {
            T::SCALAR_TYPE
        }
    }
    for ty in ScalarType::ALL {
        assert_eq!(dispatch(ty, Name), ty);
    }
}

#[test]
fn ranges_cover_every_component() {
    let arr = DataArray::soa("uv", vec![vec![1.0f64, 5.0], vec![-3.0, 2.0]]).unwrap();
    assert_eq!(arr.range(), Some([-3.0, 5.0]));
    let empty = DataArray::aos::<f64>("e", 1, Vec::new()).unwrap();
    assert_eq!(empty.range(), None);
}
