mod util;

use mesh_insitu::prelude::*;
use mesh_insitu::topology::as_composite_data;
use std::borrow::Cow;
use util::{image_at, origin_x};

fn leaves<C: CompositeDataSet + ?Sized>(cd: &C) -> Vec<f64> {
    let mut out = Vec::new();
    apply_composite(cd, &mut |ds: &DataSet| {
        out.push(origin_x(ds));
        0
    });
    out
}

fn sample_objects() -> Vec<DataObject> {
    let mut amr = AmrDataSet::new(false);
    amr.add_level([1, 1, 1]);
    amr.push_block(0, Some(DataSet::uniform_grid([4.0, 0.0, 0.0], [1.0; 3], [0, 1, 0, 1, 0, 1])))
        .unwrap();
    vec![
        image_at(1.0).into(),
        MultiBlock::with_blocks(vec![
            Some(image_at(1.0).into()),
            None,
            Some(MultiBlock::with_blocks(vec![Some(image_at(2.0).into())]).into()),
        ])
        .into(),
        amr.into(),
        MultiBlock::new().into(),
    ]
}

#[test]
fn normalizing_twice_keeps_the_leaf_sequence() {
    for obj in sample_objects() {
        let once = obj.as_composite_data();
        let twice = once.as_composite_data();
        assert_eq!(leaves(&once), leaves(&twice));
        assert_eq!(once.number_of_blocks(), twice.number_of_blocks());
        assert_eq!(once.kind(), twice.kind());
        assert!(std::ptr::eq(once.root(), twice.root()));
    }
}

#[test]
fn normalized_view_matches_direct_traversal() {
    for obj in sample_objects() {
        let mut direct = Vec::new();
        apply(&obj, &mut |ds: &DataSet| {
            direct.push(origin_x(ds));
            0
        });
        assert_eq!(leaves(&obj.as_composite_data()), direct);
    }
}

#[test]
fn leaf_becomes_one_slot_multiblock() {
    let leaf = DataObject::from(image_at(7.0));
    let view = leaf.as_composite_data();
    assert!(view.is_wrapped());
    assert_eq!(view.kind(), MeshKind::MultiBlock);
    assert_eq!(view.number_of_blocks(), 1);
    assert!(std::ptr::eq(view.block(0).unwrap(), &leaf));
}

#[test]
fn ownership_is_explicit() {
    let obj = DataObject::from(MultiBlock::with_blocks(vec![Some(image_at(0.0).into())]));
    let borrowed = as_composite_data(Cow::Borrowed(&obj));
    assert_eq!(borrowed.ownership(), Ownership::Borrowed);
    assert!(matches!(borrowed.into_inner(), Cow::Borrowed(_)));

    let owned = obj.clone().into_composite_data();
    assert_eq!(owned.ownership(), Ownership::Owned);
    // a view of an owning handle borrows from it
    assert_eq!(owned.as_composite_data().ownership(), Ownership::Borrowed);
    let back = owned.into_inner().into_owned();
    assert_eq!(back, obj);
}

#[test]
fn amr_view_keeps_its_kind() {
    let mut amr = AmrDataSet::new(true);
    amr.add_level([1, 1, 1]);
    let obj = DataObject::from(amr);
    let view = obj.as_composite_data();
    assert_eq!(view.kind(), MeshKind::OverlappingAmr);
    assert!(view.as_amr().is_some());
    assert!(!view.is_wrapped());
}
