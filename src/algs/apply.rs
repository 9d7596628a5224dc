//! Structural traversal over mesh hierarchies.
//!
//! The traversal visits every present leaf of a [`DataObject`] depth first,
//! left to right, and hands it to a callback. Absent slots are skipped.
//!
//! # Status contract
//!
//! Callbacks return a [`Status`]:
//!
//! | value | meaning |
//! |-------|---------|
//! | `0`   | keep going |
//! | `> 0` | stop now, nothing went wrong |
//! | `< 0` | stop now, the callback failed |
//!
//! The first non-zero status ends the traversal and is returned unchanged, so
//! callers can tell a graceful stop from a failure and recover the code the
//! callback chose. A traversal that visits every leaf returns `0`.
//!
//! # Flat indices
//!
//! Each leaf position has a flat index: the number of leaf positions before it
//! in depth-first order. An absent slot is one position. A nested hierarchy
//! contributes the positions of its own slots.

use crate::mesh_error::MeshError;
use crate::topology::composite::{CompositeDataSet, CompositeDataSetMut};
use crate::topology::dataset::DataSet;
use crate::topology::object::DataObject;

/// Signed tri-state returned by traversal callbacks.
pub type Status = i32;

/// Status of a callback that wants the traversal to continue.
pub const CONTINUE: Status = 0;

/// Visit every leaf of `dobj`.
pub fn apply<F>(dobj: &DataObject, func: &mut F) -> Status
where
    F: FnMut(&DataSet) -> Status + ?Sized,
{
    apply_indexed(dobj, &mut |_: usize, ds: &DataSet| func(ds))
}

/// Visit every leaf of `dobj` together with its flat index.
pub fn apply_indexed<F>(dobj: &DataObject, func: &mut F) -> Status
where
    F: FnMut(usize, &DataSet) -> Status + ?Sized,
{
    walk_object(dobj, &mut 0, func)
}

/// Visit every leaf under a hierarchy view.
pub fn apply_composite<C, F>(cd: &C, func: &mut F) -> Status
where
    C: CompositeDataSet + ?Sized,
    F: FnMut(&DataSet) -> Status + ?Sized,
{
    walk(cd, &mut 0, &mut |_: usize, ds: &DataSet| func(ds))
}

/// [`apply_composite`] with flat indices.
pub fn apply_composite_indexed<C, F>(cd: &C, func: &mut F) -> Status
where
    C: CompositeDataSet + ?Sized,
    F: FnMut(usize, &DataSet) -> Status + ?Sized,
{
    walk(cd, &mut 0, func)
}

/// Number of leaf positions (present or absent) under `dobj`.
pub fn leaf_slot_count(dobj: &DataObject) -> usize {
    match dobj {
        DataObject::DataSet(_) => 1,
        DataObject::MultiBlock(mb) => composite_leaf_slot_count(mb),
        DataObject::Amr(amr) => composite_leaf_slot_count(amr),
    }
}

/// Number of leaf positions under a hierarchy view.
pub fn composite_leaf_slot_count<C: CompositeDataSet + ?Sized>(cd: &C) -> usize {
    (0..cd.number_of_blocks())
        .map(|i| cd.block(i).map_or(1, leaf_slot_count))
        .sum()
}

fn walk_object<F>(dobj: &DataObject, next_id: &mut usize, func: &mut F) -> Status
where
    F: FnMut(usize, &DataSet) -> Status + ?Sized,
{
    match dobj {
        DataObject::DataSet(ds) => {
            let id = *next_id;
            *next_id += 1;
            func(id, ds)
        }
        DataObject::MultiBlock(mb) => walk(mb, next_id, func),
        DataObject::Amr(amr) => walk(amr, next_id, func),
    }
}

fn walk<C, F>(cd: &C, next_id: &mut usize, func: &mut F) -> Status
where
    C: CompositeDataSet + ?Sized,
    F: FnMut(usize, &DataSet) -> Status + ?Sized,
{
    for i in 0..cd.number_of_blocks() {
        match cd.block(i) {
            None => *next_id += 1,
            Some(block) => {
                let status = walk_object(block, next_id, func);
                if status != CONTINUE {
                    return status;
                }
            }
        }
    }
    CONTINUE
}

/// Visit matching leaf pairs of two hierarchies of identical shape.
///
/// Shapes must agree slot for slot: the same number of slots at every level,
/// present opposite present, absent opposite absent, leaf opposite leaf. The
/// shapes are compared before the first callback runs, so a disagreement is
/// reported as [`MeshError::StructureMismatch`] with `output` untouched.
/// Callback statuses come back in `Ok`.
pub fn apply_pair<F>(
    input: &DataObject,
    output: &mut DataObject,
    func: &mut F,
) -> Result<Status, MeshError>
where
    F: FnMut(&DataSet, &mut DataSet) -> Status + ?Sized,
{
    check_object(input, output, &mut Vec::new())?;
    pair_object(input, output, &mut Vec::new(), func)
}

/// [`apply_pair`] over two hierarchy views.
pub fn apply_pair_composite<A, B, F>(
    input: &A,
    output: &mut B,
    func: &mut F,
) -> Result<Status, MeshError>
where
    A: CompositeDataSet + ?Sized,
    B: CompositeDataSetMut + ?Sized,
    F: FnMut(&DataSet, &mut DataSet) -> Status + ?Sized,
{
    check_composite(input, &*output, &mut Vec::new())?;
    pair_composite(input, output, &mut Vec::new(), func)
}

fn as_hierarchy(dobj: &DataObject) -> Option<&dyn CompositeDataSet> {
    match dobj {
        DataObject::DataSet(_) => None,
        DataObject::MultiBlock(mb) => Some(mb),
        DataObject::Amr(amr) => Some(amr),
    }
}

fn as_hierarchy_mut(dobj: &mut DataObject) -> Option<&mut dyn CompositeDataSetMut> {
    match dobj {
        DataObject::DataSet(_) => None,
        DataObject::MultiBlock(mb) => Some(mb),
        DataObject::Amr(amr) => Some(amr),
    }
}

fn mismatch(path: &[usize], reason: String) -> MeshError {
    let err = MeshError::StructureMismatch {
        path: path.to_vec(),
        reason,
    };
    log::error!("{err}");
    err
}

fn check_object(input: &DataObject, output: &DataObject, path: &mut Vec<usize>) -> Result<(), MeshError> {
    match (as_hierarchy(input), as_hierarchy(output)) {
        (None, None) => Ok(()),
        (Some(a), Some(b)) => check_composite(a, b, path),
        _ => Err(mismatch(
            path,
            format!("input {} paired with output {}", input.kind(), output.kind()),
        )),
    }
}

fn check_composite<A, B>(input: &A, output: &B, path: &mut Vec<usize>) -> Result<(), MeshError>
where
    A: CompositeDataSet + ?Sized,
    B: CompositeDataSet + ?Sized,
{
    let n_in = input.number_of_blocks();
    let n_out = output.number_of_blocks();
    if n_in != n_out {
        return Err(mismatch(
            path,
            format!("input has {n_in} slots, output has {n_out}"),
        ));
    }
    for i in 0..n_in {
        path.push(i);
        let res = match (input.block(i), output.block(i)) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) => check_object(a, b, path),
            (Some(_), None) => Err(mismatch(path, "present in input, absent in output".into())),
            (None, Some(_)) => Err(mismatch(path, "absent in input, present in output".into())),
        };
        path.pop();
        res?;
    }
    Ok(())
}

fn pair_object<F>(
    input: &DataObject,
    output: &mut DataObject,
    path: &mut Vec<usize>,
    func: &mut F,
) -> Result<Status, MeshError>
where
    F: FnMut(&DataSet, &mut DataSet) -> Status + ?Sized,
{
    let (in_kind, out_kind) = (input.kind(), output.kind());
    if let (DataObject::DataSet(a), DataObject::DataSet(b)) = (input, &mut *output) {
        return Ok(func(a, b));
    }
    match (as_hierarchy(input), as_hierarchy_mut(output)) {
        (Some(a), Some(b)) => pair_composite(a, b, path, func),
        _ => Err(mismatch(
            path,
            format!("input {in_kind} paired with output {out_kind}"),
        )),
    }
}

fn pair_composite<A, B, F>(
    input: &A,
    output: &mut B,
    path: &mut Vec<usize>,
    func: &mut F,
) -> Result<Status, MeshError>
where
    A: CompositeDataSet + ?Sized,
    B: CompositeDataSetMut + ?Sized,
    F: FnMut(&DataSet, &mut DataSet) -> Status + ?Sized,
{
    let n_in = input.number_of_blocks();
    let n_out = output.number_of_blocks();
    if n_in != n_out {
        return Err(mismatch(
            path,
            format!("input has {n_in} slots, output has {n_out}"),
        ));
    }
    for i in 0..n_in {
        path.push(i);
        let res = match (input.block(i), output.block_mut(i)) {
            (None, None) => Ok(CONTINUE),
            (Some(a), Some(b)) => pair_object(a, b, path, func),
            (Some(_), None) => Err(mismatch(path, "present in input, absent in output".into())),
            (None, Some(_)) => Err(mismatch(path, "absent in input, present in output".into())),
        };
        path.pop();
        match res {
            Ok(CONTINUE) => {}
            done => return done,
        }
    }
    Ok(CONTINUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::composite::AsCompositeData;
    use crate::topology::multiblock::MultiBlock;

    fn leaf(x: f64) -> DataObject {
        DataObject::from(DataSet::image([x, 0.0, 0.0], [1.0; 3], [0, 1, 0, 1, 0, 1]))
    }

    fn origin_x(ds: &DataSet) -> f64 {
        ds.bounds().min()[0]
    }

    #[test]
    fn visits_in_order_and_skips_absent() {
        let inner = MultiBlock::with_blocks(vec![Some(leaf(2.0)), None, Some(leaf(3.0))]);
        let root = DataObject::from(MultiBlock::with_blocks(vec![
            Some(leaf(1.0)),
            None,
            Some(inner.into()),
            Some(leaf(4.0)),
        ]));
        let mut seen = Vec::new();
        let status = apply_indexed(&root, &mut |id, ds: &DataSet| {
            seen.push((id, origin_x(ds)));
            CONTINUE
        });
        assert_eq!(status, 0);
        assert_eq!(seen, vec![(0, 1.0), (2, 2.0), (4, 3.0), (5, 4.0)]);
        assert_eq!(leaf_slot_count(&root), 6);
    }

    #[test]
    fn first_nonzero_status_is_returned_verbatim() {
        let root = DataObject::from(MultiBlock::with_blocks(vec![
            Some(leaf(1.0)),
            Some(leaf(2.0)),
            Some(leaf(3.0)),
        ]));
        for code in [7, -13] {
            let mut calls = 0;
            let status = apply(&root, &mut |_: &DataSet| {
                calls += 1;
                if calls == 2 { code } else { CONTINUE }
            });
            assert_eq!(status, code);
            assert_eq!(calls, 2);
        }
    }

    #[test]
    fn leaf_and_wrapped_leaf_agree() {
        let l = leaf(5.0);
        let mut direct = Vec::new();
        apply(&l, &mut |ds: &DataSet| {
            direct.push(origin_x(ds));
            CONTINUE
        });
        let mut wrapped = Vec::new();
        apply_composite(&l.as_composite_data(), &mut |ds: &DataSet| {
            wrapped.push(origin_x(ds));
            CONTINUE
        });
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn pair_reports_mismatch_path() {
        let input = DataObject::from(MultiBlock::with_blocks(vec![Some(leaf(1.0)), Some(leaf(2.0))]));
        let mut output = DataObject::from(MultiBlock::with_blocks(vec![Some(leaf(0.0)), None]));
        let before = output.clone();
        let mut calls = 0;
        let err = apply_pair(&input, &mut output, &mut |_: &DataSet, _: &mut DataSet| {
            calls += 1;
            CONTINUE
        })
        .unwrap_err();
        assert_eq!(calls, 0);
        assert_eq!(output, before);
        assert!(matches!(err, MeshError::StructureMismatch { ref path, .. } if path == &vec![1]));
    }
}
