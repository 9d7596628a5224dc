mod util;

use mesh_insitu::io::write_domain_decomp_to;
use mesh_insitu::prelude::*;
use std::path::PathBuf;
use util::{round_robin, run_world};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mesh-insitu-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn rank_zero_writes_one_hexahedron_per_block() {
    let path = scratch("decomp.vtk");
    let results = run_world(3, |comm| {
        let mesh = round_robin(comm.rank(), comm.size(), 5);
        let mut md = MeshMetadata::new("mesh");
        get_metadata(&comm, &mesh, &mut md)?;
        write_domain_decomp(&comm, &md, &path)
    });
    for res in results {
        assert_eq!(res, Ok(()));
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# vtk DataFile Version 3.0\n"));
    assert!(text.contains("POINTS 40 double\n"));
    assert!(text.contains("CELLS 5 45\n"));
    assert!(text.contains("CELL_TYPES 5\n"));
    assert!(text.contains("FIELD FieldData 2\n"));
    assert!(text.contains("BlockOwner 1 5 int\n0 1 2 0 1\n"));
    assert!(text.contains("BlockId 1 5 int\n0 1 2 3 4\n"));
    assert!(!text.contains("BlockLevel"));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn local_records_are_refused() {
    let path = scratch("never-written.vtk");
    let md = MeshMetadata::new("local");
    assert_eq!(
        write_domain_decomp(&NoComm, &md, &path),
        Err(MeshError::NotGlobalView)
    );
    assert!(!path.exists());
}

#[test]
fn write_failure_on_rank_zero_reaches_every_rank() {
    let path = scratch("missing-dir").join("sub").join("decomp.vtk");
    let results = run_world(2, |comm| {
        let mesh = round_robin(comm.rank(), comm.size(), 2);
        let mut md = MeshMetadata::new("mesh");
        get_metadata(&comm, &mesh, &mut md)?;
        write_domain_decomp(&comm, &md, &path)
    });
    assert!(matches!(results[0], Err(MeshError::Io(_))));
    assert!(matches!(
        results[1],
        Err(MeshError::CollectiveFailure { operation: "write_domain_decomp", .. })
    ));
}

#[test]
fn amr_decomposition_carries_levels() {
    let mut amr = AmrDataSet::new(false);
    amr.add_level([1, 1, 1]);
    amr.add_level([2, 2, 2]);
    amr.push_block(0, Some(DataSet::uniform_grid([0.0; 3], [1.0; 3], [0, 2, 0, 2, 0, 2])))
        .unwrap();
    amr.push_block(1, Some(DataSet::uniform_grid([0.0; 3], [0.5; 3], [0, 2, 0, 2, 0, 2])))
        .unwrap();
    let mut md = MeshMetadata::new("amr");
    get_metadata(&NoComm, &amr.into(), &mut md).unwrap();

    let mut out = Vec::new();
    write_domain_decomp_to(&mut out, &md).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("FIELD FieldData 3\n"));
    assert!(text.contains("BlockLevel 1 2 int\n0 1\n"));
    // first hexahedron spans the coarse block
    assert!(text.contains("POINTS 16 double\n0 0 0\n2 0 0\n2 2 0\n0 2 0\n0 0 2\n"));
}
