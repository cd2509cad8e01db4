use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;
use tfs::{Error, Geometry, TinyFileSystem, ROOT_MARKER};

use crate::{open_existing, open_or_create};

/// 每个测试使用自己的镜像文件
fn image_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tfs-{}-{name}.img", std::process::id()));
    let _ = fs::remove_file(&path);
    path
}

fn mount(path: &PathBuf, geometry: Geometry) -> TinyFileSystem {
    let device = Arc::new(open_or_create(path, geometry).unwrap());
    TinyFileSystem::mount(device, geometry).unwrap()
}

#[test]
fn image_has_exact_size() {
    let path = image_path("size");
    let geometry = Geometry::default();
    drop(mount(&path, geometry));

    let image = fs::read(&path).unwrap();
    assert_eq!(geometry.image_size(), image.len());
    assert_eq!(ROOT_MARKER, image[tfs::HEADER_SIZE - 1]);

    fs::remove_file(path).unwrap();
}

#[test]
fn entries_persist_across_remount() {
    let path = image_path("remount");
    let geometry = Geometry::default();
    let mut rng = rand::thread_rng();
    let payload: Vec<u8> = (0..geometry.block_size()).map(|_| rng.gen()).collect();

    {
        let mut fs = mount(&path, geometry);
        fs.import("/a", &payload).unwrap();
        fs.make_directory("/d").unwrap();
        fs.import("/d/b", b"nested").unwrap();
    }

    let fs = mount(&path, geometry);
    assert_eq!(fs.list("/").unwrap(), ["a", "d"]);
    assert_eq!(payload, fs.export("/a").unwrap());
    assert_eq!(b"nested".to_vec(), fs.export("/d/b").unwrap());
    assert_eq!(geometry.block_count() - 4, fs.free_blocks());
    drop(fs);

    fs::remove_file(path).unwrap();
}

#[test]
fn bad_marker_reformats() {
    let path = image_path("marker");
    let geometry = Geometry::default();
    fs::write(&path, vec![0x5a; geometry.image_size()]).unwrap();

    let fs = mount(&path, geometry);
    assert!(fs.list("/").unwrap().is_empty());
    drop(fs);

    let image = fs::read(&path).unwrap();
    assert_eq!(ROOT_MARKER, image[tfs::HEADER_SIZE - 1]);
    assert!(image[geometry.block_size()..].iter().all(|&b| b == 0));

    fs::remove_file(path).unwrap();
}

#[test]
fn open_existing_checks_size() {
    let path = image_path("existing");
    let geometry = Geometry::default();
    assert_eq!(Err(Error::NotFound), open_existing(&path, geometry).map(|_| ()));

    fs::write(&path, vec![0; geometry.image_size() - 1]).unwrap();
    assert_eq!(
        Err(Error::InvalidGeometry),
        open_existing(&path, geometry).map(|_| ())
    );

    fs::write(&path, vec![0; geometry.image_size()]).unwrap();
    assert!(open_existing(&path, geometry).is_ok());

    fs::remove_file(path).unwrap();
}

#[test]
fn custom_geometry() {
    let path = image_path("geometry");
    let geometry = Geometry::new(64, 64).unwrap();
    {
        let mut fs = mount(&path, geometry);
        fs.import("x", &[9; 64]).unwrap();
        assert_eq!(Err(Error::TooLarge), fs.import("y", &[9; 65]));
    }
    assert_eq!(64 * 64, fs::metadata(&path).unwrap().len());

    let fs = mount(&path, geometry);
    assert_eq!(vec![9; 64], fs.export("x").unwrap());
    drop(fs);

    fs::remove_file(path).unwrap();
}
