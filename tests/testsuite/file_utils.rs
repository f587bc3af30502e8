use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tdm_deps::utils::{self, Extractable};
use tdm_test_support::paths;
use tdm_test_support::prelude::*;
use zip::write::SimpleFileOptions;

fn write_zip(dest: &Path, files: &[&str]) {
    let mut writer = zip::ZipWriter::new(File::create(dest).unwrap());
    for file in files {
        writer.start_file(*file, SimpleFileOptions::default()).unwrap();
        writer.write_all(file.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[tdm_test]
fn walk_dir_recursive() {
    let project = ProjectBuilder::from(paths::home())
        .file("file_in_root", "")
        .file("sub_folder_1/file_in_folder_1", "")
        .file("sub_folder_2/file_in_folder_2", "")
        .build();
    let root = project.root();

    let entries = utils::walk_dir(&root, true).unwrap();
    for exp in [
        root.join("file_in_root"),
        root.join("sub_folder_1"),
        root.join("sub_folder_1").join("file_in_folder_1"),
        root.join("sub_folder_2"),
        root.join("sub_folder_2").join("file_in_folder_2"),
    ] {
        assert!(entries.contains(&exp));
    }

    let entries = utils::walk_dir(&root, false).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(!entries.contains(&root.join("sub_folder_1").join("file_in_folder_1")));
}

#[tdm_test]
fn copy_by_extension_keeps_relative_paths() {
    let project = ProjectBuilder::from(paths::home())
        .file("src/client/a.hpp", "a")
        .file("src/client/nested/b.hpp", "b")
        .file("src/client/a.cpp", "c")
        .build();
    let src = project.join("src");
    let dest = project.join("out");

    let copied = utils::copy_by_extension(&src, "client", "hpp", &dest).unwrap();
    assert_eq!(
        copied,
        [dest.join("client/a.hpp"), dest.join("client/nested/b.hpp")]
    );
    assert!(!dest.join("client/a.cpp").exists());

    let copied = utils::copy_by_extension(&src, "server", "hpp", &dest).unwrap();
    assert!(copied.is_empty());
}

#[tdm_test]
fn extracting_zip_strips_root() {
    let home = paths::home();
    let archive = home.join("tracy-0.7.8.zip");
    write_zip(
        &archive,
        &["tracy-0.7.8/Tracy.hpp", "tracy-0.7.8/client/TracyProfiler.cpp"],
    );

    let out = home.join("stripped");
    Extractable::load(&archive)
        .unwrap()
        .extract_to(&out, true)
        .unwrap();
    assert!(out.join("Tracy.hpp").is_file());
    assert!(out.join("client").join("TracyProfiler.cpp").is_file());

    let out = home.join("kept");
    Extractable::load(&archive)
        .unwrap()
        .extract_to(&out, false)
        .unwrap();
    assert!(out.join("tracy-0.7.8").join("Tracy.hpp").is_file());
}

#[tdm_test]
fn extracting_single_file_zip_keeps_file() {
    let home = paths::home();
    let archive = home.join("single.zip");
    write_zip(&archive, &["only.txt"]);

    let out = home.join("out");
    Extractable::load(&archive)
        .unwrap()
        .extract_to(&out, true)
        .unwrap();
    assert_eq!(fs::read_to_string(out.join("only.txt")).unwrap(), "only.txt");
}

#[tdm_test]
fn unsupported_archive_format() {
    let project = ProjectBuilder::from(paths::home())
        .file("tracy.7z", "")
        .build();
    assert!(Extractable::load(&project.join("tracy.7z")).is_err());
}
