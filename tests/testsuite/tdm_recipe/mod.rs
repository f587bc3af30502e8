use std::fs::{self, File};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use snapbox::cmd::Command;
use crate::BinCommandExt;
use tdm_test_support::paths;
use tdm_test_support::prelude::*;

const TRACY_FILES: &[(&str, &str)] = &[
    ("client/TracyProfiler.hpp", "#pragma once\n"),
    ("client/TracyProfiler.cpp", "// profiler\n"),
    ("common/TracySystem.hpp", "#pragma once\n"),
    ("common/TracySystem.cpp", "// system\n"),
    ("libbacktrace/backtrace.hpp", "#pragma once\n"),
    ("libbacktrace/elf.cpp", "// elf\n"),
    ("libbacktrace/LICENSE", "libbacktrace license\n"),
    ("server/TracyVersion.hpp", "namespace tracy { namespace Version { enum { Major = 0 }; } }\n"),
    ("server/TracyView.cpp", "// not packaged\n"),
    ("Tracy.hpp", "#pragma once\n"),
    ("TracyC.h", "#pragma once\n"),
    (
        "TracyOpenGL.hpp",
        "glGenQueries(QueryCount, m_query);\nglGetInteger64v(GL_TIMESTAMP, &tgpu);\n",
    ),
    ("TracyClient.cpp", "// client\n"),
    ("LICENSE", "tracy license\n"),
];

const LOCAL_MANIFEST: &str = r#"
name = "tracy"
version = "0.7.8"
src_folder = "fullsource"

[sources."0.7.8"]
url = "archives/tracy-0.7.8.tar.gz"
"#;

/// Pack [`TRACY_FILES`] under a `tracy-0.7.8/` root, the way upstream release tarballs look.
fn write_tracy_tarball(dest: &Path) {
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    let encoder = GzEncoder::new(File::create(dest).unwrap(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in TRACY_FILES {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, format!("tracy-0.7.8/{path}"), content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

#[tdm_test]
fn help() {
    let output = Command::tdm_recipe().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for hook in ["layout", "source", "build", "package", "all"] {
        assert!(stdout.contains(hook), "missing '{hook}' in:\n{stdout}");
    }
}

#[tdm_test]
fn shipped_tracy_layout() {
    let manifest = paths::recipes_home().join("tracy").join("recipe.toml");
    let output = Command::tdm_recipe()
        .arg("--manifest")
        .arg(&manifest)
        .arg("layout")
        .current_dir(paths::home())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "fullsource\n");
}

#[tdm_test]
fn unknown_library() {
    let project = ProjectBuilder::from(paths::home())
        .file(
            "recipe.toml",
            "name = \"zlib\"\nversion = \"1.3\"\nsrc_folder = \"src\"\n",
        )
        .build();
    let output = Command::tdm_recipe()
        .arg("layout")
        .current_dir(project.root())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zlib"));
}

#[tdm_test]
fn all_hooks_from_local_archive() {
    let project = ProjectBuilder::from(paths::home())
        .file("recipe.toml", LOCAL_MANIFEST)
        .build();
    write_tracy_tarball(&project.join("archives/tracy-0.7.8.tar.gz"));

    let output = Command::tdm_recipe()
        .arg("all")
        .current_dir(project.root())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let build = project.join("build/tracy-0.7.8");
    let header = fs::read_to_string(build.join("fullsource/TracyOpenGL.hpp")).unwrap();
    assert_eq!(
        header,
        "qglGenQueries(QueryCount, m_query);\nqglGetInteger64v(GL_TIMESTAMP, &tgpu);\n"
    );

    let pkg = build.join("package");
    for file in [
        "include/client/TracyProfiler.hpp",
        "include/common/TracySystem.hpp",
        "include/common/TracyVersion.hpp",
        "include/libbacktrace/backtrace.hpp",
        "include/Tracy.hpp",
        "include/TracyC.h",
        "include/TracyOpenGL.hpp",
        "src/client/TracyProfiler.cpp",
        "src/common/TracySystem.cpp",
        "src/libbacktrace/elf.cpp",
        "src/TracyClient.cpp",
        "licenses/LICENSE",
        "licenses/libbacktrace/LICENSE",
    ] {
        assert!(pkg.join(file).is_file(), "'{file}' was not packaged");
    }
    assert!(!pkg.join("src/server/TracyView.cpp").exists());
    assert!(fs::read_to_string(pkg.join("include/TracyOpenGL.hpp"))
        .unwrap()
        .starts_with("qglGenQueries"));
}

#[tdm_test]
fn checksum_mismatch_is_rejected() {
    let manifest = LOCAL_MANIFEST.replace(
        "url = \"archives/tracy-0.7.8.tar.gz\"",
        "url = \"archives/tracy-0.7.8.tar.gz\"\nsha256 = \"0000\"",
    );
    let project = ProjectBuilder::from(paths::home())
        .file("recipe.toml", &manifest)
        .build();
    write_tracy_tarball(&project.join("archives/tracy-0.7.8.tar.gz"));

    let output = Command::tdm_recipe()
        .arg("source")
        .current_dir(project.root())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("checksum mismatch"));
    assert!(!project.join("build/tracy-0.7.8/fullsource").exists());
}

#[tdm_test]
fn patches_are_applied_in_build() {
    if !tdm_deps::utils::cmd_exist("git") {
        return;
    }
    let manifest = format!(
        "{LOCAL_MANIFEST}\n[[patches.\"0.7.8\"]]\npatch_file = \"patches/0001-client.patch\"\npatch_description = \"tweak client\"\n"
    );
    let patch = "\
--- a/TracyClient.cpp
+++ b/TracyClient.cpp
@@ -1 +1 @@
-// client
+// patched client
";
    let project = ProjectBuilder::from(paths::home())
        .file("recipe.toml", &manifest)
        .file("patches/0001-client.patch", patch)
        .build();
    write_tracy_tarball(&project.join("archives/tracy-0.7.8.tar.gz"));

    for hook in ["source", "build"] {
        let output = Command::tdm_recipe()
            .arg(hook)
            .current_dir(project.root())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{hook} failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let client = project.join("build/tracy-0.7.8/fullsource/TracyClient.cpp");
    assert_eq!(fs::read_to_string(client).unwrap(), "// patched client\n");
}
