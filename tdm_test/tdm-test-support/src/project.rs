use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::TestPathExt;

struct FileBuilder {
    path: PathBuf,
    content: String,
    executable: bool,
}

impl FileBuilder {
    pub fn new(path: PathBuf, content: &str, executable: bool) -> FileBuilder {
        FileBuilder {
            path,
            content: content.to_string(),
            executable,
        }
    }

    fn mk(&mut self) {
        self.dirname().mkdir_p();
        fs::write(&self.path, &self.content)
            .unwrap_or_else(|e| panic!("could not create file {}: {}", self.path.display(), e));

        #[cfg(unix)]
        if self.executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755)).unwrap_or_else(
                |e| panic!("could not make {} executable: {}", self.path.display(), e),
            );
        }
    }

    fn dirname(&self) -> &Path {
        self.path.parent().unwrap()
    }
}

pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: PathBuf) -> Project {
        Project { root }
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone()
    }

    pub fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }
}

pub struct ProjectBuilder {
    project: Project,
    files: Vec<FileBuilder>,
}

impl ProjectBuilder {
    /// Generate test project
    pub fn from(root: PathBuf) -> ProjectBuilder {
        let root = Project::new(root);
        ProjectBuilder {
            project: root,
            files: vec![],
        }
    }

    /// Add a text file, `path` is relative to the project root.
    pub fn file<B: AsRef<Path>>(mut self, path: B, content: &str) -> Self {
        self.files.push(FileBuilder::new(
            self.project.root().join(path.as_ref()),
            content,
            false,
        ));
        self
    }

    /// Add a file with executable permission (no-op on Windows).
    pub fn executable<B: AsRef<Path>>(mut self, path: B, content: &str) -> Self {
        self.files.push(FileBuilder::new(
            self.project.root().join(path.as_ref()),
            content,
            true,
        ));
        self
    }

    pub fn build(mut self) -> Project {
        // clean the home directory.
        self.project.root().rm_rf();
        // create the home directory
        self.project.root().mkdir_p();
        // create the extra files
        for file in self.files.iter_mut() {
            file.mk();
        }

        let ProjectBuilder { project, .. } = self;
        project
    }
}
