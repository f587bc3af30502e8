use std::cell::Cell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::{env, fs};

/// Every test gets `<scratch>/tdm/t<N>`.
static SCRATCH_ROOT: OnceLock<PathBuf> = OnceLock::new();

thread_local! {
    static TEST_ID: Cell<Option<usize>> = const { Cell::new(None) };
}

fn scratch_root(tmp_dir: Option<&'static str>) -> &'static Path {
    SCRATCH_ROOT.get_or_init(|| {
        let base = match tmp_dir {
            Some(dir) => PathBuf::from(dir),
            // `target/<profile>/deps/<test exe>` -> `target/<profile>/tmp`
            None => env::current_exe()
                .ok()
                .and_then(|exe| exe.parent()?.parent().map(|p| p.join("tmp")))
                .unwrap_or_else(env::temp_dir),
        };
        base.join("tdm")
    })
}

fn test_root() -> PathBuf {
    let id = TEST_ID
        .get()
        .expect("`#[tdm_test]` must be used for tests that need a scratch directory");
    let root = SCRATCH_ROOT
        .get()
        .expect("scratch root is set up by `#[tdm_test]`");
    root.join(format!("t{id}"))
}

/// Give the current test thread a fresh, empty scratch directory.
///
/// Called by the code `#[tdm_test]` injects, with `CARGO_TARGET_TMPDIR` when cargo provides it.
pub fn init_root(tmp_dir: Option<&'static str>) {
    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    scratch_root(tmp_dir);
    TEST_ID.set(Some(NEXT_ID.fetch_add(1, Ordering::SeqCst)));

    let root = test_root();
    root.rm_rf();
    root.mkdir_p();
}

/// Working directory of the current test, e.g. `$CARGO_TARGET_TMPDIR/tdm/t0/home`.
pub fn home() -> PathBuf {
    let path = test_root().join("home");
    path.mkdir_p();
    path
}

/// The `recipes/` directory of the repository.
pub fn recipes_home() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(|root| root.join("recipes"))
        .unwrap_or_else(|| PathBuf::from("recipes"))
}

pub trait TestPathExt {
    fn mkdir_p(&self);
    fn rm_rf(&self);
}

impl TestPathExt for Path {
    fn mkdir_p(&self) {
        fs::create_dir_all(self)
            .unwrap_or_else(|e| panic!("failed to create '{}': {e}", self.display()))
    }

    fn rm_rf(&self) {
        let res = match self.symlink_metadata() {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(self),
            Ok(_) => fs::remove_file(self),
            Err(e) if e.kind() == ErrorKind::NotFound => return,
            Err(e) => panic!("failed to stat '{}': {e}", self.display()),
        };
        res.unwrap_or_else(|e| panic!("failed to remove '{}': {e}", self.display()))
    }
}

impl TestPathExt for PathBuf {
    fn mkdir_p(&self) {
        self.as_path().mkdir_p()
    }

    fn rm_rf(&self) {
        self.as_path().rm_rf()
    }
}
