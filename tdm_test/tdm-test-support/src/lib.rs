//! Scratch directories and fixture projects for the integration tests.

pub use tdm_test_macro::tdm_test;

pub mod paths;
pub mod project;

pub mod prelude {
    pub use crate::paths::TestPathExt;
    pub use crate::project::ProjectBuilder;
    pub use crate::tdm_test;
}
