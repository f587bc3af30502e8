//! Core functionalities of this program
//!
//! Including host detection, the build matrix and package recipes.

pub mod command;
pub mod driver;
pub mod host;
pub mod matrix;
pub mod msvc;
pub mod recipe;
