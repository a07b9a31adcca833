pub mod selector;

pub use selector::{Cointegrator, FileCointegrator};
