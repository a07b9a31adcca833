pub mod builder;

pub use builder::{BacktestBuilder, BacktestRow};
