//! fxpack library - build pipeline and commands behind the `fxpack` binary

pub mod bundle;
pub mod commands;
pub mod common;
pub mod errors;
pub mod pipeline;
pub mod release;
pub mod timestamp;

pub use common::GlobalOpts;
pub use fxpack_logger as logger;
