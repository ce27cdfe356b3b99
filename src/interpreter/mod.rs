pub mod context;
pub mod environment;
pub mod error;
mod native;
mod tree;
pub mod value;

pub use native::Builtin;
pub use tree::{TreeWalkEvaluator, MAX_CALL_DEPTH};

/// Where evaluated programs send their output.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}
