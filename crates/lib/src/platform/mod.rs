pub mod paths;
pub mod process;

pub use process::{ProbeError, ProcessProbe, SystemProcessProbe};
