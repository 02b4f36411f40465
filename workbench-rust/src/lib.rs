pub mod documents;
mod errors;
pub mod report;
mod workbench;

pub use errors::{WorkbenchError, WorkbenchResult};
pub use workbench::{Workbench, WorkbenchOptions};
