pub mod report;
pub mod writer;

pub use report::{BundleReport, BundleSummary, FilterSnapshot};
pub use writer::{BundleProgress, BundleWriter};
