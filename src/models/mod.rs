pub mod batch;
pub mod listing;

pub use batch::HarvestBatch;
pub use listing::{Field, JobListing};
