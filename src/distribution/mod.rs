pub mod structure;
pub mod converter;
pub mod processor;
pub mod manager;
pub mod stats;
pub mod index_page;
pub mod archive;

pub use structure::DistributionStructure;
pub use converter::DistributionConverter;
pub use processor::{DistributionProcessor, PlannedAction};
pub use manager::{DistributionManager, DistributionOptions};
pub use stats::{DistributionStats, ErrorRecord, ProcessReport, ProducedFile, ProgramCopy};
