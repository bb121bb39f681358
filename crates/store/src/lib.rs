pub mod fixtures;
pub mod io;
pub mod records;
pub mod store;

pub use fixtures::DemoDataset;
pub use io::{read_records, write_records, FileError, FileFormat};
pub use records::{ProspectRecord, RecordError};
pub use store::{ExportFilter, FieldUpdate, NewProspect, ProspectStore, StoreError};
