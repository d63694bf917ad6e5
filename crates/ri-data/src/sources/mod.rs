pub mod csv_source;
pub mod dialect;
pub mod sqlite_source;

pub use csv_source::{CsvIngestor, Upload};
pub use dialect::{Dialect, Sniffer};
pub use sqlite_source::{Backend, TableStore};
