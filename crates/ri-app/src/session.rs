//! Per-user session context: uploaded tables and conversation

use ri_core::{table_name_for_slot, Conversation, SchemaDescriptor};
use ri_data::{Backend, CsvIngestor, DataError, IngestConfig, TableStore, Upload};
use tracing::{debug, info};

/// Identity of an uploaded file, used to detect re-uploads
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    name: String,
    len: usize,
}

impl From<&Upload> for Fingerprint {
    fn from(upload: &Upload) -> Self {
        Self {
            name: upload.name.clone(),
            len: upload.bytes.len(),
        }
    }
}

/// State carried between interactions of one user
pub struct Session {
    backend: Backend,
    ingestor: CsvIngestor,
    stores: Vec<TableStore>,
    fingerprints: Vec<Fingerprint>,
    conversation: Conversation,
}

impl Session {
    pub fn new(backend: Backend, ingest: IngestConfig) -> Self {
        Self {
            backend,
            ingestor: CsvIngestor::new(ingest),
            stores: Vec::new(),
            fingerprints: Vec::new(),
            conversation: Conversation::new(),
        }
    }

    /// Bring the stores in line with the current set of uploads.
    ///
    /// Slots are rebuilt from scratch whenever the set changes. Every file
    /// is parsed before any table is touched, and all slots load in one
    /// transaction: on failure the previous tables and stores stay as they
    /// were. Returns whether anything changed.
    pub fn sync_uploads(&mut self, uploads: &[Upload]) -> Result<bool, DataError> {
        let fingerprints: Vec<Fingerprint> = uploads.iter().map(Fingerprint::from).collect();
        if fingerprints == self.fingerprints {
            debug!("Uploads unchanged ({} files)", uploads.len());
            return Ok(false);
        }

        let tables = uploads
            .iter()
            .enumerate()
            .map(|(slot, upload)| self.ingestor.ingest(upload, &table_name_for_slot(slot)))
            .collect::<Result<Vec<_>, _>>()?;

        self.stores = TableStore::load_all(&self.backend, &tables, self.stores.len())?;
        self.fingerprints = fingerprints;

        info!("Registered {} uploaded tables", self.stores.len());
        Ok(true)
    }

    pub fn has_data(&self) -> bool {
        !self.stores.is_empty()
    }

    pub fn stores(&self) -> &[TableStore] {
        &self.stores
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Schema descriptors of every registered table, in slot order
    pub fn schemas(&self) -> Result<Vec<SchemaDescriptor>, DataError> {
        self.stores.iter().map(TableStore::describe).collect()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Backend::in_memory().unwrap(), IngestConfig::default())
    }

    fn orders() -> Upload {
        Upload::new(
            "orders.csv",
            "Order_ID,Date,Total_Amount\n1,2024-01-01,100\n2,2024-01-02,200\n",
        )
    }

    fn products() -> Upload {
        Upload::new("products.csv", "product_name;price\nTea;2.5\n")
    }

    #[test]
    fn test_first_upload_creates_stores() {
        let mut session = session();
        assert!(!session.has_data());

        assert!(session.sync_uploads(&[orders(), products()]).unwrap());
        let names: Vec<&str> = session.stores().iter().map(|s| s.table_name()).collect();
        assert_eq!(names, vec!["retail_ingest_data_1", "retail_ingest_data_2"]);

        let schemas = session.schemas().unwrap();
        assert_eq!(schemas[1].column_names(), vec!["product_name", "price"]);
    }

    #[test]
    fn test_same_uploads_are_not_reloaded() {
        let mut session = session();
        session.sync_uploads(&[orders()]).unwrap();
        assert!(!session.sync_uploads(&[orders()]).unwrap());
    }

    #[test]
    fn test_reupload_replaces_slots() {
        let mut session = session();
        session.sync_uploads(&[orders(), products()]).unwrap();

        assert!(session.sync_uploads(&[products()]).unwrap());
        assert_eq!(session.stores().len(), 1);
        let schema = &session.schemas().unwrap()[0];
        assert_eq!(schema.column_names(), vec!["product_name", "price"]);
        assert!(!session.backend().has_table("retail_ingest_data_2").unwrap());
    }

    #[test]
    fn test_backend_failure_keeps_previous_tables() {
        let mut session = session();
        session.sync_uploads(&[orders()]).unwrap();

        let header: Vec<String> = (0..2001).map(|i| format!("c{}", i)).collect();
        let row = vec!["1"; 2001];
        let wide = Upload::new("wide.csv", format!("{}\n{}\n", header.join(","), row.join(",")));

        assert!(matches!(
            session.sync_uploads(&[products(), wide]),
            Err(DataError::Backend(_))
        ));
        assert_eq!(session.stores().len(), 1);
        let schema = &session.schemas().unwrap()[0];
        assert_eq!(schema.column_names(), vec!["order_id", "date", "total_amount"]);
        assert_eq!(schema.row_count, 2);
        assert!(!session.backend().has_table("retail_ingest_data_2").unwrap());

        // The failed set is not remembered, so retrying reloads it
        assert!(session.sync_uploads(&[products()]).unwrap());
    }

    #[test]
    fn test_failed_upload_keeps_previous_tables() {
        let mut session = session();
        session.sync_uploads(&[orders()]).unwrap();

        let broken = Upload::new("broken.csv", "a,b\n1,2,3\n");
        assert!(matches!(
            session.sync_uploads(&[orders(), broken]),
            Err(DataError::Ingestion { .. })
        ));
        assert_eq!(session.stores().len(), 1);
        assert_eq!(session.schemas().unwrap()[0].row_count, 2);
    }
}
