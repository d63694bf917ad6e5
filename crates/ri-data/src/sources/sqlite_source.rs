//! SQLite backend shared by all table stores of a session

use std::fs;
use std::sync::Arc;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, Transaction};
use ri_core::{naming, ColumnKind, ColumnSchema, SchemaDescriptor};
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::result::ResultSet;
use crate::schema;
use crate::table::TypedTable;
use crate::DataError;

/// Synthetic auto-incrementing identity column of every stored table
pub const IDENTITY_COLUMN: &str = "_row_id";

/// Double-quote an identifier for use in SQL text
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One SQLite connection, shared by every table store and used directly
/// for queries that span several tables.
#[derive(Clone)]
pub struct Backend {
    conn: Arc<Mutex<Connection>>,
    config: Arc<BackendConfig>,
}

impl Backend {
    /// Open the configured database, creating it on first use when allowed
    pub fn open(config: BackendConfig) -> Result<Self, DataError> {
        let conn = if config.is_in_memory() {
            debug!("Opening in-memory database");
            Connection::open_in_memory()?
        } else {
            let path = &config.database_path;
            if !path.exists() {
                if !config.create_if_missing {
                    return Err(DataError::Backend(format!(
                        "database '{}' does not exist",
                        config.location()
                    )));
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                info!("Creating database {}", config.location());
            }
            Connection::open(path)?
        };

        info!("Backend ready at {}", config.location());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        })
    }

    /// Private in-memory database with default settings
    pub fn in_memory() -> Result<Self, DataError> {
        Self::open(BackendConfig::in_memory())
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Execute raw query text against the shared connection
    pub fn query(&self, sql: &str) -> Result<ResultSet, DataError> {
        let conn = self.conn.lock();
        run_query(&conn, sql, self.config.read_only_queries)
    }

    pub fn has_table(&self, name: &str) -> Result<bool, DataError> {
        let conn = self.conn.lock();
        table_exists(&conn, name)
    }

    /// Run `f` while holding the connection
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, DataError>,
    ) -> Result<T, DataError> {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Run `f` inside one transaction; nothing is kept unless `f` succeeds
    pub(crate) fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, DataError>,
    ) -> Result<T, DataError> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, DataError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn run_query(conn: &Connection, sql: &str, read_only: bool) -> Result<ResultSet, DataError> {
    debug!("Executing query: {}", sql);
    let mut stmt = conn.prepare(sql.trim()).map_err(|e| DataError::query(sql, e))?;
    if read_only && !stmt.readonly() {
        return Err(DataError::query(sql, "statement would modify the database"));
    }
    let result = ResultSet::from_statement(&mut stmt).map_err(|e| DataError::query(sql, e))?;
    debug!("Query returned {} rows", result.num_rows());
    Ok(result)
}

fn create_table_sql(table_name: &str, columns: &[ColumnSchema], if_not_exists: bool) -> String {
    let mut defs = vec![format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_ident(IDENTITY_COLUMN)
    )];
    defs.extend(columns.iter().map(|c| {
        let decl = match c.kind {
            ColumnKind::Numeric => "NUMERIC",
            ColumnKind::Text => "TEXT",
        };
        format!("{} {}", quote_ident(&c.name), decl)
    }));

    format!(
        "CREATE TABLE {}{} ({})",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        quote_ident(table_name),
        defs.join(", ")
    )
}

/// Drop and recreate `table_name`, then insert every row of `table`
fn replace_rows(conn: &Connection, table_name: &str, table: &TypedTable) -> Result<(), DataError> {
    let columns = table.columns();
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)))?;
    conn.execute_batch(&create_table_sql(table_name, &columns, false))?;
    let mut stmt = conn.prepare(&insert_sql(table_name, &columns))?;
    for row in 0..table.num_rows() {
        stmt.execute(params_from_iter(table.row_values(row)))?;
    }
    Ok(())
}

fn insert_sql(table_name: &str, columns: &[ColumnSchema]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table_name));
    }
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Lifecycle of one uploaded table inside the shared backend
pub struct TableStore {
    backend: Backend,
    slot: usize,
    table_name: String,
    columns: Vec<ColumnSchema>,
}

impl TableStore {
    /// Store for upload `slot` (0-based). The backing table is created if absent.
    pub fn new(
        backend: Backend,
        slot: usize,
        columns: Vec<ColumnSchema>,
    ) -> Result<Self, DataError> {
        let store = Self {
            backend,
            slot,
            table_name: naming::table_name_for_slot(slot),
            columns,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Store for `table`, with its rows loaded
    pub fn from_table(
        backend: Backend,
        slot: usize,
        table: &TypedTable,
    ) -> Result<Self, DataError> {
        let mut store = Self::new(backend, slot, table.columns())?;
        store.load(table)?;
        Ok(store)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Create the backing table unless it already exists
    pub fn ensure_schema(&self) -> Result<(), DataError> {
        self.backend.with_connection(|conn| {
            if table_exists(conn, &self.table_name)? {
                debug!("Table {} already present", self.table_name);
                return Ok(());
            }
            conn.execute_batch(&create_table_sql(&self.table_name, &self.columns, true))?;
            info!("Created table {} with {} columns", self.table_name, self.columns.len());
            Ok(())
        })
    }

    /// Stores for slots `0..tables.len()`, all loaded in one transaction.
    ///
    /// Tables for slots at or beyond `tables.len()` up to `retire` are
    /// dropped in the same transaction. On any failure every table keeps
    /// its previous contents.
    pub fn load_all(
        backend: &Backend,
        tables: &[TypedTable],
        retire: usize,
    ) -> Result<Vec<Self>, DataError> {
        let stores = backend.with_transaction(|tx| {
            let stores = tables
                .iter()
                .enumerate()
                .map(|(slot, table)| {
                    let table_name = naming::table_name_for_slot(slot);
                    replace_rows(tx, &table_name, table)?;
                    Ok(Self {
                        backend: backend.clone(),
                        slot,
                        table_name,
                        columns: table.columns(),
                    })
                })
                .collect::<Result<Vec<_>, DataError>>()?;
            for slot in tables.len()..retire {
                let table_name = naming::table_name_for_slot(slot);
                tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(&table_name)))?;
                debug!("Dropped table {}", table_name);
            }
            Ok(stores)
        })?;

        info!("Loaded {} tables", stores.len());
        Ok(stores)
    }

    /// Replace every row of the backing table with the contents of `table`
    pub fn load(&mut self, table: &TypedTable) -> Result<(), DataError> {
        self.backend
            .with_transaction(|tx| replace_rows(tx, &self.table_name, table))?;

        info!("Loaded {} rows into {}", table.num_rows(), self.table_name);
        self.columns = table.columns();
        Ok(())
    }

    /// Schema descriptor of the live table
    pub fn describe(&self) -> Result<SchemaDescriptor, DataError> {
        let sample_rows = self.backend.config().sample_rows;
        self.backend
            .with_connection(|conn| schema::describe_table(conn, &self.table_name, sample_rows))
    }

    /// Execute raw query text
    pub fn query(&self, sql: &str) -> Result<ResultSet, DataError> {
        let read_only = self.backend.config().read_only_queries;
        self.backend.with_connection(|conn| run_query(conn, sql, read_only))
    }
}
