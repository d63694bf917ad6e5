//! Routing of generated queries to table stores

use ri_core::{extract_table_names, slot_for_table_name};
use tracing::{debug, info};

use crate::result::ResultSet;
use crate::sources::{Backend, TableStore};
use crate::DataError;

/// Query text meaning "nothing to run"
pub const NO_QUERY_SENTINEL: &str = "none";

/// Where a generated query executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Sentinel, empty text, or no known table named
    NoQuery,
    /// Exactly one table named; runs on its store
    Single { table: String, slot: usize },
    /// Several tables named; runs on the shared connection
    Multi { tables: Vec<String> },
}

/// Decides which store runs a generated query, then runs it
pub struct QueryDispatcher<'a> {
    stores: &'a [TableStore],
    backend: &'a Backend,
}

impl<'a> QueryDispatcher<'a> {
    /// `stores` must be ordered by slot
    pub fn new(stores: &'a [TableStore], backend: &'a Backend) -> Self {
        Self { stores, backend }
    }

    /// Pick the route for `sql` without executing anything
    pub fn plan(&self, sql: &str) -> Result<Route, DataError> {
        let text = sql.trim();
        if text.is_empty() || text.eq_ignore_ascii_case(NO_QUERY_SENTINEL) {
            return Ok(Route::NoQuery);
        }

        let names = extract_table_names(text);
        let mut slots = Vec::with_capacity(names.len());
        for name in &names {
            slots.push(self.resolve(name)?);
        }

        let route = match names.len() {
            0 => Route::NoQuery,
            1 => Route::Single {
                table: names[0].clone(),
                slot: slots[0],
            },
            _ => Route::Multi {
                tables: names.into_iter().collect(),
            },
        };
        Ok(route)
    }

    /// Execute `sql` on its route. `None` means nothing was run.
    pub fn dispatch(&self, sql: &str) -> Result<Option<ResultSet>, DataError> {
        let route = self.plan(sql)?;
        info!("Query route: {:?}", route);
        debug!("Routed query: {}", sql);

        match route {
            Route::NoQuery => Ok(None),
            Route::Single { slot, .. } => {
                let store = &self.stores[slot];
                store.query(sql).map(Some)
            }
            Route::Multi { .. } => self.backend.query(sql).map(Some),
        }
    }

    /// Slot of a registered store for a table name
    fn resolve(&self, name: &str) -> Result<usize, DataError> {
        slot_for_table_name(name)
            .filter(|&slot| {
                self.stores
                    .get(slot)
                    .map_or(false, |store| store.table_name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| DataError::UnknownTable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{CsvIngestor, Upload};

    fn session(files: &[&str]) -> (Backend, Vec<TableStore>) {
        let backend = Backend::in_memory().unwrap();
        let ingestor = CsvIngestor::default();
        let stores = files
            .iter()
            .enumerate()
            .map(|(slot, content)| {
                let name = ri_core::table_name_for_slot(slot);
                let table = ingestor
                    .ingest(&Upload::new(format!("file{}.csv", slot + 1), *content), &name)
                    .unwrap();
                TableStore::from_table(backend.clone(), slot, &table).unwrap()
            })
            .collect();
        (backend, stores)
    }

    fn three_uploads() -> (Backend, Vec<TableStore>) {
        session(&[
            "store,region\nA,North\n",
            "store,quantity\nA,5\nB,7\n",
            "store,price\nA,1.5\nB,2\nC,4\n",
        ])
    }

    #[test]
    fn test_repeated_name_routes_single() {
        let (backend, stores) = three_uploads();
        let dispatcher = QueryDispatcher::new(&stores, &backend);

        let route = dispatcher
            .plan(
                "SELECT * FROM retail_ingest_data_2 \
                 WHERE quantity > (SELECT AVG(quantity) FROM retail_ingest_data_2)",
            )
            .unwrap();
        assert_eq!(
            route,
            Route::Single {
                table: "retail_ingest_data_2".to_string(),
                slot: 1
            }
        );
    }

    #[test]
    fn test_third_name_hits_third_upload() {
        let (backend, stores) = three_uploads();
        let dispatcher = QueryDispatcher::new(&stores, &backend);

        let result = dispatcher
            .dispatch("SELECT COUNT(*) AS n, SUM(price) AS total FROM RETAIL_INGEST_DATA_3")
            .unwrap()
            .unwrap();
        assert_eq!(result.value_as_f64(0, 0), Some(3.0));
        assert_eq!(result.value_as_f64(1, 0), Some(7.5));
        assert_eq!(
            dispatcher.plan("select * from retail_ingest_data_3").unwrap(),
            Route::Single {
                table: "retail_ingest_data_3".to_string(),
                slot: 2
            }
        );
    }

    #[test]
    fn test_sentinel_never_executes() {
        let (backend, stores) = three_uploads();
        let dispatcher = QueryDispatcher::new(&stores, &backend);

        for sql in ["none", "NONE", "  None ", ""] {
            assert_eq!(dispatcher.plan(sql).unwrap(), Route::NoQuery);
            assert!(dispatcher.dispatch(sql).unwrap().is_none());
        }
        assert_eq!(dispatcher.plan("SELECT 1").unwrap(), Route::NoQuery);
    }

    #[test]
    fn test_join_routes_multi() {
        let (backend, stores) = three_uploads();
        let dispatcher = QueryDispatcher::new(&stores, &backend);

        let sql = "SELECT q.store, q.quantity * p.price AS revenue \
                   FROM retail_ingest_data_2 q JOIN retail_ingest_data_3 p ON q.store = p.store \
                   ORDER BY q.store";
        assert_eq!(
            dispatcher.plan(sql).unwrap(),
            Route::Multi {
                tables: vec!["retail_ingest_data_2".to_string(), "retail_ingest_data_3".to_string()]
            }
        );

        let result = dispatcher.dispatch(sql).unwrap().unwrap();
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.label(0, 0), "A");
        assert_eq!(result.value_as_f64(1, 0), Some(7.5));
        assert_eq!(result.value_as_f64(1, 1), Some(14.0));
    }

    #[test]
    fn test_unknown_table() {
        let (backend, stores) = three_uploads();
        let dispatcher = QueryDispatcher::new(&stores, &backend);

        for sql in [
            "SELECT * FROM retail_ingest_data_4",
            "SELECT * FROM retail_ingest_data_0",
            "SELECT * FROM retail_ingest_data_1 JOIN retail_ingest_data_9",
        ] {
            assert!(matches!(dispatcher.plan(sql), Err(DataError::UnknownTable(_))));
        }
    }
}
