//! The store facade.
//!
//! [`Store`] ties the pieces together: it loads and validates both configs,
//! opens the database, reconciles the table, and then serves the add, read,
//! update and watchlist operations against that one table.

use std::collections::HashSet;

use rusqlite::Connection;
use serde_json::Value;
use stock_store_config::{StoreConfig, load_mapping_config, load_schema_config};
use stock_store_core::{
    Filter, Row, SchemaConfig, is_identifier, require_columns, validate_mapping,
    validate_schema_config,
};
use stock_store_provider::{ApiTranslator, HttpTransport, Transport};
use stock_store_sqlite::{ReconcileReport, Reconciler, SqliteError, StockTable};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};

/// Column identifying a security.
pub const ISIN_COLUMN: &str = "isin";
/// Column flagging watchlist membership.
pub const WATCHLIST_COLUMN: &str = "watchlist";

/// Outcome of a bulk update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Rows overwritten.
    pub updated: usize,
    /// Payloads ignored because their ISIN was not eligible.
    pub skipped: usize,
}

/// ISIN-keyed stock metadata store backed by one SQLite table.
///
/// # Examples
///
/// ```no_run
/// use stock_store::{Store, StoreConfig};
///
/// let store = Store::open(&StoreConfig::new("stocks.db")).unwrap();
/// store.add_isin("DE0007164600").unwrap();
/// store.set_watchlist("DE0007164600", true).unwrap();
///
/// for row in store.get_watchlist(None).unwrap() {
///     println!("{:?}", row.get_str("symbol"));
/// }
/// store.close().unwrap();
/// ```
pub struct Store {
    conn: Connection,
    schema: SchemaConfig,
    table: String,
    search_api: String,
    translator: ApiTranslator,
    reconcile_report: ReconcileReport,
}

impl Store {
    /// Opens the store, fetching provider data over HTTP.
    ///
    /// See [`Store::open_with_transport`].
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Self::open_with_transport(config, Box::new(transport))
    }

    /// Opens the store with a caller-supplied transport.
    ///
    /// Startup runs in this order, stopping at the first failure:
    ///
    /// 1. load the schema and field-mapping configs;
    /// 2. validate the schema, its `isin`/`watchlist` columns, the table
    ///    name and every mapping target;
    /// 3. resolve the API credential;
    /// 4. open the database;
    /// 5. reconcile the table with the schema.
    ///
    /// Nothing touches the database file before step 4, and a failing step
    /// 5 closes the connection again.
    pub fn open_with_transport(
        config: &StoreConfig,
        transport: Box<dyn Transport + Send>,
    ) -> Result<Self> {
        let schema = load_schema_config(&config.schema_config)?;
        let apis = load_mapping_config(&config.mapping_config)?;

        validate_schema_config(&schema)?;
        require_columns(&schema, &[ISIN_COLUMN, WATCHLIST_COLUMN])?;
        if !is_identifier(&config.table) {
            return Err(SqliteError::InvalidIdentifier(config.table.clone()).into());
        }
        validate_mapping(&apis, &schema)?;

        let api_key = config.credential.resolve()?;

        let conn = Connection::open(&config.db_path)?;
        let reconcile_report = Reconciler::new(&conn, config.table.as_str())?.reconcile(&schema)?;

        info!(
            db = %config.db_path.display(),
            table = %config.table,
            columns = schema.len(),
            apis = apis.len(),
            "opened stock store"
        );

        Ok(Self {
            conn,
            schema,
            table: config.table.clone(),
            search_api: config.search_api.clone(),
            translator: ApiTranslator::new(apis, api_key, transport),
            reconcile_report,
        })
    }

    /// Closes the database connection, reporting any error.
    ///
    /// Dropping the store also closes it, silently.
    pub fn close(self) -> Result<()> {
        let Store { conn, table, .. } = self;
        conn.close().map_err(|(_, err)| StoreError::from(err))?;
        info!(table = %table, "closed stock store");
        Ok(())
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// What startup reconciliation changed on the table.
    pub fn reconcile_report(&self) -> &ReconcileReport {
        &self.reconcile_report
    }

    /// Fetches `isin` through the search API and stores the mapped row.
    ///
    /// If the mapping does not produce an `isin` value, the requested one is
    /// stored. Returns the row as written.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateIsin`] if the ISIN is already stored, in which
    /// case no request is made, or if the provider reports an ISIN that is
    /// already stored. Provider and write failures propagate, and nothing is
    /// stored.
    pub fn add_isin(&self, isin: &str) -> Result<Row> {
        let stocks = self.stocks()?;
        if stocks.select_one(&isin_filter(isin))?.is_some() {
            warn!(isin, "isin already stored");
            return Err(StoreError::DuplicateIsin(isin.to_string()));
        }

        let mut row = self.translator.fetch_and_map(&self.search_api, isin)?;
        row.insert_if_absent(ISIN_COLUMN, isin);

        // The provider may normalize the ISIN it was asked for.
        if let Some(mapped) = row.get(ISIN_COLUMN).filter(|v| v.as_str() != Some(isin)) {
            let filter = Filter::new().eq(ISIN_COLUMN, mapped.clone());
            if stocks.select_one(&filter)?.is_some() {
                let mapped = mapped.as_str().map_or_else(|| mapped.to_string(), str::to_string);
                warn!(isin, mapped = %mapped, "provider isin already stored");
                return Err(StoreError::DuplicateIsin(mapped));
            }
        }

        stocks.insert(&row)?;
        info!(isin, api = %self.search_api, "added stock");
        Ok(row)
    }

    /// Returns every stored row matching `filter`, in insertion order.
    pub fn get_all(&self, filter: Option<&Filter>) -> Result<Vec<Row>> {
        let filter = filter.cloned().unwrap_or_default();
        self.select(&filter)
    }

    /// Returns the watchlist rows matching `filter`.
    pub fn get_watchlist(&self, filter: Option<&Filter>) -> Result<Vec<Row>> {
        self.select(&with_extra(watchlist_filter(), filter))
    }

    /// Returns the row for `isin` if it exists and matches `filter`.
    pub fn get_entry(&self, isin: &str, filter: Option<&Filter>) -> Result<Option<Row>> {
        let filter = with_extra(isin_filter(isin), filter);
        self.check_filter(&filter)?;
        Ok(self.stocks()?.select_one(&filter)?)
    }

    /// Overwrites the mapped columns of `isin`'s row with `api_data`, an
    /// entry as returned by `api_name`.
    ///
    /// The ISIN stays the key. The watchlist flag and every column the
    /// mapping does not target keep their values.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row has this ISIN; mapping failures
    /// from the provider layer.
    pub fn update_entry(&self, isin: &str, api_data: &Value, api_name: &str) -> Result<()> {
        let mapped = self.translator.map_entry(api_name, api_data)?;
        let row = set_list(mapped, isin);
        self.stocks()?.update(&row, ISIN_COLUMN, &Value::from(isin))?;
        debug!(isin, api = api_name, "updated stock");
        Ok(())
    }

    /// Applies [`update_entry`](Self::update_entry) to every payload, keyed
    /// by each payload's mapped `isin`.
    ///
    /// The batch is all-or-nothing: any failure leaves every row unchanged.
    pub fn update_all(&self, api_data_list: &[Value], api_name: &str) -> Result<UpdateReport> {
        self.update_many(api_data_list, api_name, None)
    }

    /// Like [`update_all`](Self::update_all), but only rows currently on
    /// the watchlist are updated. Payloads for other ISINs are skipped.
    pub fn update_watchlist(&self, api_data_list: &[Value], api_name: &str) -> Result<UpdateReport> {
        let watched: HashSet<String> = self
            .select(&watchlist_filter())?
            .iter()
            .filter_map(|row| row.get_str(ISIN_COLUMN).map(str::to_string))
            .collect();
        self.update_many(api_data_list, api_name, Some(&watched))
    }

    /// Adds `isin` to the watchlist or removes it.
    pub fn set_watchlist(&self, isin: &str, state: bool) -> Result<()> {
        self.stocks()?
            .set_column(ISIN_COLUMN, &Value::from(isin), WATCHLIST_COLUMN, state)?;
        info!(isin, state, "set watchlist");
        Ok(())
    }

    fn stocks(&self) -> Result<StockTable<'_>> {
        Ok(StockTable::new(&self.conn, self.table.as_str())?)
    }

    fn select(&self, filter: &Filter) -> Result<Vec<Row>> {
        self.check_filter(filter)?;
        Ok(self.stocks()?.select(filter)?)
    }

    fn check_filter(&self, filter: &Filter) -> Result<()> {
        match filter.columns().find(|column| !self.schema.contains(column)) {
            Some(column) => Err(StoreError::UnknownColumn(column.to_string())),
            None => Ok(()),
        }
    }

    fn update_many(
        &self,
        api_data_list: &[Value],
        api_name: &str,
        eligible: Option<&HashSet<String>>,
    ) -> Result<UpdateReport> {
        let mut report = UpdateReport::default();
        let mut updates = Vec::with_capacity(api_data_list.len());

        for api_data in api_data_list {
            let mapped = self.translator.map_entry(api_name, api_data)?;
            let isin = mapped
                .get_str(ISIN_COLUMN)
                .filter(|isin| !isin.is_empty())
                .ok_or_else(|| StoreError::MissingIsin {
                    api: api_name.to_string(),
                })?
                .to_string();

            if eligible.is_some_and(|set| !set.contains(&isin)) {
                debug!(isin = %isin, "not on watchlist, skipped");
                report.skipped += 1;
                continue;
            }

            let row = set_list(mapped, &isin);
            updates.push((Value::from(isin), row));
        }

        if !updates.is_empty() {
            self.stocks()?.update_batch(ISIN_COLUMN, &updates)?;
        }
        report.updated = updates.len();
        info!(
            api = api_name,
            updated = report.updated,
            skipped = report.skipped,
            "bulk update"
        );
        Ok(report)
    }
}

/// The columns an update writes: everything mapped except the watchlist
/// flag, with the key pinned to `isin`.
fn set_list(mapped: Row, isin: &str) -> Row {
    let mut row = mapped.without(WATCHLIST_COLUMN);
    row.insert(ISIN_COLUMN, isin);
    row
}

fn isin_filter(isin: &str) -> Filter {
    Filter::new().eq(ISIN_COLUMN, isin)
}

fn watchlist_filter() -> Filter {
    Filter::new().eq(WATCHLIST_COLUMN, true)
}

fn with_extra(base: Filter, extra: Option<&Filter>) -> Filter {
    match extra {
        Some(extra) => base.and(extra),
        None => base,
    }
}
