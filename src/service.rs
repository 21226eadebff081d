//! The metadata service.
//!
//! [`MetadataService`] is a read-only façade over two handles supplied by
//! the caller: a [`MappingSource`] answering entity mapping questions and a
//! [`DbConnection`] used to read a table's schema from the catalog.
//!
//! # Example
//!
//! ```ignore
//! use tablemeta::prelude::*;
//!
//! let registry = ModelRegistry::from_file("mappings.toml", Conventions::default())?;
//! let mut conn = SqliteConnection::new("./app.db");
//!
//! let mut service = MetadataService::new(&registry, &mut conn);
//! let table = service.table_name_of(&EntityType::named("Order"))?;
//! let schema = service.table_schema("Orders")?;
//! println!("{schema}");
//! ```

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::connection::{ConnectionState, DbConnection};
use crate::error::{MetadataError, MetadataResult};
use crate::mapping::{EntityType, MappingSource, PropertyMap};
use crate::schema::{CatalogQuery, SchemaTable};

/// What happens to the connection once a schema fetch is over.
///
/// The policy is applied on every exit path, failures included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPolicy {
    /// Close the connection if it is not already closed.
    #[default]
    Close,
    /// Put the connection back in the state it was in before the call.
    Restore,
}

/// Connection opened for one schema fetch; settles the policy on drop.
struct ConnectionScope<'a, C: DbConnection> {
    connection: &'a mut C,
    was_open: bool,
    policy: ConnectionPolicy,
    settled: bool,
}

impl<'a, C: DbConnection> ConnectionScope<'a, C> {
    fn acquire(connection: &'a mut C, policy: ConnectionPolicy) -> Result<Self, C::Error> {
        let was_open = connection.state().is_open();
        if !was_open {
            connection.open()?;
            debug!("opened connection for schema fetch");
        }

        Ok(Self {
            connection,
            was_open,
            policy,
            settled: false,
        })
    }

    fn should_close(&self) -> bool {
        if self.connection.state() == ConnectionState::Closed {
            return false;
        }
        match self.policy {
            ConnectionPolicy::Close => true,
            ConnectionPolicy::Restore => !self.was_open,
        }
    }

    /// Settle the policy on the success path, reporting a failed close.
    fn release(mut self) -> Result<(), C::Error> {
        self.settled = true;
        if self.should_close() {
            self.connection.close()?;
            debug!("closed connection after schema fetch");
        }
        Ok(())
    }
}

impl<C: DbConnection> Deref for ConnectionScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.connection
    }
}

impl<C: DbConnection> DerefMut for ConnectionScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.connection
    }
}

impl<C: DbConnection> Drop for ConnectionScope<'_, C> {
    fn drop(&mut self) {
        if self.settled || !self.should_close() {
            return;
        }
        // The fetch already failed; its error wins over this one.
        if let Err(e) = self.connection.close() {
            warn!(error = %e, "failed to close connection after failed schema fetch");
        }
    }
}

/// Read-only metadata façade over a mapping source and a connection.
///
/// Both handles belong to the caller; pass references (`&registry`,
/// `&mut conn`) to keep ownership outside the service. Teardown happens once:
/// [`dispose`](Self::dispose) (or drop) closes the connection if open, and
/// every later call fails with [`MetadataError::Disposed`].
pub struct MetadataService<M: MappingSource, C: DbConnection> {
    mapping: M,
    connection: C,
    catalog: CatalogQuery,
    policy: ConnectionPolicy,
    disposed: bool,
}

impl<M: MappingSource, C: DbConnection> MetadataService<M, C> {
    /// Create a service using the default catalog query and policy.
    pub fn new(mapping: M, connection: C) -> Self {
        Self {
            mapping,
            connection,
            catalog: CatalogQuery::default(),
            policy: ConnectionPolicy::default(),
            disposed: false,
        }
    }

    pub fn with_catalog(mut self, catalog: CatalogQuery) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &CatalogQuery {
        &self.catalog
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    pub fn mapping_source(&self) -> &M {
        &self.mapping
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Mapping lookups
    // =========================================================================

    /// Table name mapped for `T`, or `None` if `T` is unmapped.
    pub fn table_name<T: ?Sized + 'static>(&self) -> MetadataResult<Option<String>> {
        self.table_name_of(&EntityType::of::<T>())
    }

    /// Table name mapped for `entity`, or `None` if it is unmapped.
    pub fn table_name_of(&self, entity: &EntityType) -> MetadataResult<Option<String>> {
        self.check_entity(entity)?;
        let table = self
            .mapping
            .resolve_table_name(entity)
            .map_err(MetadataError::mapping)?;
        debug!(entity = %entity, table = ?table, "resolved table name");
        Ok(table)
    }

    /// Field to column mapping for `T`, or `None` if `T` is unmapped.
    pub fn mappings<T: ?Sized + 'static>(&self) -> MetadataResult<Option<PropertyMap>> {
        self.mappings_of(&EntityType::of::<T>())
    }

    /// Field to column mapping for `entity`, or `None` if it is unmapped.
    pub fn mappings_of(&self, entity: &EntityType) -> MetadataResult<Option<PropertyMap>> {
        self.check_entity(entity)?;
        let mappings = self
            .mapping
            .resolve_mappings(entity)
            .map_err(MetadataError::mapping)?;
        debug!(
            entity = %entity,
            columns = mappings.as_ref().map_or(0, |m| m.len()),
            "resolved mappings"
        );
        Ok(mappings)
    }

    /// Primary-key column names of `T`, in key order.
    pub fn key_names<T: ?Sized + 'static>(&self) -> MetadataResult<Vec<String>> {
        self.key_names_of(&EntityType::of::<T>())
    }

    /// Primary-key column names of `entity`, in key order.
    pub fn key_names_of(&self, entity: &EntityType) -> MetadataResult<Vec<String>> {
        self.check_entity(entity)?;
        let keys = self
            .mapping
            .resolve_key_names(entity)
            .map_err(MetadataError::mapping)?;
        debug!(entity = %entity, keys = ?keys, "resolved key names");
        Ok(keys)
    }

    fn check_entity(&self, entity: &EntityType) -> MetadataResult<()> {
        self.ensure_live()?;
        if entity.is_blank() {
            return Err(MetadataError::null_argument("entity"));
        }
        Ok(())
    }

    // =========================================================================
    // Schema fetch
    // =========================================================================

    /// Read the schema of `table_name` from the database catalog.
    ///
    /// Opens the connection if needed, runs the catalog query and loads the
    /// result into a new [`SchemaTable`] named `table_name`. The connection
    /// policy is applied afterwards whether or not the fetch succeeded.
    /// Driver errors are returned as [`MetadataError::Driver`] unchanged.
    pub fn table_schema(&mut self, table_name: &str) -> MetadataResult<SchemaTable> {
        self.ensure_live()?;
        if table_name.trim().is_empty() {
            return Err(MetadataError::blank_argument("table_name"));
        }

        let command = self.catalog.command_for(table_name);
        trace!(table = table_name, sql = %command.text, "catalog query");

        let mut scope = ConnectionScope::acquire(&mut self.connection, self.policy)
            .map_err(MetadataError::driver)?;
        let table = scope
            .execute_reader(&command, |reader| SchemaTable::load(table_name, reader))
            .map_err(MetadataError::driver)?;
        scope.release().map_err(MetadataError::driver)?;

        debug!(
            table = table_name,
            columns = table.columns.len(),
            rows = table.row_count(),
            "loaded table schema"
        );
        Ok(table)
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release the connection. Only the first call does anything.
    pub fn dispose(&mut self) -> MetadataResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        if self.connection.state().is_open() {
            self.connection.close().map_err(MetadataError::driver)?;
            debug!("closed connection on dispose");
        }
        Ok(())
    }

    fn ensure_live(&self) -> MetadataResult<()> {
        if self.disposed {
            Err(MetadataError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl<M: MappingSource, C: DbConnection> Drop for MetadataService<M, C> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!(error = %e, "failed to dispose metadata service");
        }
    }
}
