use std::sync::{Arc, OnceLock};

use log::{debug, warn};
use tracing::info_span;

use crate::connection::{Connection, ConnectionProvider, DatabaseConfig, PreparedStatement};
use crate::core::{Error, Result};
use crate::entity::binder::{self, Identifier};
use crate::entity::{Entity, EntityMetadata, MappedRows, Phase};
use crate::result::QueryResult;
use crate::translation::{self, DatabaseTranslation};

use super::registry::EntityRegistry;

/// Entry point for mapped reads and writes.
///
/// Every operation takes its own connection from the provider and drops it
/// before returning. Mapping metadata and the selected translation are
/// cached for the lifetime of the handle.
pub struct Database {
    provider: Box<dyn ConnectionProvider>,
    config: DatabaseConfig,
    translation: OnceLock<Arc<dyn DatabaseTranslation>>,
    registry: EntityRegistry,
}

impl Database {
    pub fn new(provider: impl ConnectionProvider + 'static) -> Self {
        Self::with_config(provider, DatabaseConfig::default())
    }

    pub fn with_config(provider: impl ConnectionProvider + 'static, config: DatabaseConfig) -> Self {
        Self {
            provider: Box::new(provider),
            config,
            translation: OnceLock::new(),
            registry: EntityRegistry::new(),
        }
    }

    /// Uses `translation` instead of probing the connection.
    pub fn with_translation(
        provider: impl ConnectionProvider + 'static,
        translation: Arc<dyn DatabaseTranslation>,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            config: DatabaseConfig::default(),
            translation: OnceLock::from(translation),
            registry: EntityRegistry::new(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The dialect used for generated SQL, resolved on first use.
    pub fn translation(&self) -> Result<Arc<dyn DatabaseTranslation>> {
        if let Some(selected) = self.translation.get() {
            return Ok(selected.clone());
        }

        let resolved = match &self.config.translation {
            Some(name) => translation::by_name(name).ok_or_else(|| {
                Error::MappingConstruction(format!("Unknown translation: {}", name))
            })?,
            None => {
                let product = self.connection()?.product_name()?;
                let selected = translation::for_product(&product);
                if selected.name() == "ansi" {
                    warn!("no translation for database product '{}', using ansi", product);
                } else {
                    debug!("using {} translation for '{}'", selected.name(), product);
                }
                selected
            }
        };
        Ok(self.translation.get_or_init(|| resolved).clone())
    }

    /// Mapping of `E`, built on first request and shared afterwards.
    pub fn get_or_create_entity<E: Entity>(&self) -> Result<Arc<EntityMetadata<E>>> {
        self.registry.get_or_insert_with(|| {
            let translation = self.translation()?;
            EntityMetadata::build(E::describe(), translation.as_ref())
        })
    }

    /// Executes the DDL of `E`.
    pub fn create_table<E: Entity>(&self) -> Result<()> {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.create_table", entity = %metadata.type_name());
        let _enter = span.enter();

        let mut conn = self.connection()?;
        for ddl in metadata.ddl() {
            self.run_execute(conn.as_mut(), &PreparedStatement::new(ddl))?;
        }
        Ok(())
    }

    /// Runs before-insert callbacks and inserts `entity`, returning the affected row count.
    pub fn insert<E: Entity>(&self, entity: &mut E) -> Result<u64> {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.insert", entity = %metadata.type_name());
        let _enter = span.enter();

        let mut conn = self.connection()?;
        let mut statement = PreparedStatement::new(metadata.insert_sql());
        metadata
            .callbacks()
            .run(Phase::BeforeInsert, metadata.type_name(), entity)?;
        binder::bind_insert(&metadata, entity, &mut statement)?;
        self.run_execute(conn.as_mut(), &statement)
    }

    /// Writes every column of `entity` to the row with the same identifier.
    pub fn update<E: Entity>(&self, entity: &mut E) -> Result<u64> {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.update", entity = %metadata.type_name());
        let _enter = span.enter();

        let sql = identifier_sql(&metadata, metadata.update_sql(), "update")?;
        let mut conn = self.connection()?;
        let mut statement = PreparedStatement::new(sql);
        metadata
            .callbacks()
            .run(Phase::BeforeUpdate, metadata.type_name(), entity)?;
        binder::bind_update(&metadata, entity, &mut statement)?;
        let changed = self.run_execute(conn.as_mut(), &statement)?;
        if changed == 0 {
            warn!("update of {} matched no row", metadata.type_name());
        }
        Ok(changed)
    }

    pub fn delete<E: Entity>(&self, entity: &mut E) -> Result<u64> {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.delete", entity = %metadata.type_name());
        let _enter = span.enter();

        let sql = identifier_sql(&metadata, metadata.delete_sql(), "delete")?;
        let mut conn = self.connection()?;
        let mut statement = PreparedStatement::new(sql);
        metadata
            .callbacks()
            .run(Phase::BeforeDelete, metadata.type_name(), entity)?;
        binder::bind_delete(&metadata, entity, &mut statement)?;
        self.run_execute(conn.as_mut(), &statement)
    }

    /// Loads the row with the given identifier; composite keys are passed as
    /// tuples in identifier order.
    pub fn find_by_id<E: Entity>(&self, id: impl Into<Identifier>) -> Result<Option<E>> {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.find_by_id", entity = %metadata.type_name());
        let _enter = span.enter();

        let sql = identifier_sql(&metadata, metadata.find_by_id_sql(), "find by id")?;
        let mut statement = PreparedStatement::new(sql);
        binder::bind_identifier(&metadata, id.into(), &mut statement)?;

        let result = {
            let mut conn = self.connection()?;
            self.run_query(conn.as_mut(), &statement)?
        };
        MappedRows::new(&metadata, result).next().transpose()
    }

    pub fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        let metadata = self.get_or_create_entity::<E>()?;
        self.query(metadata.find_all_sql(), crate::connection::no_binding)
    }

    /// Runs caller-supplied SQL and maps every row to `E`, in result order.
    pub fn query<E, F>(&self, sql: &str, bind: F) -> Result<Vec<E>>
    where
        E: Entity,
        F: FnOnce(&mut PreparedStatement) -> Result<()>,
    {
        let metadata = self.get_or_create_entity::<E>()?;
        let span = info_span!("relmap.query", entity = %metadata.type_name());
        let _enter = span.enter();

        let mut statement = PreparedStatement::new(sql);
        bind(&mut statement)?;
        let result = {
            let mut conn = self.connection()?;
            self.run_query(conn.as_mut(), &statement)?
        };
        MappedRows::new(&metadata, result).collect()
    }

    /// Runs caller-supplied SQL that returns no rows.
    pub fn execute<F>(&self, sql: &str, bind: F) -> Result<u64>
    where
        F: FnOnce(&mut PreparedStatement) -> Result<()>,
    {
        let mut statement = PreparedStatement::new(sql);
        bind(&mut statement)?;
        let mut conn = self.connection()?;
        self.run_execute(conn.as_mut(), &statement)
    }

    fn connection(&self) -> Result<Box<dyn Connection>> {
        self.provider.connection()
    }

    fn run_execute(&self, conn: &mut dyn Connection, statement: &PreparedStatement) -> Result<u64> {
        self.log_statement(statement);
        conn.execute(statement)
    }

    fn run_query(&self, conn: &mut dyn Connection, statement: &PreparedStatement) -> Result<QueryResult> {
        self.log_statement(statement);
        conn.query(statement)
    }

    fn log_statement(&self, statement: &PreparedStatement) {
        if self.config.log_statements {
            debug!("{} {:?}", statement.sql(), statement.params());
        }
    }
}

fn identifier_sql<'a, E>(
    metadata: &EntityMetadata<E>,
    sql: Option<&'a str>,
    operation: &str,
) -> Result<&'a str> {
    sql.ok_or_else(|| {
        Error::Binding(format!(
            "Cannot {} {}: no identifier declared",
            operation,
            metadata.type_name()
        ))
    })
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("translation", &self.translation.get())
            .field("entities", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::core::Value;
    use crate::entity::{EntityDescription, FieldSpec};

    /// Records statements and replays canned results.
    #[derive(Clone, Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<PreparedStatement>>>,
        result: Arc<Mutex<QueryResult>>,
        product: &'static str,
    }

    impl Connection for Recorder {
        fn product_name(&mut self) -> Result<String> {
            Ok(self.product.to_string())
        }

        fn execute(&mut self, statement: &PreparedStatement) -> Result<u64> {
            self.log.lock()?.push(statement.clone());
            Ok(1)
        }

        fn query(&mut self, statement: &PreparedStatement) -> Result<QueryResult> {
            self.log.lock()?.push(statement.clone());
            Ok(self.result.lock()?.clone())
        }
    }

    fn database(recorder: &Recorder) -> Database {
        let recorder = recorder.clone();
        Database::new(move || -> Result<Box<dyn Connection>> { Ok(Box::new(recorder.clone())) })
    }

    #[derive(Default, Debug, PartialEq)]
    struct Note {
        id: i64,
        body: String,
    }

    impl Entity for Note {
        fn describe() -> EntityDescription<Self> {
            EntityDescription::mutable("Note", Note::default)
                .table("NOTES")
                .field(FieldSpec::id("id"), |n| &n.id, |n| &mut n.id)
                .field(FieldSpec::column("body"), |n| &n.body, |n| &mut n.body)
                .before_insert(|n| {
                    n.body = n.body.trim().to_string();
                    Ok(())
                })
        }
    }

    #[derive(Debug, Default)]
    struct Log {
        line: String,
    }

    impl Entity for Log {
        fn describe() -> EntityDescription<Self> {
            EntityDescription::mutable("Log", Log::default)
                .field(FieldSpec::column("line"), |l| &l.line, |l| &mut l.line)
        }
    }

    #[test]
    fn translation_is_probed_once() {
        let recorder = Recorder {
            product: "PostgreSQL",
            ..Recorder::default()
        };
        let db = database(&recorder);
        assert_eq!(db.translation().unwrap().name(), "postgres");

        let forced = Database::with_config(
            move || -> Result<Box<dyn Connection>> { Err(Error::storage("offline")) },
            DatabaseConfig::new().translation("oracle"),
        );
        assert_eq!(forced.translation().unwrap().name(), "oracle");
    }

    #[test]
    fn unknown_configured_translation_fails() {
        let recorder = Recorder::default();
        let db = Database::with_config(
            move || -> Result<Box<dyn Connection>> { Ok(Box::new(recorder.clone())) },
            DatabaseConfig::new().translation("db2"),
        );
        assert!(db.translation().unwrap_err().is_mapping_construction());
    }

    #[test]
    fn insert_runs_callbacks_before_binding() {
        let recorder = Recorder::default();
        let db = database(&recorder);
        let mut note = Note {
            id: 1,
            body: "  hello ".into(),
        };
        db.insert(&mut note).unwrap();

        assert_eq!(note.body, "hello");
        let log = recorder.log.lock().unwrap();
        assert_eq!(log[0].sql(), "INSERT INTO NOTES (id, body) VALUES (?, ?)");
        assert_eq!(log[0].params(), &[Value::Integer(1), Value::Text("hello".into())]);
    }

    #[test]
    fn find_by_id_maps_first_row() {
        let recorder = Recorder::default();
        *recorder.result.lock().unwrap() = QueryResult::new(
            vec!["ID".into(), "BODY".into()],
            vec![vec![Value::Integer(4), Value::Text("four".into())]],
        );
        let db = database(&recorder);

        let note = db.find_by_id::<Note>(4i64).unwrap();
        assert_eq!(
            note,
            Some(Note {
                id: 4,
                body: "four".into(),
            })
        );
        let log = recorder.log.lock().unwrap();
        assert_eq!(log[0].sql(), "SELECT id, body FROM NOTES WHERE id = ?");
    }

    #[test]
    fn identifier_operations_need_identifiers() {
        let recorder = Recorder::default();
        let db = database(&recorder);
        let mut log = Log::default();
        assert!(db.delete(&mut log).unwrap_err().is_binding());
        assert!(db.find_by_id::<Log>("x").unwrap_err().is_binding());
        assert!(recorder.log.lock().unwrap().is_empty());
    }

    #[test]
    fn explicit_translation_skips_probing() {
        let db = Database::with_translation(
            move || -> Result<Box<dyn Connection>> { Err(Error::storage("offline")) },
            Arc::new(crate::translation::H2Translation),
        );
        assert_eq!(db.translation().unwrap().name(), "h2");
        assert!(!db.config().log_statements);
    }

    #[test]
    fn statement_logging_leaves_execution_unchanged() {
        let recorder = Recorder::default();
        *recorder.result.lock().unwrap() = QueryResult::new(
            vec!["id".into(), "body".into()],
            vec![vec![Value::Integer(2), Value::Text("two".into())]],
        );
        let connections = recorder.clone();
        let db = Database::with_config(
            move || -> Result<Box<dyn Connection>> { Ok(Box::new(connections.clone())) },
            DatabaseConfig::new().log_statements(true),
        );
        assert!(db.config().log_statements);

        let mut note = Note {
            id: 2,
            body: "two".into(),
        };
        assert_eq!(db.insert(&mut note).unwrap(), 1);
        assert_eq!(db.find_all::<Note>().unwrap(), vec![note]);

        let log = recorder.log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].sql(), "SELECT id, body FROM NOTES");
        assert!(log[1].params().is_empty());
    }

    #[test]
    fn metadata_is_cached_per_handle() {
        let recorder = Recorder::default();
        let db = database(&recorder);
        let first = db.get_or_create_entity::<Note>().unwrap();
        let second = db.get_or_create_entity::<Note>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.sql(), second.sql());
    }
}
