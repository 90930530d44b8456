use log::debug;

use crate::core::{Error, Result, SemanticType, Value};
use crate::translation::{ColumnAttributes, DatabaseTranslation};

use super::column_map::ColumnMap;
use super::description::{EntityDescription, Getter, Setter, Strategy};
use super::lifecycle::LifecycleCallbacks;
use super::sql::{GeneratedSql, SqlGenerator};

/// One persisted column of a mapped type.
pub struct FieldDescriptor<E> {
    declared_name: String,
    column_name: String,
    override_name: Option<String>,
    sql_type: Option<String>,
    semantic: SemanticType,
    nullable: bool,
    id_order: Option<u32>,
    default_value: Value,
    parameter_index: Option<usize>,
    read: Getter<E>,
    write: Option<Setter<E>>,
}

impl<E> FieldDescriptor<E> {
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Resolved, unwrapped column name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_deref()
    }

    pub fn sql_type(&self) -> Option<&str> {
        self.sql_type.as_deref()
    }

    pub fn semantic(&self) -> SemanticType {
        self.semantic
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn id_order(&self) -> Option<u32> {
        self.id_order
    }

    pub fn is_id(&self) -> bool {
        self.id_order.is_some()
    }

    /// Value used when the column is absent from a result set.
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Constructor position for immutable entities.
    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }

    pub fn attributes(&self) -> ColumnAttributes {
        ColumnAttributes {
            name: self.column_name.clone(),
            declared_name: self.declared_name.clone(),
            semantic: self.semantic,
            sql_type: self.sql_type.clone(),
            id_order: self.id_order,
            nullable: self.nullable,
        }
    }

    pub(crate) fn read(&self, instance: &E) -> Value {
        (self.read)(instance)
    }

    pub(crate) fn write(&self, instance: &mut E, value: Value) -> Result<()> {
        match &self.write {
            Some(write) => write(instance, value),
            None => Err(Error::MappingConstruction(format!(
                "Field '{}' cannot be assigned",
                self.declared_name
            ))),
        }
    }
}

/// One constructor argument of an immutable type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    index: usize,
    semantic: SemanticType,
    default_value: Value,
    persisted: bool,
}

impl ParameterDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn semantic(&self) -> SemanticType {
        self.semantic
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

/// Mapping of one entity type, built once per database and then shared.
pub struct EntityMetadata<E> {
    type_name: String,
    raw_table: String,
    table: String,
    strategy: Strategy<E>,
    fields: ColumnMap<FieldDescriptor<E>>,
    id_fields: Vec<usize>,
    parameters: ColumnMap<ParameterDescriptor>,
    callbacks: LifecycleCallbacks<E>,
    sql: GeneratedSql,
}

impl<E: 'static> EntityMetadata<E> {
    pub fn build(
        description: EntityDescription<E>,
        translation: &dyn DatabaseTranslation,
    ) -> Result<Self> {
        let EntityDescription {
            type_name,
            table,
            strategy,
            members,
            callbacks,
        } = description;

        let mut parameters = ColumnMap::new();
        if strategy.is_immutable() {
            if members.is_empty() {
                return Err(Error::MappingConstruction(format!(
                    "No usable constructor for {}: no parameters declared",
                    type_name
                )));
            }
            for (index, member) in members.iter().enumerate() {
                let descriptor = ParameterDescriptor {
                    name: member.spec.column_name().to_string(),
                    index,
                    semantic: member.semantic,
                    default_value: member.absent.clone(),
                    persisted: member.spec.is_persisted(),
                };
                parameters
                    .try_insert(member.spec.column_name(), descriptor)
                    .map_err(|_| {
                        Error::MappingConstruction(format!(
                            "Ambiguous parameter: {}",
                            member.spec.column_name()
                        ))
                    })?;
            }
        }

        let immutable = strategy.is_immutable();
        let mut fields = ColumnMap::new();
        for (index, member) in members.into_iter().enumerate() {
            if !member.spec.is_persisted() {
                continue;
            }
            if !immutable && member.write.is_none() {
                return Err(Error::MappingConstruction(format!(
                    "Field '{}' of {} has no setter",
                    member.spec.name(),
                    type_name
                )));
            }
            let column_name = member.spec.column_name().to_string();
            let descriptor = FieldDescriptor {
                declared_name: member.spec.name.clone(),
                column_name: column_name.clone(),
                override_name: member.spec.column.clone(),
                sql_type: member.spec.sql_type.clone(),
                semantic: member.semantic,
                nullable: member.nullable,
                id_order: member.spec.id_order,
                default_value: member.absent,
                parameter_index: immutable.then_some(index),
                read: member.read,
                write: member.write,
            };
            fields
                .try_insert(column_name.clone(), descriptor)
                .map_err(|_| {
                    Error::MappingConstruction(format!("Ambiguous field: {}", column_name))
                })?;
        }
        if fields.is_empty() {
            return Err(Error::MappingConstruction(format!(
                "{} declares no persisted column",
                type_name
            )));
        }

        let mut id_fields: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, (_, field))| field.is_id())
            .map(|(position, _)| position)
            .collect();
        id_fields.sort_by_key(|position| {
            fields
                .get_index(*position)
                .and_then(|(_, field)| field.id_order)
                .unwrap_or_default()
        });

        let raw_table = table.unwrap_or_else(|| type_name.clone());
        let wrapped_table = translation.wrap_table_name(&raw_table);
        let columns: Vec<ColumnAttributes> = fields.values().map(|f| f.attributes()).collect();
        let sql = SqlGenerator::new(translation).generate(&wrapped_table, &columns, &id_fields);

        debug!(
            "mapped {} to table {} with {} column(s) using {} translation",
            type_name,
            wrapped_table,
            fields.len(),
            translation.name()
        );

        Ok(Self {
            type_name,
            raw_table,
            table: wrapped_table,
            strategy,
            fields,
            id_fields,
            parameters,
            callbacks,
            sql,
        })
    }
}

impl<E> EntityMetadata<E> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Table name as declared.
    pub fn raw_table_name(&self) -> &str {
        &self.raw_table
    }

    /// Table name as it appears in SQL.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn strategy(&self) -> &Strategy<E> {
        &self.strategy
    }

    pub fn is_immutable(&self) -> bool {
        self.strategy.is_immutable()
    }

    pub fn fields(&self) -> &ColumnMap<FieldDescriptor<E>> {
        &self.fields
    }

    pub fn field(&self, column: &str) -> Option<&FieldDescriptor<E>> {
        self.fields.get(column)
    }

    /// Identifier fields in identifier order.
    pub fn id_fields(&self) -> impl Iterator<Item = &FieldDescriptor<E>> {
        self.id_fields
            .iter()
            .filter_map(|position| self.fields.get_index(*position).map(|(_, field)| field))
    }

    pub fn id_count(&self) -> usize {
        self.id_fields.len()
    }

    pub fn parameters(&self) -> &ColumnMap<ParameterDescriptor> {
        &self.parameters
    }

    /// Number of constructor arguments; zero for mutable entities.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn callbacks(&self) -> &LifecycleCallbacks<E> {
        &self.callbacks
    }

    pub fn sql(&self) -> &GeneratedSql {
        &self.sql
    }

    pub fn ddl(&self) -> Vec<String> {
        vec![self.sql.ddl.clone()]
    }

    pub fn find_by_id_sql(&self) -> Option<&str> {
        self.sql.find_by_id.as_deref()
    }

    pub fn insert_sql(&self) -> &str {
        &self.sql.insert
    }

    pub fn update_sql(&self) -> Option<&str> {
        self.sql.update.as_deref()
    }

    pub fn delete_sql(&self) -> Option<&str> {
        self.sql.delete.as_deref()
    }

    pub fn find_all_sql(&self) -> &str {
        &self.sql.find_all
    }
}

impl<E> std::fmt::Debug for EntityMetadata<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("columns", &self.fields.keys().collect::<Vec<_>>())
            .field("immutable", &self.is_immutable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::description::{Arguments, FieldSpec};
    use crate::translation::{AnsiTranslation, H2Translation};

    #[derive(Default)]
    struct FlatEntity {
        id: String,
        name: String,
        age: i32,
    }

    fn flat() -> EntityDescription<FlatEntity> {
        EntityDescription::mutable("FlatEntity", FlatEntity::default)
            .table("FLAT_ENTITY")
            .field(FieldSpec::id("id"), |e| &e.id, |e| &mut e.id)
            .field(FieldSpec::column("name"), |e| &e.name, |e| &mut e.name)
            .field(FieldSpec::column("age"), |e| &e.age, |e| &mut e.age)
    }

    struct Point {
        x: i64,
        y: i64,
        label: String,
    }

    fn point() -> EntityDescription<Point> {
        EntityDescription::immutable("Point", |mut args: Arguments| {
            Ok(Point {
                y: args.take(0)?,
                x: args.take(1)?,
                label: args.take(2)?,
            })
        })
        .parameter(FieldSpec::column("y").order(1), |p| &p.y)
        .parameter(FieldSpec::column("x").order(0), |p| &p.x)
        .parameter(FieldSpec::transient("label"), |p| &p.label)
    }

    #[test]
    fn builds_flat_mapping() {
        let metadata = EntityMetadata::build(flat(), &H2Translation).unwrap();

        assert_eq!(metadata.table_name(), "FLAT_ENTITY");
        assert_eq!(metadata.fields().len(), 3);
        assert_eq!(metadata.id_count(), 1);
        assert_eq!(metadata.arity(), 0);
        assert_eq!(metadata.field("AGE").unwrap().semantic(), SemanticType::Integer);
        assert_eq!(metadata.field("age").unwrap().default_value(), &Value::Integer(0));
        assert_eq!(
            metadata.ddl(),
            vec!["CREATE TABLE FLAT_ENTITY (id VARCHAR(255), age INTEGER, name VARCHAR(255), PRIMARY KEY (id))"]
        );
    }

    #[test]
    fn table_defaults_to_type_name() {
        let description = EntityDescription::mutable("FlatEntity", FlatEntity::default)
            .field(FieldSpec::id("id"), |e| &e.id, |e| &mut e.id);
        let metadata = EntityMetadata::build(description, &AnsiTranslation).unwrap();
        assert_eq!(metadata.raw_table_name(), "FlatEntity");
        assert_eq!(metadata.find_all_sql(), "SELECT id FROM FlatEntity");
    }

    #[test]
    fn immutable_parameters_include_transient_members() {
        let metadata = EntityMetadata::build(point(), &AnsiTranslation).unwrap();

        assert_eq!(metadata.arity(), 3);
        assert_eq!(metadata.fields().len(), 2);
        assert!(!metadata.parameters().get("label").unwrap().is_persisted());
        assert_eq!(metadata.parameters().get("x").unwrap().index(), 1);
        let ids: Vec<&str> = metadata.id_fields().map(|f| f.column_name()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(
            metadata.delete_sql(),
            Some("DELETE FROM Point WHERE x = ? AND y = ?")
        );
    }

    #[test]
    fn case_insensitive_duplicates_are_rejected() {
        let description = flat().field(FieldSpec::column("x").renamed("NAME"), |e| &e.age, |e| &mut e.age);
        let err = EntityMetadata::build(description, &AnsiTranslation).unwrap_err();
        assert!(err.is_mapping_construction());
        assert!(err.to_string().ends_with("Ambiguous field: NAME"));

        let description = point().parameter(FieldSpec::column("X"), |p| &p.x);
        let err = EntityMetadata::build(description, &AnsiTranslation).unwrap_err();
        assert!(err.to_string().contains("Ambiguous parameter: X"));
    }

    #[test]
    fn unusable_descriptions_are_rejected() {
        let empty = EntityDescription::mutable("FlatEntity", FlatEntity::default);
        assert!(EntityMetadata::build(empty, &AnsiTranslation)
            .unwrap_err()
            .is_mapping_construction());

        let no_parameters =
            EntityDescription::<Point>::immutable("Point", |_| Err(Error::Binding("never".into())));
        assert!(EntityMetadata::build(no_parameters, &AnsiTranslation)
            .unwrap_err()
            .is_mapping_construction());

        let read_only = EntityDescription::mutable("FlatEntity", FlatEntity::default)
            .parameter(FieldSpec::id("id"), |e| &e.id);
        assert!(EntityMetadata::build(read_only, &AnsiTranslation)
            .unwrap_err()
            .is_mapping_construction());
    }
}
