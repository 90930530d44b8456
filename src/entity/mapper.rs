use crate::core::{Result, Value};
use crate::result::{QueryResult, Row};

use super::description::{Arguments, Strategy};
use super::lifecycle::Phase;
use super::metadata::EntityMetadata;

/// Turns rows of one result set into entities.
///
/// Column names are resolved against the mapping once, when the mapper is
/// created. Mutable entities match columns to fields and immutable entities
/// match them to constructor parameters, transient ones included. Unknown
/// columns are skipped; when a name appears twice the first occurrence is used.
pub struct RowMapper<'a, E> {
    metadata: &'a EntityMetadata<E>,
    // (result column, field position or parameter index)
    plan: Vec<(usize, usize)>,
}

impl<'a, E> RowMapper<'a, E> {
    pub fn new(metadata: &'a EntityMetadata<E>, columns: &[String]) -> Self {
        let mut plan: Vec<(usize, usize)> = Vec::with_capacity(columns.len());
        for (column, name) in columns.iter().enumerate() {
            let target = if metadata.is_immutable() {
                metadata.parameters().get(name).map(|parameter| parameter.index())
            } else {
                metadata.fields().position(name)
            };
            if let Some(target) = target {
                if !plan.iter().any(|(_, assigned)| *assigned == target) {
                    plan.push((column, target));
                }
            }
        }
        Self { metadata, plan }
    }

    /// Number of result columns that map onto a field or parameter.
    pub fn matched_columns(&self) -> usize {
        self.plan.len()
    }

    pub fn map_row(&self, mut row: Row) -> Result<E> {
        match self.metadata.strategy() {
            Strategy::Mutable(create) => {
                let mut instance = create();
                for (column, field) in &self.plan {
                    let Some(value) = take(&mut row, *column) else {
                        continue;
                    };
                    if let Some((_, descriptor)) = self.metadata.fields().get_index(*field) {
                        descriptor.write(&mut instance, value)?;
                    }
                }
                self.metadata.callbacks().run(
                    Phase::AfterLoad,
                    self.metadata.type_name(),
                    &mut instance,
                )?;
                Ok(instance)
            }
            Strategy::Immutable(construct) => {
                let mut arguments: Vec<Value> = self
                    .metadata
                    .parameters()
                    .values()
                    .map(|parameter| parameter.default_value().clone())
                    .collect();
                for (column, index) in &self.plan {
                    if let (Some(slot), Some(value)) =
                        (arguments.get_mut(*index), take(&mut row, *column))
                    {
                        *slot = value;
                    }
                }
                construct(Arguments::new(arguments))
            }
        }
    }

    pub fn map_all(&self, rows: Vec<Row>) -> Result<Vec<E>> {
        rows.into_iter().map(|row| self.map_row(row)).collect()
    }
}

fn take(row: &mut Row, column: usize) -> Option<Value> {
    row.get_mut(column)
        .map(|slot| std::mem::replace(slot, Value::Null))
}

/// Entities produced one row at a time from a result set.
pub struct MappedRows<'a, E> {
    mapper: RowMapper<'a, E>,
    rows: std::vec::IntoIter<Row>,
}

impl<'a, E> MappedRows<'a, E> {
    pub fn new(metadata: &'a EntityMetadata<E>, result: QueryResult) -> Self {
        let mapper = RowMapper::new(metadata, result.columns());
        Self {
            mapper,
            rows: result.into_rows().into_iter(),
        }
    }
}

impl<E> Iterator for MappedRows<'_, E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| self.mapper.map_row(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::description::{EntityDescription, FieldSpec};
    use crate::translation::AnsiTranslation;

    #[derive(Default, Debug, PartialEq)]
    struct Person {
        id: String,
        name: String,
        age: i32,
        loaded: bool,
    }

    fn person() -> EntityMetadata<Person> {
        let description = EntityDescription::mutable("Person", Person::default)
            .field(FieldSpec::id("id"), |p| &p.id, |p| &mut p.id)
            .field(FieldSpec::column("name"), |p| &p.name, |p| &mut p.name)
            .field(FieldSpec::column("age"), |p| &p.age, |p| &mut p.age)
            .after_load(|p| {
                p.loaded = true;
                Ok(())
            });
        EntityMetadata::build(description, &AnsiTranslation).unwrap()
    }

    #[derive(Debug, PartialEq)]
    struct Reading {
        sensor: String,
        value: f64,
        note: Option<String>,
    }

    fn reading() -> EntityMetadata<Reading> {
        let description = EntityDescription::immutable("Reading", |mut args: Arguments| {
            Ok(Reading {
                sensor: args.take(0)?,
                value: args.take(1)?,
                note: args.take(2)?,
            })
        })
        .parameter(FieldSpec::id("sensor"), |r| &r.sensor)
        .parameter(FieldSpec::column("value"), |r| &r.value)
        .parameter(FieldSpec::transient("note"), |r| &r.note)
        .after_load(|_| anyhow::bail!("immutable entities skip after-load"));
        EntityMetadata::build(description, &AnsiTranslation).unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn superset_of_columns_is_ignored() {
        let metadata = person();
        let mapper = RowMapper::new(&metadata, &columns(&["ID", "extra", "Name", "AGE"]));
        let person = mapper
            .map_row(vec![
                Value::Text("p1".into()),
                Value::Integer(99),
                Value::Text("Ada".into()),
                Value::Integer(36),
            ])
            .unwrap();

        assert_eq!(mapper.matched_columns(), 3);
        assert_eq!(
            person,
            Person {
                id: "p1".into(),
                name: "Ada".into(),
                age: 36,
                loaded: true,
            }
        );
    }

    #[test]
    fn subset_of_columns_keeps_defaults() {
        let metadata = person();
        let mapper = RowMapper::new(&metadata, &columns(&["name"]));
        let person = mapper.map_row(vec![Value::Text("Bob".into())]).unwrap();
        assert_eq!(person.id, "");
        assert_eq!(person.age, 0);
        assert_eq!(person.name, "Bob");
    }

    #[test]
    fn first_duplicate_column_wins() {
        let metadata = person();
        let mapper = RowMapper::new(&metadata, &columns(&["age", "AGE"]));
        let person = mapper
            .map_row(vec![Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(person.age, 1);
    }

    #[test]
    fn immutable_rows_use_parameter_defaults() {
        let metadata = reading();
        let mapper = RowMapper::new(&metadata, &columns(&["sensor"]));
        let reading = mapper.map_row(vec![Value::Text("s-1".into())]).unwrap();
        assert_eq!(
            reading,
            Reading {
                sensor: "s-1".into(),
                value: 0.0,
                note: None,
            }
        );
    }

    #[test]
    fn transient_parameters_read_their_columns() {
        let metadata = reading();
        let mapper = RowMapper::new(&metadata, &columns(&["NOTE", "sensor"]));
        let reading = mapper
            .map_row(vec![Value::Text("hello".into()), Value::Text("s-2".into())])
            .unwrap();
        assert_eq!(mapper.matched_columns(), 2);
        assert_eq!(reading.note.as_deref(), Some("hello"));
        assert_eq!(reading.sensor, "s-2");
        assert_eq!(reading.value, 0.0);
    }

    #[test]
    fn mapped_rows_are_lazy_and_ordered() {
        let metadata = reading();
        let result = QueryResult::new(
            columns(&["value", "sensor"]),
            vec![
                vec![Value::Integer(2), Value::Text("b".into())],
                vec![Value::Float(1.5), Value::Text("a".into())],
            ],
        );
        let sensors: Vec<String> = MappedRows::new(&metadata, result)
            .map(|reading| reading.unwrap().sensor)
            .collect();
        assert_eq!(sensors, vec!["b", "a"]);
    }

    #[test]
    fn conversion_failures_are_binding_errors() {
        let metadata = person();
        let mapper = RowMapper::new(&metadata, &columns(&["age"]));
        let err = mapper
            .map_row(vec![Value::Text("not a number".into())])
            .unwrap_err();
        assert!(err.is_binding());
    }
}
