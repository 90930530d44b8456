use crate::core::{ColumnValue, Error, Result, SemanticType, Value};

use super::lifecycle::{Callback, LifecycleCallbacks, Phase};

pub(crate) type Getter<E> = Box<dyn Fn(&E) -> Value + Send + Sync>;
pub(crate) type Setter<E> = Box<dyn Fn(&mut E, Value) -> Result<()> + Send + Sync>;

/// Builds an immutable entity from its positional constructor arguments.
pub type Constructor<E> = fn(Arguments) -> Result<E>;

/// How instances are built when rows are read.
pub enum Strategy<E> {
    /// Default-construct, then assign each column.
    Mutable(fn() -> E),
    /// Call a single constructor with every parameter supplied.
    Immutable(Constructor<E>),
}

impl<E> Strategy<E> {
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Immutable(_))
    }
}

/// Mapping metadata of one declared member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) column: Option<String>,
    pub(crate) sql_type: Option<String>,
    pub(crate) id_order: Option<u32>,
    pub(crate) persisted: bool,
}

impl FieldSpec {
    /// A persisted column named after the member.
    pub fn column(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column: None,
            sql_type: None,
            id_order: None,
            persisted: true,
        }
    }

    /// A persisted identifier column with order 0.
    pub fn id(name: &str) -> Self {
        Self {
            id_order: Some(0),
            ..Self::column(name)
        }
    }

    /// A member that is never read from or written to the database. Only
    /// meaningful for constructor parameters of immutable entities.
    pub fn transient(name: &str) -> Self {
        Self {
            persisted: false,
            ..Self::column(name)
        }
    }

    /// Position in a composite key; implies the member is an identifier.
    pub fn order(mut self, order: u32) -> Self {
        self.id_order = Some(order);
        self.persisted = true;
        self
    }

    /// Column name to use instead of the member name. Blank names are ignored.
    pub fn renamed(mut self, column: &str) -> Self {
        self.column = non_blank(column);
        self
    }

    /// Explicit database type used verbatim in DDL. Blank types are ignored.
    pub fn sql_type(mut self, sql_type: &str) -> Self {
        self.sql_type = non_blank(sql_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Override name when present, member name otherwise.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn is_id(&self) -> bool {
        self.id_order.is_some()
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) struct MemberDescription<E> {
    pub(crate) spec: FieldSpec,
    pub(crate) semantic: SemanticType,
    pub(crate) nullable: bool,
    pub(crate) absent: Value,
    pub(crate) read: Getter<E>,
    pub(crate) write: Option<Setter<E>>,
}

/// Declarative description of a mapped type.
///
/// ```
/// use relmap::{EntityDescription, FieldSpec};
///
/// #[derive(Default)]
/// struct Account {
///     id: i64,
///     owner: String,
/// }
///
/// let description = EntityDescription::mutable("Account", Account::default)
///     .table("ACCOUNTS")
///     .field(FieldSpec::id("id"), |a| &a.id, |a| &mut a.id)
///     .field(FieldSpec::column("owner"), |a| &a.owner, |a| &mut a.owner);
/// assert_eq!(description.type_name(), "Account");
/// ```
pub struct EntityDescription<E> {
    pub(crate) type_name: String,
    pub(crate) table: Option<String>,
    pub(crate) strategy: Strategy<E>,
    pub(crate) members: Vec<MemberDescription<E>>,
    pub(crate) callbacks: LifecycleCallbacks<E>,
}

impl<E: 'static> EntityDescription<E> {
    pub fn mutable(type_name: &str, create: fn() -> E) -> Self {
        Self::with_strategy(type_name, Strategy::Mutable(create))
    }

    /// Immutable entities declare their constructor parameters with
    /// [`parameter`](Self::parameter) (or [`field`](Self::field)); the
    /// declaration order is the argument order.
    pub fn immutable(type_name: &str, construct: Constructor<E>) -> Self {
        Self::with_strategy(type_name, Strategy::Immutable(construct))
    }

    fn with_strategy(type_name: &str, strategy: Strategy<E>) -> Self {
        Self {
            type_name: type_name.to_string(),
            table: None,
            strategy,
            members: Vec::new(),
            callbacks: LifecycleCallbacks::default(),
        }
    }

    /// Table name; defaults to the type name. Blank names are ignored.
    pub fn table(mut self, table: &str) -> Self {
        self.table = non_blank(table);
        self
    }

    /// Declares a member that can be read and assigned.
    pub fn field<T>(self, spec: FieldSpec, get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T) -> Self
    where
        T: ColumnValue + 'static,
    {
        let setter: Setter<E> = Box::new(move |instance: &mut E, value: Value| {
            *get_mut(instance) = T::from_value(value)?;
            Ok(())
        });
        self.member::<T>(spec, get, Some(setter))
    }

    /// Declares a read-only member, i.e. a constructor parameter.
    pub fn parameter<T>(self, spec: FieldSpec, get: fn(&E) -> &T) -> Self
    where
        T: ColumnValue + 'static,
    {
        self.member::<T>(spec, get, None)
    }

    fn member<T>(mut self, spec: FieldSpec, get: fn(&E) -> &T, write: Option<Setter<E>>) -> Self
    where
        T: ColumnValue + 'static,
    {
        self.members.push(MemberDescription {
            spec,
            semantic: T::SEMANTIC_TYPE,
            nullable: T::NULLABLE,
            absent: T::absent_value(),
            read: Box::new(move |instance: &E| get(instance).to_value()),
            write,
        });
        self
    }

    pub fn before_insert(mut self, callback: Callback<E>) -> Self {
        self.callbacks.register(Phase::BeforeInsert, callback);
        self
    }

    pub fn before_update(mut self, callback: Callback<E>) -> Self {
        self.callbacks.register(Phase::BeforeUpdate, callback);
        self
    }

    pub fn before_delete(mut self, callback: Callback<E>) -> Self {
        self.callbacks.register(Phase::BeforeDelete, callback);
        self
    }

    /// Runs after a row was assigned to a mutable entity. Immutable entities
    /// never run these.
    pub fn after_load(mut self, callback: Callback<E>) -> Self {
        self.callbacks.register(Phase::AfterLoad, callback);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn strategy(&self) -> &Strategy<E> {
        &self.strategy
    }

    pub fn member_specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.members.iter().map(|member| &member.spec)
    }
}

/// Positional constructor arguments of an immutable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves the argument at `index` out, converted to `T`.
    pub fn take<T: ColumnValue>(&mut self, index: usize) -> Result<T> {
        let arity = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| {
            Error::Binding(format!(
                "Constructor argument {} requested but only {} supplied",
                index, arity
            ))
        })?;
        T::from_value(std::mem::replace(slot, Value::Null))
    }
}
