use std::fmt;

use crate::core::{Error, Result};

/// A lifecycle hook: runs against the instance for its side effects.
pub type Callback<E> = fn(&mut E) -> anyhow::Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeInsert,
    BeforeUpdate,
    BeforeDelete,
    AfterLoad,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeInsert => "before-insert",
            Self::BeforeUpdate => "before-update",
            Self::BeforeDelete => "before-delete",
            Self::AfterLoad => "after-load",
        })
    }
}

/// Callbacks of one entity type, per phase, in registration order.
pub struct LifecycleCallbacks<E> {
    before_insert: Vec<Callback<E>>,
    before_update: Vec<Callback<E>>,
    before_delete: Vec<Callback<E>>,
    after_load: Vec<Callback<E>>,
}

impl<E> Default for LifecycleCallbacks<E> {
    fn default() -> Self {
        Self {
            before_insert: Vec::new(),
            before_update: Vec::new(),
            before_delete: Vec::new(),
            after_load: Vec::new(),
        }
    }
}

impl<E> LifecycleCallbacks<E> {
    pub(crate) fn register(&mut self, phase: Phase, callback: Callback<E>) {
        self.phase_mut(phase).push(callback);
    }

    pub fn get(&self, phase: Phase) -> &[Callback<E>] {
        match phase {
            Phase::BeforeInsert => &self.before_insert,
            Phase::BeforeUpdate => &self.before_update,
            Phase::BeforeDelete => &self.before_delete,
            Phase::AfterLoad => &self.after_load,
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Callback<E>> {
        match phase {
            Phase::BeforeInsert => &mut self.before_insert,
            Phase::BeforeUpdate => &mut self.before_update,
            Phase::BeforeDelete => &mut self.before_delete,
            Phase::AfterLoad => &mut self.after_load,
        }
    }

    /// Runs every callback of `phase`; the first failure stops the chain.
    pub fn run(&self, phase: Phase, type_name: &str, instance: &mut E) -> Result<()> {
        for callback in self.get(phase) {
            callback(instance).map_err(|err| {
                Error::storage_caused_by(
                    format!("{} callback of '{}' failed", phase, type_name),
                    err,
                )
            })?;
        }
        Ok(())
    }
}

/// Lets hooks return either `()` or a `Result`.
pub trait IntoCallbackResult {
    fn into_callback_result(self) -> anyhow::Result<()>;
}

impl IntoCallbackResult for () {
    fn into_callback_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> IntoCallbackResult for std::result::Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_callback_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}
