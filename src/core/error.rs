use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    /// The entity description could not be turned into usable metadata.
    #[error("Mapping construction error: {0}")]
    MappingConstruction(String),

    /// A value could not be converted to or from its column's wire type.
    #[error("Binding error: {0}")]
    Binding(String),

    /// Any failure raised while talking to the storage layer, lifecycle
    /// callbacks included. The driver error is kept as the source.
    #[error("Storage operation failed: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_caused_by(message: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn is_mapping_construction(&self) -> bool {
        matches!(self, Self::MappingConstruction(_))
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::storage(format!("Lock poisoned: {}", err))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::storage_caused_by(err.to_string(), err)
    }
}
