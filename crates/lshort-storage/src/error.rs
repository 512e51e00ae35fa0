use lshort_core::{LinkError, Operation, StorageError};

pub(crate) fn map_redb_error(err: impl Into<redb::Error>) -> StorageError {
    let err = err.into();
    let message = err.to_string();

    match err {
        redb::Error::Io(_) | redb::Error::DatabaseAlreadyOpen => StorageError::Unavailable(message),
        redb::Error::Corrupted(_) | redb::Error::TableDoesNotExist(_) => {
            StorageError::InvalidData(message)
        }
        _ => StorageError::Operation(message),
    }
}

pub(crate) fn map_sled_error(err: sled::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sled::Error::Io(_) => StorageError::Unavailable(message),
        sled::Error::Corruption { .. } | sled::Error::CollectionNotFound(_) => {
            StorageError::InvalidData(message)
        }
        _ => StorageError::Operation(message),
    }
}

pub(crate) fn map_io_error(err: std::io::Error) -> StorageError {
    StorageError::Unavailable(err.to_string())
}

/// Returns a `map_err` adapter that wraps a redb error with its context.
pub(crate) fn redb_error<E: Into<redb::Error>>(
    operation: Operation,
    subject: &str,
) -> impl FnOnce(E) -> LinkError + '_ {
    move |err| LinkError::storage(operation, subject, map_redb_error(err))
}

/// Returns a `map_err` adapter that wraps a sled error with its context.
pub(crate) fn sled_error(operation: Operation, subject: &str) -> impl FnOnce(sled::Error) -> LinkError + '_ {
    move |err| LinkError::storage(operation, subject, map_sled_error(err))
}
