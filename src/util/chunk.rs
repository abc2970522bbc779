use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Invalid argument: chunk size must be at least 1, got {0}")]
    InvalidArgument(usize),
}

/// Split `items` into consecutive groups of `size`, keeping order.
///
/// The last group may be shorter. An empty input yields no groups.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>, ChunkError> {
    if size == 0 {
        return Err(ChunkError::InvalidArgument(size));
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}
