use thiserror::Error;

#[derive(Debug, Error)]
#[error("{self:?}")]
pub enum ViatomError {
    EmptyChunk,
    ChunkTooLong(usize),
    HeaderTooShort,
    InvalidMagic,
    InvalidTimestamp,
    BufferUnderrun,
}
