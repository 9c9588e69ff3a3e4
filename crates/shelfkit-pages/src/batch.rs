#![forbid(unsafe_code)]

//! Sequential fixed-size batch close.
//!
//! Closing hundreds of counts at once is split into chunks of
//! [`EngineConfig::close_batch_size`]. Chunks run strictly one after another:
//! the next request goes out only after the previous response is in.
//!
//! # Failure Modes
//!
//! | Scenario | Behavior |
//! |----------|----------|
//! | Chunk `n` fails | chunk `n` restored to editable, chunks `> n` never sent |
//! | Chunks `< n` | stay closed, no rollback |

use shelfkit_core::EngineConfig;

use crate::error::ServiceError;

/// Receiver of batch progress for one close run.
pub trait ChunkSink<K> {
    /// Lock a chunk's rows while its request is in flight.
    fn begin(&mut self, chunk: &[K]);

    /// Send the close request for one chunk.
    fn close(&mut self, chunk: &[K]) -> Result<(), ServiceError>;

    /// The chunk closed.
    fn closed(&mut self, chunk: &[K]);

    /// The chunk failed; make its rows editable again.
    fn failed(&mut self, chunk: &[K], error: &ServiceError);
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<K> {
    /// Items in chunks that closed.
    pub closed: Vec<K>,
    /// Items of the chunk that failed.
    pub failed: Vec<K>,
    /// Items never sent: after a failed chunk, or skipped by the caller.
    pub pending: Vec<K>,
    /// Chunks sent, including a failed one.
    pub chunks_sent: usize,
    pub error: Option<ServiceError>,
}

impl<K> BatchReport<K> {
    /// No chunk failed and nothing was left unsent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.pending.is_empty()
    }
}

/// Splits a close into sequential chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCloser {
    chunk_size: usize,
}

impl BatchCloser {
    /// Chunks of `chunk_size` items (at least one).
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.close_batch_size)
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Close `items` chunk by chunk, stopping at the first failure.
    pub fn run<K: Clone>(&self, items: &[K], sink: &mut impl ChunkSink<K>) -> BatchReport<K> {
        let total_chunks = items.len().div_ceil(self.chunk_size);
        let mut report = BatchReport {
            closed: Vec::new(),
            failed: Vec::new(),
            pending: Vec::new(),
            chunks_sent: 0,
            error: None,
        };
        let mut chunks = items.chunks(self.chunk_size);
        for chunk in chunks.by_ref() {
            sink.begin(chunk);
            report.chunks_sent += 1;
            match sink.close(chunk) {
                Ok(()) => {
                    sink.closed(chunk);
                    report.closed.extend_from_slice(chunk);
                    tracing::info!(
                        chunk = report.chunks_sent,
                        of = total_chunks,
                        size = chunk.len(),
                        "batch chunk closed"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        chunk = report.chunks_sent,
                        of = total_chunks,
                        error = %error,
                        "batch chunk failed; remaining chunks skipped"
                    );
                    sink.failed(chunk, &error);
                    report.failed.extend_from_slice(chunk);
                    report.error = Some(error);
                    break;
                }
            }
        }
        for chunk in chunks {
            report.pending.extend_from_slice(chunk);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        fail_on: Option<usize>,
        calls: usize,
    }

    impl ChunkSink<u32> for Recorder {
        fn begin(&mut self, chunk: &[u32]) {
            self.log.push(format!("begin {chunk:?}"));
        }

        fn close(&mut self, chunk: &[u32]) -> Result<(), ServiceError> {
            self.calls += 1;
            self.log.push(format!("close {chunk:?}"));
            if self.fail_on == Some(self.calls) {
                Err(ServiceError::new("down"))
            } else {
                Ok(())
            }
        }

        fn closed(&mut self, chunk: &[u32]) {
            self.log.push(format!("closed {chunk:?}"));
        }

        fn failed(&mut self, chunk: &[u32], _error: &ServiceError) {
            self.log.push(format!("restore {chunk:?}"));
        }
    }

    #[test]
    fn chunks_are_sequential() {
        let mut sink = Recorder::default();
        let report = BatchCloser::new(2).run(&[1, 2, 3, 4, 5], &mut sink);
        assert!(report.is_complete());
        assert_eq!(report.closed, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.chunks_sent, 3);
        assert_eq!(
            sink.log,
            vec![
                "begin [1, 2]",
                "close [1, 2]",
                "closed [1, 2]",
                "begin [3, 4]",
                "close [3, 4]",
                "closed [3, 4]",
                "begin [5]",
                "close [5]",
                "closed [5]",
            ]
        );
    }

    #[test]
    fn failure_restores_chunk_and_stops() {
        let mut sink = Recorder {
            fail_on: Some(2),
            ..Default::default()
        };
        let report = BatchCloser::new(2).run(&[1, 2, 3, 4, 5], &mut sink);
        assert_eq!(report.closed, vec![1, 2]);
        assert_eq!(report.failed, vec![3, 4]);
        assert_eq!(report.pending, vec![5]);
        assert_eq!(report.error, Some(ServiceError::new("down")));
        assert_eq!(sink.calls, 2);
        assert_eq!(sink.log.last().map(String::as_str), Some("restore [3, 4]"));
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        assert_eq!(BatchCloser::new(0).chunk_size(), 1);
        assert_eq!(BatchCloser::from_config(&EngineConfig::default()).chunk_size(), 25);
    }

    #[test]
    fn empty_run_sends_nothing() {
        let mut sink = Recorder::default();
        let report = BatchCloser::new(3).run(&[], &mut sink);
        assert!(report.is_complete());
        assert_eq!(report.chunks_sent, 0);
        assert!(sink.log.is_empty());
    }
}
