//! Per-request processing-path selection, admission control and fallback.
//!
//! Each encode or decode request walks the same state machine: pick a path
//! (in-memory or streaming), admit streaming work through a bounded
//! semaphore, run under a deadline composed with caller cancellation, fall
//! back to the in-memory path once if streaming fails and the input can be
//! rewound, and always release the concurrency slot.

use crate::codec;
use crate::config::ResilienceConfig;
use crate::error::{Error, Result};
use crate::resilience::metrics::metrics;
use crate::resilience::semaphore::Semaphore;
use crate::resilience::source::PayloadSource;
use crate::resilience::{stream, CancelToken, Deadline, MetricsSnapshot};
use crate::strategy::EmbedTarget;
use image::RgbaImage;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide approximation of memory pressure: payload bytes currently
/// held by in-memory operations. A heuristic, not an exact bound.
static IN_FLIGHT_BYTES: AtomicU64 = AtomicU64::new(0);

/// Payload bytes currently reserved by in-memory operations.
pub fn in_flight_bytes() -> u64 {
    IN_FLIGHT_BYTES.load(Ordering::Relaxed)
}

struct Reservation(u64);

impl Reservation {
    fn take(bytes: u64) -> Self {
        IN_FLIGHT_BYTES.fetch_add(bytes, Ordering::Relaxed);
        Self(bytes)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        IN_FLIGHT_BYTES.fetch_sub(self.0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessingPath {
    InMemory,
    Streaming,
}

/// Adaptive resilience orchestrator wrapping the codec.
pub struct Orchestrator {
    config: ResilienceConfig,
    slots: Semaphore,
}

impl Orchestrator {
    /// Create an orchestrator from a validated configuration.
    pub fn new(config: ResilienceConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidArgument)?;
        let slots = Semaphore::new(config.max_concurrent_streams);
        Ok(Self { config, slots })
    }

    /// Orchestrator with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ResilienceConfig::default()).expect("default config is valid")
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    /// Point-in-time view of the process-wide resilience counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        metrics().snapshot()
    }

    /// Encode a payload source through the selected processing path.
    pub fn encode(
        &self,
        source: &mut dyn PayloadSource,
        filename: &str,
        target: EmbedTarget<'_>,
        password: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<RgbaImage> {
        cancel.check()?;
        match self.select_path(source.len_hint()) {
            ProcessingPath::InMemory => {
                self.encode_in_memory(source, filename, target, password, cancel)
            }
            ProcessingPath::Streaming => {
                metrics().record_streaming_attempt();
                match self.encode_streaming(source, filename, target, password, cancel) {
                    Ok(image) => Ok(image),
                    // honoring the caller's cancellation beats retrying
                    Err(Error::Canceled) => Err(Error::Canceled),
                    Err(err) => {
                        metrics().record_streaming_error();
                        if self.config.fallback_enabled && source.supports_rewind() {
                            source.rewind()?;
                            metrics().record_fallback();
                            self.encode_in_memory(source, filename, target, password, cancel)
                        } else {
                            Err(err)
                        }
                    }
                }
            }
        }
    }

    /// Decode a container through the selected processing path.
    pub fn decode(
        &self,
        image: &RgbaImage,
        password: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<codec::DecodedPayload> {
        cancel.check()?;
        let info = codec::peek_metadata(image)?;
        match self.select_path(Some(info.payload_len)) {
            ProcessingPath::InMemory => {
                let _reserved = Reservation::take(info.payload_len);
                codec::decode(image, password)
            }
            ProcessingPath::Streaming => {
                metrics().record_streaming_attempt();
                match self.decode_streaming(image, password, cancel) {
                    Ok(decoded) => Ok(decoded),
                    Err(Error::Canceled) => Err(Error::Canceled),
                    Err(err) => {
                        metrics().record_streaming_error();
                        if self.config.fallback_enabled {
                            // a pixel grid is random access, always retryable
                            metrics().record_fallback();
                            let _reserved = Reservation::take(info.payload_len);
                            codec::decode(image, password)
                        } else {
                            Err(err)
                        }
                    }
                }
            }
        }
    }

    /// Path selection, evaluated in fixed order.
    fn select_path(&self, len_hint: Option<u64>) -> ProcessingPath {
        if !self.config.streaming_enabled {
            return ProcessingPath::InMemory;
        }
        if in_flight_bytes() >= self.config.memory_budget {
            return ProcessingPath::Streaming;
        }
        match len_hint {
            Some(len) if len >= self.config.streaming_threshold => ProcessingPath::Streaming,
            Some(_) => ProcessingPath::InMemory,
            // unknown size: be conservative
            None => ProcessingPath::Streaming,
        }
    }

    fn encode_in_memory(
        &self,
        source: &mut dyn PayloadSource,
        filename: &str,
        target: EmbedTarget<'_>,
        password: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<RgbaImage> {
        // the in-memory path is unbounded and has no deadline; it still
        // honors the caller's cancellation between chunks
        let no_deadline = Deadline::start(std::time::Duration::from_secs(60 * 60 * 24 * 365));
        let payload = stream::drain(source, &no_deadline, cancel, self.config.chunk_size)?;
        let _reserved = Reservation::take(payload.len() as u64);

        let encoding = match target {
            EmbedTarget::Generated => crate::format::Encoding::Direct,
            EmbedTarget::Carrier { .. } => crate::format::Encoding::Lsb,
        };
        let bytes = codec::build_container(&payload, filename, password, encoding)?;
        crate::strategy::embed(target, &bytes)
    }

    fn encode_streaming(
        &self,
        source: &mut dyn PayloadSource,
        filename: &str,
        target: EmbedTarget<'_>,
        password: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<RgbaImage> {
        let _permit = self.slots.acquire(cancel)?;
        let deadline = Deadline::start(self.config.stream_timeout);
        stream::encode(
            source,
            filename,
            target,
            password,
            &deadline,
            cancel,
            self.config.chunk_size,
        )
    }

    fn decode_streaming(
        &self,
        image: &RgbaImage,
        password: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<codec::DecodedPayload> {
        let _permit = self.slots.acquire(cancel)?;
        let deadline = Deadline::start(self.config.stream_timeout);
        stream::decode(image, password, &deadline, cancel, self.config.chunk_size)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::MemorySource;

    fn small_threshold_config() -> ResilienceConfig {
        ResilienceConfig {
            streaming_threshold: 16,
            // keep path selection deterministic under parallel tests
            memory_budget: u64::MAX,
            ..Default::default()
        }
    }

    #[test]
    fn test_streaming_disabled_forces_in_memory() {
        let orchestrator = Orchestrator::new(ResilienceConfig {
            streaming_enabled: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            orchestrator.select_path(None),
            ProcessingPath::InMemory
        );
        assert_eq!(
            orchestrator.select_path(Some(u64::MAX)),
            ProcessingPath::InMemory
        );
    }

    #[test]
    fn test_selection_by_size() {
        let orchestrator = Orchestrator::new(small_threshold_config()).unwrap();
        assert_eq!(
            orchestrator.select_path(Some(8)),
            ProcessingPath::InMemory
        );
        assert_eq!(
            orchestrator.select_path(Some(16)),
            ProcessingPath::Streaming
        );
        assert_eq!(orchestrator.select_path(None), ProcessingPath::Streaming);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Orchestrator::new(ResilienceConfig {
            max_concurrent_streams: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_encode_decode_through_orchestrator() {
        let orchestrator = Orchestrator::new(small_threshold_config()).unwrap();
        let payload: Vec<u8> = (0..1_000).map(|i| (i % 256) as u8).collect();
        let cancel = CancelToken::new();

        // above the threshold: streaming path
        let mut source = MemorySource::new(payload.clone());
        let image = orchestrator
            .encode(&mut source, "f.bin", EmbedTarget::Generated, None, &cancel)
            .unwrap();

        let decoded = orchestrator.decode(&image, None, &cancel).unwrap();
        assert_eq!(decoded.data, payload);
        assert_eq!(decoded.filename, "f.bin");
    }

    #[test]
    fn test_reservation_releases() {
        // large enough that concurrent test traffic cannot mask it
        let marker = 1u64 << 40;
        {
            let _r = Reservation::take(marker);
            assert!(in_flight_bytes() >= marker);
        }
        assert!(in_flight_bytes() < marker);
    }
}
