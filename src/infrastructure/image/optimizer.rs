//! Optimization orchestrator.
//!
//! One [`ImageOptimizer`] per consuming view drives the pipeline for a
//! single (payload, options) pair: consult the caches, otherwise run
//! the three transforms concurrently, store the result, and expose the
//! staged URLs plus loading state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::entities::{OptimizeState, OptimizedImage};
use crate::domain::errors::{TransformError, TransformResult};
use crate::infrastructure::config::ViewportConfig;
use crate::infrastructure::image::eviction_cache::ProcessedImageCache;
use crate::infrastructure::image::transform;

/// Fixed user-facing message for any optimization failure. The
/// underlying error is logged, never surfaced.
pub const OPTIMIZE_FAILED_MESSAGE: &str = "Failed to optimize image";

/// How much of the raw payload keys the result memo when no explicit
/// cache key is supplied.
const MEMO_KEY_PREFIX_LEN: usize = 100;

/// Options for one optimization pipeline instance.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Produce a thumbnail rendition.
    pub enable_thumbnail: bool,
    /// Produce a blurred placeholder rendition.
    pub enable_placeholder: bool,
    /// Explicit key for the result memo; defaults to a payload prefix.
    pub cache_key: Option<String>,
    /// Viewport the sizing policy targets.
    pub viewport: ViewportConfig,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            enable_thumbnail: true,
            enable_placeholder: true,
            cache_key: None,
            viewport: ViewportConfig::default(),
        }
    }
}

/// Process-wide memo of completed results, keyed by cache key.
///
/// Sits in front of the eviction cache: where the eviction cache holds
/// only the final rendition, the memo holds the whole staged result so
/// a re-mounted view skips the pipeline entirely. Constructed at the
/// composition root and cloned into each optimizer.
#[derive(Debug, Clone, Default)]
pub struct ResultMemo {
    results: Arc<RwLock<HashMap<String, OptimizedImage>>>,
}

impl ResultMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, key: &str) -> Option<OptimizedImage> {
        self.results.read().await.get(key).cloned()
    }

    async fn insert(&self, key: String, result: OptimizedImage) {
        self.results.write().await.insert(key, result);
    }

    /// Drops all memoized results.
    pub async fn clear(&self) {
        self.results.write().await.clear();
    }
}

/// Per-image pipeline coordinator.
pub struct ImageOptimizer {
    cache: Arc<ProcessedImageCache>,
    memo: ResultMemo,
    options: OptimizeOptions,
    state_tx: watch::Sender<OptimizeState>,
}

impl ImageOptimizer {
    /// Creates an optimizer over an injected cache and memo.
    #[must_use]
    pub fn new(cache: Arc<ProcessedImageCache>, memo: ResultMemo, options: OptimizeOptions) -> Self {
        let (state_tx, _) = watch::channel(OptimizeState::Empty);
        Self {
            cache,
            memo,
            options,
            state_tx,
        }
    }

    /// Subscribes to state snapshots as the pipeline advances.
    ///
    /// A consumer torn down mid-flight simply drops its receiver; the
    /// stale result lands nowhere.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OptimizeState> {
        self.state_tx.subscribe()
    }

    /// Drives the pipeline for a raw payload and returns the completed
    /// result. An absent or empty payload resets to the empty result.
    /// Transform failures resolve to the error result; they never
    /// propagate out of this call.
    pub async fn optimize(&self, raw: Option<&str>) -> OptimizedImage {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            self.state_tx.send_replace(OptimizeState::Empty);
            return OptimizedImage::empty();
        };

        self.state_tx.send_replace(OptimizeState::Checking);

        let memo_key = self.memo_key(raw);
        if let Some(memoized) = self.memo.get(&memo_key).await {
            debug!("Serving memoized optimization result");
            self.state_tx
                .send_replace(OptimizeState::Ready(memoized.clone()));
            return memoized;
        }

        // The eviction cache stores only the final rendition, so a hit
        // yields a result without thumbnail or placeholder.
        if let Some(cached) = self.cache.get(raw).await {
            let result = OptimizedImage {
                original_url: Some(raw.to_owned()),
                optimized_url: Some(cached),
                ..OptimizedImage::default()
            };
            self.memo.insert(memo_key, result.clone()).await;
            self.state_tx
                .send_replace(OptimizeState::Ready(result.clone()));
            return result;
        }

        self.state_tx.send_replace(OptimizeState::Processing);

        match self.process(raw).await {
            Ok(result) => {
                if let Some(optimized) = &result.optimized_url {
                    self.cache.set(raw, optimized.clone()).await;
                }
                self.memo.insert(memo_key, result.clone()).await;
                self.state_tx
                    .send_replace(OptimizeState::Ready(result.clone()));
                result
            }
            Err(e) => {
                warn!(error = %e, "Image optimization failed");
                let result = OptimizedImage {
                    original_url: Some(raw.to_owned()),
                    error: Some(OPTIMIZE_FAILED_MESSAGE.to_owned()),
                    ..OptimizedImage::default()
                };
                self.state_tx
                    .send_replace(OptimizeState::Error(OPTIMIZE_FAILED_MESSAGE.to_owned()));
                result
            }
        }
    }

    /// Runs the three transforms concurrently and joins them. Disabled
    /// stages resolve to an absent URL without invoking the engine. All
    /// three settle before any result is surfaced; the first failure
    /// wins.
    async fn process(&self, raw: &str) -> TransformResult<OptimizedImage> {
        let policy = transform::optimal_size(
            self.options.viewport.width,
            self.options.viewport.device_pixel_ratio,
        );

        let full_task = {
            let raw = raw.to_owned();
            tokio::task::spawn_blocking(move || {
                transform::recompress(&raw, policy.quality, policy.width, policy.height).map(Some)
            })
        };

        let thumbnail_task = self.options.enable_thumbnail.then(|| {
            let raw = raw.to_owned();
            tokio::task::spawn_blocking(move || transform::thumbnail(&raw).map(Some))
        });

        let placeholder_task = self.options.enable_placeholder.then(|| {
            let raw = raw.to_owned();
            tokio::task::spawn_blocking(move || {
                transform::blurred_placeholder(&raw, transform::DEFAULT_PLACEHOLDER_BLUR).map(Some)
            })
        });

        let (full, thumb, placeholder) = tokio::join!(
            join_transform(Some(full_task)),
            join_transform(thumbnail_task),
            join_transform(placeholder_task),
        );

        Ok(OptimizedImage {
            original_url: Some(raw.to_owned()),
            optimized_url: full?,
            thumbnail_url: thumb?,
            placeholder_url: placeholder?,
            is_loading: false,
            is_optimizing: false,
            error: None,
        })
    }

    fn memo_key(&self, raw: &str) -> String {
        self.options.cache_key.clone().unwrap_or_else(|| {
            let end = raw
                .char_indices()
                .nth(MEMO_KEY_PREFIX_LEN)
                .map_or(raw.len(), |(i, _)| i);
            raw[..end].to_owned()
        })
    }
}

impl std::fmt::Debug for ImageOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageOptimizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Awaits an optional transform task; an absent task is an absent
/// rendition, and a panicked task surfaces as a tagged error.
async fn join_transform(
    task: Option<JoinHandle<TransformResult<Option<String>>>>,
) -> TransformResult<Option<String>> {
    match task {
        None => Ok(None),
        Some(handle) => handle
            .await
            .map_err(|e| TransformError::Task(e.to_string()))?,
    }
}
