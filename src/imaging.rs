pub mod codec;
pub mod cover;
pub mod swap;

use crate::config::ImageConfig;
use crate::locks::KeyedLocks;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions treated as image requests by the cover policy.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "avif", "gif", "webp"];

/// Which rules materialize missing image paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationPolicy {
    /// `cover.*` requests produce `cover.jpg` from the directory's first image.
    #[default]
    Cover,
    /// Missing `.jpg` files are converted from `.png`/`.gif` siblings.
    ExtensionSwap,
}

/// Result of trying to materialize a missing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationOutcome {
    /// Serve this derivative.
    Derived(PathBuf),
    /// Derivation failed; serve this untouched source.
    Fallback(PathBuf),
    /// No source exists; serve the requested path as-is.
    Unavailable,
}

impl DerivationOutcome {
    /// Path to serve for this outcome, given the originally requested path.
    pub fn into_served_path(self, requested: &Path) -> PathBuf {
        match self {
            DerivationOutcome::Derived(path) | DerivationOutcome::Fallback(path) => path,
            DerivationOutcome::Unavailable => requested.to_path_buf(),
        }
    }
}

/// Size and quality parameters for generated files.
#[derive(Debug, Clone, Copy)]
pub struct DerivationOptions {
    /// Target width of covers in pixels.
    pub cover_width: u32,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

/// Materializes derivative images on first request.
#[derive(Clone)]
pub struct DerivationEngine {
    policy: DerivationPolicy,
    options: DerivationOptions,
    locks: KeyedLocks,
}

impl DerivationEngine {
    /// Create an engine from configuration.
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            policy: config.policy,
            options: DerivationOptions {
                cover_width: config.cover_width.max(1),
                jpeg_quality: config.jpeg_quality.clamp(1, 100),
            },
            locks: KeyedLocks::new(),
        }
    }

    /// Active policy.
    pub fn policy(&self) -> DerivationPolicy {
        self.policy
    }

    /// Whether a missing `path` is a candidate for derivation.
    pub fn applies_to(&self, path: &Path) -> bool {
        let extension = path.extension().and_then(|e| e.to_str());
        match self.policy {
            DerivationPolicy::Cover => {
                path.file_stem().is_some_and(|s| s == cover::COVER_STEM)
                    && extension.is_some_and(|ext| {
                        IMAGE_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
            }
            DerivationPolicy::ExtensionSwap => extension == Some("jpg"),
        }
    }

    /// Materialize the derivative for a missing `requested` path.
    ///
    /// Concurrent calls for the same target wait on each other; the later
    /// ones find the finished file.
    pub async fn derive(&self, requested: &Path) -> DerivationOutcome {
        let Some(dir) = requested.parent().map(Path::to_path_buf) else {
            return DerivationOutcome::Unavailable;
        };

        let requested = requested.to_path_buf();

        // Every file a derivation may write is locked, conversion target
        // (`1.jpg`) before the requested `cover.jpg`, so lock order is fixed.
        let lock_keys = match self.policy {
            DerivationPolicy::Cover => vec![dir.join(cover::COVER_FILE)],
            DerivationPolicy::ExtensionSwap => {
                let mut keys: Vec<PathBuf> = swap::conversion_target(&requested)
                    .into_iter()
                    .collect();
                if !keys.contains(&requested) {
                    keys.push(requested.clone());
                }
                keys
            }
        };
        let mut guards = Vec::with_capacity(lock_keys.len());
        for key in &lock_keys {
            guards.push(self.locks.lock(key.to_string_lossy().into_owned()).await);
        }

        let policy = self.policy;
        let options = self.options;
        let task = tokio::task::spawn_blocking(move || match policy {
            DerivationPolicy::Cover => cover::derive(&dir, &options),
            DerivationPolicy::ExtensionSwap => swap::derive(&requested, &options),
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Derivation task failed");
                DerivationOutcome::Unavailable
            }
        }
    }
}
