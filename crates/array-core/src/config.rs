// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! kernel = "parallel"
//! parallel_threshold = 65536
//! num_threads = 4
//! ```

use crate::ops::{Kernel, ParallelKernel, ReferenceKernel};
use crate::ArrayError;
use std::path::Path;

/// Default minimum `rows * cols * inner` before the parallel kernel fans out.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Selects and parameterises the matrix-multiply kernel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Kernel name: `"reference"` or `"parallel"`.
    pub kernel: String,
    /// Minimum multiply-adds before the parallel kernel uses its pool.
    #[serde(default = "default_threshold")]
    pub parallel_threshold: usize,
    /// Number of worker threads (defaults to number of online CPU cores).
    pub num_threads: Option<usize>,
}

fn default_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ArrayError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArrayError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ArrayError> {
        toml::from_str(toml_str).map_err(|e| ArrayError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ArrayError> {
        toml::to_string_pretty(self)
            .map_err(|e| ArrayError::Config(format!("TOML serialise error: {e}")))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        match self.num_threads {
            Some(0) => {
                tracing::warn!("num_threads = 0 is not usable, falling back to 1");
                1
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or_else(|_| {
                    tracing::warn!("cannot query available parallelism, assuming 4 threads");
                    4
                }),
        }
    }

    /// Creates the kernel specified by this config.
    ///
    /// # Errors
    /// [`ArrayError::Config`] for an unknown kernel name or a thread pool that
    /// cannot be started.
    pub fn create_kernel(&self) -> Result<Box<dyn Kernel>, ArrayError> {
        let kernel: Box<dyn Kernel> = match self.kernel.to_lowercase().as_str() {
            "reference" | "portable" => Box::new(ReferenceKernel::new()),
            "parallel" | "rayon" => {
                let threads = self.resolve_threads();
                Box::new(ParallelKernel::new(threads, self.parallel_threshold)?)
            }
            other => {
                return Err(ArrayError::Config(format!(
                    "unknown kernel '{other}'; expected 'reference' or 'parallel'"
                )))
            }
        };
        tracing::info!("Using {} kernel", kernel.name());
        Ok(kernel)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernel: "reference".to_string(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            num_threads: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = EngineConfig::default();
        assert_eq!(c.kernel, "reference");
        assert_eq!(c.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(c.num_threads.is_none());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
kernel = "parallel"
parallel_threshold = 1000
num_threads = 2
"#;
        let c = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(c.kernel, "parallel");
        assert_eq!(c.parallel_threshold, 1000);
        assert_eq!(c.num_threads, Some(2));
        assert_eq!(c.resolve_threads(), 2);
    }

    #[test]
    fn test_from_toml_defaults_threshold() {
        let c = EngineConfig::from_toml("kernel = \"reference\"").unwrap();
        assert_eq!(c.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_from_toml_invalid() {
        let result = EngineConfig::from_toml("kernel = 3");
        assert!(matches!(result, Err(ArrayError::Config(_))));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = EngineConfig {
            kernel: "parallel".into(),
            parallel_threshold: 10,
            num_threads: Some(3),
        };
        let back = EngineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_resolve_threads() {
        assert!(EngineConfig::default().resolve_threads() >= 1);
        let zero = EngineConfig {
            num_threads: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.resolve_threads(), 1);
    }

    #[test]
    fn test_create_kernel_reference() {
        let k = EngineConfig::default().create_kernel().unwrap();
        assert_eq!(k.name(), "reference");
    }

    #[test]
    fn test_create_kernel_parallel() {
        let c = EngineConfig {
            kernel: "Parallel".into(),
            num_threads: Some(2),
            ..Default::default()
        };
        let k = c.create_kernel().unwrap();
        assert_eq!(k.name(), "parallel");
    }

    #[test]
    fn test_create_kernel_unknown() {
        let c = EngineConfig {
            kernel: "bogus".into(),
            ..Default::default()
        };
        assert!(matches!(c.create_kernel(), Err(ArrayError::Config(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let path = std::env::temp_dir().join("array-core-no-such-config.toml");
        assert!(matches!(EngineConfig::from_file(&path), Err(ArrayError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("array-core-config-{}.toml", std::process::id()));
        std::fs::write(&path, "kernel = \"parallel\"\nnum_threads = 1\n").unwrap();
        let c = EngineConfig::from_file(&path).unwrap();
        assert_eq!(c.kernel, "parallel");
        assert_eq!(c.num_threads, Some(1));
        let _ = std::fs::remove_file(&path);
    }
}
