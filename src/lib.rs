#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner shared by the demo binary.
pub mod app;
/// Collector outputs and their persisted encoding.
pub mod artifact;
/// Collector traits, built-in collectors, and bound collectors.
pub mod collector;
/// Experiment configuration points and feature modes.
pub mod config;
/// Centralized constants for storage keys, artifact keys, and defaults.
pub mod constants;
/// Per-document records handed to collectors.
pub mod document;
/// Feature extractor descriptors and the dependency declarator capability.
pub mod extractor;
mod hash;
/// Storage namespace allocator.
pub mod namespace;
/// Pipeline assembly and the collection scan.
pub mod pipeline;
/// Corpus readers.
pub mod reader;
/// Collector resolution for one configuration point.
pub mod resolve;
/// Key-to-folder storage service.
pub mod storage;
/// Task lifecycle, manifests, and up-to-date checks.
pub mod task;
/// Filesystem helpers (corpus discovery, atomic writes).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Tokenization and text normalization helpers.
pub mod utils;

mod errors;

pub use artifact::{Artifact, ContextEntry, ContextTable, FrequencyEntry, FrequencyTable};
pub use collector::{
    BoundCollector, CollectorDescription, CollectorFactory, CollectorKind, MetaCollector,
};
pub use config::{CorpusInput, ExperimentConfig, ExperimentPoint, FeatureMode};
pub use document::{Document, DocumentView, TextSpan};
pub use errors::MetaError;
pub use extractor::{
    ExtractorDescriptor, ExtractorPlugin, ImplementationRef, MetaDependent, ResolvedExtractor,
};
pub use namespace::{StorageBinding, StorageRequest, resolve_storage_path};
pub use pipeline::{MetaPipeline, PipelineReport, PipelineStage};
pub use reader::{CorpusReader, DocumentStream, InMemoryCorpus, LineCorpusReader, SerializedCorpusReader};
pub use resolve::{configure_storage_locations, resolve_meta_collectors};
pub use storage::{AccessMode, FsStorageService, StorageService};
pub use task::{MetaInfoTask, MetaRunReport, RunManifest, TaskState};
pub use types::{
    DocumentId, ExtractorId, ImplementationName, ParameterMap, ParameterName, PreferredKey,
    StorageKey, StoragePath, Term, ViewName,
};
