//! Dependency resolution: which collectors run for one configuration point.

use std::collections::HashSet;
use std::path::{Component, Path};

use tracing::{debug, info};

use crate::collector::{BoundCollector, CollectorDescription, CollectorKind, MetaCollector};
use crate::config::FeatureMode;
use crate::errors::MetaError;
use crate::extractor::ExtractorDescriptor;
use crate::namespace::StorageRequest;

/// Resolve the ordered list of bound collectors for one configuration point.
///
/// Mode-level context collectors come first, followed by the collectors of
/// each meta-dependent extractor in configuration order. Equal collectors
/// declared by different extractors are bound and run once per extractor.
pub fn resolve_meta_collectors(
    extractors: &[ExtractorDescriptor],
    feature_mode: FeatureMode,
) -> Result<Vec<BoundCollector>, MetaError> {
    if extractors.is_empty() {
        return Err(MetaError::Configuration("no feature extractors".into()));
    }
    validate_identities(extractors)?;

    let mut collectors = Vec::new();
    match feature_mode {
        FeatureMode::Unit => collectors.push(configure_storage_locations(
            &CollectorKind::UnitContext.into(),
            None,
        )?),
        FeatureMode::Sequence => collectors.push(configure_storage_locations(
            &CollectorKind::SequenceContext.into(),
            None,
        )?),
        FeatureMode::Document | FeatureMode::Pair => {}
    }

    for descriptor in extractors {
        let resolved = descriptor.resolve()?;
        let Some(dependent) = resolved.as_meta_dependent() else {
            debug!(
                extractor = descriptor.identity(),
                implementation = resolved.name(),
                "extractor needs no meta collection"
            );
            continue;
        };
        for description in dependent.meta_collectors() {
            collectors.push(configure_storage_locations(
                &description,
                Some(descriptor.identity()),
            )?);
        }
    }

    ensure_unique_paths(&collectors)?;
    info!(
        %feature_mode,
        extractors = extractors.len(),
        collectors = collectors.len(),
        "resolved meta collectors"
    );
    Ok(collectors)
}

/// Bind every storage parameter of a primitive collector into the namespace
/// of `extractor` (or the bare preferred keys when `None`).
pub fn configure_storage_locations(
    description: &CollectorDescription,
    extractor: Option<&str>,
) -> Result<BoundCollector, MetaError> {
    let kind = match description {
        CollectorDescription::Primitive(kind) => kind,
        CollectorDescription::Aggregate { name, parts } => {
            return Err(MetaError::UnsupportedConfiguration {
                extractor: extractor.map(str::to_string),
                collector: name.clone(),
                reason: format!(
                    "only primitive meta collectors are supported, found a composite of {} parts",
                    parts.len()
                ),
            });
        }
    };
    let instance = kind.instantiate().map_err(|err| match err {
        MetaError::Resolution { .. } | MetaError::InvalidImplementation { .. } => err,
        other => MetaError::Resolution {
            extractor: extractor.map(str::to_string),
            implementation: kind.name().to_string(),
            reason: other.to_string(),
        },
    })?;
    let requests = validate_contract(instance.as_ref(), kind, extractor)?;
    let bindings = requests
        .iter()
        .map(|request| request.bind(extractor))
        .collect();
    Ok(BoundCollector::new(
        kind.clone(),
        extractor.map(str::to_string),
        bindings,
    ))
}

/// Fail when two collectors would write the same storage path.
pub fn ensure_unique_paths(collectors: &[BoundCollector]) -> Result<(), MetaError> {
    let mut seen = HashSet::new();
    for binding in collectors.iter().flat_map(|c| c.bindings()) {
        if !seen.insert(binding.resolved_path.as_str()) {
            return Err(MetaError::Configuration(format!(
                "storage path '{}' is bound by more than one collector",
                binding.resolved_path
            )));
        }
    }
    Ok(())
}

fn validate_identities(extractors: &[ExtractorDescriptor]) -> Result<(), MetaError> {
    let mut seen = HashSet::new();
    for descriptor in extractors {
        let identity = descriptor.identity();
        if !is_single_path_segment(identity) {
            return Err(MetaError::Configuration(format!(
                "extractor identity '{identity}' must be a non-empty name without path separators"
            )));
        }
        if !seen.insert(identity) {
            return Err(MetaError::Configuration(format!(
                "extractor identity '{identity}' is used more than once"
            )));
        }
    }
    Ok(())
}

fn validate_contract(
    collector: &dyn MetaCollector,
    kind: &CollectorKind,
    extractor: Option<&str>,
) -> Result<Vec<StorageRequest>, MetaError> {
    let violation = |reason: String| MetaError::InvalidImplementation {
        extractor: extractor.map(str::to_string),
        implementation: kind.name().to_string(),
        reason,
    };
    let requests = collector.storage_requests();
    if requests.is_empty() {
        return Err(violation("collector declares no storage parameters".into()));
    }
    let mut parameters = HashSet::new();
    for request in &requests {
        if request.parameter.is_empty() {
            return Err(violation("storage parameter name is empty".into()));
        }
        if !parameters.insert(request.parameter.as_str()) {
            return Err(violation(format!(
                "storage parameter '{}' is declared more than once",
                request.parameter
            )));
        }
        if !is_single_path_segment(&request.preferred_key) {
            return Err(violation(format!(
                "preferred key '{}' of parameter '{}' must be a plain file name",
                request.preferred_key, request.parameter
            )));
        }
    }
    Ok(requests)
}

fn is_single_path_segment(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
