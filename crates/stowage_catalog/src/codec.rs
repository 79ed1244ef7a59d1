//! Portable JSON form of a [`Catalog`].
//!
//! Capabilities travel as fully-qualified names and are resolved back through
//! a shared [`CapabilityResolver`] on decode. The generating machine's
//! separator is persisted verbatim; when it differs from the local one, every
//! relative path is rewritten once, at decode time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityResolver, CapabilitySet};
use crate::catalog::Catalog;
use crate::entry::{CatalogEntry, Identity};
use crate::error::CodecError;

/// What to do with a persisted capability name the registry does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedCapabilityPolicy {
    /// Keep the name as an unparented capability. It still matches filters
    /// naming the same capability, but has no place in the hierarchy.
    #[default]
    Opaque,
    /// Skip the name. An entry left without capabilities is dropped.
    Drop,
    /// Abort decoding with [`CodecError::UnresolvedCapability`].
    Fail,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDto {
    created_at: String,
    directory_separator: char,
    resources: Vec<EntryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryDto {
    identity: String,
    relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package: Option<String>,
    components: Vec<String>,
}

impl From<&CatalogEntry> for EntryDto {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            identity: entry.identity().as_str().to_string(),
            relative_path: entry.relative_path().to_string(),
            package: entry.package().map(str::to_string),
            components: entry
                .capabilities()
                .iter()
                .map(|capability| capability.name().to_string())
                .collect(),
        }
    }
}

/// Encodes and decodes catalogs.
#[derive(Debug, Clone)]
pub struct CatalogCodec {
    resolver: Arc<CapabilityResolver>,
    local_separator: char,
    policy: UnresolvedCapabilityPolicy,
}

impl CatalogCodec {
    /// Creates a codec resolving names through `resolver`, using the
    /// platform separator as the local one.
    #[must_use]
    pub fn new(resolver: Arc<CapabilityResolver>) -> Self {
        Self {
            resolver,
            local_separator: std::path::MAIN_SEPARATOR,
            policy: UnresolvedCapabilityPolicy::default(),
        }
    }

    /// Overrides the local separator decoded paths are rewritten to.
    #[must_use]
    pub fn with_local_separator(mut self, separator: char) -> Self {
        self.local_separator = separator;
        self
    }

    /// Sets the policy for names the registry does not know.
    #[must_use]
    pub fn with_policy(mut self, policy: UnresolvedCapabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The separator decoded catalogs use.
    #[must_use]
    pub fn local_separator(&self) -> char {
        self.local_separator
    }

    /// The resolver shared by every decode.
    #[must_use]
    pub fn resolver(&self) -> &Arc<CapabilityResolver> {
        &self.resolver
    }

    /// Serializes `catalog` to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn encode(&self, catalog: &Catalog) -> Result<Vec<u8>, CodecError> {
        let dto = CatalogDto {
            created_at: catalog.created_at().to_rfc3339(),
            directory_separator: catalog.path_separator(),
            resources: catalog.entries().iter().map(EntryDto::from).collect(),
        };
        Ok(serde_json::to_vec(&dto)?)
    }

    /// Deserializes a catalog, rewriting paths to the local separator.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the bytes are not a catalog, the timestamp
    /// does not parse, or a capability name cannot be handled under the
    /// configured policy.
    pub fn decode(&self, bytes: &[u8]) -> Result<Catalog, CodecError> {
        let dto: CatalogDto = serde_json::from_slice(bytes)?;
        let created_at = DateTime::parse_from_rfc3339(&dto.created_at)
            .map_err(|source| CodecError::Timestamp {
                value: dto.created_at.clone(),
                source,
            })?
            .with_timezone(&Utc);

        let rewrite = dto.directory_separator != self.local_separator;
        if rewrite {
            tracing::debug!(
                persisted = %dto.directory_separator,
                local = %self.local_separator,
                "rewriting catalog paths to local separator"
            );
        }

        let mut entries = Vec::with_capacity(dto.resources.len());
        for resource in dto.resources {
            let relative_path = if rewrite {
                resource.relative_path.replace(
                    dto.directory_separator,
                    self.local_separator.encode_utf8(&mut [0; 4]),
                )
            } else {
                resource.relative_path
            };

            let capabilities = self.resolve_all(&resource.components)?;
            if capabilities.is_empty() {
                if resource.components.is_empty() {
                    return Err(CodecError::EmptyCapabilities {
                        path: relative_path,
                    });
                }
                tracing::warn!(path = %relative_path, "dropping entry without resolvable capabilities");
                continue;
            }

            entries.push(CatalogEntry::new(
                Identity::from(resource.identity),
                relative_path,
                resource.package,
                capabilities,
                self.local_separator,
            ));
        }

        tracing::debug!(entries = entries.len(), "catalog decoded");
        Ok(Catalog::new(created_at, entries, self.local_separator))
    }

    fn resolve_all(&self, names: &[String]) -> Result<CapabilitySet, CodecError> {
        let mut capabilities = CapabilitySet::new();
        for name in names {
            if let Some(capability) = self.resolve(name)? {
                capabilities.insert(capability);
            }
        }
        Ok(capabilities)
    }

    fn resolve(&self, name: &str) -> Result<Option<Capability>, CodecError> {
        if let Some(capability) = self.resolver.resolve(name) {
            return Ok(Some(capability));
        }
        match self.policy {
            UnresolvedCapabilityPolicy::Opaque => {
                tracing::warn!(name, "unknown capability kept as opaque");
                Ok(Some(Capability::new(name)))
            }
            UnresolvedCapabilityPolicy::Drop => {
                tracing::warn!(name, "unknown capability dropped");
                Ok(None)
            }
            UnresolvedCapabilityPolicy::Fail => Err(CodecError::UnresolvedCapability {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityRegistry;
    use chrono::TimeZone;

    fn resolver() -> Arc<CapabilityResolver> {
        let mut registry = CapabilityRegistry::new();
        let asset = registry.register("engine::Asset");
        registry.register_subtype("engine::TextAsset", &asset);
        registry.register("engine::Transform");
        Arc::new(CapabilityResolver::new(Arc::new(registry)))
    }

    fn catalog(separator: char, resolver: &CapabilityResolver) -> Catalog {
        let text = resolver.resolve("engine::TextAsset").unwrap();
        let path = format!("folder{separator}nested{separator}someAsset.asset");
        Catalog::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            vec![
                CatalogEntry::new(
                    Identity::new("a1"),
                    path,
                    Some("com.acme".into()),
                    CapabilitySet::single(text.clone()),
                    separator,
                ),
                CatalogEntry::new(
                    Identity::new("b2"),
                    "top.asset",
                    None,
                    CapabilitySet::single(text),
                    separator,
                ),
            ],
            separator,
        )
    }

    #[test]
    fn round_trip_with_same_separator() {
        let resolver = resolver();
        let codec = CatalogCodec::new(resolver.clone()).with_local_separator('/');
        let original = catalog('/', &resolver);

        let decoded = codec.decode(&codec.encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn foreign_separator_is_rewritten_once() {
        let resolver = resolver();
        let original = catalog('\\', &resolver);
        let bytes = CatalogCodec::new(resolver.clone())
            .with_local_separator('\\')
            .encode(&original)
            .unwrap();

        let decoded = CatalogCodec::new(resolver)
            .with_local_separator('/')
            .decode(&bytes)
            .unwrap();
        assert_eq!(decoded.path_separator(), '/');
        assert_eq!(decoded.len(), original.len());
        for (decoded, original) in decoded.entries().iter().zip(original.entries()) {
            assert_eq!(decoded.name(), original.name());
            assert!(!decoded.relative_path().contains('\\'));
            assert_eq!(decoded.logical_path(), original.logical_path().replace('\\', "/"));
        }
        assert_eq!(decoded.entries()[0].directory(), "folder/nested");
    }

    #[test]
    fn resolution_is_memoized_across_entries() {
        let resolver = resolver();
        let codec = CatalogCodec::new(resolver.clone()).with_local_separator('/');
        let bytes = codec.encode(&catalog('/', &resolver)).unwrap();
        resolver.clear();

        codec.decode(&bytes).unwrap();
        let stats = resolver.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn decoded_capabilities_keep_hierarchy() {
        let resolver = resolver();
        let codec = CatalogCodec::new(resolver.clone()).with_local_separator('/');
        let decoded = codec.decode(&codec.encode(&catalog('/', &resolver)).unwrap()).unwrap();
        let asset = resolver.resolve("engine::Asset").unwrap();
        assert!(decoded.entries().iter().all(|entry| entry.has_capability(&asset)));
    }

    const UNKNOWN: &str = r#"{
        "createdAt": "2024-03-01T12:30:00+00:00",
        "directorySeparator": "/",
        "resources": [
            { "identity": "1", "relativePath": "a.bin", "components": ["game::Missing", "engine::Transform"] },
            { "identity": "2", "relativePath": "b.bin", "components": ["game::Missing"] }
        ]
    }"#;

    #[test]
    fn unknown_names_are_opaque_by_default() {
        let codec = CatalogCodec::new(resolver()).with_local_separator('/');
        let decoded = codec.decode(UNKNOWN.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.entries()[1].capabilities().names(), vec!["game::Missing"]);
        assert!(decoded.entries()[1].has_capability(&Capability::new("game::Missing")));
    }

    #[test]
    fn drop_policy_skips_names_and_empty_entries() {
        let codec = CatalogCodec::new(resolver())
            .with_local_separator('/')
            .with_policy(UnresolvedCapabilityPolicy::Drop);
        let decoded = codec.decode(UNKNOWN.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.entries()[0].capabilities().names(), vec!["engine::Transform"]);
    }

    #[test]
    fn fail_policy_aborts() {
        let codec = CatalogCodec::new(resolver())
            .with_local_separator('/')
            .with_policy(UnresolvedCapabilityPolicy::Fail);
        let err = codec.decode(UNKNOWN.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::UnresolvedCapability { name } if name == "game::Missing"));
    }

    #[test]
    fn malformed_input() {
        let codec = CatalogCodec::new(resolver());
        assert!(matches!(codec.decode(b"not json"), Err(CodecError::Json(_))));

        let bad_time = r#"{"createdAt":"yesterday","directorySeparator":"/","resources":[]}"#;
        assert!(matches!(
            codec.decode(bad_time.as_bytes()),
            Err(CodecError::Timestamp { .. })
        ));

        let empty = r#"{"createdAt":"2024-03-01T12:30:00Z","directorySeparator":"/","resources":[
            {"identity":"1","relativePath":"a.bin","components":[]}]}"#;
        assert!(matches!(
            codec.decode(empty.as_bytes()),
            Err(CodecError::EmptyCapabilities { .. })
        ));
    }
}
