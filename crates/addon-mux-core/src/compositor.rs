use addon_mux_models::{BehaviorHints, CatalogRegistration, CombinedCatalog, CombinedManifest, ManifestInfo};
use rand::Rng;
use std::collections::HashSet;
use crate::composite_id::composite_catalog_id;
use crate::shuffle::shuffle_with;

const CATALOG_RESOURCE: &str = "catalog";

/// Builds the per-user combined manifest from a list of registrations.
///
/// The registrations must already be filtered to active ones and sorted by
/// `order`; the compositor keeps whatever order it is given.
#[derive(Debug, Clone)]
pub struct ManifestCompositor {
    info: ManifestInfo,
}

impl ManifestCompositor {
    pub fn new(info: ManifestInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &ManifestInfo {
        &self.info
    }

    pub fn compose(&self, registrations: &[CatalogRegistration]) -> CombinedManifest {
        self.compose_with_rng(registrations, &mut rand::rng())
    }

    pub fn compose_with_rng<R: Rng>(&self, registrations: &[CatalogRegistration], rng: &mut R) -> CombinedManifest {
        if registrations.is_empty() {
            return self.configuration_required(None);
        }

        let mut types = OrderedSet::default();
        let mut id_prefixes = OrderedSet::default();
        let mut catalogs = Vec::new();

        for registration in registrations {
            let manifest = &registration.original_manifest;
            types.extend(&manifest.types);
            id_prefixes.extend(&manifest.id_prefixes);

            for inner in &manifest.catalogs {
                let genres = match &inner.genres {
                    Some(genres) if registration.randomized => Some(shuffle_with(genres, rng)),
                    other => other.clone(),
                };

                catalogs.push(CombinedCatalog {
                    content_type: inner.content_type.clone(),
                    id: composite_catalog_id(&manifest.id, &inner.id),
                    name: registration.display_name.clone(),
                    genres,
                    extra: inner.extra.clone(),
                    extra_supported: inner.extra_supported.clone(),
                });
            }
        }

        CombinedManifest {
            id: self.info.id.clone(),
            version: self.info.version.clone(),
            name: self.info.name.clone(),
            description: self.info.description.clone(),
            logo: self.info.logo.clone(),
            background: self.info.background.clone(),
            resources: vec![CATALOG_RESOURCE.to_string()],
            types: types.into_vec(),
            id_prefixes: id_prefixes.into_vec(),
            catalogs,
            behavior_hints: BehaviorHints {
                configurable: true,
                configuration_required: false,
            },
        }
    }

    /// Manifest served when the user id does not resolve to a known user
    pub fn user_not_found(&self) -> CombinedManifest {
        self.configuration_required(Some("user not found"))
    }

    fn configuration_required(&self, notice: Option<&str>) -> CombinedManifest {
        let (name, description) = match notice {
            Some(notice) => (
                format!("{} ({})", self.info.name, notice),
                format!("{}. Check your addon URL and configure your catalogs.", capitalize(notice)),
            ),
            None => (
                self.info.name.clone(),
                "No active catalogs. Configure at least one catalog to get started.".to_string(),
            ),
        };

        CombinedManifest {
            id: self.info.id.clone(),
            version: self.info.version.clone(),
            name,
            description,
            logo: self.info.logo.clone(),
            background: self.info.background.clone(),
            resources: Vec::new(),
            types: Vec::new(),
            id_prefixes: Vec::new(),
            catalogs: Vec::new(),
            behavior_hints: BehaviorHints {
                configurable: true,
                configuration_required: true,
            },
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Set union keeping first-appearance order
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn extend<'a>(&mut self, values: impl IntoIterator<Item = &'a String>) {
        for value in values {
            if self.seen.insert(value.clone()) {
                self.items.push(value.clone());
            }
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}
