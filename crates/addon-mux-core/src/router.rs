use addon_mux_models::{CatalogDescriptor, CatalogRegistration, CatalogResponse, SOURCE_ADDON_FIELD};
use addon_mux_sources::CatalogFetcher;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::composite_id::candidate_fragment;
use crate::shuffle::shuffle;

/// An inbound request for one entry of the combined manifest
#[derive(Debug, Clone, Copy)]
pub struct CatalogRequest<'a> {
    pub content_type: &'a str,
    pub composite_id: &'a str,
    /// Extra arguments (`genre=Action&skip=100`), forwarded to the upstream addon
    pub extra: Option<&'a str>,
}

impl<'a> CatalogRequest<'a> {
    pub fn new(content_type: &'a str, composite_id: &'a str) -> Self {
        Self {
            content_type,
            composite_id,
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: Option<&'a str>) -> Self {
        self.extra = extra;
        self
    }
}

/// The registration and inner catalog a composite id resolved to
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCatalog<'a> {
    pub registration: &'a CatalogRegistration,
    pub catalog: &'a CatalogDescriptor,
}

/// Map a composite catalog id back to the registration and inner catalog it was built from.
///
/// A registration is a candidate when the id starts with its addon id followed by the
/// separator. Within a candidate, an inner catalog of the requested type matches when its
/// id equals the remaining fragment, or failing that when it is contained in the fragment,
/// which also accepts legacy ids carrying trailing noise. Registrations are tried in list
/// order and the first one with any match wins.
pub fn resolve_catalog<'a>(
    registrations: &'a [CatalogRegistration],
    content_type: &str,
    composite_id: &str,
) -> Option<ResolvedCatalog<'a>> {
    registrations
        .iter()
        .filter(|registration| registration.is_active())
        .find_map(|registration| {
            let fragment = candidate_fragment(composite_id, registration.addon_id())?;
            let catalogs = &registration.original_manifest.catalogs;
            let of_type = |catalog: &&CatalogDescriptor| catalog.content_type == content_type;

            catalogs
                .iter()
                .filter(of_type)
                .find(|catalog| catalog.id == fragment)
                .or_else(|| {
                    catalogs
                        .iter()
                        .filter(of_type)
                        .find(|catalog| fragment.contains(catalog.id.as_str()))
                })
                .map(|catalog| ResolvedCatalog { registration, catalog })
        })
}

/// Stamp every item with the registration's display name and shuffle when the
/// registration is randomized. Non-object items are passed through untouched.
pub fn tag_and_order(mut items: Vec<Value>, registration: &CatalogRegistration) -> Vec<Value> {
    for item in items.iter_mut() {
        if let Value::Object(fields) = item {
            fields.insert(
                SOURCE_ADDON_FIELD.to_string(),
                Value::String(registration.display_name.clone()),
            );
        }
    }

    if registration.randomized && items.len() > 1 {
        shuffle(&items)
    } else {
        items
    }
}

/// Resolves catalog requests against a user's registrations and proxies them upstream.
///
/// Routing misses and upstream failures never surface as errors; they produce an
/// empty `metas` list.
#[derive(Clone)]
pub struct CatalogRouter {
    fetcher: Arc<dyn CatalogFetcher>,
}

impl CatalogRouter {
    pub fn new(fetcher: Arc<dyn CatalogFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn route(&self, registrations: &[CatalogRegistration], request: CatalogRequest<'_>) -> CatalogResponse {
        let Some(resolved) = resolve_catalog(registrations, request.content_type, request.composite_id) else {
            info!(
                operation = "catalog_route_miss",
                content_type = request.content_type,
                composite_id = request.composite_id,
                "No active registration matches catalog id"
            );
            return CatalogResponse::empty();
        };

        let registration = resolved.registration;
        let endpoint = registration.endpoint();
        debug!(
            operation = "catalog_route",
            composite_id = request.composite_id,
            addon_id = registration.addon_id(),
            inner_id = %resolved.catalog.id,
            endpoint = %endpoint,
            "Resolved catalog request"
        );

        let items = match self
            .fetcher
            .fetch_catalog(&endpoint, request.content_type, &resolved.catalog.id, request.extra)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    operation = "catalog_upstream_error",
                    composite_id = request.composite_id,
                    addon_id = registration.addon_id(),
                    error = %e,
                    "Upstream catalog fetch failed, returning no items"
                );
                return CatalogResponse::empty();
            }
        };

        if items.is_empty() {
            return CatalogResponse::empty();
        }

        CatalogResponse {
            metas: tag_and_order(items, registration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_mux_models::{AddonManifest, RegistrationStatus};
    use addon_mux_sources::UpstreamError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct FetchCall {
        endpoint: String,
        content_type: String,
        inner_id: String,
        extra: Option<String>,
    }

    /// Serves a fixed set of items and records every call
    struct RecordingFetcher {
        items: Vec<Value>,
        fail: bool,
        calls: Mutex<Vec<FetchCall>>,
    }

    impl RecordingFetcher {
        fn returning(items: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                items,
                fail: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                items: Vec::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<FetchCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogFetcher for RecordingFetcher {
        async fn fetch_catalog(
            &self,
            endpoint: &str,
            content_type: &str,
            inner_id: &str,
            extra: Option<&str>,
        ) -> Result<Vec<Value>, UpstreamError> {
            self.calls.lock().unwrap().push(FetchCall {
                endpoint: endpoint.to_string(),
                content_type: content_type.to_string(),
                inner_id: inner_id.to_string(),
                extra: extra.map(str::to_string),
            });
            if self.fail {
                return Err(UpstreamError::Status {
                    url: endpoint.to_string(),
                    status: 500,
                });
            }
            Ok(self.items.clone())
        }
    }

    fn catalog(content_type: &str, id: &str) -> CatalogDescriptor {
        CatalogDescriptor {
            content_type: content_type.to_string(),
            id: id.to_string(),
            ..CatalogDescriptor::default()
        }
    }

    fn registration(addon_id: &str, display_name: &str, catalogs: Vec<CatalogDescriptor>) -> CatalogRegistration {
        CatalogRegistration {
            manifest_url: format!("https://{addon_id}.example/manifest.json"),
            display_name: display_name.to_string(),
            status: RegistrationStatus::Active,
            randomized: false,
            order: 0,
            original_manifest: AddonManifest {
                id: addon_id.to_string(),
                catalogs,
                ..AddonManifest::default()
            },
            registered_at: None,
        }
    }

    fn movies(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({"id": format!("tt{i:07}"), "type": "movie", "name": format!("Movie {i}")}))
            .collect()
    }

    #[test]
    fn test_resolve_round_trip() {
        let registrations = vec![
            registration("com.alpha", "Alpha", vec![catalog("movie", "top"), catalog("series", "top")]),
            registration("my-addon", "Mine", vec![catalog("movie", "top-rated"), catalog("movie", "new-releases")]),
        ];

        for registration in &registrations {
            for inner in &registration.original_manifest.catalogs {
                let id = crate::composite_catalog_id(registration.addon_id(), &inner.id);
                let resolved = resolve_catalog(&registrations, &inner.content_type, &id).unwrap();
                assert_eq!(resolved.registration.addon_id(), registration.addon_id());
                assert_eq!(resolved.catalog, inner);
            }
        }
    }

    #[test]
    fn test_resolve_prefers_exact_inner_id_over_containment() {
        let registrations = vec![registration(
            "com.alpha",
            "Alpha",
            vec![catalog("movie", "top"), catalog("movie", "top-rated")],
        )];

        let resolved = resolve_catalog(&registrations, "movie", "com.alpha-top-rated").unwrap();
        assert_eq!(resolved.catalog.id, "top-rated");
    }

    #[test]
    fn test_resolve_accepts_legacy_suffix_noise() {
        let registrations = vec![registration("com.alpha", "Alpha", vec![catalog("movie", "top")])];

        let resolved = resolve_catalog(&registrations, "movie", "com.alpha-top-legacy1").unwrap();
        assert_eq!(resolved.catalog.id, "top");
    }

    #[test]
    fn test_resolve_first_registration_wins() {
        let registrations = vec![
            registration("com.dup", "First", vec![catalog("movie", "top")]),
            registration("com.dup", "Second", vec![catalog("movie", "top")]),
        ];

        let resolved = resolve_catalog(&registrations, "movie", "com.dup-top").unwrap();
        assert_eq!(resolved.registration.display_name, "First");
    }

    #[test]
    fn test_resolve_earlier_containment_beats_later_exact() {
        let registrations = vec![
            registration("com.a", "First", vec![catalog("movie", "top")]),
            registration("com.a-top", "Second", vec![catalog("movie", "rated")]),
        ];

        let resolved = resolve_catalog(&registrations, "movie", "com.a-top-rated").unwrap();
        assert_eq!(resolved.registration.display_name, "First");
        assert_eq!(resolved.catalog.id, "top");
    }

    #[test]
    fn test_resolve_requires_matching_type_and_separator() {
        let registrations = vec![registration("com.alpha", "Alpha", vec![catalog("movie", "top")])];

        assert!(resolve_catalog(&registrations, "series", "com.alpha-top").is_none());
        assert!(resolve_catalog(&registrations, "movie", "com.alphatop").is_none());
        assert!(resolve_catalog(&registrations, "movie", "com.gamma-top").is_none());
    }

    #[test]
    fn test_resolve_skips_inactive_registrations() {
        let mut inactive = registration("com.alpha", "Alpha", vec![catalog("movie", "top")]);
        inactive.status = RegistrationStatus::Inactive;

        assert!(resolve_catalog(&[inactive], "movie", "com.alpha-top").is_none());
    }

    #[test]
    fn test_tag_and_order_overrides_source_addon() {
        let items = vec![
            json!({"id": "tt1", "type": "movie", "name": "One", "sourceAddon": "Somebody Else"}),
            json!({"id": "tt2", "type": "movie", "name": "Two"}),
            json!("not an object"),
        ];
        let registration = registration("com.alpha", "Alpha Picks", vec![]);

        let tagged = tag_and_order(items, &registration);
        assert_eq!(tagged[0]["sourceAddon"], "Alpha Picks");
        assert_eq!(tagged[1]["sourceAddon"], "Alpha Picks");
        assert_eq!(tagged[1]["name"], "Two");
        assert_eq!(tagged[2], json!("not an object"));
    }

    #[tokio::test]
    async fn test_route_fetches_from_resolved_registration() {
        let registrations = vec![
            registration("com.alpha", "Alpha Picks", vec![catalog("movie", "top")]),
            registration("com.beta", "Beta Picks", vec![catalog("movie", "top")]),
        ];
        let fetcher = RecordingFetcher::returning(movies(3));
        let router = CatalogRouter::new(fetcher.clone());

        let response = router
            .route(&registrations, CatalogRequest::new("movie", "com.beta-top"))
            .await;

        assert_eq!(
            fetcher.calls(),
            vec![FetchCall {
                endpoint: "https://com.beta.example/".to_string(),
                content_type: "movie".to_string(),
                inner_id: "top".to_string(),
                extra: None,
            }]
        );
        assert_eq!(response.metas.len(), 3);
        assert!(response.metas.iter().all(|m| m["sourceAddon"] == "Beta Picks"));
        let ids: Vec<&str> = response.metas.iter().map(|m| m["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["tt0000000", "tt0000001", "tt0000002"]);
    }

    #[tokio::test]
    async fn test_route_forwards_extra() {
        let registrations = vec![registration("com.alpha", "Alpha", vec![catalog("movie", "top")])];
        let fetcher = RecordingFetcher::returning(movies(1));
        let router = CatalogRouter::new(fetcher.clone());

        router
            .route(
                &registrations,
                CatalogRequest::new("movie", "com.alpha-top").with_extra(Some("genre=Action")),
            )
            .await;

        assert_eq!(fetcher.calls()[0].extra.as_deref(), Some("genre=Action"));
    }

    #[tokio::test]
    async fn test_route_miss_returns_empty_without_fetching() {
        let registrations = vec![registration("com.alpha", "Alpha", vec![catalog("movie", "top")])];
        let fetcher = RecordingFetcher::returning(movies(2));
        let router = CatalogRouter::new(fetcher.clone());

        for (content_type, id) in [("movie", "com.removed-top"), ("series", "com.alpha-top"), ("movie", "")] {
            let response = router.route(&registrations, CatalogRequest::new(content_type, id)).await;
            assert!(response.is_empty());
        }
        let response = router.route(&[], CatalogRequest::new("movie", "com.alpha-top")).await;
        assert!(response.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_route_upstream_failure_returns_empty() {
        let registrations = vec![registration("com.alpha", "Alpha", vec![catalog("movie", "top")])];
        let fetcher = RecordingFetcher::failing();
        let router = CatalogRouter::new(fetcher.clone());

        let response = router
            .route(&registrations, CatalogRequest::new("movie", "com.alpha-top"))
            .await;

        assert!(response.is_empty());
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_route_randomized_shuffles_items() {
        let mut randomized = registration("com.alpha", "Alpha", vec![catalog("movie", "top")]);
        randomized.randomized = true;
        let upstream = movies(40);
        let router = CatalogRouter::new(RecordingFetcher::returning(upstream.clone()));

        let response = router
            .route(&[randomized], CatalogRequest::new("movie", "com.alpha-top"))
            .await;

        let returned: Vec<String> = response.metas.iter().map(|m| m["id"].as_str().unwrap().to_string()).collect();
        let mut expected: Vec<String> = upstream.iter().map(|m| m["id"].as_str().unwrap().to_string()).collect();
        assert_ne!(returned, expected, "40 items should not come back in upstream order");

        let mut sorted = returned.clone();
        sorted.sort();
        expected.sort();
        assert_eq!(sorted, expected);
        assert!(response.metas.iter().all(|m| m["sourceAddon"] == "Alpha"));
    }
}
