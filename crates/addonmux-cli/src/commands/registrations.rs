use crate::output::{Output, OutputFormat};
use crate::RegistrationCommands;
use addon_mux_models::{AddonManifest, CatalogRegistration, RegistrationStatus};
use addon_mux_sources::{active_in_order, is_valid_user_id, FileRegistrationStore, RegistrationStore};
use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::info;

pub async fn run_registrations(cmd: RegistrationCommands, output: &Output) -> Result<()> {
    let paths = super::paths();
    let config = super::load_config(&paths)?;
    let store = super::open_store(&config, &paths);

    match cmd {
        RegistrationCommands::Add {
            user_id,
            manifest_url,
            name,
            randomize,
            inactive,
        } => {
            check_user_id(&user_id)?;
            let manifest = super::addon_client(&config)
                .fetch_manifest(&manifest_url)
                .await
                .wrap_err_with(|| format!("Failed to fetch addon manifest from {manifest_url}"))?;

            let mut registrations = load(&store, &user_id).await?;
            let registration = new_registration(
                &registrations,
                manifest_url.trim(),
                manifest,
                name,
                randomize,
                inactive,
                Utc::now(),
            )?;
            let summary = format!(
                "Registered '{}' ({}, {} catalogs) at position {}",
                registration.display_name,
                registration.addon_id(),
                registration.original_manifest.catalogs.len(),
                registration.order
            );
            info!(
                operation = "registration_added",
                user_id = %user_id,
                addon_id = registration.addon_id(),
                order = registration.order,
                "Added catalog registration"
            );
            registrations.push(registration);
            save(&store, &user_id, &registrations).await?;
            output.success(summary);
        }
        RegistrationCommands::List { user_id } => {
            let registrations = load(&store, &user_id).await?;
            list_registrations(&user_id, &registrations, output);
        }
        RegistrationCommands::Remove { user_id, addon_id } => {
            let mut registrations = load(&store, &user_id).await?;
            let removed = remove_registration(&mut registrations, &addon_id)?;
            save(&store, &user_id, &registrations).await?;
            output.success(format!("Removed '{}' ({})", removed.display_name, addon_id));
        }
        RegistrationCommands::Enable { user_id, addon_id } => {
            update(&store, &user_id, &addon_id, |r| r.status = RegistrationStatus::Active).await?;
            output.success(format!("Enabled {addon_id}"));
        }
        RegistrationCommands::Disable { user_id, addon_id } => {
            update(&store, &user_id, &addon_id, |r| r.status = RegistrationStatus::Inactive).await?;
            output.success(format!("Disabled {addon_id}"));
        }
        RegistrationCommands::Randomize { user_id, addon_id, off } => {
            update(&store, &user_id, &addon_id, |r| r.randomized = !off).await?;
            if off {
                output.success(format!("{addon_id} keeps upstream order"));
            } else {
                output.success(format!("{addon_id} items and genres will be shuffled"));
            }
        }
        RegistrationCommands::Reorder { user_id, addon_id, order } => {
            update(&store, &user_id, &addon_id, |r| r.order = order).await?;
            output.success(format!("Moved {addon_id} to position {order}"));
        }
    }

    Ok(())
}

/// Build the registration for a freshly fetched manifest, placed after every existing one
fn new_registration(
    existing: &[CatalogRegistration],
    manifest_url: &str,
    manifest: AddonManifest,
    name: Option<String>,
    randomize: bool,
    inactive: bool,
    registered_at: DateTime<Utc>,
) -> Result<CatalogRegistration> {
    if manifest.id.trim().is_empty() {
        return Err(eyre!("Addon manifest at {} has no id", manifest_url));
    }
    if existing.iter().any(|r| r.addon_id() == manifest.id) {
        return Err(eyre!("Addon '{}' is already registered", manifest.id));
    }

    let display_name = name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| manifest.name.clone().filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| manifest.id.clone());

    Ok(CatalogRegistration {
        manifest_url: manifest_url.to_string(),
        display_name,
        status: if inactive {
            RegistrationStatus::Inactive
        } else {
            RegistrationStatus::Active
        },
        randomized: randomize,
        order: next_order(existing),
        original_manifest: manifest,
        registered_at: Some(registered_at),
    })
}

fn next_order(existing: &[CatalogRegistration]) -> i64 {
    existing.iter().map(|r| r.order).max().map_or(0, |max| max + 1)
}

fn find_registration<'a>(
    registrations: &'a mut [CatalogRegistration],
    addon_id: &str,
) -> Result<&'a mut CatalogRegistration> {
    registrations
        .iter_mut()
        .find(|r| r.addon_id() == addon_id)
        .ok_or_else(|| eyre!("No registration for addon '{}'", addon_id))
}

fn remove_registration(registrations: &mut Vec<CatalogRegistration>, addon_id: &str) -> Result<CatalogRegistration> {
    let index = registrations
        .iter()
        .position(|r| r.addon_id() == addon_id)
        .ok_or_else(|| eyre!("No registration for addon '{}'", addon_id))?;
    Ok(registrations.remove(index))
}

async fn update(
    store: &FileRegistrationStore,
    user_id: &str,
    addon_id: &str,
    change: impl FnOnce(&mut CatalogRegistration),
) -> Result<()> {
    let mut registrations = load(store, user_id).await?;
    change(find_registration(&mut registrations, addon_id)?);
    save(store, user_id, &registrations).await
}

fn check_user_id(user_id: &str) -> Result<()> {
    if is_valid_user_id(user_id) {
        Ok(())
    } else {
        Err(eyre!(
            "Invalid user id '{}': use letters, digits, '-' and '_' only",
            user_id
        ))
    }
}

async fn load(store: &FileRegistrationStore, user_id: &str) -> Result<Vec<CatalogRegistration>> {
    check_user_id(user_id)?;
    store
        .all_registrations(user_id)
        .await
        .wrap_err_with(|| format!("Failed to read registrations of '{user_id}'"))
}

async fn save(store: &FileRegistrationStore, user_id: &str, registrations: &[CatalogRegistration]) -> Result<()> {
    store
        .save_registrations(user_id, registrations)
        .await
        .wrap_err_with(|| format!("Failed to save registrations of '{user_id}'"))
}

fn list_registrations(user_id: &str, registrations: &[CatalogRegistration], output: &Output) {
    // Same order the combined manifest uses, inactive ones last
    let mut sorted = active_in_order(registrations.to_vec());
    let mut inactive: Vec<CatalogRegistration> = registrations.iter().filter(|r| !r.is_active()).cloned().collect();
    inactive.sort_by_key(|r| r.order);
    sorted.extend(inactive);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if sorted.is_empty() {
                output.warn(format!("No registrations for user '{user_id}'"));
                return;
            }

            let mut table = Table::new();
            table.set_header(
                ["Order", "Name", "Addon Id", "Status", "Randomized", "Catalogs"]
                    .into_iter()
                    .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
            );
            for r in &sorted {
                table.add_row(vec![
                    Cell::new(r.order),
                    Cell::new(&r.display_name),
                    Cell::new(r.addon_id()),
                    Cell::new(if r.is_active() {
                        "active".green().to_string()
                    } else {
                        "inactive".bright_black().to_string()
                    }),
                    Cell::new(if r.randomized { "✓".green().to_string() } else { "✗".red().to_string() }),
                    Cell::new(r.original_manifest.catalogs.len()),
                ]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let rows: Vec<_> = sorted
                .iter()
                .map(|r| {
                    json!({
                        "order": r.order,
                        "displayName": r.display_name,
                        "addonId": r.addon_id(),
                        "status": r.status,
                        "randomized": r.randomized,
                        "catalogs": r.original_manifest.catalogs.len(),
                        "manifestUrl": r.manifest_url,
                    })
                })
                .collect();
            output.json(&json!({"user_id": user_id, "registrations": rows}));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_mux_models::CatalogDescriptor;

    fn manifest(id: &str, name: Option<&str>) -> AddonManifest {
        AddonManifest {
            id: id.to_string(),
            name: name.map(str::to_string),
            types: vec!["movie".to_string()],
            catalogs: vec![CatalogDescriptor {
                content_type: "movie".to_string(),
                id: "top".to_string(),
                ..CatalogDescriptor::default()
            }],
            ..AddonManifest::default()
        }
    }

    fn add(existing: &[CatalogRegistration], id: &str) -> CatalogRegistration {
        new_registration(
            existing,
            &format!("https://{id}.example/manifest.json"),
            manifest(id, Some("Upstream Name")),
            None,
            false,
            false,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_registration_defaults() {
        let now = Utc::now();
        let registration = new_registration(
            &[],
            "https://alpha.example/manifest.json",
            manifest("com.alpha", Some("Alpha Upstream")),
            None,
            false,
            false,
            now,
        )
        .unwrap();

        assert_eq!(registration.display_name, "Alpha Upstream");
        assert_eq!(registration.status, RegistrationStatus::Active);
        assert!(!registration.randomized);
        assert_eq!(registration.order, 0);
        assert_eq!(registration.registered_at, Some(now));
        assert_eq!(registration.original_manifest.catalogs.len(), 1);
    }

    #[test]
    fn test_display_name_falls_back_to_addon_id() {
        let registration = new_registration(
            &[],
            "https://alpha.example/manifest.json",
            manifest("com.alpha", None),
            Some("   ".to_string()),
            true,
            true,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(registration.display_name, "com.alpha");
        assert_eq!(registration.status, RegistrationStatus::Inactive);
        assert!(registration.randomized);
    }

    #[test]
    fn test_explicit_name_wins() {
        let registration = new_registration(
            &[],
            "https://alpha.example/manifest.json",
            manifest("com.alpha", Some("Alpha Upstream")),
            Some("Family Movies".to_string()),
            false,
            false,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(registration.display_name, "Family Movies");
    }

    #[test]
    fn test_order_is_placed_after_existing() {
        let mut existing = vec![add(&[], "com.alpha")];
        existing[0].order = 7;
        existing.push(add(&existing, "com.beta"));
        assert_eq!(existing[1].order, 8);

        existing[0].order = -3;
        assert_eq!(next_order(&existing), 9);
    }

    #[test]
    fn test_rejects_duplicate_and_anonymous_addons() {
        let existing = vec![add(&[], "com.alpha")];

        let duplicate = new_registration(
            &existing,
            "https://mirror.example/manifest.json",
            manifest("com.alpha", None),
            None,
            false,
            false,
            Utc::now(),
        );
        assert!(duplicate.is_err());

        let anonymous = new_registration(&[], "https://x.example", manifest("", None), None, false, false, Utc::now());
        assert!(anonymous.is_err());
    }

    #[test]
    fn test_find_and_remove_by_addon_id() {
        let mut registrations = vec![add(&[], "com.alpha")];
        registrations.push(add(&registrations, "com.beta"));

        find_registration(&mut registrations, "com.beta").unwrap().randomized = true;
        assert!(registrations[1].randomized);
        assert!(find_registration(&mut registrations, "com.gamma").is_err());

        let removed = remove_registration(&mut registrations, "com.alpha").unwrap();
        assert_eq!(removed.addon_id(), "com.alpha");
        assert_eq!(registrations.len(), 1);
        assert!(remove_registration(&mut registrations, "com.alpha").is_err());
    }

    #[tokio::test]
    async fn test_update_persists_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistrationStore::new(dir.path().join("users"));
        let registrations = vec![add(&[], "com.alpha")];
        save(&store, "alice", &registrations).await.unwrap();

        update(&store, "alice", "com.alpha", |r| r.status = RegistrationStatus::Inactive)
            .await
            .unwrap();

        let stored = load(&store, "alice").await.unwrap();
        assert_eq!(stored[0].status, RegistrationStatus::Inactive);
        assert!(update(&store, "alice", "com.missing", |r| r.order = 3).await.is_err());
        assert!(load(&store, "../alice").await.is_err());
    }
}
