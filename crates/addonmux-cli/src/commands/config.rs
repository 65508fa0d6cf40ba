use crate::output::{Output, OutputFormat};
use addon_mux_config::Config;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show => show_config(output),
        crate::ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let paths = super::paths();
    let config_file = paths.config_file();

    if config_file.exists() && !force {
        output.warn(format!("Configuration file already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    paths.ensure_directories().map_err(|e| eyre!("{}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn show_config(output: &Output) -> Result<()> {
    let paths = super::paths();
    let config_file = paths.config_file();
    let config = super::load_config(&paths)?;
    let users_dir = config.users_dir(&paths);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if !config_file.exists() {
                output.warn(format!(
                    "Configuration file not found at: {} (showing defaults)",
                    config_file.display()
                ));
                output.info("Run 'addonmux config init' to create it.");
            }

            println!("\n{}", "Configuration".bright_cyan().bold());
            println!();

            let mut server_table = section_table("Server");
            server_table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display().to_string())]);
            server_table.add_row(vec![Cell::new("Bind"), Cell::new(&config.server.bind)]);
            server_table.add_row(vec![
                Cell::new("Upstream Timeout"),
                Cell::new(format!("{} seconds", config.server.request_timeout_secs)),
            ]);
            server_table.add_row(vec![Cell::new("Registrations"), Cell::new(users_dir.display().to_string())]);
            println!("{}", server_table);
            println!();

            let mut manifest_table = section_table("Combined Manifest");
            manifest_table.add_row(vec![Cell::new("Id"), Cell::new(&config.manifest.id)]);
            manifest_table.add_row(vec![Cell::new("Version"), Cell::new(&config.manifest.version)]);
            manifest_table.add_row(vec![Cell::new("Name"), Cell::new(&config.manifest.name)]);
            manifest_table.add_row(vec![Cell::new("Description"), Cell::new(&config.manifest.description)]);
            manifest_table.add_row(vec![
                Cell::new("Logo"),
                Cell::new(config.manifest.logo.as_deref().unwrap_or("-")),
            ]);
            manifest_table.add_row(vec![
                Cell::new("Background"),
                Cell::new(config.manifest.background.as_deref().unwrap_or("-")),
            ]);
            println!("{}", manifest_table);
            println!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
                "users_dir": users_dir.display().to_string(),
                "config": serde_json::to_value(&config)?,
            }));
        }
    }

    Ok(())
}

fn section_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}
