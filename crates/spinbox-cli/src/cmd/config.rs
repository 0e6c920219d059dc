use crate::cmd::{load_store, CliContext};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use spinbox_core::config::{GlobalConfig, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show every key and its value
    List,

    /// Print the value of one key
    Get { key: String },

    /// Set a key
    Set { key: String, value: String },

    /// Restore one key, or all keys, to the default
    Reset {
        /// Key to reset (omit to reset everything)
        key: Option<String>,
    },

    /// Check the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &CliContext, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    let dir = ctx.user_dir()?;
    let mut config = ctx.global_config()?;
    match subcmd {
        ConfigSubcommand::List => list(&config, ctx.json),
        ConfigSubcommand::Get { key } => {
            let value = config.get(&key)?;
            if ctx.json {
                print_json(&serde_json::json!({ "key": key, "value": value }))
            } else {
                println!("{value}");
                Ok(())
            }
        }
        ConfigSubcommand::Set { key, value } => {
            config.set(&key, &value)?;
            save(&config, &dir)?;
            report_change(&config, &key, ctx.json)
        }
        ConfigSubcommand::Reset { key } => {
            config.reset(key.as_deref())?;
            save(&config, &dir)?;
            match key {
                Some(k) => report_change(&config, &k, ctx.json),
                None => list(&config, ctx.json),
            }
        }
        ConfigSubcommand::Validate => validate(&config, ctx.json),
    }
}

fn save(config: &GlobalConfig, dir: &Path) -> anyhow::Result<()> {
    config
        .save(dir)
        .with_context(|| format!("failed to save config in {}", dir.display()))
}

fn report_change(config: &GlobalConfig, key: &str, json: bool) -> anyhow::Result<()> {
    let value = config.get(key)?;
    if json {
        print_json(&serde_json::json!({ "key": key, "value": value }))
    } else {
        println!("{key} = {value}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(config: &GlobalConfig, json: bool) -> anyhow::Result<()> {
    let entries = config.list();
    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        return print_json(&map);
    }
    let rows = entries
        .into_iter()
        .map(|(k, v)| vec![k.to_string(), if v.is_empty() { "-".to_string() } else { v }])
        .collect();
    print_table(&["KEY", "VALUE"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &GlobalConfig, json: bool) -> anyhow::Result<()> {
    let store = load_store()?;
    let warnings = config.validate(&store);

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
