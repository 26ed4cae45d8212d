//! Subcommand implementations.
//!
//! Commands print their results to the given writer; logs go through
//! `tracing` so stdout stays machine-readable.

use crate::config::{CacheCommand, Cli, Command, GamesCommand};
use anyhow::{Context, Result, anyhow};
use retrohub_api::{ApiConfig, Game, RetroApi, build_image_url, rom_source_url};
use retrohub_cache::{ByteStore, DiskStore, RomKey};
use retrohub_loader::{AcquiredRom, EmulatorModules, RomLoader, RomSource, core_for_system};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Run the parsed command line
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Fetch {
            url,
            out: path,
            raw,
        } => {
            let loader = open_loader(&cli, *raw)?;
            fetch(&loader, url, path.as_deref(), out).await
        }
        Command::Resolve { game_id, out: path } => {
            let api = open_api(&cli.api_config())?;
            let game = api
                .fetch_game_by_id(*game_id)
                .await
                .with_context(|| format!("failed to look up game {game_id}"))?;
            let url = rom_source_url(&cli.rom_base, &game)
                .ok_or_else(|| anyhow!("game {game_id} ({}) has no ROM file", game.title))?;
            writeln!(
                out,
                "{} [{} -> core {}]",
                game.title,
                game.game_type,
                core_for_system(&game.game_type)
            )?;

            let loader = open_loader(&cli, false)?;
            fetch(&loader, &url, path.as_deref(), out).await
        }
        Command::Cache(command) => cache(&cli, command, out).await,
        Command::Core { system } => {
            writeln!(out, "{}", core_for_system(system))?;
            Ok(())
        }
        Command::Games(command) => games(&cli, command, out).await,
    }
}

fn open_store(cli: &Cli) -> Result<DiskStore> {
    let config = cli.store_config();
    config.validate().map_err(|e| anyhow!(e))?;
    DiskStore::open(config)
        .with_context(|| format!("failed to open cache in {}", cli.cache_dir.display()))
}

fn open_loader(cli: &Cli, accept_raw_rom: bool) -> Result<RomLoader> {
    let config = cli.loader_config(accept_raw_rom);
    config.validate().map_err(|e| anyhow!(e))?;
    let store = Arc::new(open_store(cli)?);
    Ok(RomLoader::new(config, store)?)
}

fn open_api(config: &ApiConfig) -> Result<RetroApi> {
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(RetroApi::new(config)?)
}

/// File name for a ROM written without `--out`
fn default_output(rom: &AcquiredRom) -> PathBuf {
    let name = rom
        .entry_name
        .as_deref()
        .and_then(|entry| entry.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| rom.key.as_str());
    PathBuf::from(name)
}

async fn fetch(
    loader: &RomLoader,
    url: &str,
    path: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let rom = loader
        .acquire_rom(url)
        .await
        .with_context(|| format!("failed to acquire {url}"))?;

    let target = path.map_or_else(|| default_output(&rom), Path::to_path_buf);
    tokio::fs::write(&target, &rom.bytes)
        .await
        .with_context(|| format!("failed to write {}", target.display()))?;

    let source = match rom.source {
        RomSource::Cache => "cache",
        RomSource::Network => "network",
    };
    writeln!(
        out,
        "{} bytes from {source} ({}) -> {}",
        rom.bytes.len(),
        rom.key,
        target.display()
    )?;
    Ok(())
}

async fn cache(cli: &Cli, command: &CacheCommand, out: &mut impl Write) -> Result<()> {
    let store = open_store(cli)?;
    match command {
        CacheCommand::List => {
            for key in store.keys().await? {
                writeln!(out, "{key}")?;
            }
        }
        CacheCommand::Remove { key } => {
            if store.remove(&RomKey::new(key.clone())).await? {
                writeln!(out, "removed {key}")?;
            } else {
                writeln!(out, "{key} is not cached")?;
            }
        }
        CacheCommand::Clear => {
            store.clear().await?;
            writeln!(out, "cleared {}", store.dir().display())?;
        }
        CacheCommand::Stats => {
            writeln!(out, "namespace: {}", store.namespace())?;
            writeln!(out, "directory: {}", store.dir().display())?;
            writeln!(out, "entries:   {}", store.len().await?)?;
        }
    }
    Ok(())
}

fn print_games(out: &mut impl Write, games: &[Game]) -> Result<()> {
    for game in games {
        writeln!(out, "{}\t{}\t{}", game.game_id, game.game_type, game.title)?;
    }
    Ok(())
}

async fn games(cli: &Cli, command: &GamesCommand, out: &mut impl Write) -> Result<()> {
    let config = cli.api_config();
    let api = open_api(&config)?;
    match command {
        GamesCommand::Types => {
            for name in api.fetch_types().await? {
                writeln!(out, "{name}")?;
            }
        }
        GamesCommand::Recommend { limit } => print_games(out, &api.fetch_recommend(*limit).await?)?,
        GamesCommand::Ranking { limit } => print_games(out, &api.fetch_ranking(*limit).await?)?,
        GamesCommand::Search { title } => print_games(out, &api.search_by_title(title).await?)?,
        GamesCommand::Show { id } => {
            let game = api.fetch_game_by_id(*id).await?;
            writeln!(out, "id:     {}", game.game_id)?;
            writeln!(out, "title:  {}", game.title)?;
            writeln!(out, "system: {} (core {})", game.game_type, core_for_system(&game.game_type))?;
            writeln!(out, "region: {}", game.region)?;
            writeln!(
                out,
                "rom:    {}",
                rom_source_url(&config.rom_base, &game).unwrap_or_else(|| "-".to_string())
            )?;
            let cover = build_image_url(&config.image_base, game.title_screen_image.as_deref());
            writeln!(out, "cover:  {}", if cover.is_empty() { "-" } else { cover.as_str() })?;

            let modules = EmulatorModules::new(&config.emulator_base);
            writeln!(out, "loader: {}", modules.loader.url)?;
            writeln!(out, "engine: {}", modules.engine.url)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(entry_name: Option<&str>) -> AcquiredRom {
        AcquiredRom {
            key: RomKey::new("contra.zip"),
            bytes: Default::default(),
            source: RomSource::Network,
            entry_name: entry_name.map(str::to_string),
        }
    }

    #[test]
    fn test_default_output_prefers_entry_file_name() {
        assert_eq!(
            default_output(&rom(Some("roms/Contra (U).nes"))),
            PathBuf::from("Contra (U).nes")
        );
        assert_eq!(default_output(&rom(None)), PathBuf::from("contra.zip"));
        assert_eq!(default_output(&rom(Some("dir/"))), PathBuf::from("contra.zip"));
    }
}
