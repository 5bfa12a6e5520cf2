//! Command handling for the playlist-bridge binary
//!
//! Usage:
//!   playlist-bridge transfer <tracks.json> --catalog <catalog.json>   Transfer a playlist
//!   playlist-bridge dry-run <tracks.json> --catalog <catalog.json>    Preview matches
//!   playlist-bridge config                                             Show configuration
//!
//! Directions: spotify-to-youtube (s2y), youtube-to-spotify (y2s)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use playlist_bridge_core::{
    Config, DryRunResult, LocalCatalog, MatchResult, Platform, PlatformPorts, PortRegistry,
    ProgressCallback, TransferDirection, TransferEngine, TransferProgress, TransferRequest,
    TransferResult,
};
use tokio_util::sync::CancellationToken;

use crate::source;

/// CLI command to execute
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Transfer { source: PathBuf },
    DryRun { source: PathBuf },
    Config,
}

/// CLI options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub catalog: Option<PathBuf>,
    pub direction: TransferDirection,
    pub title: Option<String>,
    pub out: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub threshold: Option<f64>,
    pub json: bool,
    pub verbose: bool,
}

impl CliOptions {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.transfer.concurrency = concurrency;
        }
        if let Some(threshold) = self.threshold {
            config.matching.threshold = threshold;
        }
    }
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<CliCommand> = None;
    let mut direction: Option<TransferDirection> = None;
    let mut from: Option<Platform> = None;
    let mut to: Option<Platform> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--verbose" | "-v" => options.verbose = true,
            "--catalog" => options.catalog = Some(PathBuf::from(value(args, &mut i, arg)?)),
            "--out" => options.out = Some(PathBuf::from(value(args, &mut i, arg)?)),
            "--title" => options.title = Some(value(args, &mut i, arg)?.to_string()),
            "--direction" => direction = Some(value(args, &mut i, arg)?.parse()?),
            "--from" => from = Some(value(args, &mut i, arg)?.parse()?),
            "--to" => to = Some(value(args, &mut i, arg)?.parse()?),
            "--concurrency" => {
                let raw = value(args, &mut i, arg)?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid concurrency: {}", raw))?;
                options.concurrency = Some(n);
            }
            "--threshold" => {
                let raw = value(args, &mut i, arg)?;
                let x = raw
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid threshold: {}", raw))?;
                options.threshold = Some(x);
            }
            "transfer" | "dry-run" if command.is_none() => {
                let path = PathBuf::from(value(args, &mut i, arg)?);
                command = Some(if arg == "transfer" {
                    CliCommand::Transfer { source: path }
                } else {
                    CliCommand::DryRun { source: path }
                });
            }
            "config" if command.is_none() => command = Some(CliCommand::Config),
            _ => {
                if arg.starts_with('-') {
                    return Err(format!("Unknown option: {}", arg));
                }
                return Err(format!("Unknown command: {}", arg));
            }
        }
        i += 1;
    }

    options.direction = resolve_direction(direction, from, to)?;

    let command = command.ok_or_else(|| {
        "No command specified. Use: transfer <file>, dry-run <file>, or config".to_string()
    })?;

    if matches!(command, CliCommand::Transfer { .. } | CliCommand::DryRun { .. })
        && options.catalog.is_none()
    {
        return Err("--catalog is required for transfer and dry-run".to_string());
    }

    Ok((command, options))
}

/// Take the value following the flag at `i`
fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Combine `--direction`, `--from` and `--to` into one direction
///
/// `--from` flips the default direction when needed; `--to` then sets the
/// destination explicitly.
fn resolve_direction(
    direction: Option<TransferDirection>,
    from: Option<Platform>,
    to: Option<Platform>,
) -> Result<TransferDirection, String> {
    let mut resolved = direction.unwrap_or_default();
    if let Some(from) = from {
        if from != resolved.source {
            resolved = resolved.reversed();
        }
    }
    if let Some(to) = to {
        resolved.destination = to;
    }

    if !resolved.is_cross_platform() {
        return Err(format!(
            "Source and destination are both {}",
            resolved.source
        ));
    }
    Ok(resolved)
}

/// Run CLI command
pub async fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    let mut config = Config::load();
    options.apply(&mut config);

    match command {
        CliCommand::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        CliCommand::DryRun { source } => run_dry_run(&source, config, options).await,
        CliCommand::Transfer { source } => run_transfer(&source, config, options).await,
    }
}

/// Everything needed to start a job against the offline catalog
struct Job {
    catalog: Arc<LocalCatalog>,
    request: TransferRequest,
}

fn prepare(source_path: &Path, options: &CliOptions) -> anyhow::Result<Job> {
    let catalog_path = options
        .catalog
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--catalog is required"))?;
    let catalog = LocalCatalog::load(catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

    let direction = options.direction;
    if catalog.platform() != direction.destination {
        anyhow::bail!(
            "Catalog {} serves {}, but the destination is {}",
            catalog_path.display(),
            catalog.platform(),
            direction.destination
        );
    }

    let tracks = source::load_tracks(source_path, direction.source)?;
    let request = TransferRequest::new(tracks, direction, options.title.clone());

    Ok(Job {
        catalog: Arc::new(catalog),
        request,
    })
}

fn build_engine(
    catalog: &Arc<LocalCatalog>,
    config: Config,
    progress: Option<ProgressCallback>,
    cancellation: CancellationToken,
) -> anyhow::Result<TransferEngine> {
    let ports = PortRegistry::new().register(
        catalog.platform(),
        PlatformPorts::from_adapter(Arc::clone(catalog)),
    );

    let mut builder = TransferEngine::builder()
        .ports(ports)
        .config(config)
        .cancellation(cancellation)
        .rate_limited();
    if let Some(callback) = progress {
        builder = builder.progress_callback(callback);
    }

    Ok(builder.build()?)
}

/// Cancel the token when Ctrl-C is pressed
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping transfer");
            trigger.cancel();
        }
    });
    token
}

fn progress_printer() -> ProgressCallback {
    Box::new(|progress: TransferProgress| {
        eprint!(
            "\r{}: {}/{} - {}\x1b[K",
            progress.phase, progress.current, progress.total, progress.current_name
        );
    })
}

async fn run_dry_run(source: &Path, config: Config, options: CliOptions) -> anyhow::Result<()> {
    let job = prepare(source, &options)?;
    let show_progress = !options.json;
    let progress = show_progress.then(progress_printer);

    let engine = build_engine(&job.catalog, config, progress, cancel_on_ctrl_c())?;
    let result = engine.dry_run(&job.request).await;

    if show_progress {
        eprintln!(); // New line after progress
    }

    print_dry_run_result(&result?, &options)?;
    Ok(())
}

async fn run_transfer(source: &Path, config: Config, options: CliOptions) -> anyhow::Result<()> {
    let job = prepare(source, &options)?;
    let show_progress = !options.json;
    let progress = show_progress.then(progress_printer);

    let engine = build_engine(&job.catalog, config, progress, cancel_on_ctrl_c())?;
    let result = engine.transfer(&job.request).await;

    if show_progress {
        eprintln!(); // New line after progress
    }

    // Partial playlists are still written out when the job fails midway
    if let Some(out) = &options.out {
        job.catalog
            .save_playlists(out)
            .with_context(|| format!("Failed to write playlists to {}", out.display()))?;
    }

    print_transfer_result(&result?, &options)?;
    Ok(())
}

fn print_transfer_result(result: &TransferResult, options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "playlist_id": result.playlist_id,
                "title": result.title,
                "direction": result.direction.short_name(),
                "matched": result.matched,
                "total": result.total,
                "skipped": result.skipped(),
                "complete": result.is_complete(),
                "outcomes": result.outcomes,
            })
        );
        return Ok(());
    }

    println!(
        "Transfer complete: {}/{} tracks matched",
        result.matched, result.total
    );
    println!(
        "  Playlist: \"{}\" ({}) on {}",
        result.title, result.playlist_id, result.direction.destination
    );
    if result.is_complete() {
        println!("  All tracks transferred");
        return Ok(());
    }
    println!("  Match rate: {:.0}%", result.match_rate() * 100.0);
    print_unmatched(&result.outcomes);
    Ok(())
}

fn print_dry_run_result(result: &DryRunResult, options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "direction": result.direction.short_name(),
                "matched": result.matched,
                "total": result.total,
                "skipped": result.skipped(),
                "outcomes": result.outcomes,
            })
        );
        return Ok(());
    }

    println!("Dry Run Results ({}):", result.direction);
    println!("  Total:     {}", result.total);
    println!("  Matched:   {}", result.matched);
    println!("  Unmatched: {}", result.skipped());
    println!();

    for item in result.outcomes.iter().filter(|r| r.is_matched()) {
        if let Some(candidate) = item.outcome.candidate() {
            println!(
                "  [{}] {} -> {}",
                item.index + 1,
                item.source.display_name(),
                candidate.track.display_name()
            );
        }
    }
    print_unmatched(&result.outcomes);
    Ok(())
}

fn print_unmatched(outcomes: &[MatchResult]) {
    let unmatched: Vec<_> = outcomes
        .iter()
        .filter_map(|r| r.outcome.reason().map(|reason| (r, reason)))
        .collect();
    if unmatched.is_empty() {
        return;
    }

    println!();
    println!("Unmatched tracks:");
    for (item, reason) in unmatched {
        println!(
            "  - [{}] {}: {}",
            item.index + 1,
            item.source.display_name(),
            reason
        );
    }
}

/// Print CLI help
pub fn print_help() {
    println!("playlist-bridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Transfer playlists between Spotify and YouTube");
    println!();
    println!("USAGE:");
    println!("    playlist-bridge <command> [options]");
    println!();
    println!("COMMANDS:");
    println!("    transfer <tracks.json>      Match tracks and build the destination playlist");
    println!("    dry-run <tracks.json>       Preview matches without writing anything");
    println!("    config                      Print the effective configuration");
    println!();
    println!("DIRECTIONS:");
    println!("    spotify-to-youtube, s2y     Spotify playlist to YouTube (default)");
    println!("    youtube-to-spotify, y2s     YouTube playlist to Spotify");
    println!();
    println!("OPTIONS:");
    println!("    --catalog <file>            Destination catalog JSON (required for transfer/dry-run)");
    println!("    --direction <dir>           Transfer direction");
    println!("    --from <platform>           Source platform (spotify, youtube)");
    println!("    --to <platform>             Destination platform");
    println!("    --title <title>             Destination playlist title");
    println!("    --out <file>                Write created playlists to a JSON file");
    println!("    --concurrency <n>           Parallel track searches (default 5)");
    println!("    --threshold <x>             Minimum match score, 0..1 (default 0.55)");
    println!("    --json                      Output in JSON format");
    println!("    --verbose, -v               Log progress details to stderr");
    println!();
    println!("EXAMPLES:");
    println!("    playlist-bridge transfer liked.json --catalog youtube.json");
    println!("    playlist-bridge dry-run videos.json --catalog spotify.json --from youtube");
    println!("    playlist-bridge transfer liked.json --catalog youtube.json --title \"Road Trip\" --json");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ==== Argument Parsing Tests ====

    #[test]
    fn test_parse_args_transfer() {
        let (cmd, options) =
            parse_args(&args(&["transfer", "liked.json", "--catalog", "yt.json"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Transfer {
                source: PathBuf::from("liked.json")
            }
        );
        assert_eq!(options.catalog, Some(PathBuf::from("yt.json")));
        assert_eq!(options.direction, TransferDirection::SPOTIFY_TO_YOUTUBE);
        assert!(!options.json);
    }

    #[test]
    fn test_parse_args_dry_run_with_flags() {
        let (cmd, options) = parse_args(&args(&[
            "dry-run",
            "videos.json",
            "--catalog",
            "sp.json",
            "--direction",
            "y2s",
            "--concurrency",
            "2",
            "--threshold",
            "0.7",
            "--json",
        ]))
        .unwrap();

        assert!(matches!(cmd, CliCommand::DryRun { .. }));
        assert_eq!(options.direction, TransferDirection::YOUTUBE_TO_SPOTIFY);
        assert_eq!(options.concurrency, Some(2));
        assert_eq!(options.threshold, Some(0.7));
        assert!(options.json);
    }

    #[test]
    fn test_parse_args_config() {
        let (cmd, _) = parse_args(&args(&["config"])).unwrap();
        assert_eq!(cmd, CliCommand::Config);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["transfer"])).is_err());
        assert!(parse_args(&args(&["transfer", "a.json"])).is_err());
        assert!(parse_args(&args(&["sync"])).is_err());
        assert!(parse_args(&args(&["config", "--bogus"])).is_err());
        assert!(parse_args(&args(&["config", "--concurrency", "many"])).is_err());
        assert!(parse_args(&args(&["config", "--from", "tidal"])).is_err());
    }

    #[test]
    fn test_resolve_direction() {
        assert_eq!(
            resolve_direction(None, None, None),
            Ok(TransferDirection::SPOTIFY_TO_YOUTUBE)
        );
        assert_eq!(
            resolve_direction(None, Some(Platform::YouTube), None),
            Ok(TransferDirection::YOUTUBE_TO_SPOTIFY)
        );
        assert_eq!(
            resolve_direction(None, None, Some(Platform::Spotify)),
            Err("Source and destination are both Spotify".to_string())
        );
        assert_eq!(
            resolve_direction(
                Some(TransferDirection::SPOTIFY_TO_YOUTUBE),
                Some(Platform::YouTube),
                Some(Platform::Spotify)
            ),
            Ok(TransferDirection::YOUTUBE_TO_SPOTIFY)
        );
    }

    #[test]
    fn test_options_override_config() {
        let options = CliOptions {
            concurrency: Some(8),
            threshold: Some(0.8),
            ..Default::default()
        };
        let mut config = Config::default();
        options.apply(&mut config);
        assert_eq!(config.transfer.concurrency, 8);
        assert_eq!(config.matching.threshold, 0.8);
    }

    // ==== Local Catalog Tests ====

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const YOUTUBE_CATALOG: &str = r#"{
        "platform": "youtube",
        "tracks": [
            { "destination_id": "yt-1", "track": { "platform": "youtube", "id": "yt-1", "title": "Yesterday (Remastered 2009)", "artists": ["The Beatles"], "duration_ms": 126000 } },
            { "destination_id": "yt-2", "track": { "platform": "youtube", "id": "yt-2", "title": "Hey Jude", "artists": ["The Beatles"], "duration_ms": 431000 } }
        ]
    }"#;

    const SPOTIFY_TRACKS: &str = r#"[
        { "platform": "spotify", "id": "s1", "title": "Yesterday", "artists": ["The Beatles"], "duration_ms": 125000 },
        { "platform": "spotify", "id": "s2", "title": "Completely Unknown Song", "artists": ["Nobody"], "duration_ms": 200000 },
        { "platform": "spotify", "id": "s3", "title": "Hey Jude", "artists": ["The Beatles"], "duration_ms": 430000 }
    ]"#;

    #[test]
    fn test_prepare_rejects_wrong_catalog_platform() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write_file(&dir, "yt.json", YOUTUBE_CATALOG);
        let tracks = write_file(&dir, "tracks.json", SPOTIFY_TRACKS);

        let options = CliOptions {
            catalog: Some(catalog),
            direction: TransferDirection::YOUTUBE_TO_SPOTIFY,
            ..Default::default()
        };
        let err = prepare(&tracks, &options).err().unwrap();
        assert!(err.to_string().contains("destination is Spotify"));
    }

    #[tokio::test]
    async fn test_transfer_against_local_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write_file(&dir, "yt.json", YOUTUBE_CATALOG);
        let tracks = write_file(&dir, "tracks.json", SPOTIFY_TRACKS);

        let options = CliOptions {
            catalog: Some(catalog),
            title: Some("Beatles".to_string()),
            ..Default::default()
        };
        let job = prepare(&tracks, &options).unwrap();
        assert_eq!(job.request.len(), 3);

        let engine = build_engine(
            &job.catalog,
            Config::default(),
            None,
            CancellationToken::new(),
        )
        .unwrap();
        let result = engine.transfer(&job.request).await.unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.matched, 2);
        assert!(!result.outcomes[1].is_matched());

        let playlist = job.catalog.playlist(&result.playlist_id).unwrap();
        assert_eq!(playlist.title, "Beatles");
        assert_eq!(playlist.track_ids, vec!["yt-1", "yt-2"]);

        let out = dir.path().join("out.json");
        job.catalog.save_playlists(&out).unwrap();
        let saved = std::fs::read_to_string(&out).unwrap();
        assert!(saved.contains("\"Beatles\""));
    }
}
