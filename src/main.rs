//! Gesture Control - Hand Gesture Desktop Automation
//!
//! Runs the gesture control loop and manages gesture profiles.

use anyhow::Context;
use gesture_control::actuation::{Actuator, DryRunActuator, EnigoActuator};
use gesture_control::app::cli::{Cli, Commands, ConfigAction, SettingsAction};
use gesture_control::app::config::Config;
use gesture_control::context;
use gesture_control::control::{spawn_command_reader, ControlLoop};
use gesture_control::perception::{parse_frame_line, JsonLinesSource, SidecarSource};
use gesture_control::pointer::PointerSettings;
use gesture_control::profile::{ActionSpec, ProfileStore};
use gesture_control::recognition::GestureTemplate;
use gesture_control::time::{Clock, Timestamp};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    Clock::init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Run {
            source,
            no_preview,
            dry_run,
            profiles,
        } => {
            run_loop(source, no_preview, dry_run, profiles, &config)?;
        }
        Commands::Register {
            name,
            frame,
            action,
            scope,
        } => {
            run_register(&name, &frame, action.as_deref(), &scope, &config)?;
        }
        Commands::Map {
            gesture,
            action,
            scope,
        } => {
            run_map(&gesture, &action, &scope, &config)?;
        }
        Commands::Unmap { gesture, scope } => {
            run_unmap(&gesture, &scope, &config)?;
        }
        Commands::List { detailed } => {
            run_list(detailed, &config)?;
        }
        Commands::Delete { name, scope } => {
            run_delete(&name, &scope, &config)?;
        }
        Commands::Settings { action } => {
            run_settings(action, &config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn run_loop(
    source: Option<PathBuf>,
    no_preview: bool,
    dry_run: bool,
    profiles: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    let profiles_path = profiles.unwrap_or_else(|| config.store.profiles_path());
    let store = ProfileStore::load_or_default(&profiles_path);
    info!(
        path = %profiles_path.display(),
        templates = store.templates().len(),
        "Loaded profiles"
    );

    let actuator: Box<dyn Actuator> = if dry_run {
        info!("Dry run: actions are logged, not performed");
        let screen = config.pointer.screen_override().unwrap_or((1920, 1080));
        Box::new(DryRunActuator::new(screen))
    } else {
        match EnigoActuator::new() {
            Ok(actuator) => Box::new(actuator),
            Err(e) => {
                warn!("Input synthesis may need Accessibility permissions in System Settings > Privacy & Security > Accessibility");
                anyhow::bail!("Failed to initialize input synthesis: {} (use --dry-run to run without it)", e);
            }
        }
    };
    let context = context::from_config(&config.context)?;

    let mut control = ControlLoop::new(config, store, actuator, context).with_preview(!no_preview);

    // Set up Ctrl+C handler
    let stop_flag = control.handle().stop_flag();
    ctrlc::set_handler(move || {
        stop_flag.store(true, std::sync::atomic::Ordering::SeqCst);
    })?;

    let mirror = config.perception.mirror;
    let stats = match source {
        Some(path) if Cli::is_stdin(&path) => {
            info!("Reading frames from stdin");
            control.run(JsonLinesSource::new(std::io::stdin().lock()).with_mirror(mirror))?
        }
        Some(path) => {
            info!("Reading frames from {:?}", path);
            spawn_command_reader(BufReader::new(std::io::stdin()), control.handle());
            control.run(JsonLinesSource::open(&path)?.with_mirror(mirror))?
        }
        None => {
            let sidecar = SidecarSource::spawn(
                &config.perception.command,
                &config.perception.ready_line,
                mirror,
            )?;
            spawn_command_reader(BufReader::new(std::io::stdin()), control.handle());
            info!("Running... type 'save <name> <action>', 'pause', 'toggle' or press Ctrl+C to stop");
            control.run(sidecar)?
        }
    };

    info!(
        frames = stats.frames,
        hand_frames = stats.hand_frames,
        fires = stats.fires,
        executed = stats.executed,
        suppressed = stats.suppressed,
        unmapped = stats.unmapped,
        "Session finished"
    );

    Ok(())
}

/// Open the store for editing. A store that fails to parse is reported, not
/// replaced.
fn open_store(config: &Config) -> anyhow::Result<ProfileStore> {
    let path = config.store.profiles_path();
    ProfileStore::open(&path).with_context(|| format!("Cannot read profile store {:?}", path))
}

fn run_register(
    name: &str,
    frame: &Path,
    action: Option<&str>,
    scope: &str,
    config: &Config,
) -> anyhow::Result<()> {
    if !frame.exists() {
        anyhow::bail!("Frame file not found: {:?}", frame);
    }
    let content = std::fs::read_to_string(frame)?;
    let line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Frame file {:?} is empty", frame))?;

    let mut landmark_frame = parse_frame_line(line, Timestamp::now());
    if config.perception.mirror {
        landmark_frame = landmark_frame.mirrored();
    }
    let points = landmark_frame
        .hand(config.perception.landmark_count)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No hand with {} landmarks in {:?}",
                config.perception.landmark_count,
                frame
            )
        })?;

    let action = action.map(str::parse::<ActionSpec>).transpose()?;

    let mut store = open_store(config)?;
    store.register_gesture(GestureTemplate::capture(name, points))?;
    if let Some(action) = action {
        store.set_action(scope, name, action)?;
    }
    store.save()?;

    info!(gesture = %name, "Registered gesture");
    println!("Registered '{}' ({} landmarks)", name, points.len());
    if let Some(action) = store.profile(scope).and_then(|p| p.get(name)) {
        println!("  {} -> {}", scope, action);
    }

    Ok(())
}

fn run_map(gesture: &str, action: &str, scope: &str, config: &Config) -> anyhow::Result<()> {
    let action: ActionSpec = action.parse()?;
    let mut store = open_store(config)?;
    store.set_action(scope, gesture, action.clone())?;
    store.save()?;
    println!("{}: {} -> {}", scope, gesture, action);
    Ok(())
}

fn run_unmap(gesture: &str, scope: &str, config: &Config) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    if !store.remove_action(scope, gesture) {
        anyhow::bail!("No mapping for '{}' in {}", gesture, scope);
    }
    store.save()?;
    println!("Unmapped '{}' in {}", gesture, scope);
    Ok(())
}

fn run_list(detailed: bool, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    println!("Gestures in {:?}:", config.store.profiles_path());
    if store.templates().is_empty() {
        println!("  (none)");
        println!("Register one with: gesturectl register --name <name> --frame <file>");
    }
    for template in store.templates() {
        let scopes: Vec<&str> = store
            .profiles()
            .filter(|(_, profile)| profile.contains(&template.name))
            .map(|(scope, _)| scope)
            .collect();
        if detailed {
            println!(
                "  {}  ({} landmarks, mapped in: {})",
                template.name,
                template.len(),
                if scopes.is_empty() { "-".to_string() } else { scopes.join(", ") }
            );
        } else {
            println!("  {}", template.name);
        }
    }

    println!("\nProfiles:");
    for (scope, profile) in store.profiles() {
        println!("  [{}] {} mapping(s)", scope, profile.len());
        if detailed {
            for (gesture, action) in profile.actions() {
                println!("    {} -> {}", gesture, action);
            }
        }
    }

    Ok(())
}

fn run_delete(name: &str, scope: &str, config: &Config) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let outcome = store.delete_gesture(name, scope);
    if !outcome.mapping_removed && !outcome.template_removed {
        anyhow::bail!("Nothing to delete for '{}' in {}", name, scope);
    }
    store.save()?;

    if outcome.mapping_removed {
        println!("Removed mapping '{}' from {}", name, scope);
    }
    if outcome.template_removed {
        info!(gesture = %name, "Template removed");
        println!("Removed template '{}'", name);
    }
    Ok(())
}

fn run_settings(action: SettingsAction, config: &Config) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    match action {
        SettingsAction::Show => {
            println!("Settings ({:?}):\n", config.store.profiles_path());
            println!("{}", serde_json::to_string_pretty(store.settings())?);
        }
        SettingsAction::Set { key, value } => {
            store.save_setting(&key, &value)?;
            PointerSettings::check(config, store.settings())?;
            store.save()?;
            println!("Set {} = {}", key, value);
        }
    }
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    // Create the profile store
    let profiles_path = config.store.profiles_path();
    if !profiles_path.exists() {
        ProfileStore::with_path(&profiles_path).save()?;
    }
    println!("\nProfiles: {:?}", profiles_path);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            let default_config = Config::default();
            default_config.save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}
