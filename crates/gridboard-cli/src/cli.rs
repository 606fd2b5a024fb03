use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridboard_layout::EngineConfig;

use crate::commands::{
    AddArgs, DocArgs, ExportArgs, ImportArgs, InitArgs, PresetArgs, RescaleArgs, ShowArgs,
    WidgetArgs, print_presets, print_profiles, run_add, run_export, run_import, run_init,
    run_maximize, run_minimize, run_preset, run_remove, run_rescale, run_restore, run_show,
    run_sort,
};
use crate::error::{CliError, Result};
use crate::profile::{DEFAULT_PROFILE, load_profile, load_profile_file};

#[derive(Debug, Parser)]
#[command(
    name = "gridboard",
    about = "Inspect and edit dashboard widget layouts",
    version
)]
pub struct Cli {
    /// Built-in profile supplying cell size, viewport, and view mode.
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Read the profile from an `.env`-style file instead.
    #[arg(long, global = true)]
    pub profile_file: Option<PathBuf>,

    /// Override the profile viewport, as WIDTHxHEIGHT pixels.
    #[arg(long, global = true)]
    pub viewport: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a new dashboard with the built-in layout.
    Init(InitArgs),

    /// Print the grid map, widget list, and conflicts.
    Show(ShowArgs),

    /// Re-pack every widget in reading order.
    Sort(DocArgs),

    /// Add a widget of the given type.
    Add(AddArgs),

    /// Remove a widget by id.
    Remove(WidgetArgs),

    /// Resize a widget to a named preset.
    Preset(PresetArgs),

    /// Change the cell size and convert every widget to it.
    Rescale(RescaleArgs),

    /// Collapse a widget to its header row.
    Minimize(WidgetArgs),

    /// Undo a minimize.
    Restore(WidgetArgs),

    /// Check that a widget can be maximized and show the result.
    Maximize(WidgetArgs),

    /// Replace a dashboard's widgets with an exported payload.
    Import(ImportArgs),

    /// Print or write a dashboard export.
    Export(ExportArgs),

    /// Print built-in profile names.
    #[command(name = "list-profiles")]
    ListProfiles,

    /// Print the size presets at the active cell size.
    #[command(name = "list-presets")]
    ListPresets,
}

impl Commands {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Show(_) => "show",
            Self::Sort(_) => "sort",
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Preset(_) => "preset",
            Self::Rescale(_) => "rescale",
            Self::Minimize(_) => "minimize",
            Self::Restore(_) => "restore",
            Self::Maximize(_) => "maximize",
            Self::Import(_) => "import",
            Self::Export(_) => "export",
            Self::ListProfiles => "list-profiles",
            Self::ListPresets => "list-presets",
        }
    }
}

impl Cli {
    /// Engine configuration from the selected profile and overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let profile = match &self.profile_file {
            Some(path) => load_profile_file(path)?,
            None => load_profile(&self.profile)?,
        };
        let mut config = profile.engine_config()?;
        if let Some(raw) = &self.viewport {
            let (width, height) = parse_viewport(raw)?;
            config = config.viewport(width, height);
        }
        gridboard_core::debug!(profile = %profile.name, grid = ?config.grid(), "configuration resolved");
        Ok(config)
    }
}

fn parse_viewport(raw: &str) -> Result<(f64, f64)> {
    let invalid = || CliError::invalid(format!("viewport must look like 1440x900, got {raw:?}"));
    let (width, height) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width = width.trim().parse::<f64>().map_err(|_| invalid())?;
    let height = height.trim().parse::<f64>().map_err(|_| invalid())?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(invalid());
    }
    Ok((width, height))
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::init_logging(cli.log_json);
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    if matches!(cli.command, Commands::ListProfiles) {
        return print_profiles(out);
    }
    let config = cli.engine_config()?;
    let _span = gridboard_core::debug_span!("command", name = cli.command.name()).entered();
    match cli.command {
        Commands::Init(args) => run_init(args, config, out),
        Commands::Show(args) => run_show(args, config, out),
        Commands::Sort(args) => run_sort(args, config, out),
        Commands::Add(args) => run_add(args, config, out),
        Commands::Remove(args) => run_remove(args, config, out),
        Commands::Preset(args) => run_preset(args, config, out),
        Commands::Rescale(args) => run_rescale(args, config, out),
        Commands::Minimize(args) => run_minimize(args, config, out),
        Commands::Restore(args) => run_restore(args, config, out),
        Commands::Maximize(args) => run_maximize(args, config, out),
        Commands::Import(args) => run_import(args, config, out),
        Commands::Export(args) => run_export(args, config, out),
        Commands::ListPresets => print_presets(&config, out),
        Commands::ListProfiles => print_profiles(out),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::error::CliError;

    use super::{Cli, parse_viewport, run};

    fn run_args(args: &[&str]) -> (crate::error::Result<()>, String) {
        let cli = Cli::try_parse_from(args).expect("arguments parse");
        let mut out = Vec::new();
        let result = run(cli, &mut out);
        (result, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn list_profiles_command_dispatches_successfully() {
        let (result, out) = run_args(&["gridboard", "list-profiles"]);
        assert!(result.is_ok());
        assert_eq!(out, "desktop\ncompact\nmobile\n");
    }

    #[test]
    fn list_presets_follows_the_profile_density() {
        let (result, out) = run_args(&["gridboard", "--profile", "compact", "list-presets"]);
        assert!(result.is_ok());
        assert!(out.lines().any(|line| line.starts_with("small") && line.contains("12x9 cells at 20px")));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let (result, _) = run_args(&["gridboard", "--profile", "huge", "list-presets"]);
        match result.expect_err("missing profile should fail") {
            CliError::ProfileNotFound { name } => assert_eq!(name, "huge"),
            other => panic!("expected ProfileNotFound, got {other}"),
        }
    }

    #[test]
    fn viewport_override_parses_both_separators() {
        assert_eq!(parse_viewport("1440x900").unwrap(), (1440.0, 900.0));
        assert_eq!(parse_viewport(" 390X844 ").unwrap(), (390.0, 844.0));
        assert!(parse_viewport("1440").is_err());
        assert!(parse_viewport("0x900").is_err());
    }

    #[test]
    fn unknown_widget_type_is_a_parse_error() {
        assert!(Cli::try_parse_from(["gridboard", "add", "board.json", "clock"]).is_err());
    }
}
