use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pn_app::{
    AppError, AppResult, EnergyClass, PhaseTable, RenderError, ResultSurface, Session, Settings,
    SubmissionForm, SubmitProgressEvent, functional_label, plot_traces,
};
use pn_client::PlotSpec;
use pn_core::{TemperatureControl, TemperatureUnit, key_fingerprint, validate_temperature};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phasenav")]
#[command(about = "PhaseNavigator CLI - phase diagrams from the Materials Project", long_about = None)]
struct Cli {
    /// Settings YAML file
    #[arg(long, global = true, default_value = "phasenav.yaml")]
    config: PathBuf,

    /// Override the API base URL (e.g. http://127.0.0.1:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a phase diagram
    Generate {
        /// Comma-separated formulas, 2 to 4 (e.g. "Li2O, CoO, O2")
        #[arg(short, long)]
        formulas: String,
        /// Materials Project API key; the stored key is used when omitted
        #[arg(long)]
        api_key: Option<String>,
        /// Temperature in `--unit`; 0 for none
        #[arg(short, long, default_value_t = 0)]
        temp: i64,
        #[arg(short, long, value_enum, default_value_t = UnitArg::Kelvin)]
        unit: UnitArg,
        /// Energy above hull cutoff in eV/atom
        #[arg(long)]
        e_cut: Option<String>,
        /// DFT functional (GGA_GGA_U_R2SCAN, R2SCAN, GGA_GGA_U)
        #[arg(long)]
        functional: Option<String>,
        /// Write the returned plot JSON here
        #[arg(long)]
        plot_out: Option<PathBuf>,
    },
    /// Check that the API server is up
    Health,
    /// Manage the stored API key
    #[command(subcommand)]
    Key(KeyCommands),
    /// Convert a temperature between Kelvin and Celsius
    Convert {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(long, value_enum, default_value_t = UnitArg::Kelvin)]
        from: UnitArg,
    },
    /// Show what the temperature control makes of a typed value
    Temp {
        #[arg(allow_hyphen_values = true)]
        text: String,
        #[arg(short, long, value_enum, default_value_t = UnitArg::Kelvin)]
        unit: UnitArg,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Validate and store a key
    Save { api_key: String },
    /// Show the stored key's fingerprint
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Kelvin,
    Celsius,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Kelvin => TemperatureUnit::Kelvin,
            UnitArg::Celsius => TemperatureUnit::Celsius,
        }
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(Some(&cli.config))?;
    if let Some(url) = cli.api_url {
        settings = settings.with_api_base_url(url);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let session = || Session::from_settings(settings.clone());

    match cli.command {
        Commands::Generate {
            formulas,
            api_key,
            temp,
            unit,
            e_cut,
            functional,
            plot_out,
        } => cmd_generate(
            &session()?,
            GenerateArgs {
                formulas,
                api_key,
                temp,
                unit: unit.into(),
                e_cut,
                functional,
            },
            plot_out.as_deref(),
        ),
        Commands::Health => cmd_health(&session()?),
        Commands::Key(KeyCommands::Save { api_key }) => cmd_key_save(&session()?, &api_key),
        Commands::Key(KeyCommands::Show) => cmd_key_show(&session()?),
        Commands::Key(KeyCommands::Clear) => cmd_key_clear(&session()?),
        Commands::Convert { value, from } => {
            cmd_convert(value, from.into());
            Ok(())
        }
        Commands::Temp { text, unit } => {
            cmd_temp(&text, unit.into());
            Ok(())
        }
    }
}

struct GenerateArgs {
    formulas: String,
    api_key: Option<String>,
    temp: i64,
    unit: TemperatureUnit,
    e_cut: Option<String>,
    functional: Option<String>,
}

/// Runs `value` through the same control the GUI uses; 0 leaves it disabled.
fn canonical_temperature(value: i64, unit: TemperatureUnit) -> AppResult<u32> {
    validate_temperature(value, unit)?;
    let mut control = TemperatureControl::new();
    if value != 0 {
        control.set_enabled(true);
        control.set_unit(unit);
        control.type_text(&value.to_string());
    }
    Ok(control.canonical_kelvin())
}

fn cmd_generate(session: &Session, args: GenerateArgs, plot_out: Option<&Path>) -> AppResult<()> {
    let mut surface = TerminalSurface::default();

    let temperature_k = match canonical_temperature(args.temp, args.unit) {
        Ok(k) => k,
        Err(err) => {
            surface.show_error(&err.to_string());
            return Err(err);
        }
    };

    let defaults = session.default_form();
    let form = SubmissionForm {
        formulas: args.formulas,
        api_key: args
            .api_key
            .or_else(|| session.restore_api_key())
            .unwrap_or_default(),
        energy_cutoff: args.e_cut.unwrap_or(defaults.energy_cutoff),
        functional: args.functional.unwrap_or(defaults.functional),
        temperature_k,
    };

    println!(
        "Generating phase diagram for {} ({})",
        form.formulas,
        functional_label(&form.functional)
    );
    let response = session.submit(&form, &mut surface)?;

    if let Some(path) = plot_out {
        let json = serde_json::to_string_pretty(&response.plot)
            .map_err(|e| AppError::Io(e.into()))?;
        std::fs::write(path, json)?;
        println!("✓ Plot written to {}", path.display());
    }
    Ok(())
}

fn cmd_health(session: &Session) -> AppResult<()> {
    println!("Checking {}", session.settings().api_base_url);
    let health = session.check_health()?;
    let status = health
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");
    println!("✓ Server status: {}", status);
    if let Some(version) = health.get("version").and_then(serde_json::Value::as_str) {
        println!("  Version: {}", version);
    }
    Ok(())
}

fn cmd_key_save(session: &Session, api_key: &str) -> AppResult<()> {
    session.save_api_key(api_key)?;
    println!("✓ API key saved ({})", key_fingerprint(api_key.trim()));
    Ok(())
}

fn cmd_key_show(session: &Session) -> AppResult<()> {
    match session.restore_api_key() {
        Some(key) => println!("Stored API key: {} (fingerprint {})", mask_key(&key), key_fingerprint(&key)),
        None => println!("No API key stored"),
    }
    Ok(())
}

fn cmd_key_clear(session: &Session) -> AppResult<()> {
    session.clear_api_key()?;
    println!("✓ Stored API key removed");
    Ok(())
}

fn cmd_convert(value: f64, from: TemperatureUnit) {
    let to = from.other();
    println!(
        "{}{} = {:.2}{}",
        value,
        from.suffix(),
        from.convert_to(value, to),
        to.suffix()
    );
}

fn cmd_temp(text: &str, unit: TemperatureUnit) {
    let mut control = TemperatureControl::new();
    control.set_enabled(true);
    control.set_unit(unit);
    control.type_text(text);
    let slider = control.slider();
    println!(
        "Displayed: {}{}  ({})",
        control.displayed(),
        unit.suffix(),
        control.conversion_hint()
    );
    println!("Sent to server: {} K", control.canonical_kelvin());
    println!(
        "Range: {}-{}{} in steps of {}",
        slider.min,
        slider.max,
        unit.suffix(),
        slider.step
    );
}

fn mask_key(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{}{}", "*".repeat(key.chars().count().saturating_sub(4)), tail)
}

/// Prints submission state to the terminal.
#[derive(Default)]
struct TerminalSurface {
    progress_shown: bool,
}

impl TerminalSurface {
    fn clear_progress_line(&mut self) {
        if self.progress_shown {
            print!("\r{}\r", " ".repeat(80));
            let _ = io::stdout().flush();
            self.progress_shown = false;
        }
    }
}

impl ResultSurface for TerminalSurface {
    fn set_loading(&mut self, loading: bool) {
        if !loading {
            self.clear_progress_line();
        }
    }

    fn show_progress(&mut self, event: &SubmitProgressEvent) {
        print!(
            "\r[{}/4] {:<45} elapsed={:.1}s",
            event.step.number(),
            event.text(),
            event.elapsed_wall_s
        );
        let _ = io::stdout().flush();
        self.progress_shown = true;
    }

    fn show_error(&mut self, message: &str) {
        self.clear_progress_line();
        eprintln!("✗ {}", message);
    }

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), RenderError> {
        let traces = plot_traces(plot)?;
        self.clear_progress_line();
        println!("✓ {}", plot.title().unwrap_or("Phase diagram"));
        let points: usize = traces.iter().map(|t| t.point_count()).sum();
        let labels: Vec<&str> = traces
            .iter()
            .flat_map(|t| t.labels.iter().map(|l| l.text.as_str()))
            .collect();
        println!("  Traces: {} ({} points)", traces.len(), points);
        if !labels.is_empty() {
            println!("  Labelled phases: {}", labels.join(", "));
        }
        Ok(())
    }

    fn show_phase_table(&mut self, table: &PhaseTable) {
        println!();
        println!("Phase information {}", table.count_label);
        println!("  {}", table.summary());
        println!("  Energy corrections: {}", table.correction_note);
        println!(
            "  {:<14} {:<16} {:>12} {:>12} {:>10}  {}",
            "Formula", "Composition", "E_form", "E/atom", "Corr.", "Entry"
        );
        for row in &table.rows {
            let marker = match row.energy_class {
                EnergyClass::Positive => '+',
                EnergyClass::Negative => '-',
                EnergyClass::Zero => ' ',
            };
            println!(
                "  {:<14} {:<16} {:>11}{} {:>12} {:>10}  {}",
                row.formula,
                row.composition,
                row.formation_energy,
                marker,
                row.energy_per_atom,
                row.correction,
                row.entry.text()
            );
        }
    }

    fn hide_phase_table(&mut self) {
        println!("  (no phase information returned)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_temperature_stays_disabled() {
        assert_eq!(canonical_temperature(0, TemperatureUnit::Celsius).unwrap(), 0);
    }

    #[test]
    fn celsius_is_sent_as_kelvin() {
        assert_eq!(canonical_temperature(27, TemperatureUnit::Celsius).unwrap(), 300);
        assert_eq!(canonical_temperature(1200, TemperatureUnit::Kelvin).unwrap(), 1200);
    }

    #[test]
    fn out_of_range_temperature_is_an_error() {
        let err = canonical_temperature(3000, TemperatureUnit::Kelvin).unwrap_err();
        assert_eq!(err.to_string(), "Temperature must be 0 K or between 300-2000 K");
    }

    #[test]
    fn masked_key_keeps_last_four() {
        assert_eq!(mask_key("abcdefgh"), "****efgh");
        assert_eq!(mask_key("ab"), "ab");
    }

    #[test]
    fn cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "phasenav", "generate", "-f", "Fe2O3,FeO", "--temp", "500", "--unit", "celsius",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate { formulas, temp, unit, .. } => {
                assert_eq!(formulas, "Fe2O3,FeO");
                assert_eq!(temp, 500);
                assert!(matches!(unit, UnitArg::Celsius));
            }
            _ => panic!("expected generate"),
        }
    }
}
