/// cal-presenter - calibrated stimulus presentation from the command line
use anyhow::Context;
use cal_audio::AudioDescriptor;
use cal_audio_desktop::{list_devices, CpalSink};
use cal_core::{CalError, SessionParams};
use cal_presentation::{calibrate, Command, CommandOutcome, Presenter};
use cal_presenter::config::{load_params, params_path, save_params};
use cal_presenter::hints::{clipping_plot, corrective_hint};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cal-presenter")]
#[command(about = "Calibrate an output chain and present stimuli at accurate levels", long_about = None)]
struct Cli {
    /// Parameter file (default: presenter.toml)
    #[arg(short, long, global = true, env = "CAL_PRESENTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List output devices and their ids
    Devices,
    /// Play the calibration signal at the calibration level
    PlayCal {
        /// Output device id (overrides audio_device)
        #[arg(short, long, allow_hyphen_values = true)]
        device: Option<i32>,
        /// Channel routing, e.g. "1 2" (overrides channel_routing)
        #[arg(short, long)]
        routing: Option<String>,
    },
    /// Store the sound level meter reading taken during calibration
    Calibrate {
        /// Meter reading in dB SPL
        #[arg(long, allow_hyphen_values = true)]
        reading: f64,
    },
    /// Present a stimulus file at a desired level
    Present {
        /// Stimulus file
        file: PathBuf,
        /// Desired level in dB SPL
        #[arg(short, long, allow_hyphen_values = true)]
        level: f64,
        /// Do not print the waveform plot when the stimulus clips
        #[arg(long)]
        no_plot: bool,
    },
    /// Print the parameter store
    Show,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cal_presenter=info,cal_presentation=info,cal_audio=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Devices => show_devices()?,
        Commands::PlayCal { device, routing } => play_calibration(config_path, device, routing)?,
        Commands::Calibrate { reading } => submit_calibration(config_path, reading)?,
        Commands::Present { file, level, no_plot } => present(config_path, file, level, !no_plot)?,
        Commands::Show => show_params(config_path)?,
    }

    Ok(())
}

fn show_devices() -> anyhow::Result<()> {
    let devices = list_devices().context("Failed to enumerate output devices")?;

    if devices.is_empty() {
        println!("No output devices found");
        return Ok(());
    }

    println!("Output devices:");
    for device in devices {
        println!(
            "  {:>2}  {}{}  ({} ch, {} Hz)",
            device.id,
            device.name,
            if device.is_default { " [default]" } else { "" },
            device.channels,
            device.sample_rate
        );
    }
    Ok(())
}

fn play_calibration(
    config_path: Option<&Path>,
    device: Option<i32>,
    routing: Option<String>,
) -> anyhow::Result<()> {
    let mut params = load_params(config_path)?;
    if let Some(device) = device {
        params.audio_device = device;
    }
    if let Some(routing) = routing {
        params.channel_routing = routing;
    }

    let title = params.cal_file.display().to_string();
    let mut presenter = Presenter::new(CpalSink::new()?);
    let outcome = run(&mut presenter, Command::PlayCalibration, &mut params, Some(&title))?;
    report(&outcome);
    println!("Read the sound level meter, then run: cal-presenter calibrate --reading <dB SPL>");

    save_params(&params_path(config_path), &params)?;
    presenter.sink().wait_until_finished();
    Ok(())
}

fn submit_calibration(config_path: Option<&Path>, reading: f64) -> anyhow::Result<()> {
    let mut params = load_params(config_path)?;

    let state = calibrate(&mut params, reading)?;
    report(&CommandOutcome::Calibrated(state));

    save_params(&params_path(config_path), &params)?;
    Ok(())
}

fn present(
    config_path: Option<&Path>,
    file: PathBuf,
    level: f64,
    plot: bool,
) -> anyhow::Result<()> {
    let mut params = load_params(config_path)?;
    let title = file.display().to_string();

    let mut presenter = Presenter::new(CpalSink::new()?);
    let command = Command::Present {
        stimulus: AudioDescriptor::file(file),
        desired_level_db: level,
    };
    let outcome = run(&mut presenter, command, &mut params, plot.then_some(title.as_str()))?;
    report(&outcome);

    save_params(&params_path(config_path), &params)?;
    presenter.sink().wait_until_finished();
    Ok(())
}

fn show_params(config_path: Option<&Path>) -> anyhow::Result<()> {
    let params = load_params(config_path)?;
    println!("# {}", params_path(config_path).display());
    print!("{}", toml::to_string_pretty(&params)?);
    if params.slm_offset_db.is_none() {
        println!("# not calibrated yet");
    }
    Ok(())
}

/// Dispatch a command, printing the corrective hint on failure
///
/// A clipped stimulus is also plotted unless `plot_title` is `None`. The
/// error itself is reported by `main` on the way out.
fn run(
    presenter: &mut Presenter<CpalSink>,
    command: Command,
    params: &mut SessionParams,
    plot_title: Option<&str>,
) -> Result<CommandOutcome, CalError> {
    presenter.dispatch(command, params).inspect_err(|e| {
        if let Some(hint) = corrective_hint(e.kind()) {
            eprintln!("Hint: {}", hint);
        }
        if let Some(plot) = plot_title.and_then(|title| clipping_plot(e, &*presenter, title)) {
            eprint!("{}", plot);
        }
    })
}

fn report(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Presented(report) => println!(
            "Playing {} at {:.2} dB FS on {} (channels {}), {:.2} s, peak {:.4}",
            report.label,
            report.level_db,
            report.device.name,
            report.routing,
            report.duration_secs,
            report.peak
        ),
        CommandOutcome::Calibrated(state) => println!(
            "Calibration level {:.2} dB, reading {:.2} dB SPL -> offset {:+.2} dB",
            state.cal_level_db, state.slm_reading_db, state.slm_offset_db
        ),
        CommandOutcome::Stopped(outcome) => println!("Stop: {:?}", outcome),
    }
}
