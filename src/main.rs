use clap::Parser;

use asciicam::ascii::RenderConfig;
use asciicam::camera::{FrameSource, SourceError, V4l2Source};
use asciicam::cli::{self, Args, Command};
use asciicam::config::{Config, RunMode, Settings, SourceSettings};
use asciicam::greenscreen::{Greenscreen, SampleRecorder, SampleStore};
use asciicam::pipeline::PipeSource;
use asciicam::resize::Bilinear;
use asciicam::session::{record_samples, AppError, CancelToken, Session};
use asciicam::terminal::{
    resolve_output_size, terminal_size, ColorProfile, ScreenGuard, TerminalOutput,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Config actions must work even when the file itself is broken
    if let Some(Command::Config { action }) = &args.command {
        cli::handle_config_action(action.clone(), args.config.as_deref())?;
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    if let Some(Command::ListFormats) = &args.command {
        cli::list_formats(&args.device_path(&config))?;
        return Ok(());
    }

    let settings = args.resolve(&config)?;

    let cancel = CancelToken::new();
    cancel.cancel_on_signal()?;

    let mut source = open_source(&settings.source)?;
    log::info!("Capturing at {}", source.resolution());

    match settings.run_mode {
        RunMode::RecordSamples => {
            let store = SampleStore::new(&settings.sample_dir);
            let mut recorder = SampleRecorder::new(store);
            let written = record_samples(&mut source, &mut recorder, &cancel)?;
            println!(
                "Wrote {} background samples to {}",
                written,
                settings.sample_dir.display()
            );
            Ok(())
        }
        RunMode::Render => render(source, &settings, &cancel),
    }
}

fn open_source(settings: &SourceSettings) -> Result<Box<dyn FrameSource>, SourceError> {
    match settings {
        SourceSettings::Device(camera) => Ok(Box::new(V4l2Source::open(camera)?)),
        SourceSettings::Pipeline {
            description,
            resolution,
        } => Ok(Box::new(PipeSource::spawn(description, *resolution)?)),
    }
}

fn render(
    source: Box<dyn FrameSource>,
    settings: &Settings,
    cancel: &CancelToken,
) -> Result<(), AppError> {
    let (width, height) = resolve_output_size(settings.width, settings.height, terminal_size());
    let config = RenderConfig {
        override_color: settings.override_color,
        width,
        height,
        mode: settings.render_mode,
        profile: settings.profile.unwrap_or_else(ColorProfile::detect),
    };
    let (image_width, image_height) = config.image_size();
    log::info!(
        "Rendering {}x{} cells from {}x{} images ({:?}, {})",
        width,
        height,
        image_width,
        image_height,
        config.mode,
        config.profile.name()
    );

    let greenscreen = if settings.greenscreen {
        Greenscreen::load(
            &SampleStore::new(&settings.sample_dir),
            settings.sample_index,
            image_width,
            image_height,
            settings.threshold,
            &Bilinear,
        )?
    } else {
        Greenscreen::disabled()
    };

    let mut session = Session::new(source, Bilinear, greenscreen, config);
    if settings.show_fps {
        session = session.with_fps();
    }

    // Declared after the session so the screen is restored before the
    // source is torn down
    let _screen = ScreenGuard::enter()?;
    let mut out = TerminalOutput::stdout();
    session.run(&mut out, cancel)
}
