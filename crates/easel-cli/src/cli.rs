// ============================================================================
// Command-line interface
// ============================================================================
//
// Usage:
//   easel apply photo.jpg --script edits.json
//   easel apply photo.jpg --script edits.json -o out.png --preview preview.png
//   easel info photo.jpg --config easel.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use easel_core::decode::get_orientation;
use easel_core::{
    decode_bytes, default_save_path, encode_file, EditSession, EditorConfig, LatestFrame,
    SessionState, ViewTransform,
};
use log::{debug, info, warn};

use crate::script::{load_script, replay};

/// Headless Easel edit pipeline.
#[derive(Parser, Debug)]
#[command(name = "easel", version, about = "Replay photo edit scripts without a GUI")]
pub struct Cli {
    /// Editor settings (TOML). Defaults are used when omitted.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an image, replay an edit script and save the committed result.
    Apply {
        input: PathBuf,

        /// JSON edit script.
        #[arg(short, long, value_name = "SCRIPT.json")]
        script: PathBuf,

        /// Output file; format follows the extension. Defaults to `<input>-edited.<ext>`.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the last displayed preview frame.
        #[arg(long, value_name = "FILE")]
        preview: Option<PathBuf>,

        /// Font for text edits; overrides `font_path` from the config.
        #[arg(long, value_name = "FONT.ttf")]
        font: Option<PathBuf>,
    },

    /// Print the image size and how it would be previewed.
    Info { input: PathBuf },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Apply {
            input,
            script,
            output,
            preview,
            font,
        } => {
            let output = output.unwrap_or_else(|| default_save_path(&input));
            apply(
                config,
                &input,
                &script,
                &output,
                preview.as_deref(),
                font.as_deref(),
            )
        }
        Command::Info { input } => {
            println!("{}", info(&config, &input)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        debug!("No config given, using defaults");
        return Ok(EditorConfig::default());
    };
    EditorConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn apply(
    config: EditorConfig,
    input: &Path,
    script: &Path,
    output: &Path,
    preview: Option<&Path>,
    font: Option<&Path>,
) -> Result<()> {
    let steps = load_script(script)?;
    let font = font.map(Path::to_path_buf).or_else(|| config.font_path.clone());
    let jpeg_quality = config.jpeg_quality;

    let mut session = EditSession::new(config, LatestFrame::default());
    if let Some(font) = &font {
        session.load_font(font)?;
    }
    session
        .load_path(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;

    replay(&mut session, &steps)?;
    if session.state() == SessionState::Previewing {
        warn!("Script ended with an uncommitted edit; it is not saved");
    }

    session.save(output)?;
    info!("Wrote {}", output.display());

    if let Some(path) = preview {
        let frame = session
            .presenter()
            .frame
            .as_ref()
            .context("No preview frame was presented")?;
        encode_file(frame, path, jpeg_quality)
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
        info!("Wrote preview {}", path.display());
    }

    Ok(())
}

fn info(config: &EditorConfig, input: &Path) -> Result<String> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let image = decode_bytes(&bytes).with_context(|| format!("Failed to decode {}", input.display()))?;
    let view = ViewTransform::fit(image.width, image.height, config.preview);

    Ok(format!(
        "{}: {}x{}, preview {}x{} (ratio {:.4}), orientation {:?}",
        input.display(),
        image.width,
        image.height,
        view.display_width,
        view.display_height,
        view.ratio,
        get_orientation(&bytes),
    ))
}
