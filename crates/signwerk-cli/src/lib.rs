// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// signwerk-cli — Command-line front end for the PDF toolbox.
//
// Every subcommand reads its inputs from disk, runs one toolbox operation from
// `signwerk-document` (or, for `stamp`, one bake through the overlay editor),
// and writes the result where it was asked to. Reports go to the supplied
// writer so tests can capture them.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use signwerk_core::error::Result;
use signwerk_core::{EditorConfig, Point};
use signwerk_document::{BlankRasterizer, LopdfCodec, PdfReader, PdfWriter};
use signwerk_overlay::Editor;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "signwerk", version)]
#[command(about = "Merge, split, rotate, compress and inspect PDF files")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge two or more PDFs, in the given order, into one file.
    Merge {
        #[arg(value_name = "FILE", num_args = 2.., required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write every page as its own PDF (page_1.pdf, page_2.pdf, ...).
    Split {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        /// Directory for the single-page files; created if missing.
        #[arg(short, long)]
        out_dir: PathBuf,
    },
    /// Rotate every page clockwise by a multiple of 90 degrees, added to the
    /// page's existing rotation.
    Rotate {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(short, long, default_value_t = 90, allow_hyphen_values = true)]
        degrees: i32,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build a PDF with one page per PNG/JPEG image.
    ImagesToPdf {
        #[arg(value_name = "IMAGE", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Title stored in the document metadata.
        #[arg(long)]
        title: Option<String>,
    },
    /// Re-save with unused objects removed and streams compressed.
    Compress {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the page count and page sizes.
    Info {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Bake text, checkboxes and a signature onto one page.
    Stamp(StampArgs),
}

/// Positions are measured from the page's top-left corner in rendered-page
/// pixels, which are PDF points at the default render scale.
#[derive(Debug, Args)]
struct StampArgs {
    #[arg(value_name = "FILE")]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// 1-based page to annotate.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    /// Text to place, as `X,Y:TEXT`. Repeatable.
    #[arg(long, value_name = "X,Y:TEXT", value_parser = parse_text_placement)]
    text: Vec<TextPlacement>,
    /// Checkbox to place, as `X,Y`. Repeatable.
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    checkbox: Vec<Point>,
    /// PNG/JPEG signature, placed at the configured position and size.
    #[arg(long, value_name = "IMAGE")]
    signature: Option<PathBuf>,
    /// Editor settings JSON (font size, text colour, render scale, signature
    /// placement, checkbox state).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
struct TextPlacement {
    at: Point,
    text: String,
}

fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{value}`"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|err| format!("bad coordinate `{part}`: {err}"))
    };
    Ok(Point::new(coordinate(x)?, coordinate(y)?))
}

fn parse_text_placement(value: &str) -> std::result::Result<TextPlacement, String> {
    let (at, text) = value
        .split_once(':')
        .ok_or_else(|| format!("expected X,Y:TEXT, got `{value}`"))?;
    Ok(TextPlacement {
        at: parse_point(at)?,
        text: text.to_string(),
    })
}

/// Run the parsed command, writing human-facing reports to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Merge { inputs, output } => run_merge(&inputs, &output, out),
        Command::Split { input, out_dir } => run_split(&input, &out_dir, out),
        Command::Rotate {
            input,
            degrees,
            output,
        } => run_rotate(&input, degrees, &output, out),
        Command::ImagesToPdf {
            inputs,
            output,
            title,
        } => run_images_to_pdf(&inputs, &output, title, out),
        Command::Compress { input, output } => run_compress(&input, &output, out),
        Command::Info { input, json } => run_info(&input, json, out),
        Command::Stamp(args) => run_stamp(&args, out),
    }
}

// -- Subcommands --------------------------------------------------------------

fn run_merge(inputs: &[PathBuf], output: &Path, out: &mut impl Write) -> Result<()> {
    let Some((first, rest)) = inputs.split_first() else {
        return Ok(());
    };
    let base = PdfReader::open(first)?;
    let others = rest.iter().map(fs::read).collect::<std::io::Result<Vec<_>>>()?;
    let other_slices: Vec<&[u8]> = others.iter().map(Vec::as_slice).collect();

    let merged = base.merge(&other_slices)?;
    fs::write(output, &merged)?;
    info!(inputs = inputs.len(), output = %output.display(), "Merged");
    writeln!(out, "Merged {} files into {}", inputs.len(), output.display())?;
    Ok(())
}

fn run_split(input: &Path, out_dir: &Path, out: &mut impl Write) -> Result<()> {
    let reader = PdfReader::open(input)?;
    let pages = reader.split_pages()?;
    fs::create_dir_all(out_dir)?;

    for (index, bytes) in pages.iter().enumerate() {
        let path = out_dir.join(format!("page_{}.pdf", index + 1));
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), "Page written");
    }
    writeln!(out, "Split {} pages into {}", pages.len(), out_dir.display())?;
    Ok(())
}

fn run_rotate(input: &Path, degrees: i32, output: &Path, out: &mut impl Write) -> Result<()> {
    let rotated = PdfReader::open(input)?.rotate_all(degrees)?;
    fs::write(output, &rotated)?;
    writeln!(out, "Rotated {} by {} degrees", input.display(), degrees)?;
    Ok(())
}

fn run_images_to_pdf(
    inputs: &[PathBuf],
    output: &Path,
    title: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let images = inputs.iter().map(fs::read).collect::<std::io::Result<Vec<_>>>()?;
    let slices: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();

    let mut writer = PdfWriter::new();
    if let Some(title) = title {
        writer.set_title(title);
    }
    let pdf = writer.images_to_pdf(&slices)?;
    fs::write(output, &pdf)?;

    let pages = PdfReader::from_bytes(&pdf)?.page_count();
    writeln!(out, "Wrote {} image pages to {}", pages, output.display())?;
    Ok(())
}

fn run_compress(input: &Path, output: &Path, out: &mut impl Write) -> Result<()> {
    let (compressed, report) = PdfReader::open(input)?.compress()?;
    fs::write(output, &compressed)?;
    writeln!(
        out,
        "{} -> {} bytes ({:.1}% smaller)",
        report.original_bytes,
        report.compressed_bytes,
        report.reduction_percent()
    )?;
    Ok(())
}

fn run_info(input: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let info = PdfReader::open(input)?.info()?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        return Ok(());
    }

    writeln!(out, "{}: {} pages, {} bytes", input.display(), info.page_count, info.file_bytes)?;
    for (index, size) in info.pages.iter().enumerate() {
        writeln!(out, "  page {}: {:.0} x {:.0} pt", index + 1, size.width, size.height)?;
    }
    Ok(())
}

fn run_stamp(args: &StampArgs, out: &mut impl Write) -> Result<()> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let document = fs::read(&args.input)?;

    let mut editor = Editor::new(LopdfCodec::new(), BlankRasterizer::new(), config);
    editor.load_for_editing(document, |_| true)?;
    editor.set_current_page(args.page as usize - 1)?;

    for placement in &args.text {
        if editor.add_text(placement.at, &placement.text)?.is_none() {
            warn!(at = ?placement.at, "Blank text skipped");
        }
    }
    for at in &args.checkbox {
        editor.add_checkbox(*at)?;
    }
    if let Some(path) = &args.signature {
        editor.add_signature(fs::read(path)?)?;
    }

    let placed = editor.controller().store().len();
    let stamped = editor.save_edited()?;
    fs::write(&args.output, &stamped)?;
    info!(placed, page = args.page, output = %args.output.display(), "Stamped");
    writeln!(
        out,
        "Placed {} annotations on page {} of {}",
        placed,
        args.page,
        args.output.display()
    )?;
    Ok(())
}
