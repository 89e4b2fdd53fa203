use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use qrgen::batch::{run_batch, BatchOptions};
use qrgen::output::{format_file_size, save_png};
use qrgen::payload::{batch_entries, image_data_uri, normalize_text_file};
use qrgen::render::DEFAULT_PREVIEW_CELLS;
use qrgen::{encode, preview_text, ErrorCorrectionLevel, NormalizeOptions, Payload};

mod cli;
mod logging;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    if let Some(file) = batch_file(&cli) {
        return run_batch_file(file, &cli);
    }

    let Some(payload) = input_payload(&cli)? else {
        bail!(
            "No input provided. Use -t, -u, or -f flag.\nRun 'qrgen --help' for more information."
        );
    };
    let options = NormalizeOptions {
        escape_wifi: cli.escape,
    };
    let content = payload.normalize(&options)?;
    let level = ErrorCorrectionLevel::from_quality(&cli.quality);
    let qr = encode(&content, level).context("cannot create QR code")?;

    if cli.preview {
        show_preview(&qr, &content);
    }

    if cli.output.exists() && !cli.force && !confirm_overwrite(&cli.output)? {
        bail!("operation cancelled");
    }
    let written =
        save_png(&qr, &cli.output, cli.size, true).context("cannot write QR code to file")?;

    if !cli.quiet {
        println!("✅ QR code successfully generated!");
        println!("📁 Output: {}", cli.output.display());
        println!("📏 Size: {0}x{0} pixels", cli.size);
        println!("📊 Quality: {}", cli.quality);
        println!("💾 File size: {}", format_file_size(written));
    }
    Ok(())
}

/// Batch mode only applies with `-f`; a bare `--batch` falls back to the single-input path.
fn batch_file(cli: &Cli) -> Option<&Path> {
    cli.file.as_deref().filter(|_| cli.batch)
}

/// Picks the input by priority: vcard, wifi, image, file, url, text.
fn input_payload(cli: &Cli) -> Result<Option<Payload>> {
    if let Some(path) = &cli.vcard {
        return Ok(Some(Payload::VCard(read_text(path)?)));
    }
    if let Some(wifi) = &cli.wifi {
        return Ok(Some(Payload::Wifi(wifi.clone())));
    }
    if let Some(path) = &cli.image {
        let bytes = fs::read(path)
            .with_context(|| format!("cannot open image file {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        return Ok(Some(Payload::DataUri(image_data_uri(&bytes, ext))));
    }
    if let Some(path) = &cli.file {
        return Ok(Some(Payload::Text(normalize_text_file(&read_text(path)?))));
    }
    if let Some(url) = &cli.url {
        return Ok(Some(Payload::Url(url.clone())));
    }
    Ok(cli.text.clone().map(Payload::Text))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot open file {}", path.display()))
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!("⚠️  File {} already exists. Overwrite? (y/N): ", path.display());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(matches!(response.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn show_preview(qr: &qrgen::QrCode, content: &str) {
    println!("\n📱 QR Preview:");
    let body = preview_text(qr, DEFAULT_PREVIEW_CELLS);
    let width = body.lines().next().map_or(0, |l| l.chars().count());
    println!("╭{}╮", "─".repeat(width + 2));
    for line in body.lines() {
        println!("│ {line} │");
    }
    println!("╰{}╯", "─".repeat(width + 2));
    println!("Content: {}\n", truncate(content, 50));
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn run_batch_file(file: &Path, cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("cannot open batch file {}", file.display()))?;
    let entries: Vec<&str> = batch_entries(&text).collect();
    let options = BatchOptions {
        overwrite: cli.force,
        ..BatchOptions::default()
    };

    let outcomes = run_batch(&entries, &options);
    let mut generated = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(_) => {
                generated += 1;
                if !cli.quiet {
                    println!("✅ Generated: {}", outcome.path.display());
                }
            }
            Err(e) => eprintln!("❌ Error processing line {}: {e}", outcome.index),
        }
    }
    if !cli.quiet {
        println!(
            "Batch processing completed. Generated {generated} of {} QR codes.",
            outcomes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_batch_needs_file() {
        let cli = Cli::try_parse_from(["qrgen", "--batch", "-t", "hello"]).unwrap();
        assert_eq!(batch_file(&cli), None);
        assert_eq!(input_payload(&cli).unwrap(), Some(Payload::Text("hello".into())));
        let cli = Cli::try_parse_from(["qrgen", "--batch", "-f", "urls.txt"]).unwrap();
        assert_eq!(batch_file(&cli), Some(Path::new("urls.txt")));
        let cli = Cli::try_parse_from(["qrgen", "-f", "urls.txt"]).unwrap();
        assert_eq!(batch_file(&cli), None);
    }

    #[test]
    fn test_input_priority() {
        let cli =
            Cli::try_parse_from(["qrgen", "-t", "text", "-u", "https://a.example", "-w", "S:P"])
                .unwrap();
        assert_eq!(input_payload(&cli).unwrap(), Some(Payload::Wifi("S:P".into())));
        let cli = Cli::try_parse_from(["qrgen", "-t", "text", "-u", "https://a.example"]).unwrap();
        assert_eq!(input_payload(&cli).unwrap(), Some(Payload::Url("https://a.example".into())));
        let cli = Cli::try_parse_from(["qrgen"]).unwrap();
        assert_eq!(input_payload(&cli).unwrap(), None);
    }
}
