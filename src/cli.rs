use clap::{value_parser, Parser};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "qr.png";

#[derive(Parser, Debug)]
#[command(
    name = "qrgen",
    version,
    about = "QR Code Generator CLI",
    after_help = "EXAMPLES:
    qrgen -t \"Hello World!\"
    qrgen -u \"https://github.com/yourusername\" -s 512 -o github.png
    qrgen -w \"MyWiFi:password123:WPA\" -o wifi.png
    qrgen -i logo.png -o image_qr.png
    qrgen --vcard contact.vcf -o contact.png
    qrgen -f urls.txt --batch
    qrgen -u \"https://important-site.com\" -q highest --preview

BATCH FILE FORMAT:
    One payload per line; blank lines and lines starting with # are skipped.
    Entries are written to batch_1.png, batch_2.png, ... in the current directory.

WIFI SECURITY: WPA, WEP, nopass"
)]
pub struct Cli {
    /// Text to encode in QR code
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// URL to encode in QR code
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// File containing text to encode (or one payload per line with --batch)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Image file to encode as a base64 data URI
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// WiFi credentials: 'SSID:PASSWORD[:SECURITY]'
    #[arg(short, long, value_name = "CREDENTIALS")]
    pub wifi: Option<String>,

    /// vCard file (.vcf) to encode
    #[arg(long, value_name = "FILE")]
    pub vcard: Option<PathBuf>,

    /// Output file name
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// QR code size in pixels (1-2048)
    #[arg(short, long, default_value_t = 256, value_parser = value_parser!(u32).range(1..=2048))]
    pub size: u32,

    /// Error correction level (low/medium/high/highest)
    #[arg(short, long, value_name = "LEVEL", default_value = "medium")]
    pub quality: String,

    /// Batch mode - process multiple inputs from --file
    #[arg(long)]
    pub batch: bool,

    /// Show a block-character preview in the terminal
    #[arg(long)]
    pub preview: bool,

    /// Quiet mode - no output messages
    #[arg(long)]
    pub quiet: bool,

    /// Overwrite existing files without asking
    #[arg(long)]
    pub force: bool,

    /// Escape \ ; , : inside WiFi SSID and password
    #[arg(long)]
    pub escape: bool,

    /// Log debug details to stderr
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["qrgen", "-t", "hi"]).unwrap();
        assert_eq!(cli.text.as_deref(), Some("hi"));
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(cli.size, 256);
        assert_eq!(cli.quality, "medium");
        assert!(!cli.batch && !cli.preview && !cli.quiet && !cli.force);
    }

    #[test]
    fn test_size_range() {
        assert!(Cli::try_parse_from(["qrgen", "-t", "hi", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["qrgen", "-t", "hi", "-s", "2049"]).is_err());
        assert!(Cli::try_parse_from(["qrgen", "-t", "hi", "-s", "2048"]).is_ok());
    }
}
