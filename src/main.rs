//! stegovault - hide files inside raster images.
//!
//! Embeds an arbitrary file in a PNG carrier (or a purpose-generated
//! image), optionally encrypted with a password and always protected by a
//! SHA-256 content hash.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stegovault::pixel::capacity;
use stegovault::resilience::{CancelToken, FileSource, Orchestrator};
use stegovault::{codec, EmbedTarget};

#[derive(Parser)]
#[command(name = "stegovault")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Hide files inside raster images",
    long_about = "Embeds an arbitrary file inside a PNG image, optionally encrypted with a password and always verified with a SHA-256 content hash."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a file in a freshly generated image
    Hide {
        /// File to hide
        input: PathBuf,

        /// Output PNG path
        output: PathBuf,

        /// Stored filename (default: input file name)
        #[arg(long)]
        name: Option<String>,

        /// Encrypt the payload with a password (prompted)
        #[arg(long)]
        encrypt: bool,

        /// Password for non-interactive use
        #[arg(long, conflicts_with = "encrypt")]
        password: Option<String>,
    },

    /// Hide a file in an existing carrier image
    Embed {
        /// File to hide
        input: PathBuf,

        /// Carrier image (PNG or another lossless format)
        carrier: PathBuf,

        /// Output PNG path
        output: PathBuf,

        /// Bits per channel, 1-8 (default: smallest depth that fits)
        #[arg(long)]
        depth: Option<u8>,

        /// Stored filename (default: input file name)
        #[arg(long)]
        name: Option<String>,

        /// Encrypt the payload with a password (prompted)
        #[arg(long)]
        encrypt: bool,

        /// Password for non-interactive use
        #[arg(long, conflicts_with = "encrypt")]
        password: Option<String>,
    },

    /// Extract a hidden file from an image
    Reveal {
        /// Image containing a container
        image: PathBuf,

        /// Output path (default: the stored filename)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Password for encrypted containers
        #[arg(long)]
        password: Option<String>,
    },

    /// Show container metadata without extracting the payload
    Inspect {
        /// Image containing a container
        image: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report carrier capacity for a payload
    Capacity {
        /// Carrier image
        carrier: PathBuf,

        /// Payload size in bytes to plan for
        #[arg(long)]
        payload_size: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Hide {
            input,
            output,
            name,
            encrypt,
            password,
        } => cmd_hide(&input, &output, name, encrypt, password),

        Commands::Embed {
            input,
            carrier,
            output,
            depth,
            name,
            encrypt,
            password,
        } => cmd_embed(&input, &carrier, &output, depth, name, encrypt, password),

        Commands::Reveal {
            image,
            output,
            password,
        } => cmd_reveal(&image, output, password),

        Commands::Inspect { image, json } => cmd_inspect(&image, json),

        Commands::Capacity {
            carrier,
            payload_size,
        } => cmd_capacity(&carrier, payload_size),
    }
}

fn prompt_password(prompt: &str) -> String {
    rpassword::prompt_password(prompt).unwrap_or_else(|_| {
        eprint!("{}", prompt);
        let _ = io::stderr().flush();
        let mut password = String::new();
        let _ = io::stdin().read_line(&mut password);
        password.trim().to_string()
    })
}

/// Resolve the password from the flag or an interactive prompt.
fn resolve_password(encrypt: bool, password: Option<String>) -> anyhow::Result<Option<String>> {
    if let Some(pw) = password {
        return Ok(Some(pw));
    }
    if !encrypt {
        return Ok(None);
    }
    let pw = prompt_password("Enter password: ");
    let confirm = prompt_password("Confirm password: ");
    if pw != confirm {
        bail!("passwords do not match");
    }
    Ok(Some(pw))
}

fn stored_name(input: &Path, name: Option<String>) -> String {
    name.unwrap_or_else(|| {
        input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payload.bin".to_string())
    })
}

fn load_carrier(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to load carrier {}", path.display()))?;
    Ok(image.to_rgba8())
}

fn save_png(image: &image::RgbaImage, path: &Path) -> anyhow::Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn cmd_hide(
    input: &Path,
    output: &Path,
    name: Option<String>,
    encrypt: bool,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = resolve_password(encrypt, password)?;
    let filename = stored_name(input, name);

    let orchestrator = Orchestrator::with_defaults();
    let mut source =
        FileSource::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let image = orchestrator.encode(
        &mut source,
        &filename,
        EmbedTarget::Generated,
        password.as_deref(),
        &CancelToken::new(),
    )?;

    save_png(&image, output)?;
    println!(
        "Hidden {} as '{}' in {}x{} image {}",
        input.display(),
        filename,
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_embed(
    input: &Path,
    carrier: &Path,
    output: &Path,
    depth: Option<u8>,
    name: Option<String>,
    encrypt: bool,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = resolve_password(encrypt, password)?;
    let filename = stored_name(input, name);
    let carrier_image = load_carrier(carrier)?;

    let payload_len = std::fs::metadata(input)
        .with_context(|| format!("failed to stat {}", input.display()))?
        .len();
    let depth = match depth {
        Some(d) => d,
        None => {
            // rough plan: header is small next to any real payload
            let required = payload_len + 128;
            capacity::min_depth(required, carrier_image.width(), carrier_image.height())
                .with_context(|| {
                    format!(
                        "payload does not fit: carrier holds at most {} bytes",
                        capacity::max_capacity_bytes(
                            carrier_image.width(),
                            carrier_image.height()
                        )
                    )
                })?
        }
    };

    let orchestrator = Orchestrator::with_defaults();
    let mut source =
        FileSource::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let image = orchestrator.encode(
        &mut source,
        &filename,
        EmbedTarget::Carrier {
            image: &carrier_image,
            depth,
        },
        password.as_deref(),
        &CancelToken::new(),
    )?;

    save_png(&image, output)?;
    println!(
        "Embedded {} at depth {} into {}",
        input.display(),
        depth,
        output.display()
    );
    Ok(())
}

fn cmd_reveal(
    image_path: &Path,
    output: Option<PathBuf>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let image = load_carrier(image_path)?;

    let info = codec::peek_metadata(&image)?;
    let password = match (info.encrypted, password) {
        (true, None) => Some(prompt_password("Password: ")),
        (_, pw) => pw,
    };

    let orchestrator = Orchestrator::with_defaults();
    let decoded = orchestrator.decode(&image, password.as_deref(), &CancelToken::new())?;

    let output = output.unwrap_or_else(|| PathBuf::from(&decoded.filename));
    std::fs::write(&output, &decoded.data)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Revealed '{}' ({} bytes, sha256 {}) to {}",
        decoded.filename,
        decoded.data.len(),
        hex::encode(decoded.content_hash),
        output.display()
    );
    Ok(())
}

fn cmd_inspect(image_path: &Path, json: bool) -> anyhow::Result<()> {
    let image = load_carrier(image_path)?;
    let info = codec::peek_metadata(&image)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Filename:  {}", info.filename);
        println!("Payload:   {} bytes", info.payload_len);
        println!("Encrypted: {}", if info.encrypted { "yes" } else { "no" });
        println!("Encoding:  {:?}", info.encoding);
    }
    Ok(())
}

fn cmd_capacity(carrier: &Path, payload_size: u64) -> anyhow::Result<()> {
    let image = load_carrier(carrier)?;
    let (width, height) = image.dimensions();

    println!("Carrier: {}x{} pixels", width, height);
    for depth in 1..=8u8 {
        let bytes = capacity::lsb_capacity_bytes(width, height, depth);
        let fits = if capacity::fits(payload_size, width, height, depth) {
            "fits"
        } else {
            "too small"
        };
        println!("  depth {}: {:>12} bytes  {}", depth, bytes, fits);
    }

    match capacity::min_depth(payload_size, width, height) {
        Some(depth) => println!("Minimum depth for {} bytes: {}", payload_size, depth),
        None => println!(
            "{} bytes do not fit; maximum is {} bytes at depth 8",
            payload_size,
            capacity::max_capacity_bytes(width, height)
        ),
    }
    Ok(())
}
