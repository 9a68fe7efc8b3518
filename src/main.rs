//! # garage-invoice CLI
//!
//! Usage:
//!   garage-invoice invoice.json -o invoice.pdf
//!   echo '{ ... }' | garage-invoice -o invoice.pdf
//!   garage-invoice invoice.json --format instructions
//!   garage-invoice --example > invoice.json

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use garage_invoice::{InvoiceDocument, LayoutConfig, LayoutEngine, PageSize};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// PDF bytes
    Pdf,
    /// `data:application/pdf;base64,...` string
    DataUrl,
    /// Draw instructions as JSON
    Instructions,
}

#[derive(Parser)]
#[command(name = "garage-invoice")]
#[command(about = "Lay out garage invoices into pages and render them as PDF")]
struct Cli {
    /// Invoice JSON file (reads from stdin if omitted or `-`)
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page size: a4, a5, letter or legal
    #[arg(long)]
    page_size: Option<String>,

    /// Uniform page margin in points
    #[arg(long)]
    margin: Option<f64>,

    #[arg(short, long, value_enum, default_value = "pdf")]
    format: OutputFormat,

    /// Print a sample invoice and exit
    #[arg(long)]
    example: bool,

    /// Log layout decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.example {
        print!("{}", example_invoice_json());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let source = read_input(cli.input.as_ref())?;
    let invoice: InvoiceDocument = serde_json::from_str(&source)
        .map_err(garage_invoice::InvoiceError::from)
        .context("invalid invoice input")?;

    let bytes = match cli.format {
        OutputFormat::Pdf => garage_invoice::render(&invoice, &config)?,
        OutputFormat::DataUrl => garage_invoice::render_data_url(&invoice, &config)?.into_bytes(),
        OutputFormat::Instructions => {
            let instructions = LayoutEngine::new(config.clone()).layout(&invoice)?;
            info!(
                pages = garage_invoice::layout::page_count(&instructions),
                instructions = instructions.len(),
                "layout done"
            );
            serde_json::to_vec_pretty(&instructions).context("cannot serialize instructions")?
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("cannot write {}", path.display()))?;
            info!(bytes = bytes.len(), path = %path.display(), "written");
        }
        None => io::stdout()
            .write_all(&bytes)
            .context("cannot write to stdout")?,
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_path(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if let Some(name) = &cli.page_size {
        let Some(size) = PageSize::from_name(name) else {
            bail!("unknown page size `{}` (expected a4, a5, letter or legal)", name);
        };
        config = config.with_page_size(size);
    }
    if let Some(margin) = cli.margin {
        config = config.with_margin(margin);
    }
    Ok(config)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf)
        }
    }
}

fn example_invoice_json() -> &'static str {
    r##"{
  "invoiceNumber": "INV-2026-0142",
  "issueDate": "2026-10-14",
  "dueDate": "2026-10-28",
  "customer": {
    "name": "Asha Rao",
    "email": "asha.rao@example.com",
    "phone": "+91 98450 00000",
    "address": "14 Residency Road, Bengaluru 560025"
  },
  "vehicleInfo": "2019 Honda Civic ZX, KA-01-AB-1234, 48,200 km",
  "workItems": [
    { "title": "Periodic maintenance service (labour)", "price": "2500.00" },
    { "title": "Engine oil 0W-20, 4L", "price": "3200.00" },
    { "title": "Oil filter", "price": "450.00" },
    { "title": "Front brake pads replacement, rotors resurfaced and caliper pins lubricated", "price": "4800.00" },
    { "title": "Wheel alignment and balancing", "price": "1200.00" }
  ],
  "subtotal": "12150.00",
  "tax": "2187.00",
  "discount": "500.00",
  "total": "13837.00",
  "service": {
    "name": "Torque Motors Service Center",
    "phone": "080 4000 1234",
    "address": "221 Hosur Road, Koramangala, Bengaluru 560034"
  },
  "notes": "Rear tyres at 3 mm tread. Recommend replacement within 5,000 km.",
  "isGST": true,
  "gstNumber": "29ABCDE1234F1Z5"
}
"##
}
