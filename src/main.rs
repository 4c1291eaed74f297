//! pdfpacket - Assemble product documents into a submittal packet PDF.

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use pdfpacket::cli::Cli;
use pdfpacket::config::{Config, Manifest, OverwriteMode};
use pdfpacket::error::PacketError;
use pdfpacket::io::PdfWriter;
use pdfpacket::output::{
    OutputFormatter, display_build_statistics, display_failures, display_plan,
};
use pdfpacket::packet::PacketBuilder;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the log subscriber. `RUST_LOG` overrides the default level.
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "pdfpacket=info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PacketError> {
    cli.validate()?;
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfpacket::NAME, pdfpacket::VERSION));
        formatter.blank_line();
    }

    let manifest = Manifest::load(&config.manifest).await?;
    formatter.info(&format!(
        "Packet '{}' with {} document(s) from {}",
        manifest.metadata.title.as_deref().unwrap_or("untitled"),
        manifest.documents.len(),
        config.store.describe()
    ));

    let store = config.store.open()?;
    let builder = PacketBuilder::new(store).with_options(config.build_options());

    if config.dry_run {
        return dry_run(&config, &manifest, &builder, &formatter).await;
    }

    let writer = PdfWriter::new();
    handle_output_overwrite(&config, &writer, &formatter).await?;
    writer.can_write(&config.output).await?;

    formatter.info("Building packet...");
    let output = builder
        .build_report(&manifest.metadata, &manifest.documents)
        .await?;

    display_failures(&formatter, &output.failures);
    if config.strict && !output.is_complete() {
        return Err(PacketError::UnresolvedDocuments {
            count: output.failures.len(),
        });
    }

    if formatter.is_verbose() {
        display_plan(&formatter, &output.entries);
    }

    formatter.info(&format!("Writing to: {}", config.output.display()));
    let write_stats = writer.save_bytes(&output.bytes, &config.output).await?;

    if formatter.should_print() {
        formatter.blank_line();
        formatter.success(&format!(
            "Created {} ({} pages, {})",
            config.output.display(),
            output.total_pages,
            write_stats.format_file_size()
        ));
        display_build_statistics(&formatter, &output);
        formatter.detail(
            "Write time",
            &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
        );
    }

    Ok(())
}

/// Resolve every document and print the page plan without writing.
async fn dry_run(
    config: &Config,
    manifest: &Manifest,
    builder: &PacketBuilder,
    formatter: &OutputFormatter,
) -> Result<(), PacketError> {
    manifest.metadata.validate()?;

    let plan = builder.plan(&manifest.documents).await;
    display_plan(formatter, &plan.entries);
    formatter.blank_line();
    display_failures(formatter, &plan.failures);

    if config.strict && !plan.is_complete() {
        return Err(PacketError::UnresolvedDocuments {
            count: plan.failures.len(),
        });
    }

    formatter.success(&format!(
        "Dry run completed: {} pages",
        plan.total_pages()
    ));
    formatter.info(&format!("  Output would be: {}", config.output.display()));
    formatter.info("  Run without --dry-run to create the packet");
    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    writer: &PdfWriter,
    formatter: &OutputFormatter,
) -> Result<(), PacketError> {
    if !writer.exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PacketError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Without a terminal to ask, refuse like --no-clobber.
            if formatter.is_quiet() {
                return Err(PacketError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PacketError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(PacketError::Cancelled),
            }
        }
    }
}
