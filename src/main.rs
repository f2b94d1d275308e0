use anyhow::Context;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use vjson::document::{self, Document, DocumentOptions};
use vjson::edit::Edit;
use vjson::snapshot::{self, DecodeMode};
use vjson::tree::EncodeOptions;
use vjson::{cli::Cli, config::Config, replay::ReplayOptions};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration; CLI flags override config values
    let config = Config::load_with_custom_path(cli.config.as_deref())?;
    let prettiness = cli.indent.unwrap_or(config.output.prettiness);
    let mode = if cli.strict || config.decode.strict {
        DecodeMode::Strict
    } else {
        DecodeMode::Lenient
    };

    let options = DocumentOptions {
        replay: ReplayOptions {
            encode: EncodeOptions {
                detect_special_strings: config.detect.special_strings,
            },
        },
        mode,
        prettiness,
    };
    let mut doc = Document::load(&cli.file, options);

    if let Some(log_path) = &cli.apply {
        let text = fs::read_to_string(log_path)
            .with_context(|| format!("failed to read edit log {:?}", log_path))?;
        let edits: Vec<Edit> = serde_json::from_str(&text)
            .with_context(|| format!("edit log {:?} is not a JSON array of edits", log_path))?;
        for edit in edits {
            doc.record(edit);
        }
    }

    // Full round trip: replay the log over the base, render the snapshot,
    // decode it back. The empty-result guard runs as part of the decode.
    let tree = doc.current_tree()?;
    let snap = snapshot::render(&tree);
    let value = snapshot::decode_snapshot(snap.container, &snap.markup, mode)?;

    if cli.check {
        // The snapshot codec must agree with a direct decode of the same
        // tree; with no edits applied, both must also equal the source.
        let reference = vjson::tree::decode(&tree)?;
        if value != reference {
            anyhow::bail!("snapshot round trip altered the document");
        }
        if doc.edits().is_empty() && &value != doc.value() {
            anyhow::bail!("round trip altered the document");
        }
        eprintln!("{}: round trip OK ({} top-level items)", cli.file.display(), match &value {
            serde_json::Value::Object(m) => m.len(),
            serde_json::Value::Array(a) => a.len(),
            _ => 0,
        });
        return Ok(());
    }

    match &cli.output {
        Some(path) => {
            document::write_value(path, &value, prettiness)?;
        }
        None => {
            let bytes = document::to_json_bytes(&value, prettiness)?;
            io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}
