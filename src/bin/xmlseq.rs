//! Command-line driver: sequences XML files and prints the nodes they
//! project to.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use xml_sequencer::destination::{BatchedDestination, Destination, MemoryDestination, NodeRecord};
use xml_sequencer::namespace::{MemoryNamespaceRegistry, NamespaceRegistry};
use xml_sequencer::projector::{AttributeScoping, DocumentOptions, ElementOptions, ProjectorBuilder};
use xml_sequencer::property::PropertyValue;
use xml_sequencer::{sequence_str, QualifiedName};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xmlseq -- project XML documents into path-addressed nodes.
#[derive(Parser, Debug)]
#[command(name = "xmlseq", version, about, long_about = None)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Projection strategy.
    #[arg(long, value_enum, default_value_t = Mode::Document)]
    mode: Mode,

    /// Do not project the outermost element (element mode only).
    #[arg(long)]
    skip_root: bool,

    /// Attribute whose value names the node, e.g. `jcr:name`.
    #[arg(long, value_name = "NAME")]
    name_attribute: Option<String>,

    /// Property that receives the node type (element mode only).
    #[arg(long, value_name = "NAME")]
    type_attribute: Option<String>,

    /// Type written when the document gives none.
    #[arg(long, value_name = "NAME")]
    default_type: Option<String>,

    /// Give unprefixed attributes the namespace of their element.
    #[arg(long)]
    inherit_attribute_namespace: bool,

    /// Queue writes and apply them when the document is complete.
    #[arg(long)]
    batched: bool,

    /// Print debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One node per element; attributes become properties.
    Element,
    /// Also keep text, comments, processing instructions and the DTD.
    Document,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_USAGE_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut worst_exit: u8 = EXIT_SUCCESS;
    for file in &cli.files {
        let exit = process_file(&cli, file);
        if exit > worst_exit {
            worst_exit = exit;
        }
    }

    ExitCode::from(worst_exit)
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_PARSE_ERROR;
        }
    };

    let mut registry = MemoryNamespaceRegistry::with_defaults();
    let records = if cli.batched {
        let mut destination = BatchedDestination::new(MemoryDestination::new());
        let outcome = project(cli, &input, &mut destination, &mut registry);
        outcome.map(|()| destination.into_inner().into_records())
    } else {
        let mut destination = MemoryDestination::new();
        let outcome = project(cli, &input, &mut destination, &mut registry);
        outcome.map(|()| destination.into_records())
    };

    match records {
        Ok(records) => {
            for record in &records {
                println!("{}", format_record(record, &registry));
            }
            EXIT_SUCCESS
        }
        Err((exit, msg)) => {
            eprintln!("{filename}: {msg}");
            exit
        }
    }
}

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<String> {
    if filename == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(filename)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Runs the configured projector over `input`.
fn project<D: Destination>(
    cli: &Cli,
    input: &str,
    destination: &mut D,
    registry: &mut MemoryNamespaceRegistry,
) -> Result<(), (u8, String)> {
    let name_attribute = parse_name(cli.name_attribute.as_deref(), &*registry)?;
    let type_attribute = parse_name(cli.type_attribute.as_deref(), &*registry)?;
    let default_type = parse_name(cli.default_type.as_deref(), &*registry)?;
    let scoping = if cli.inherit_attribute_namespace {
        AttributeScoping::InheritElementNamespace
    } else {
        AttributeScoping::UseDefaultNamespace
    };

    let builder = ProjectorBuilder::new().destination(destination).registry(registry);
    let outcome = match cli.mode {
        Mode::Element => {
            let opts = ElementOptions::default()
                .skip_root(cli.skip_root)
                .name_attribute(name_attribute)
                .type_attribute(type_attribute)
                .type_attribute_value(default_type)
                .attribute_scoping(scoping);
            let mut projector = builder.build_element(opts).map_err(usage)?;
            sequence_str(input, &mut projector)
        }
        Mode::Document => {
            let mut opts = DocumentOptions::default();
            if name_attribute.is_some() {
                opts = opts.name_attribute(name_attribute);
            }
            if let Some(default_type) = default_type {
                opts = opts.default_primary_type(default_type);
            }
            if cli.inherit_attribute_namespace {
                opts = opts.attribute_scoping(scoping);
            }
            let mut projector = builder.build_document(opts).map_err(usage)?;
            sequence_str(input, &mut projector)
        }
    };
    outcome.map_err(|e| (EXIT_PARSE_ERROR, e.to_string()))
}

fn parse_name(
    text: Option<&str>,
    registry: &dyn NamespaceRegistry,
) -> Result<Option<QualifiedName>, (u8, String)> {
    text.map(|t| QualifiedName::parse(t, registry))
        .transpose()
        .map_err(|e| (EXIT_USAGE_ERROR, e.to_string()))
}

fn usage(err: impl std::fmt::Display) -> (u8, String) {
    (EXIT_USAGE_ERROR, err.to_string())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Formats a record with registry prefixes instead of `{uri}` names.
fn format_record(record: &NodeRecord, registry: &dyn NamespaceRegistry) -> String {
    let mut out = record.path.to_prefixed(registry);
    for (name, values) in record.properties.iter() {
        let _ = write!(out, "\n  {} =", name.to_prefixed(registry));
        for value in values {
            match value {
                PropertyValue::Name(name) => {
                    let _ = write!(out, " {}", name.to_prefixed(registry));
                }
                PropertyValue::String(text) => {
                    let _ = write!(out, " {text:?}");
                }
            }
        }
    }
    out
}
