//! figtree - Normalize image figures in HTML

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::Level;

use figtree::model::{Model, NodeData, NodeId};
use figtree::{Editor, ImageConfig, ImageEditing};

#[derive(Parser)]
#[command(name = "figtree")]
#[command(version, about = "Normalize image figures in HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    figtree post.html                 Print normalized HTML
    figtree post.html -o clean.html   Write normalized HTML to a file
    figtree --model post.html         Dump the document model as JSON
    cat post.html | figtree -         Read from stdin")]
struct Cli {
    /// Input HTML file, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Print the document model as JSON instead of HTML
    #[arg(short, long)]
    model: bool,

    /// Image markup configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Log conversion decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// JSON form of a model node.
#[derive(Serialize)]
struct JsonNode {
    name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode>,
}

impl JsonNode {
    fn from_model(model: &Model, id: NodeId) -> Option<Self> {
        let node = model.node(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|&child| Self::from_model(model, child))
            .collect();
        Some(match &node.data {
            NodeData::Element { name, attrs } => JsonNode {
                name: name.clone(),
                attributes: attrs.clone(),
                text: None,
                children,
            },
            NodeData::Text(text) => JsonNode {
                name: figtree::model::TEXT_NAME.to_string(),
                attributes: BTreeMap::new(),
                text: Some(text.clone()),
                children,
            },
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ImageConfig::default(),
    };

    let input = read_input(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;

    let mut editor = Editor::new()
        .with_plugin(ImageEditing::with_config(config))
        .map_err(|e| e.to_string())?;
    editor.set_data_bytes(&input);

    let rendered = if cli.model {
        let root = JsonNode::from_model(editor.model(), editor.model().root())
            .ok_or("empty model")?;
        serde_json::to_string_pretty(&root).map_err(|e| e.to_string())?
    } else {
        editor.get_data()
    };

    write_output(cli.output.as_deref(), &rendered).map_err(|e| e.to_string())
}

fn load_config(path: &str) -> Result<ImageConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}

fn write_output(path: Option<&str>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}
