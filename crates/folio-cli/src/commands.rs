use anyhow::{bail, Context};
use colored::Colorize;
use folio_store::{Collection, Document, Format, Store, StoreConfig};
use serde_json::Value;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    tracing::debug!(root = %config.root.display(), format = %config.format, "opening store");
    let store = open_store(&cli.command, config)?;
    match cli.command {
        Command::Init(_) => cmd_init(&store),
        Command::Put(args) => cmd_put(&store, args),
        Command::Get(args) => cmd_get(&store, args),
        Command::Ls(args) => cmd_ls(&store, args),
        Command::Rm(args) => cmd_rm(&store, args),
    }
}

/// Only `init` and `put` may create the store; the other commands require an
/// existing root record so a mistyped `--root` is reported, not created.
fn open_store(command: &Command, config: StoreConfig) -> anyhow::Result<Store> {
    let root = config.root.clone();
    let store = match command {
        Command::Init(_) | Command::Put(_) => Store::open_with_config(config),
        Command::Get(_) | Command::Ls(_) | Command::Rm(_) => Store::open_existing(config),
    };
    store.with_context(|| format!("failed to open store at {}", root.display()))
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    Ok(config)
}

/// A node reached by a slash-separated logical path.
pub enum Node {
    Document(Document),
    Collection(Collection),
}

/// Walk `path` from the root, alternating collection and document segments:
/// `""` is the root document, `fish` a collection, `fish/red` a document.
pub fn walk(store: &Store, path: &str) -> Node {
    let mut node = Node::Document(store.root().clone());
    let path = path.trim_matches('/');
    if path.is_empty() {
        return node;
    }
    for segment in path.split('/') {
        node = match node {
            Node::Document(doc) => Node::Collection(doc.collection(segment)),
            Node::Collection(coll) => Node::Document(coll.document(segment)),
        };
    }
    node
}

fn document_at(store: &Store, path: &str) -> anyhow::Result<Document> {
    match walk(store, path) {
        Node::Document(doc) => Ok(doc),
        Node::Collection(_) => bail!("{path:?} names a collection, not a document"),
    }
}

fn collection_at(store: &Store, path: &str) -> anyhow::Result<Collection> {
    match walk(store, path) {
        Node::Collection(coll) => Ok(coll),
        Node::Document(_) => bail!("{path:?} names a document, not a collection"),
    }
}

fn cmd_init(store: &Store) -> anyhow::Result<()> {
    let config = store.config();
    println!(
        "{} Initialized folio store in {} ({})",
        "✓".green().bold(),
        config.root.display().to_string().bold(),
        config.format.to_string().cyan()
    );
    Ok(())
}

fn cmd_put(store: &Store, args: PutArgs) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(&args.value).context("value is not valid JSON")?;
    let doc = document_at(store, &args.path)?;
    doc.write(&value)?;
    println!("{} wrote {}", "✓".green(), args.path.yellow());
    Ok(())
}

fn cmd_get(store: &Store, args: GetArgs) -> anyhow::Result<()> {
    let doc = document_at(store, &args.path)?;
    match store.codec() {
        Format::Json => {
            let value: Value = doc.read_value()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        // Binary records are not self-describing; show the bytes.
        Format::Binary => {
            let bytes = doc.read_raw()?;
            println!("{}", hex::encode(bytes));
        }
    }
    Ok(())
}

fn cmd_ls(store: &Store, args: LsArgs) -> anyhow::Result<()> {
    let coll = collection_at(store, &args.path)?;
    let docs = coll.get_documents(args.start, args.end)?;
    if docs.is_empty() {
        println!("{}", "(no documents)".dimmed());
    }
    for doc in &docs {
        println!("{}", doc.id());
    }
    Ok(())
}

fn cmd_rm(store: &Store, args: RmArgs) -> anyhow::Result<()> {
    if args.path.trim_matches('/').is_empty() {
        bail!("refusing to delete the store root");
    }
    match walk(store, &args.path) {
        Node::Document(doc) => doc.delete()?,
        Node::Collection(coll) => coll.delete()?,
    }
    println!("{} removed {}", "✓".green(), args.path.yellow());
    Ok(())
}
