//! `livecheck_demo` - type text into a document and watch it get checked
//!
//! Reads stdin, types it character by character into a `DocumentBuffer`
//! driven by an `Engine` with the built-in word list on a worker thread, and
//! prints the final text, annotations and prediction.
//!
//! # Usage
//!
//! ```bash
//! echo "Teh cat sat on teh mat. she sat" | cargo run --features demo --bin livecheck_demo
//! cargo run --features demo --bin livecheck_demo -- --words words.txt --options opts.json
//! RUST_LOG=debug cargo run --features demo --bin livecheck_demo < notes.txt
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use livecheck::{
    Dictionary, DocumentBuffer, Engine, EngineOptions, JsonFileStore, ProviderService,
    ThreadedExecutor, WordListBackend,
};

const HELP_TEXT: &str = "livecheck_demo - live spelling and grammar checking on stdin

USAGE:
    livecheck_demo [OPTIONS] < input.txt

OPTIONS:
    -h, --help              Print this help message and exit
    --words <FILE>          Word list, one `word [frequency]` per line
    --options <FILE>        Engine options as JSON (camelCase keys)
    --dictionary <FILE>     JSON file for the user dictionary
    --no-autocorrect        Offer every correction instead of applying it
";

/// Small built-in list so the demo works without any files.
const BUILTIN_WORDS: &str = "\
the 5000\nand 3000\na 2500\nto 2400\nof 2300\nin 2000\nis 1500\nit 1400\non 1200\nthat 1100
was 1000\nhe 900\nshe 900\nfor 850\nwith 800\nas 700\nat 650\nby 600\nthis 600\nhave 550
cat 120\nsat 110\nmat 60\nhat 40\ndog 100\nhome 150\nwent 130\ngo 140\ngoes 90\ntext 70
testing 30\ntest 60\nthere 300\ntheir 280\nthey 400\nwhere 200\nwhen 350\nwhile 80
";

#[derive(Debug, Default)]
struct Args {
    words: Option<PathBuf>,
    options: Option<PathBuf>,
    dictionary: Option<PathBuf>,
    no_autocorrect: bool,
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--words" => args.words = Some(iter.next().ok_or("--words needs a file")?.into()),
            "--options" => args.options = Some(iter.next().ok_or("--options needs a file")?.into()),
            "--dictionary" => {
                args.dictionary = Some(iter.next().ok_or("--dictionary needs a file")?.into());
            }
            "--no-autocorrect" => args.no_autocorrect = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(Some(args))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP_TEXT}");
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}\n\n{HELP_TEXT}");
            std::process::exit(2);
        }
    };

    let mut options = match &args.options {
        Some(path) => EngineOptions::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineOptions::default(),
    };
    if args.no_autocorrect {
        options.autocorrect_enabled = false;
    }

    let words = match &args.words {
        Some(path) => std::fs::read_to_string(path)?,
        None => BUILTIN_WORDS.to_string(),
    };
    let providers = ProviderService::new(options.policy)
        .with_local(Arc::new(WordListBackend::from_list(&words)));
    let dictionary = match &args.dictionary {
        Some(path) => Dictionary::load_or_empty(Box::new(JsonFileStore::open(path)?)),
        None => Dictionary::in_memory(),
    };

    let mut engine = Engine::new(options, providers, dictionary, ThreadedExecutor::new()?);
    let mut doc = DocumentBuffer::new();

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let start = Instant::now();
    let mut clock = start;
    for edit in doc.type_text(input.trim_end()) {
        // Pretend each keystroke takes 50ms.
        clock += Duration::from_millis(50);
        engine.on_edit_at(&doc, &edit, clock);
        engine.poll(&mut doc, clock);
    }

    // Let every timer fire and every worker finish.
    let settle = clock + Duration::from_secs(10);
    engine.poll(&mut doc, settle);
    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.stats().dispatched
        > engine.stats().applied + engine.stats().stale_dropped + engine.stats().errors
        && Instant::now() < deadline
    {
        std::thread::sleep(Duration::from_millis(5));
        engine.poll(&mut doc, settle);
    }

    println!("text: {}", doc.to_string());
    for entry in engine.list_annotations() {
        let suggestions: Vec<&str> = entry.suggestions.iter().map(|s| s.text.as_str()).collect();
        println!(
            "  {:>4}..{:<4} {:?} {:?} {:?} -> {:?}{}",
            entry.from,
            entry.to,
            entry.kind,
            entry.source,
            entry.current_value,
            suggestions,
            entry
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default(),
        );
    }
    if let Some(prediction) = engine.prediction() {
        println!("prediction: {:?} at {}", prediction.ghost_text, prediction.anchor_pos);
    }
    println!("stats: {:?}", engine.stats());

    engine.destroy();
    Ok(())
}
