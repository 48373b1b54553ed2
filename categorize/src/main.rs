use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgGroup, Parser};
use textcat::TextCategorizer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    about = "A program to categorize whitespace-tokenized sentences.",
    group = ArgGroup::new("input_model").required(true),
)]
struct Args {
    /// A pure model file holding the classifier and the tag names
    #[arg(long, group = "input_model", requires = "extractor")]
    pure_model: Option<PathBuf>,

    /// A word feature extractor file, used together with --pure-model
    #[arg(long)]
    extractor: Option<PathBuf>,

    /// A single file holding the whole categorizer
    #[arg(long, group = "input_model", conflicts_with = "extractor")]
    model: Option<PathBuf>,

    /// Print the score after the tag
    #[arg(long)]
    with_score: bool,

    /// Print label ids instead of tag names
    #[arg(long)]
    ids: bool,
}

fn load(args: &Args) -> Result<TextCategorizer, Box<dyn std::error::Error>> {
    if let Some(path) = &args.model {
        return Ok(TextCategorizer::read(BufReader::new(File::open(path)?))?);
    }
    match (&args.pure_model, &args.extractor) {
        (Some(pure_model), Some(extractor)) => {
            Ok(TextCategorizer::from_files(pure_model, extractor)?)
        }
        _ => Err("--pure-model and --extractor must be given together".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("loading model files");
    let categorizer = load(&args)?;

    let mut out = BufWriter::new(stdout().lock());
    let mut n_sentences = 0;
    let start = Instant::now();
    for line in stdin().lock().lines() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (tag, score) = categorizer.predict_with_score(&tokens)?;
        if args.ids {
            write!(out, "{tag}")?;
        } else {
            write!(out, "{}", categorizer.tag_name(tag).unwrap_or("<unnamed>"))?;
        }
        if args.with_score {
            write!(out, "\t{score}")?;
        }
        writeln!(out)?;
        n_sentences += 1;
    }
    out.flush()?;

    let duration = start.elapsed();
    info!(
        sentences = n_sentences,
        elapsed_sec = duration.as_secs_f64(),
        "finished"
    );

    Ok(())
}
