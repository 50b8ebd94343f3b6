use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use trigram_gen_core::error::GenError;
use trigram_gen_core::model::config::{CorpusConfig, GenerationConfig};
use trigram_gen_core::model::trigram_model::TrigramModel;

/// Generates sentences from a corpus of short lines using trigram chains.
#[derive(Parser, Debug)]
#[command(name = "trigram-gen", version)]
struct Args {
    /// Input corpus, one sentence per line
    #[arg(short = 'f', long = "file")]
    input_file: PathBuf,

    /// Number of sentences to output
    #[arg(short = 'c', long = "count", default_value_t = 1)]
    sentence_count: usize,

    /// Max candidates when generating a sentence
    #[arg(short = 'm', long, default_value_t = 25_000)]
    max_candidates: usize,

    /// Max candidates when generating a sentence with an include word
    #[arg(short = 'M', long, default_value_t = 100_000)]
    include_max_candidates: usize,

    /// Min tokens in a sentence
    #[arg(short = 't', long, default_value_t = 6)]
    min_tokens: usize,

    /// Max tokens in a sentence (at least 2)
    #[arg(short = 'T', long, default_value_t = 35)]
    max_tokens: usize,

    /// Word to try to include
    #[arg(short = 'w', long = "word")]
    include_word: Option<String>,

    /// Random seed, any string
    #[arg(short = 's', long = "seed")]
    random_seed: Option<String>,

    /// Exit after building the table and print its statistics
    #[arg(short = 'x', long)]
    build_only: bool,

    /// Build workers (0 uses every core)
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,
}

impl Args {
    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            min_tokens: self.min_tokens,
            max_candidates: self.max_candidates,
            include_max_candidates: self.include_max_candidates,
            include_word: self.include_word.clone(),
            sentence_count: self.sentence_count,
            random_seed: self.random_seed.clone(),
            ..GenerationConfig::default()
        }
        .with_max_tokens(self.max_tokens)
    }
}

fn run(args: &Args) -> Result<(), GenError> {
    let config = args.generation_config();
    debug!("{config:?}");

    let model = TrigramModel::load(&args.input_file, &CorpusConfig::default(), args.jobs)?;
    let include = model.include_filter_for(&config);

    if args.build_only {
        let stats = model.stats(&include);
        eprintln!("token count: {}", stats.tokens);
        eprintln!("table size: {}", stats.trigrams);
        eprintln!("starts: {}", stats.starts);
        eprintln!("match tokens: {}", stats.include_matches);
        return Ok(());
    }

    let mut rng = config.rng();
    for _ in 0..config.sentence_count {
        // An exhausted search prints nothing
        if let Some(sentence) = model.generate(&mut rng, &config, &include) {
            println!("{sentence}");
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
