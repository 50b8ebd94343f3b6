use std::path::{Path, PathBuf};
use std::sync::RwLock;

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use env_logger::Env;
use log::{info, warn};
use serde::Deserialize;

use trigram_gen_core::error::GenError;
use trigram_gen_core::io::list_files;
use trigram_gen_core::model::config::{CorpusConfig, GenerationConfig};
use trigram_gen_core::model::trigram_model::TrigramModel;

/// Extension of corpus files in the data directory.
const CORPUS_EXTENSION: &str = "txt";

/// Upper bound on sentences produced by one request.
const MAX_SENTENCES: usize = 100;

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize, Default)]
struct GenerateParams {
	min_tokens: Option<usize>,
	max_tokens: Option<usize>,
	max_candidates: Option<usize>,
	include_max_candidates: Option<usize>,
	word: Option<String>,
	count: Option<usize>,
	seed: Option<String>,
}

#[derive(Deserialize)]
struct StatsQuery {
	word: Option<String>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
}

struct SharedData {
	data_dir: PathBuf,
	model: RwLock<TrigramModel>,
}

impl GenerateParams {
	/// Builds the generation config, falling back to defaults for missing fields.
	fn generation_config(&self) -> Result<GenerationConfig, String> {
		let defaults = GenerationConfig::default();
		let count = self.count.unwrap_or(defaults.sentence_count);
		if count > MAX_SENTENCES {
			return Err(format!("count must be at most {MAX_SENTENCES}"));
		}

		Ok(GenerationConfig {
			min_tokens: self.min_tokens.unwrap_or(defaults.min_tokens),
			max_candidates: self.max_candidates.unwrap_or(defaults.max_candidates),
			include_max_candidates: self.include_max_candidates.unwrap_or(defaults.include_max_candidates),
			include_word: self.word.clone(),
			sentence_count: count,
			random_seed: self.seed.clone(),
			..defaults
		}
		.with_max_tokens(self.max_tokens.unwrap_or(defaults.max_tokens)))
	}
}

/// Builds one model out of several corpus files of `data_dir`.
fn build_model(data_dir: &Path, names: &[String]) -> Result<TrigramModel, GenError> {
	let config = CorpusConfig::default();
	let mut model = TrigramModel::default();
	for name in names {
		let path = data_dir.join(format!("{name}.{CORPUS_EXTENSION}"));
		let partial = TrigramModel::load(&path, &config, 0)?;
		model.merge(&partial)?;
	}
	Ok(model)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates up to `count` sentences from the loaded corpora and returns them
/// one per line. Searches that give up contribute no line, so the body may
/// be empty.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let config = match query.generation_config() {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let result = web::block(move || {
		let model = data.model.read().map_err(|_| "Model lock failed".to_owned())?;
		if model.ensure_not_empty().is_err() {
			return Err("No corpus loaded".to_owned());
		}
		let mut rng = config.rng();
		Ok(model.generate_all(&mut rng, &config))
	})
	.await;

	match result {
		Ok(Ok(sentences)) => HttpResponse::Ok().body(sentences.join("\n")),
		Ok(Err(e)) => HttpResponse::ServiceUnavailable().body(e),
		Err(_) => HttpResponse::InternalServerError().body("Generation failed"),
	}
}

/// HTTP GET endpoint `/v1/stats`
///
/// Returns the size figures of the loaded model as JSON.
#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>, query: web::Query<StatsQuery>) -> impl Responder {
	let model = match data.model.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let include = match &query.word {
		Some(word) => model.include_filter(word),
		None => Default::default(),
	};
	HttpResponse::Ok().json(model.stats(&include))
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<SharedData>) -> impl Responder {
	match list_files(&data.data_dir, CORPUS_EXTENSION) {
		Ok(files) => {
			let suffix = format!(".{CORPUS_EXTENSION}");
			let names: Vec<&str> = files.iter().map(|f| f.trim_end_matches(&suffix)).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<SharedData>) -> impl Responder {
	let model = match data.model.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(model.corpus_names().join("\n"))
}

/// HTTP PUT endpoint `/v1/load_corpora`
///
/// Builds and merges the named corpora, then replaces the served model.
/// The previous model keeps serving until the new one is complete.
#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<SharedData>, query: web::Query<CorpusQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let names: Vec<String> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.map(str::to_owned)
		.collect();

	let data_dir = data.data_dir.clone();
	let built = match web::block(move || build_model(&data_dir, &names)).await {
		Ok(Ok(model)) => model,
		Ok(Err(e)) => {
			warn!("failed to load corpora '{query_names}': {e}");
			return HttpResponse::InternalServerError().body(format!("Failed to load corpora: {e}"));
		}
		Err(_) => return HttpResponse::InternalServerError().body("Loading failed"),
	};

	let mut model = match data.model.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	*model = built;
	info!("serving corpora: {}", model.corpus_names().join(", "));

	HttpResponse::Ok().body("Corpora loaded successfully")
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_stats)
		.service(get_corpora)
		.service(get_loaded_corpora)
		.service(put_corpora);
}

/// Main entry point for the server.
///
/// Starts with an empty model; corpora are loaded through
/// `PUT /v1/load_corpora`, or at startup from the comma separated
/// `TRIGRAM_GEN_CORPORA` variable.
///
/// # Notes
/// - Binds to `TRIGRAM_GEN_ADDR`, default 127.0.0.1:5000.
/// - Corpora are read from `TRIGRAM_GEN_DATA`, default `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let addr = std::env::var("TRIGRAM_GEN_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	let data_dir = PathBuf::from(std::env::var("TRIGRAM_GEN_DATA").unwrap_or_else(|_| "./data".to_owned()));

	let mut model = TrigramModel::default();
	if let Ok(preload) = std::env::var("TRIGRAM_GEN_CORPORA") {
		let names: Vec<String> = preload.split(',').map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()).collect();
		model = build_model(&data_dir, &names).map_err(std::io::Error::other)?;
	}

	let shared_data = web::Data::new(SharedData {
		data_dir,
		model: RwLock::new(model),
	});

	info!("listening on {addr}");
	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.configure(configure)
	})
		.bind(addr)?
		.run()
		.await
}
