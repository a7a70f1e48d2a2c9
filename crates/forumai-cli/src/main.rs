mod display;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forumai_ai::{Orchestrator, StopwordSet, fetch_stopwords, load_model};
use forumai_client::ClassifierClient;
use forumai_core::api::{BatchResponse, ClassifyResponse};
use forumai_core::config::{DEFAULT_BIND, DEFAULT_LANGUAGE, DEFAULT_MODEL_DIR};
use forumai_core::{ArtifactPaths, ServiceConfig, StopwordConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forumai", author, version, about = "Physics forum post classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP classification service
    Serve {
        /// Address to listen on
        #[arg(long, env = "FORUMAI_BIND", default_value = DEFAULT_BIND)]
        bind: String,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        stopwords: StopwordArgs,
    },
    /// Classify texts locally and print the result as JSON
    Classify {
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        stopwords: StopwordArgs,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Print the normalized form of a text
    Normalize {
        #[command(flatten)]
        stopwords: StopwordArgs,
        text: String,
    },
    /// Load the model artifacts and describe them
    Inspect {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
    /// Classify texts through a running service
    Remote {
        /// Base URL of the service
        #[arg(long, env = "FORUMAI_URL", default_value = "http://localhost:5000")]
        url: String,
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct ArtifactArgs {
    /// Directory holding vectorizer.json and model_classifier.json
    #[arg(long, env = "FORUMAI_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
    /// Vectorizer artifact, overrides --model-dir
    #[arg(long, env = "FORUMAI_VECTORIZER")]
    vectorizer: Option<PathBuf>,
    /// Classifier artifact, overrides --model-dir
    #[arg(long, env = "FORUMAI_CLASSIFIER")]
    classifier: Option<PathBuf>,
}

impl ArtifactArgs {
    fn paths(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::in_dir(&self.model_dir);
        if let Some(v) = &self.vectorizer {
            paths.vectorizer = v.clone();
        }
        if let Some(c) = &self.classifier {
            paths.classifier = c.clone();
        }
        paths
    }
}

#[derive(Args, Debug, Clone)]
struct StopwordArgs {
    /// Stopword language
    #[arg(long, env = "FORUMAI_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,
    /// Stopword list, one word per line [default: stopwords/<language>]
    #[arg(long, env = "FORUMAI_STOPWORDS")]
    stopwords: Option<PathBuf>,
    /// Download the list from here if the file does not exist yet
    #[arg(long, env = "FORUMAI_STOPWORDS_URL")]
    stopwords_url: Option<String>,
}

impl StopwordArgs {
    fn config(&self) -> StopwordConfig {
        let mut cfg = StopwordConfig::for_language(&self.language);
        if let Some(path) = &self.stopwords {
            cfg.path = path.clone();
        }
        cfg.url = self.stopwords_url.clone();
        cfg
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            bind,
            artifacts,
            stopwords,
        } => {
            let config = ServiceConfig {
                bind,
                artifacts: artifacts.paths(),
                stopwords: stopwords.config(),
            };
            serve(config).await
        }
        Command::Classify {
            artifacts,
            stopwords,
            texts,
        } => classify_local(&artifacts.paths(), &stopwords.config(), &texts).await,
        Command::Normalize { stopwords, text } => {
            let stopwords = load_stopwords(&stopwords.config()).await?;
            println!("{}", forumai_ai::normalize(&text, &stopwords));
            Ok(())
        }
        Command::Inspect { artifacts } => {
            let paths = artifacts.paths();
            let state = load_model(&paths);
            print!("{}", display::render_model(&paths, &state));
            match state.failure() {
                Some(cause) => anyhow::bail!("model not loaded: {cause}"),
                None => Ok(()),
            }
        }
        Command::Remote { url, texts } => classify_remote(&url, &texts).await,
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    tracing::info!("forumai v{}", env!("CARGO_PKG_VERSION"));

    // Stopwords are required; a missing model only degrades the service.
    let stopwords = load_stopwords(&config.stopwords).await?;
    let state = load_model(&config.artifacts);
    if let Some(cause) = state.failure() {
        tracing::warn!(cause, "serving without a model, classify requests will fail");
    }

    let engine = Orchestrator::new(state, Arc::new(stopwords));
    let router = forumai_server::build_router(forumai_server::AppState::new(engine));
    forumai_server::serve(&config.bind, router)
        .await
        .with_context(|| format!("serving on {}", config.bind))
}

async fn load_stopwords(config: &StopwordConfig) -> anyhow::Result<StopwordSet> {
    let set = match &config.url {
        Some(url) => fetch_stopwords(&config.language, url, &config.path).await,
        None => StopwordSet::load(&config.language, &config.path),
    };
    set.with_context(|| {
        format!(
            "loading {} stopwords from {}",
            config.language,
            config.path.display()
        )
    })
}

async fn classify_local(
    paths: &ArtifactPaths,
    stopwords: &StopwordConfig,
    texts: &[String],
) -> anyhow::Result<()> {
    let stopwords = load_stopwords(stopwords).await?;
    let state = load_model(paths);
    if let Some(cause) = state.failure() {
        anyhow::bail!("model not loaded: {cause}");
    }
    let engine = Orchestrator::new(state, Arc::new(stopwords));

    let json = match texts {
        [text] => {
            let result = engine.classify_one(text)?;
            serde_json::to_string_pretty(&ClassifyResponse::from_result(text.clone(), result))?
        }
        _ => {
            let items = engine.classify_batch(texts)?;
            serde_json::to_string_pretty(&BatchResponse::from_items(items))?
        }
    };
    println!("{json}");
    Ok(())
}

async fn classify_remote(url: &str, texts: &[String]) -> anyhow::Result<()> {
    let client = ClassifierClient::new(url);
    let json = match texts {
        [text] => {
            let resp = client
                .classify(text)
                .await
                .with_context(|| format!("classifying via {}", client.base_url()))?;
            serde_json::to_string_pretty(&resp)?
        }
        _ => {
            let results = client
                .classify_batch(texts)
                .await
                .with_context(|| format!("classifying via {}", client.base_url()))?;
            serde_json::to_string_pretty(&results)?
        }
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn artifact_overrides_win_over_model_dir() {
        let Command::Inspect { artifacts } = parse(&[
            "forumai",
            "inspect",
            "--model-dir",
            "/srv/models",
            "--classifier",
            "/tmp/nb.json",
        ]) else {
            panic!("expected inspect");
        };
        let paths = artifacts.paths();
        assert_eq!(paths.vectorizer, Path::new("/srv/models/vectorizer.json"));
        assert_eq!(paths.classifier, Path::new("/tmp/nb.json"));
    }

    #[test]
    fn stopword_path_defaults_to_language() {
        let Command::Normalize { stopwords, text } =
            parse(&["forumai", "normalize", "--language", "english", "what is gravity"])
        else {
            panic!("expected normalize");
        };
        assert_eq!(text, "what is gravity");
        let cfg = stopwords.config();
        assert_eq!(cfg.path, Path::new("stopwords/english"));
        assert!(cfg.url.is_none());
    }

    #[test]
    fn classify_requires_text() {
        assert!(Cli::try_parse_from(["forumai", "classify"]).is_err());
    }
}
