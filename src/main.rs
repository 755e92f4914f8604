mod backend;
mod config;
mod model;
mod server;
mod service;

use clap::Parser;
use model::TopicModel;

const SAMPLE_TEXT: &str = "This is a sample Instagram post.";

#[derive(clap::Parser)]
struct Opts {
    #[clap(long, default_value = "config.toml")]
    config: std::path::PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the classify endpoint over HTTP.
    Serve {
        /// Overrides `listen` from the config file.
        #[clap(long)]
        listen: Option<std::net::SocketAddr>,
    },

    /// Run the stand-in model once and print its topic probabilities.
    Predict {
        #[clap(default_value = SAMPLE_TEXT)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    env_logger::builder()
        .filter_module("topicd", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();

    match opts.command {
        Command::Serve { listen } => {
            let config = config::Config::load(&opts.config)?;
            let service = service::ClassificationService::new(backend::new_backend_from_config(&config)?);
            server::serve(listen.unwrap_or(config.listen), config.max_body_bytes, std::sync::Arc::new(service)).await?;
        }
        Command::Predict { text } => {
            let classifier = model::DummyTopicClassifier::default();
            let result = classifier.predict_text(&text)?;
            println!("Sample text: {}", text);
            println!("Predicted topic probabilities:");
            for (topic, prob) in result.iter() {
                println!("{}: {:.4}", topic, prob);
            }
        }
    }

    Ok(())
}
