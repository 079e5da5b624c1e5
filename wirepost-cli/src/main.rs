use clap::Parser;
use color_eyre::eyre::{self, Context};
use std::{env, path::PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    layer::SubscriberExt,
    Layer, Registry,
};
use wirepost_config::Configuration;
use wirepost_operator::{result_schema, FieldValue, PostDispatcher, Punctuation, Record};

/// Post each line read from stdin to the configured HTTP(S) endpoint and
/// print the resulting response record
#[derive(Parser)]
#[command(about, author, version)]
struct Args {
    /// Path to the configuration file
    #[clap(long, short)]
    config: PathBuf,
}

fn initialise_logging() -> eyre::Result<()> {
    let env_filter = env::var("RUST_LOG")
        .map_err(eyre::Report::from)
        .and_then(|targets| targets.parse().context("Failed to parse RUST_LOG value"))
        .unwrap_or_else(|_| Targets::default().with_default(LevelFilter::INFO));

    let subscriber =
        Registry::default().with(tracing_subscriber::fmt::layer().with_filter(env_filter));

    tracing::subscriber::set_global_default(subscriber)
        .context("Couldn't install the global tracing subscriber")?;

    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    initialise_logging()?;

    let args = Args::parse();
    let config = Configuration::load(args.config).await?;
    let field_name = config.payload.field_name.clone();

    let mut dispatcher = PostDispatcher::initialize(config.post, result_schema());
    dispatcher.all_ports_ready();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let record = Record::new().with_field(field_name.clone(), FieldValue::Str(line));

        // Transport failures are logged and skipped; the next line still
        // gets its shot.
        match dispatcher.on_record(&record).await {
            Ok(Some(outbound)) => println!("{outbound}"),
            Ok(None) => {}
            Err(error) => tracing::error!(error = ?error, "http post failed"),
        }
    }

    let _ = dispatcher.on_punctuation(Punctuation::FinalMarker);
    dispatcher.shutdown();

    Ok(())
}
