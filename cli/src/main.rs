use anyhow::{anyhow, Result};
use clap::Parser;
use rtex::{ContextConfig, CoreClient, ExtractionContext, FormatProtocol};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Page or radio player URL to extract
    #[arg(required_unless_present = "list_extractors")]
    url: Option<String>,

    /// Print the whole extraction as JSON
    #[arg(long)]
    json: bool,

    /// List the supported sites and exit
    #[arg(long)]
    list_extractors: bool,

    /// HTTP proxy, overrides $http_proxy
    #[arg(long)]
    proxy: Option<String>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Preferred language, most wanted first (repeatable)
    #[arg(long = "locale")]
    locales: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn context_config(&self) -> ContextConfig {
        let mut config = ContextConfig::from_env();
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        config.locales = self.locales.clone();
        config.timeout_secs = self.timeout;
        config
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn protocol_tag(protocol: FormatProtocol) -> &'static str {
    match protocol {
        FormatProtocol::Http => "HTTP",
        FormatProtocol::Hls => "HLS",
        FormatProtocol::Hds => "HDS",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let client = CoreClient::with_context(ExtractionContext::from_config(&args.context_config())?);

    if args.list_extractors {
        for (name, description) in client.list_extractors() {
            println!("{name}: {description}");
        }
        return Ok(());
    }

    let url = match &args.url {
        Some(url) => Url::parse(url)?,
        None => return Err(anyhow!("no URL given")),
    };

    tracing::info!(%url, "extracting");
    let extraction = client
        .extract_url(&url)
        .await?
        .ok_or_else(|| anyhow!("no extractor for {url}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    println!("{:#?}", extraction.metadata);
    for fmt in &extraction.formats {
        println!(
            "{}: [{}] {}",
            fmt.id.as_deref().unwrap_or("-"),
            protocol_tag(fmt.protocol),
            &fmt.url
        );
    }

    Ok(())
}
