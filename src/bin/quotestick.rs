use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quotestick", version)]
struct Cli {
    /// Bot configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one quote sticker.
    Card(CardArgs),
    /// Run the bot over a recorded JSON event file and report what it sent.
    Replay(ReplayArgs),
    /// Print how a message body wraps with the configured fonts.
    Wrap(WrapArgs),
}

#[derive(Parser, Debug)]
struct CardArgs {
    /// Sender label drawn above the message.
    #[arg(long, default_value = "")]
    name: String,

    /// Quoted message text.
    #[arg(long)]
    text: String,

    /// Avatar URL (http, https, data or file).
    #[arg(long)]
    avatar: Option<String>,

    /// Output WebP path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the intermediate PNG here.
    #[arg(long)]
    raster: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// JSON array of recorded events.
    #[arg(long)]
    events: PathBuf,

    /// Directory to copy sent stickers into.
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WrapArgs {
    #[arg(long)]
    text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Card(args) => cmd_card(&cfg, args).await,
        Command::Replay(args) => cmd_replay(&cfg, args).await,
        Command::Wrap(args) => cmd_wrap(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<quotestick::BotConfig> {
    let Some(path) = path else {
        return Ok(quotestick::BotConfig::default());
    };
    quotestick::BotConfig::load(path).with_context(|| "load bot config")
}

async fn cmd_card(cfg: &quotestick::BotConfig, args: CardArgs) -> anyhow::Result<()> {
    let renderer = quotestick::QuoteCardRenderer::new(cfg)?;
    let avatar = args.avatar.map(quotestick::AvatarSource::Url);
    let image = renderer
        .render(&args.name, &args.text, avatar.as_ref())
        .await?;
    if let quotestick::AvatarStatus::Failed(reason) = &image.avatar {
        eprintln!("avatar skipped: {reason}");
    }

    let encoder = quotestick::StickerEncoder::new(
        quotestick::OutputTarget::Fixed {
            path: args.out.clone(),
        },
        false,
    );
    encoder.encode(&image)?;

    if let Some(raster) = &args.raster {
        if let Some(parent) = raster.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(raster, &image.png)
            .with_context(|| format!("write png '{}'", raster.display()))?;
        eprintln!("wrote {}", raster.display());
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_replay(cfg: &quotestick::BotConfig, args: ReplayArgs) -> anyhow::Result<()> {
    let transport = Arc::new(
        quotestick::ReplayTransport::from_json_file(&args.events)
            .with_context(|| "load replay events")?,
    );
    let pipeline = Arc::new(quotestick::QuotePipeline::new(cfg)?);
    let bot = Arc::new(quotestick::QuoteBot::new(
        Arc::clone(&transport),
        pipeline,
        cfg.command.clone(),
    ));

    let summary = bot.run().await?;

    if let Some(dir) = &args.dump_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create dump dir '{}'", dir.display()))?;
    }
    for (i, out) in transport.outbox()?.into_iter().enumerate() {
        match out {
            quotestick::Outbound::Reply { message_id, text } => {
                println!("reply    {message_id}: {text}");
            }
            quotestick::Outbound::Sticker { chat_id, bytes, .. } => {
                println!("sticker  {chat_id}: {} bytes", bytes.len());
                if let Some(dir) = &args.dump_dir {
                    let path = dir.join(format!("sticker_{i:03}.webp"));
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("write sticker '{}'", path.display()))?;
                }
            }
        }
    }

    println!(
        "sent={} missing_quote={} failed={} ignored={} errors={}",
        summary.sent, summary.missing_quote, summary.failed, summary.ignored, summary.errors
    );
    Ok(())
}

fn cmd_wrap(cfg: &quotestick::BotConfig, args: WrapArgs) -> anyhow::Result<()> {
    let renderer = quotestick::QuoteCardRenderer::new(cfg)?;
    for line in renderer.wrap_body(&args.text)? {
        println!("{line}");
    }
    Ok(())
}
