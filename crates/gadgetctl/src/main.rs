use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use gadgets::core::Locale;
use tracing_subscriber::EnvFilter;

use gadgetctl::cmd_bundle;
use gadgetctl::cmd_check;
use gadgetctl::cmd_inspect;
use gadgetctl::cmd_render::{self, RenderArgs};
use gadgetctl::common;

#[derive(Parser, Debug)]
#[command(name = "gadgetctl", version, about = "Gadget specification CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// JSON file with cache settings
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Summarize a gadget spec
    Inspect {
        /// Path or file:// URL
        target: String,
    },
    /// Validate a gadget spec and check it round-trips
    Check {
        target: String,
        /// Print the serialized document
        #[arg(long)]
        xml: bool,
    },
    /// Render one view with messages and user prefs filled in
    Render {
        target: String,
        #[arg(long, default_value = "all_ALL")]
        locale: Locale,
        #[arg(long, default_value = "default")]
        view: String,
        /// User preference as name=value (repeatable)
        #[arg(long = "pref", value_parser = common::parse_pref)]
        prefs: Vec<(String, String)>,
        #[arg(long, default_value_t = 0)]
        module_id: u64,
    },
    /// Print the merged message bundle for a locale
    Bundle {
        target: String,
        #[arg(long, default_value = "all_ALL")]
        locale: Locale,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        config,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = common::load_config(config.as_ref())?;
    let gadgets = common::open_gadgets(config);

    match cmd {
        Cmd::Inspect { target } => {
            let url = common::target_url(&target)?;
            cmd_inspect::run(&gadgets, &url, json).await?
        }
        Cmd::Check { target, xml } => {
            let url = common::target_url(&target)?;
            cmd_check::run(&gadgets, &url, xml, json).await?
        }
        Cmd::Render {
            target,
            locale,
            view,
            prefs,
            module_id,
        } => {
            let args = RenderArgs {
                url: common::target_url(&target)?,
                locale,
                view,
                prefs: prefs.into_iter().collect(),
                module_id,
            };
            cmd_render::run(&gadgets, args, json).await?
        }
        Cmd::Bundle { target, locale } => {
            let url = common::target_url(&target)?;
            cmd_bundle::run(&gadgets, &url, &locale).await?
        }
    };

    Ok(())
}
