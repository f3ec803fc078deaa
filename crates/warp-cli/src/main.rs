use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "warp",
    about = "WarpGrid text response rendering",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render text responses and inspect content type resolution
    Render {
        #[command(subcommand)]
        action: RenderAction,
    },
}

#[derive(Subcommand)]
enum RenderAction {
    /// Render a literal string as a response.
    ///
    /// Prints the status line and Content-Type header, then the body.
    /// Without --content-type the body is sent as text/plain; charset=utf-8.
    Content {
        /// Declared content type, e.g. "application/json; charset=utf-16"
        #[arg(short = 't', long)]
        content_type: Option<String>,
        /// Status code to set on the response
        #[arg(short, long)]
        status: Option<u16>,
        /// Render settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the body as hex instead of raw bytes
        #[arg(long)]
        hex: bool,
        /// Response body text
        text: String,
    },
    /// Show the header and encoding a declared content type resolves to
    Resolve {
        /// Declared content type
        content_type: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warp=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { action } => match action {
            RenderAction::Content {
                content_type,
                status,
                config,
                hex,
                text,
            } => commands::render::content(
                &text,
                content_type.as_deref(),
                status,
                config.as_deref(),
                hex,
            ),
            RenderAction::Resolve { content_type } => {
                commands::render::resolve(&content_type)
            }
        },
    }
}
