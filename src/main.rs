use clap::{Parser, Subcommand};
use post_view::gallery::GalleryBuilder;
use post_view::imaging::{RustBackend, supported_extensions};
use post_view::presenter::PostPresenter;
use post_view::repository::{PostRepository, SqliteRepository};
use post_view::templates::{HtmlTemplates, RecordingTemplates};
use post_view::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "post-view")]
#[command(about = "Render single blog posts with their image galleries")]
#[command(long_about = "\
Render single blog posts with their image galleries

Posts are addressed by permalink: the day they were posted and their
form-encoded subject, e.g. 2024-03-05/Hello+world. Without a permalink the
newest post is shown.

Gallery images live under the configured data_root:

  data/post/<post id>/
  ├── 1.jpg                 # full-size images, natural filename order
  ├── 2.jpg
  └── thumbs/
      ├── 1.jpg             # thumbnail with the same filename
      └── 2.jpg

Set RUST_LOG=debug to trace how a request is resolved.

Run 'post-view gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// SQLite database (overrides `database` from the config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the post at a permalink (or the newest post) as HTML
    Show {
        /// Route token: YYYY-MM-DD/subject
        #[arg(default_value = "")]
        token: String,
        /// Print the resolved view as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
    /// List the newest posts with their permalinks
    Latest {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// List the gallery images found for a post
    Gallery { post_id: i64 },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Show { token, json } => {
            let site = load_site(&cli)?;
            let repo = SqliteRepository::open(&site.database, &site.table_prefix)?;
            let presenter = PostPresenter::new(&site, repo, RustBackend::new());
            if *json {
                let mut templates = RecordingTemplates::new();
                let outcome = presenter.process(token, &mut templates)?;
                let report = serde_json::json!({
                    "template": outcome.template(),
                    "view": outcome.view(),
                    "slots": templates.slots,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let stdout = std::io::stdout().lock();
                let mut templates = HtmlTemplates::new(&site.site_title, site.base_url(), stdout);
                presenter.process(token, &mut templates)?;
            }
        }
        Command::Latest { limit } => {
            let site = load_site(&cli)?;
            let repo = SqliteRepository::open(&site.database, &site.table_prefix)?;
            output::print_latest(&repo.latest(*limit)?);
        }
        Command::Gallery { post_id } => {
            let site = load_site(&cli)?;
            let gallery = GalleryBuilder::new(&site, RustBackend::new()).build(*post_id)?;
            output::print_gallery(*post_id, &gallery);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `--config` and apply the `--database` override.
fn load_site(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site = config::load_config(&cli.config)?;
    if let Some(database) = &cli.database {
        site.database = database.clone();
    }
    for ext in &site.gallery.extensions {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if !supported_extensions().contains(&ext.as_str()) {
            tracing::warn!(extension = %ext, "gallery extension cannot be identified; matching images will fail");
        }
    }
    tracing::debug!(
        config = %cli.config.display(),
        database = %site.database.display(),
        "configuration loaded"
    );
    Ok(site)
}
