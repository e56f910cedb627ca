use clap::{Parser, Subcommand};
use printify::config::{self, CONFIG_FILE, PrintConfig};
use printify::gallery::Gallery;
use printify::intake::drop_paths;
use printify::layout::{PolicyKind, plan, policy_for};
use printify::output;
use printify::print::{BrowserSink, FileSink, PrintSink, print_gallery};
use printify::render::RenderOptions;
use printify::session::Session;
use std::io;
use std::path::{Path, PathBuf};

/// Shared flag for commands that print.
#[derive(clap::Args, Clone)]
struct OpenArgs {
    /// Open the document in the browser and start printing right away
    #[arg(long)]
    open: bool,
}

#[derive(Parser)]
#[command(name = "printify")]
#[command(about = "Tile images onto printable pages")]
#[command(long_about = "\
Tile images onto printable pages

Images are added to a gallery in the order given. Directories are expanded
recursively, sorted by file name, and anything that is not an image is
skipped and reported.

Two pagination policies:

  grid   a fixed number of images per page, each cropped to fill its cell
  flow   images at their own size, wrapped across the page and broken into
         pages by accumulated height

The print document is a single HTML file with every image embedded. Open it
in a browser and print, or pass --open to do both at once.

Run 'printify gen-config' to generate a documented printify.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Pagination policy, overrides print.policy from the config
    #[arg(long, global = true)]
    policy: Option<PolicyKind>,

    /// Where the print document is written
    #[arg(long, default_value = "print.html", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render images into a print document
    Print {
        #[command(flatten)]
        open: OpenArgs,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the page layout as JSON without printing
    Plan {
        /// One line per page instead of JSON
        #[arg(long)]
        summary: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Build up a gallery interactively, then print it
    Shell {
        #[command(flatten)]
        open: OpenArgs,
        paths: Vec<PathBuf>,
    },
    /// Print a stock printify.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Print { open, paths } => {
            let (config, policy) = load_settings(&cli.config, cli.policy)?;
            let mut gallery = Gallery::with_tiles(config.tiles);
            let intake = drop_paths(&mut gallery, &paths)?;
            output::print_intake_report(&intake, &gallery);

            let layout_policy = policy_for(policy, &config);
            let options = RenderOptions {
                title: &config.print.title,
                auto_print: open.open,
            };
            let mut sink = sink_for(&cli.output, open.open);
            let report = print_gallery(&gallery, layout_policy.as_ref(), options, sink.as_mut());
            output::print_print_report(&report);
        }
        Command::Plan { summary, paths } => {
            let (config, policy) = load_settings(&cli.config, cli.policy)?;
            let mut gallery = Gallery::with_tiles(config.tiles);
            let intake = drop_paths(&mut gallery, &paths)?;
            // stdout carries the plan
            for line in output::format_intake_report(&intake, &gallery) {
                eprintln!("{}", line);
            }

            let layout_policy = policy_for(policy, &config);
            let plan = plan(layout_policy.as_ref(), gallery.entries());
            if summary {
                output::print_plan_summary(&plan);
            } else {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
        }
        Command::Shell { open, paths } => {
            let (config, policy) = load_settings(&cli.config, cli.policy)?;
            let gallery = Gallery::with_tiles(config.tiles);
            let mut session = Session::new(gallery, config, sink_for(&cli.output, open.open))
                .with_policy(policy)
                .with_auto_print(open.open);
            if !paths.is_empty() {
                session.add(&paths, &mut io::stdout())?;
            }
            session.run(io::stdin().lock(), io::stdout())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config and resolve the policy, letting `--policy` win.
fn load_settings(
    path: &Path,
    policy: Option<PolicyKind>,
) -> Result<(PrintConfig, PolicyKind), config::ConfigError> {
    let config = config::load_config(path)?;
    let policy = policy.unwrap_or(config.print.policy);
    log::debug!("using {policy} policy, config {}", path.display());
    Ok((config, policy))
}

fn sink_for(output: &Path, open: bool) -> Box<dyn PrintSink> {
    if open {
        Box::new(BrowserSink::new(output))
    } else {
        Box::new(FileSink::new(output))
    }
}
