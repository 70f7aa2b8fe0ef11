use clap::{Args, Parser, Subcommand};
use linkpad::config::{EditorConfig, load_config, load_default_config};
use linkpad::content::{ContentLoader, ContentProvider};
use linkpad::error::{LinkpadError, RawError};
use linkpad::html;
use linkpad::link_controller::LinkController;
use linkpad::richtext::selection::SelectionState;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkpad")]
#[command(about = "Add, update and remove links in rich text", long_about = None)]
struct Cli {
    /// Configuration file (defaults to linkpad.toml in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load the document from a raw JSON file
    #[arg(long, global = true, conflicts_with = "text")]
    raw: Option<PathBuf>,

    /// Load the document from a plain text file, one block per line
    #[arg(long, global = true)]
    text: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// Block the selection starts in (0-based)
    #[arg(long, default_value_t = 0)]
    block: usize,

    /// Start offset within the block
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// End offset (defaults to the start offset)
    #[arg(long)]
    end: Option<usize>,

    /// Block the selection ends in, when different from --block
    #[arg(long)]
    end_block: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the editor as HTML
    Render {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Render with the link form opened for the selection
        #[arg(long)]
        form: bool,
    },
    /// Print the link state of the selection as JSON
    State {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Add or update the link at the selection
    Link {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Link text
        #[arg(long = "link-text")]
        link_text: String,

        /// Link target
        #[arg(long)]
        url: String,

        /// Print HTML instead of raw JSON
        #[arg(long)]
        html: bool,
    },
    /// Remove the link containing the selection
    Unlink {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

fn selection_for(
    controller: &LinkController,
    args: &SelectionArgs,
) -> Result<SelectionState, LinkpadError> {
    let content = controller.editor_state().current_content();
    let block_key = |index: usize| {
        content
            .block_at(index)
            .map(|block| block.key().clone())
            .ok_or_else(|| {
                LinkpadError::InvalidSelection(format!(
                    "block {} does not exist (document has {})",
                    index,
                    content.block_count()
                ))
            })
    };

    let focus_block = args.end_block.unwrap_or(args.block);
    let focus_offset = args.end.unwrap_or(args.start);
    let is_backward = (focus_block, focus_offset) < (args.block, args.start);

    Ok(SelectionState::create_empty(block_key(args.block)?)
        .with_anchor_offset(args.start)
        .with_focus_key(block_key(focus_block)?)
        .with_focus_offset(focus_offset)
        .with_is_backward(is_backward)
        .with_has_focus(true))
}

fn load_controller(cli: &Cli) -> Result<LinkController, LinkpadError> {
    let config: EditorConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };
    let mut controller = LinkController::new(config);

    if let Some(path) = &cli.raw {
        log::info!("loading raw content from {}", path.display());
        controller.set_content_from_raw(&fs::read_to_string(path)?)?;
    } else if let Some(path) = &cli.text {
        log::info!("loading text from {}", path.display());
        controller.set_content_from_text(&fs::read_to_string(path)?);
    }
    Ok(controller)
}

fn run(cli: Cli) -> Result<String, LinkpadError> {
    let mut controller = load_controller(&cli)?;

    match cli.command {
        Commands::Render { selection, form } => {
            let selection = selection_for(&controller, &selection)?;
            controller.select(selection);
            if form {
                controller.toggle_link_editor();
            }
            Ok(html::render_page(&controller))
        }
        Commands::State { selection } => {
            let selection = selection_for(&controller, &selection)?;
            controller.select(selection);
            Ok(serde_json::to_string_pretty(controller.link_state()).map_err(RawError::from)?)
        }
        Commands::Link {
            selection,
            link_text,
            url,
            html: as_html,
        } => {
            let selection = selection_for(&controller, &selection)?;
            controller.select(selection);
            controller.update_link(&link_text, &url)?;
            if as_html {
                Ok(html::render_page(&controller))
            } else {
                Ok(controller.get_content()?)
            }
        }
        Commands::Unlink { selection } => {
            let selection = selection_for(&controller, &selection)?;
            controller.select(selection);
            controller.remove_link()?;
            Ok(controller.get_content()?)
        }
    }
}

fn main() {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
