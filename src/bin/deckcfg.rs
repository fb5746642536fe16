use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use deckcfg::{
    ActionKind, ActionMode, ActionSlot, Applied, Command as Edit, ConfigDocument, DisplayTarget,
    Editor, FileTemplateStore, FontOptions, ImagePipeline, SlotRef,
};

#[derive(Parser, Debug)]
#[command(name = "deckcfg", version)]
struct Cli {
    /// Directory holding the persisted default back image.
    #[arg(long, global = true, default_value = ".deckcfg")]
    state_dir: PathBuf,

    /// Extra font directory for text displays (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new configuration.
    New(NewArgs),
    /// Print a summary of a configuration.
    Inspect(FileArg),
    /// Write a PNG preview of every display.
    Previews(PreviewsArgs),
    /// Append a page, optionally linked from an existing button.
    AddPage(AddPageArgs),
    /// Delete a page and renumber page links behind it.
    DeletePage(DeletePageArgs),
    /// Set the text of one display.
    SetText(SetTextArgs),
    /// Attach a source image (PNG, JPEG, SVG, ...) to one display.
    SetImage(SetImageArgs),
    /// Bind an action to one button.
    SetAction(SetActionArgs),
    /// Change the grid size. Shrinking discards trailing tiles of every page.
    Resize(ResizeArgs),
}

#[derive(Parser, Debug)]
struct FileArg {
    /// Configuration file (`.bin` device format or `.json` project file).
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Output file (`.bin` or `.json`).
    #[arg(long)]
    out: PathBuf,

    /// Tiles per row.
    #[arg(long, default_value_t = deckcfg::DEFAULT_GRID_WIDTH)]
    width: u8,

    /// Tile rows.
    #[arg(long, default_value_t = deckcfg::DEFAULT_GRID_HEIGHT)]
    height: u8,

    /// Number of blank pages.
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Display brightness.
    #[arg(long, default_value_t = deckcfg::DEFAULT_BRIGHTNESS)]
    brightness: u8,
}

#[derive(Parser, Debug)]
struct PreviewsArgs {
    /// Configuration file.
    file: PathBuf,

    /// Directory receiving `p<page>_b<button>.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct AddPageArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// Button that should open the new page, as `PAGE:BUTTON`.
    #[arg(long, value_parser = parse_slot)]
    from: Option<SlotRef>,
}

#[derive(Parser, Debug)]
struct DeletePageArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// Page index.
    #[arg(long)]
    page: usize,
}

#[derive(Parser, Debug)]
struct SetTextArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// Display as `PAGE:BUTTON`, or `back` for the default back image.
    #[arg(long, value_parser = parse_target)]
    at: DisplayTarget,

    /// Text; `\n` starts a new line.
    #[arg(long)]
    text: String,

    /// `"<N>px <family>"` or a family name.
    #[arg(long, default_value = "")]
    font: String,

    /// Use error diffusion instead of a hard threshold.
    #[arg(long)]
    dither: bool,

    /// Invert the display.
    #[arg(long)]
    invert: bool,
}

#[derive(Parser, Debug)]
struct SetImageArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// Display as `PAGE:BUTTON`.
    #[arg(long, value_parser = parse_slot)]
    at: SlotRef,

    /// Source image file.
    #[arg(long)]
    image: PathBuf,
}

#[derive(Parser, Debug)]
struct SetActionArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// Button as `PAGE:BUTTON`.
    #[arg(long, value_parser = parse_slot)]
    at: SlotRef,

    /// Bind the long-press action instead of the short press.
    #[arg(long)]
    secondary: bool,

    /// Action kind.
    #[arg(long, value_enum)]
    mode: ModeChoice,

    /// Action values (page index, key codes, ...).
    #[arg(long = "value")]
    values: Vec<u16>,

    /// Store the action disabled.
    #[arg(long)]
    disabled: bool,
}

#[derive(Parser, Debug)]
struct ResizeArgs {
    /// Configuration file, rewritten in place.
    file: PathBuf,

    /// New tiles per row.
    #[arg(long)]
    width: Option<u8>,

    /// New tile rows.
    #[arg(long)]
    height: Option<u8>,

    /// Confirm that shrinking may discard buttons and displays.
    #[arg(long)]
    yes: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Noop,
    ChangePage,
    Hotkey,
    Media,
    Text,
    Settings,
}

impl From<ModeChoice> for ActionMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Noop => Self::Noop,
            ModeChoice::ChangePage => Self::ChangePage,
            ModeChoice::Hotkey => Self::Hotkey,
            ModeChoice::Media => Self::Media,
            ModeChoice::Text => Self::Text,
            ModeChoice::Settings => Self::Settings,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let log_level = match std::env::var("DECKCFG_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let ctx = Ctx {
        state_dir: cli.state_dir,
        fonts: FontOptions {
            system_fonts: true,
            font_dirs: cli.font_dirs,
        },
    };
    match cli.cmd {
        Command::New(args) => cmd_new(&ctx, args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Previews(args) => cmd_previews(args),
        Command::AddPage(args) => edit_file(&ctx, &args.file, |_| {
            Ok(Edit::AddPage {
                back_link: args.from,
            })
        }),
        Command::DeletePage(args) => edit_file(&ctx, &args.file, |_| {
            Ok(Edit::DeletePage { page: args.page })
        }),
        Command::SetText(args) => cmd_set_text(&ctx, args),
        Command::SetImage(args) => {
            let bytes = std::fs::read(&args.image)
                .with_context(|| format!("read image '{}'", args.image.display()))?;
            edit_file(&ctx, &args.file, |_| {
                Ok(Edit::SetOriginalImage {
                    slot: args.at,
                    image: Some(bytes),
                })
            })
        }
        Command::SetAction(args) => {
            let kind = ActionKind::from_raw(args.mode.into(), &args.values)?;
            edit_file(&ctx, &args.file, |_| {
                Ok(Edit::SetButtonSettings {
                    slot: args.at,
                    which: if args.secondary {
                        ActionSlot::Secondary
                    } else {
                        ActionSlot::Primary
                    },
                    action: deckcfg::Action {
                        kind,
                        enabled: !args.disabled,
                    },
                })
            })
        }
        Command::Resize(args) => edit_file(&ctx, &args.file, |doc| {
            let width = args.width.unwrap_or(doc.tile_grid_width);
            let height = args.height.unwrap_or(doc.tile_grid_height);
            let tiles = usize::from(width) * usize::from(height);
            if tiles < doc.tile_count() && !doc.pages.is_empty() && !args.yes {
                anyhow::bail!(
                    "shrinking to {width}x{height} discards {} tile(s) on every page; pass --yes to confirm",
                    doc.tile_count() - tiles
                );
            }
            Ok(Edit::SetDimensions {
                width: args.width,
                height: args.height,
            })
        }),
    }
}

struct Ctx {
    state_dir: PathBuf,
    fonts: FontOptions,
}

impl Ctx {
    fn editor(&self, doc: Option<ConfigDocument>) -> anyhow::Result<Editor> {
        let pipeline = ImagePipeline::new(&self.fonts);
        let store = Box::new(FileTemplateStore::new(&self.state_dir));
        Ok(match doc {
            Some(doc) => Editor::with_document(doc, pipeline, store)?,
            None => Editor::new(pipeline, store)?,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn read_doc(path: &Path) -> anyhow::Result<ConfigDocument> {
    if is_json(path) {
        let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let doc: ConfigDocument = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse project '{}'", path.display()))?;
        return Ok(doc);
    }
    let bytes = deckcfg::read_source(deckcfg::ConfigSource::Files(vec![path.to_path_buf()]))?;
    Ok(deckcfg::decode_document(&bytes)?)
}

fn write_doc(path: &Path, doc: &ConfigDocument) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let bytes = if is_json(path) {
        serde_json::to_vec_pretty(doc).context("serialize project")?
    } else {
        deckcfg::encode_document(doc)?
    };
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn report(applied: &Applied) {
    for notice in &applied.notices {
        eprintln!("warning: {notice}");
    }
}

fn edit_file(
    ctx: &Ctx,
    path: &Path,
    make: impl FnOnce(&ConfigDocument) -> anyhow::Result<Edit>,
) -> anyhow::Result<()> {
    let mut editor = ctx.editor(Some(read_doc(path)?))?;
    let edit = make(editor.document())?;
    report(&editor.apply(edit)?);
    write_doc(path, editor.document())
}

fn cmd_new(ctx: &Ctx, args: NewArgs) -> anyhow::Result<()> {
    let mut editor = ctx.editor(None)?;
    editor.apply(Edit::SetDimensions {
        width: Some(args.width),
        height: Some(args.height),
    })?;
    editor.apply(Edit::SetBrightness {
        brightness: args.brightness,
    })?;
    for _ in 0..args.pages {
        editor.apply(Edit::AddPage { back_link: None })?;
    }
    write_doc(&args.out, editor.document())
}

fn cmd_set_text(ctx: &Ctx, args: SetTextArgs) -> anyhow::Result<()> {
    let mut editor = ctx.editor(Some(read_doc(&args.file)?))?;
    let doc = editor.document();
    let current = match args.at {
        DisplayTarget::DefaultBack => Some(&doc.default_back_display),
        DisplayTarget::Slot(slot) => doc.display(slot),
    };
    let mut display = current
        .cloned()
        .with_context(|| format!("no display at {:?}", args.at))?;
    display.text_settings.text = args.text.replace("\\n", "\n");
    display.text_settings.font = args.font;
    display.image_settings.dither = args.dither;
    display.image_settings.invert = args.invert;
    report(&editor.apply(Edit::SetDisplaySettings {
        target: args.at,
        display: Box::new(display),
    })?);

    // Back buttons copied from the template follow it.
    if args.at == DisplayTarget::DefaultBack {
        let template = editor.document().default_back_display.clone();
        report(&editor.apply(Edit::UpdateAllDefaultBackImages {
            display: Box::new(template),
        })?);
    }
    write_doc(&args.file, editor.document())
}

fn cmd_inspect(args: FileArg) -> anyhow::Result<()> {
    let doc = read_doc(&args.file)?;
    println!("format version: {}", doc.format_version);
    println!(
        "grid: {}x{} ({} tiles)",
        doc.tile_grid_width,
        doc.tile_grid_height,
        doc.tile_count()
    );
    println!("brightness: {}", doc.brightness);
    println!("pages: {}", doc.pages.len());
    for (slot, button) in doc.buttons() {
        let display = doc.display(slot);
        let text = display
            .map(|d| d.text_settings.text.replace('\n', "\\n"))
            .unwrap_or_default();
        let lit: u32 = display
            .map(|d| d.converted_image().iter().map(|b| b.count_ones()).sum())
            .unwrap_or(0);
        println!(
            "{slot}: primary {:?}{} secondary {:?}{} text {text:?} lit {lit}",
            button.primary.kind,
            if button.primary.enabled { "" } else { " (off)" },
            button.secondary.kind,
            if button.secondary.enabled { "" } else { " (off)" },
        );
    }
    Ok(())
}

fn cmd_previews(args: PreviewsArgs) -> anyhow::Result<()> {
    let doc = read_doc(&args.file)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut written = 0usize;
    let back = args.out_dir.join("default_back.png");
    std::fs::write(&back, doc.default_back_display.preview().to_png()?)
        .with_context(|| format!("write png '{}'", back.display()))?;
    for (slot, display) in doc.displays() {
        let path = args
            .out_dir
            .join(format!("p{}_b{}.png", slot.page, slot.button));
        std::fs::write(&path, display.preview().to_png()?)
            .with_context(|| format!("write png '{}'", path.display()))?;
        written += 1;
    }
    eprintln!("wrote {} previews to {}", written + 1, args.out_dir.display());
    Ok(())
}

fn parse_slot(s: &str) -> Result<SlotRef, String> {
    let (page, button) = s
        .split_once(':')
        .ok_or_else(|| format!("expected PAGE:BUTTON, got '{s}'"))?;
    let page = page
        .trim()
        .parse()
        .map_err(|e| format!("page '{page}': {e}"))?;
    let button = button
        .trim()
        .parse()
        .map_err(|e| format!("button '{button}': {e}"))?;
    Ok(SlotRef::new(page, button))
}

fn parse_target(s: &str) -> Result<DisplayTarget, String> {
    if s.eq_ignore_ascii_case("back") {
        return Ok(DisplayTarget::DefaultBack);
    }
    parse_slot(s).map(DisplayTarget::Slot)
}
