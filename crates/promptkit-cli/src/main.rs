use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Args, Parser, Subcommand};
use promptkit_contracts::catalog::{
    categories, category_by_id, tool_spec, Category, IconKey, TOOLS,
};
use promptkit_contracts::chat::{parse_intent, Intent, CHAT_HELP_COMMANDS};
use promptkit_contracts::data_url::{decode_data_url, read_file_as_data_url};
use promptkit_contracts::events::{EventPayload, EventWriter};
use promptkit_contracts::instruction::{build_system_instruction, instruction_for_tool_id};
use promptkit_contracts::payload::{GeneratedResult, ToolType};
use promptkit_contracts::workspace::{ResponseSource, Workspace};
use promptkit_engine::{BackendKind, EngineConfig, PromptEngine};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "promptkit",
    version,
    about = "Prompt engineering workspace backed by Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive workspace driven by slash commands.
    Workspace(WorkspaceArgs),
    /// One request, printed or saved, then exit.
    Generate(GenerateArgs),
    /// List categories and tools.
    Catalog(CatalogArgs),
    /// Print the system instruction for a category and tool.
    Instruction(InstructionArgs),
}

#[derive(Debug, Args)]
struct EngineArgs {
    /// `gemini` or `dryrun`. Overrides PROMPTKIT_BACKEND.
    #[arg(long)]
    backend: Option<String>,
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
    /// Seconds, clamped to 15-300.
    #[arg(long)]
    request_timeout: Option<f64>,
    /// Append JSONL events to this file.
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct WorkspaceArgs {
    #[command(flatten)]
    engine: EngineArgs,
    #[arg(long, default_value = "coding")]
    category: String,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[command(flatten)]
    engine: EngineArgs,
    #[arg(long, default_value = "coding")]
    category: String,
    #[arg(long, default_value = "generator")]
    tool: String,
    #[arg(long, conflicts_with = "input_file")]
    input: Option<String>,
    #[arg(long)]
    input_file: Option<PathBuf>,
    /// Image to edit (IMAGE_EDITOR only).
    #[arg(long)]
    image: Option<PathBuf>,
    /// Where an image result is written.
    #[arg(long, default_value = DEFAULT_IMAGE_FILE_NAME)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct CatalogArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Parser)]
struct InstructionArgs {
    #[arg(long, default_value = "coding")]
    category: String,
    /// Tool id; unknown ids print the category instruction alone.
    #[arg(long, default_value = "generator")]
    tool: String,
}

const DEFAULT_IMAGE_FILE_NAME: &str = "magic-edit-result.png";
const DEFAULT_TEXT_FILE_NAME: &str = "prompt-result.txt";
const UPLOAD_HINT: &str = "PNG, JPG up to 5MB";
const PROGRESS_TICK: Duration = Duration::from_millis(400);
const GUARD_EXIT_CODE: i32 = 2;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("promptkit error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Workspace(args) => {
            run_workspace(args)?;
            Ok(0)
        }
        Command::Generate(args) => run_generate(args),
        Command::Catalog(args) => {
            print_catalog(&mut io::stdout().lock(), args.json)?;
            Ok(0)
        }
        Command::Instruction(args) => {
            let category = resolve_category(&args.category)?;
            println!("{}", instruction_for_tool_id(&category, &args.tool));
            Ok(0)
        }
    }
}

fn engine_config(args: &EngineArgs) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env()?;
    if let Some(raw) = args.backend.as_deref() {
        config.backend = BackendKind::parse(raw)?;
    }
    if let Some(base) = non_empty(args.api_base.as_deref()) {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(model) = non_empty(args.text_model.as_deref()) {
        config.text_model = Some(model.to_string());
    }
    if let Some(model) = non_empty(args.image_model.as_deref()) {
        config.image_model = Some(model.to_string());
    }
    if let Some(seconds) = args.request_timeout {
        config = config.with_request_timeout(seconds);
    }
    Ok(config)
}

fn open_engine(args: &EngineArgs) -> Result<PromptEngine> {
    let config = engine_config(args)?;
    let session_id = uuid::Uuid::new_v4().to_string();
    let events = match args.events.as_ref() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed creating {}", parent.display()))?;
            }
            EventWriter::new(path, session_id)
        }
        None => EventWriter::disabled(session_id),
    };
    PromptEngine::from_config(&config, events)
}

fn resolve_category(raw: &str) -> Result<Category> {
    match category_by_id(raw) {
        Some(category) => Ok(category),
        None => {
            let known = categories()
                .into_iter()
                .map(|category| category.id)
                .collect::<Vec<String>>();
            bail!("unknown category '{raw}' (expected one of: {})", known.join(", "))
        }
    }
}

fn resolve_tool(raw: &str) -> Result<ToolType> {
    match ToolType::parse(raw) {
        Some(tool) => Ok(tool),
        None => {
            let known = ToolType::ALL
                .iter()
                .map(|tool| tool.id())
                .collect::<Vec<&str>>();
            bail!("unknown tool '{raw}' (expected one of: {})", known.join(", "))
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let category = resolve_category(&args.category)?;
    let tool = resolve_tool(&args.tool)?;
    let input = match (args.input.as_ref(), args.input_file.as_ref()) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?,
        (None, None) => String::new(),
    };
    let engine = open_engine(&args.engine)?;
    let events = engine.event_writer();
    emit(
        &events,
        "session_started",
        json!({
            "mode": "generate",
            "backend": engine.backend_name(),
        }),
    )?;

    let mut workspace = Workspace::new(category);
    workspace.select_tool(tool);
    workspace.set_input(input);
    if let Some(path) = args.image.as_ref() {
        stage_image_file(&mut workspace, &events, path)?;
    }

    if !workspace.can_generate() {
        eprintln!("{}", guard_hint(&workspace));
        emit(&events, "session_finished", json!({ "exit_code": GUARD_EXIT_CODE }))?;
        return Ok(GUARD_EXIT_CODE);
    }

    let mut stdout = io::stdout().lock();
    run_generation_with_progress(&mut workspace, &engine, &events);
    if let Some(result) = workspace.output() {
        if result.is_image() {
            let saved = save_result(result, &args.out)?;
            writeln!(stdout, "Image saved to {}", saved.display())?;
        } else {
            writeln!(stdout, "{}", result.content)?;
        }
    }
    emit(&events, "session_finished", json!({ "exit_code": 0 }))?;
    Ok(0)
}

/// Runs the remote call on a worker thread and prints a dot per tick until
/// it answers.
fn run_generation_with_progress<S: ResponseSource + Sync>(
    workspace: &mut Workspace,
    source: &S,
    events: &EventWriter,
) -> bool {
    let Some(ticket) = workspace.begin_generation() else {
        return false;
    };
    let payload = ticket.payload().clone();
    let label = tool_spec(payload.tool_type).action_label();
    let mut ticks = 0usize;
    let outcome = thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        scope.spawn(move || {
            let _ = tx.send(source.respond(&payload));
        });
        loop {
            match rx.recv_timeout(PROGRESS_TICK) {
                Ok(outcome) => break outcome,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if ticks == 0 {
                        eprint!("{label}: PROCESSING");
                    }
                    ticks += 1;
                    eprint!(".");
                    let _ = io::stderr().flush();
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    break Err(anyhow!("generation worker exited without a result"))
                }
            }
        }
    });
    if ticks > 0 {
        eprintln!();
    }
    workspace.settle_outcome(ticket, outcome, events)
}

fn run_workspace(args: WorkspaceArgs) -> Result<()> {
    let category = resolve_category(&args.category)?;
    let engine = open_engine(&args.engine)?;
    let events = engine.event_writer();
    let mut session = WorkspaceSession {
        workspace: Workspace::new(category),
        engine,
        events,
    };
    emit(
        &session.events,
        "session_started",
        json!({
            "mode": "workspace",
            "backend": session.engine.backend_name(),
            "category": session.workspace.category().id,
        }),
    )?;

    let mut stdout = io::stdout();
    writeln!(stdout, "Promptkit workspace started. Type /help for commands.")?;
    print_banner(&mut stdout, &session)?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        stdout.flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let intent = parse_intent(line.trim_end_matches(['\n', '\r']));
        if session.handle(&intent, &mut stdout)? == Flow::Quit {
            break;
        }
    }

    emit(&session.events, "session_finished", json!({ "exit_code": 0 }))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct WorkspaceSession {
    workspace: Workspace,
    engine: PromptEngine,
    events: EventWriter,
}

impl WorkspaceSession {
    fn handle(&mut self, intent: &Intent, out: &mut impl Write) -> Result<Flow> {
        match intent.action.as_str() {
            "noop" => {}
            "help" => {
                writeln!(out, "Commands: {}", CHAT_HELP_COMMANDS.join(" "))?;
                writeln!(out, "Plain text sets the input and generates.")?;
            }
            "list_categories" => {
                let active = self.workspace.category().id.clone();
                for category in categories() {
                    let marker = if category.id == active { "*" } else { " " };
                    writeln!(
                        out,
                        "{marker} {} {:<10} {} - {}",
                        IconKey::from_key(&category.icon).glyph(),
                        category.id,
                        category.name,
                        category.description
                    )?;
                }
            }
            "select_category" => {
                let Some(raw) = intent.arg("category") else {
                    writeln!(out, "Usage: /category <id>")?;
                    return Ok(Flow::Continue);
                };
                let Some(category) = category_by_id(raw) else {
                    writeln!(out, "Unknown category '{raw}'. Type /categories to list them.")?;
                    return Ok(Flow::Continue);
                };
                self.workspace.select_category(category);
                emit(
                    &self.events,
                    "category_selected",
                    json!({ "category": self.workspace.category().id }),
                )?;
                print_banner(out, self)?;
            }
            "list_tools" => {
                let active = self.workspace.tool();
                for spec in TOOLS {
                    let marker = if spec.tool == active { "*" } else { " " };
                    writeln!(
                        out,
                        "{marker} {} {:<12} {} - {}",
                        IconKey::from_key(spec.icon).glyph(),
                        spec.tool.id(),
                        spec.name,
                        spec.description
                    )?;
                }
            }
            "select_tool" => {
                let Some(raw) = intent.arg("tool") else {
                    writeln!(out, "Usage: /tool <id>")?;
                    return Ok(Flow::Continue);
                };
                let Some(tool) = ToolType::parse(raw) else {
                    writeln!(out, "Unknown tool '{raw}'. Type /tools to list them.")?;
                    return Ok(Flow::Continue);
                };
                self.workspace.select_tool(tool);
                emit(&self.events, "tool_selected", json!({ "tool": tool.id() }))?;
                print_tool_line(out, tool)?;
            }
            "set_input" => {
                let text = intent.arg("text").unwrap_or_default();
                self.workspace.set_input(text);
                writeln!(out, "Input set ({} chars)", text.chars().count())?;
            }
            "stage_image" => {
                let Some(raw) = intent.arg("path") else {
                    writeln!(out, "Usage: /image <path> ({UPLOAD_HINT})")?;
                    return Ok(Flow::Continue);
                };
                let path = PathBuf::from(raw);
                match stage_image_file(&mut self.workspace, &self.events, &path) {
                    Ok(()) => writeln!(out, "Image staged: {}", path.display())?,
                    Err(err) => writeln!(out, "Image upload failed: {err:#}")?,
                }
            }
            "clear_image" => {
                self.workspace.clear_image();
                writeln!(out, "Image cleared")?;
            }
            "generate" => {
                if let Some(prompt) = intent.prompt.as_deref() {
                    self.workspace.set_input(prompt);
                }
                if !self.workspace.can_generate() {
                    writeln!(out, "{}", guard_hint(&self.workspace))?;
                    return Ok(Flow::Continue);
                }
                run_generation_with_progress(&mut self.workspace, &self.engine, &self.events);
                self.print_output(out)?;
            }
            "show_output" => self.print_output(out)?,
            "copy_output" => match self.workspace.output() {
                Some(result) if !result.is_image() => {
                    write!(out, "{}", osc52_copy_sequence(&result.content))?;
                    writeln!(out, "Copied")?;
                }
                Some(_) => writeln!(out, "Image results are downloaded with /save [path]")?,
                None => writeln!(out, "Nothing to copy yet")?,
            },
            "save_output" => {
                let Some(result) = self.workspace.output() else {
                    writeln!(out, "Nothing to save yet")?;
                    return Ok(Flow::Continue);
                };
                let path = intent
                    .arg("path")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_save_path(result));
                match save_result(result, &path) {
                    Ok(saved) => writeln!(out, "Saved to {}", saved.display())?,
                    Err(err) => writeln!(out, "Save failed: {err:#}")?,
                }
            }
            "show_instruction" => {
                let tool = self.workspace.tool();
                if tool.is_image_editor() && self.workspace.image().is_some() {
                    writeln!(
                        out,
                        "Image edits send the input as the instruction, no system instruction."
                    )?;
                } else {
                    writeln!(
                        out,
                        "{}",
                        build_system_instruction(self.workspace.category(), tool)
                    )?;
                }
            }
            "set_text_model" => {
                let requested = intent.arg("model").map(str::to_string);
                self.engine.set_text_model(requested);
                match self.engine.resolve_text_model() {
                    Ok(selection) => {
                        if let Some(reason) = selection.fallback_reason.as_deref() {
                            writeln!(out, "{reason}")?;
                        }
                        writeln!(out, "Text model set to {}", selection.model.name)?;
                    }
                    Err(err) => writeln!(out, "Text model unavailable: {err:#}")?,
                }
            }
            "set_image_model" => {
                let requested = intent.arg("model").map(str::to_string);
                self.engine.set_image_model(requested);
                match self.engine.resolve_image_model() {
                    Ok(selection) => {
                        if let Some(reason) = selection.fallback_reason.as_deref() {
                            writeln!(out, "{reason}")?;
                        }
                        writeln!(out, "Image model set to {}", selection.model.name)?;
                    }
                    Err(err) => writeln!(out, "Image model unavailable: {err:#}")?,
                }
            }
            "quit" => return Ok(Flow::Quit),
            "unknown" => {
                let command = intent.arg("command").unwrap_or_default();
                writeln!(out, "Unknown command /{command}. Type /help for commands.")?;
            }
            other => writeln!(out, "Unhandled action '{other}'")?,
        }
        Ok(Flow::Continue)
    }

    fn print_output(&self, out: &mut impl Write) -> Result<()> {
        match self.workspace.output() {
            Some(result) if result.is_image() => {
                let size = decode_data_url(&result.content)
                    .map(|(_, bytes)| bytes.len())
                    .unwrap_or(0);
                writeln!(
                    out,
                    "Image result ready ({size} bytes). Download with /save [path] (default {DEFAULT_IMAGE_FILE_NAME})."
                )?;
            }
            Some(result) => writeln!(out, "{}", result.content)?,
            None => {
                let idle = if self.workspace.tool().is_image_editor() {
                    "Awaiting visual input"
                } else {
                    "System ready"
                };
                writeln!(out, "{idle}")?;
            }
        }
        Ok(())
    }
}

/// Category header, tool line and the model footer.
fn print_banner(out: &mut impl Write, session: &WorkspaceSession) -> Result<()> {
    let category = session.workspace.category();
    writeln!(
        out,
        "{} {}",
        IconKey::from_key(&category.icon).glyph(),
        category.name
    )?;
    writeln!(out, "  {}", category.description)?;
    print_tool_line(out, session.workspace.tool())?;
    let model = session
        .engine
        .resolve_text_model()
        .map(|selection| selection.model.name)
        .unwrap_or_else(|_| "unavailable".to_string());
    writeln!(
        out,
        "{} {model} ({})",
        IconKey::Cpu.glyph(),
        session.engine.backend_name()
    )?;
    Ok(())
}

fn print_tool_line(out: &mut impl Write, tool: ToolType) -> Result<()> {
    let spec = tool_spec(tool);
    writeln!(
        out,
        "{} {} [{}]",
        IconKey::from_key(spec.icon).glyph(),
        spec.name,
        spec.action_label()
    )?;
    writeln!(out, "  {}", spec.placeholder)?;
    if tool.is_image_editor() {
        writeln!(out, "  /image <path> to upload ({UPLOAD_HINT})")?;
    }
    Ok(())
}

fn guard_hint(workspace: &Workspace) -> &'static str {
    if workspace.is_loading() {
        "A generation is already running"
    } else if workspace.tool().is_image_editor() {
        "Upload an image first: /image <path>"
    } else {
        "Type an idea first: the input is empty"
    }
}

/// Only reading the file can fail; the `image_staged` event is best effort.
fn stage_image_file(workspace: &mut Workspace, events: &EventWriter, path: &Path) -> Result<()> {
    let data_url = read_file_as_data_url(path)?;
    let chars = data_url.len();
    workspace.stage_image(data_url);
    let _ = emit(
        events,
        "image_staged",
        json!({
            "path": path.to_string_lossy(),
            "chars": chars,
        }),
    );
    Ok(())
}

fn default_save_path(result: &GeneratedResult) -> PathBuf {
    if result.is_image() {
        PathBuf::from(DEFAULT_IMAGE_FILE_NAME)
    } else {
        PathBuf::from(DEFAULT_TEXT_FILE_NAME)
    }
}

/// Images are decoded from their data URL; text is written as is.
fn save_result(result: &GeneratedResult, path: &Path) -> Result<PathBuf> {
    let bytes = if result.is_image() {
        decode_data_url(&result.content)
            .context("image result is not a valid data URL")?
            .1
    } else {
        result.content.as_bytes().to_vec()
    };
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn osc52_copy_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()))
}

fn print_catalog(out: &mut impl Write, as_json: bool) -> Result<()> {
    if as_json {
        let tools = TOOLS
            .iter()
            .map(|spec| {
                json!({
                    "id": spec.tool.id(),
                    "name": spec.name,
                    "icon": IconKey::from_key(spec.icon).key(),
                    "description": spec.description,
                    "placeholder": spec.placeholder,
                    "actionLabel": spec.action_label(),
                })
            })
            .collect::<Vec<Value>>();
        let catalog = json!({
            "categories": categories(),
            "tools": tools,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&catalog)?)?;
        return Ok(());
    }
    writeln!(out, "Categories:")?;
    for category in categories() {
        writeln!(
            out,
            "  {} {:<10} {}",
            IconKey::from_key(&category.icon).glyph(),
            category.id,
            category.name
        )?;
    }
    writeln!(out, "Tools:")?;
    for spec in TOOLS {
        writeln!(
            out,
            "  {} {:<12} {}",
            IconKey::from_key(spec.icon).glyph(),
            spec.tool.id(),
            spec.name
        )?;
    }
    Ok(())
}

fn emit(events: &EventWriter, event_type: &str, payload: Value) -> Result<()> {
    events.emit(event_type, json_object(payload))?;
    Ok(())
}

fn json_object(value: Value) -> EventPayload {
    value.as_object().cloned().unwrap_or_default()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
