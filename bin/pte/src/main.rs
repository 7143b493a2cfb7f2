mod error;
mod external;
mod watch;

use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use crossbeam_channel::Sender;
use error::CliError;
use external::{CommandDecompiler, CommandPatcher};
use patch_editor::editor::{
    classes_in_jar, expand_home, is_jar, ClassSource, Decompiler, EditorSession, SessionSettings,
};
use patch_editor::highlight::builtins::Dialect;
use patch_editor::highlight::{
    HighlightError, HighlightResult, HighlightSink, HighlighterSettings, IncrementalHighlighter,
};
use patch_editor::jvm::model::ClassDeclaration;
use patch_editor::printer::BytecodePrinter;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;
use watch::PatchWatcher;

fn main() {
    env_logger::init();

    let matches = Command::new("PTE")
        .version(crate_version!())
        .about("Patch editor for JVM classes")
        .subcommand_required(true)
        .subcommand(
            Command::new("print")
                .about("Print classes as bytecode listings")
                .arg(
                    Arg::new("INPUT")
                        .help("Class files, jars, or directories to search for class files")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("class")
                        .long("class")
                        .value_name("NAME")
                        .help("Only print this class (eg. `a.b.C`) out of jar inputs"),
                ),
        )
        .subcommand(
            Command::new("highlight")
                .about("Print a file with syntax highlighting")
                .arg(
                    Arg::new("dialect")
                        .long("dialect")
                        .value_name("DIALECT")
                        .value_parser(["java", "patch"])
                        .default_value("patch")
                        .help("Which built-in pattern set to use"),
                )
                .arg(
                    Arg::new("FILE")
                        .help("File to highlight")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Apply a patch to a class and show the result")
                .arg(
                    Arg::new("CLASS")
                        .help("Class file to patch (or jar containing it, see `--class`)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("class")
                        .long("class")
                        .value_name("NAME")
                        .help("Name of the class (eg. `a.b.C`) inside the jar given as CLASS"),
                )
                .arg(
                    Arg::new("patch")
                        .long("patch")
                        .value_name("FILE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Patch script"),
                )
                .arg(
                    Arg::new("patcher")
                        .long("patcher")
                        .value_name("PROGRAM")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Program run as `<PROGRAM> <class-file> <patch-file>`"),
                )
                .arg(
                    Arg::new("decompiler")
                        .long("decompiler")
                        .value_name("PROGRAM")
                        .value_parser(value_parser!(PathBuf))
                        .help("Program run as `<PROGRAM> <class-file>`"),
                )
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Keep running, re-applying the patch whenever its file changes"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("print", sub_matches)) => print_classes(sub_matches),
        Some(("highlight", sub_matches)) => highlight_file(sub_matches),
        Some(("edit", sub_matches)) => edit_class(sub_matches),
        _ => unreachable!("a subcommand is required"),
    };

    if let Err(err) = result {
        log::error!("{}", err);
        eprintln!("{}", err);
        exit(1);
    }
}

fn print_classes(matches: &ArgMatches) -> Result<(), CliError> {
    let inputs = matches
        .get_many::<PathBuf>("INPUT")
        .into_iter()
        .flatten()
        .map(|input| expand_home(input));
    let class_name = matches.get_one::<String>("class");

    // Find all of the class files
    let mut classes: Vec<ClassSource> = vec![];
    for input in inputs {
        if is_jar(&input) {
            match class_name {
                Some(class_name) => classes.push(ClassSource::in_jar(&input, class_name)),
                None => classes.extend(
                    classes_in_jar(&input).map_err(|err| CliError::Input(input.clone(), err))?,
                ),
            }
        } else if input.is_file() {
            classes.push(ClassSource::File(input));
        } else {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|e| e.is_file() && e.extension().map_or(false, |ex| ex == "class"))
                .collect();
            found.sort();
            classes.extend(found.into_iter().map(ClassSource::File));
        }
    }

    let printer = BytecodePrinter::new();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut failures = 0;
    for (idx, source) in classes.iter().enumerate() {
        match print_class(&printer, source) {
            Ok(text) => {
                if idx > 0 {
                    writeln!(stdout)?;
                }
                if classes.len() > 1 {
                    writeln!(stdout, "// {}", source.display_path().display())?;
                }
                stdout.write_all(text.as_bytes())?;
            }
            Err(err) => {
                failures += 1;
                eprintln!("{}", err);
            }
        }
    }

    if failures > 0 {
        Err(CliError::Failures(failures))
    } else {
        Ok(())
    }
}

fn print_class(printer: &BytecodePrinter, source: &ClassSource) -> Result<String, CliError> {
    let path = source.display_path();
    log::info!("Printing '{}'", path.display());
    let bytes = source
        .read()
        .map_err(|err| CliError::Input(path.clone(), err))?;
    let class =
        ClassDeclaration::parse(&bytes).map_err(|err| CliError::ClassFile(path.clone(), err))?;
    printer
        .print(&class)
        .map_err(|err| CliError::Print(path, err))
}

/// Forwards highlighting outcomes to whoever is waiting on the other end
struct ChannelSink(Sender<Result<HighlightResult, HighlightError>>);

impl HighlightSink for ChannelSink {
    fn apply(&mut self, result: HighlightResult) {
        let _ = self.0.send(Ok(result));
    }

    fn report(&mut self, _sequence: u64, error: HighlightError) {
        let _ = self.0.send(Err(error));
    }
}

fn label_color(label: &str) -> Option<ColorSpec> {
    let mut spec = ColorSpec::new();
    match label {
        "keyword" => spec.set_fg(Some(Color::Magenta)).set_bold(true),
        "string" => spec.set_fg(Some(Color::Green)),
        "comment" => spec.set_fg(Some(Color::Cyan)).set_italic(true),
        "action" => spec.set_fg(Some(Color::Blue)).set_bold(true),
        "find" => spec.set_fg(Some(Color::Yellow)),
        "add" => spec.set_fg(Some(Color::Green)).set_bold(true),
        "remove" => spec.set_fg(Some(Color::Red)).set_bold(true),
        "match" => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        "paren" | "brace" | "bracket" | "semicolon" => spec.set_dimmed(true),
        _ => return None,
    };
    Some(spec)
}

fn highlight_file(matches: &ArgMatches) -> Result<(), CliError> {
    let path = required_path(matches, "FILE")?;
    let dialect: Dialect = matches
        .get_one::<String>("dialect")
        .map_or(Ok(Dialect::Patch), |name| name.parse())
        .map_err(CliError::BadArgument)?;

    let text = fs::read_to_string(expand_home(path))?;
    let (sender, receiver) = crossbeam_channel::unbounded();
    let highlighter = IncrementalHighlighter::new(
        Arc::new(dialect.patterns()),
        ChannelSink(sender),
        HighlighterSettings::default(),
    );
    highlighter.text_changed(&text);
    let result = receiver
        .recv_timeout(Duration::from_secs(30))
        .map_err(|_| CliError::HighlightTimeout)??;
    drop(highlighter);

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for span in &result.spans {
        // Comments and strings win over whatever is inside them
        let color = ["action", "comment", "string"]
            .into_iter()
            .chain(span.labels.iter().map(|label| &**label))
            .filter(|label| span.has_label(label))
            .find_map(label_color);
        match color {
            Some(color) => stdout.set_color(&color)?,
            None => stdout.reset()?,
        }
        write!(&mut stdout, "{}", &text[span.start..span.end])?;
    }
    stdout.reset()?;
    Ok(())
}

fn edit_class(matches: &ArgMatches) -> Result<(), CliError> {
    let class_path = required_path(matches, "CLASS")?;
    let patch_path = required_path(matches, "patch")?;
    let patcher = required_path(matches, "patcher")?;
    let decompiler = matches
        .get_one::<PathBuf>("decompiler")
        .map(|program| Box::new(CommandDecompiler::new(program)) as Box<dyn Decompiler>);

    let source = ClassSource::from_input(
        class_path,
        matches.get_one::<String>("class").map(String::as_str),
    );
    let patch_path = expand_home(patch_path);
    let patch_path = patch_path.as_path();

    let settings = SessionSettings::default();
    let mut session = EditorSession::open_source(
        &source,
        Box::new(CommandPatcher::new(patcher)),
        decompiler,
        settings,
    )?;
    session.load_patch(patch_path)?;
    log::info!("{}", session.title());

    if !matches.get_flag("watch") {
        return recompute_and_show(&mut session);
    }

    let watcher = PatchWatcher::new(patch_path, session.settings().patch_debounce)?;
    if let Err(err) = recompute_and_show(&mut session) {
        eprintln!("{}", err);
    }
    while watcher.next_change() {
        // The file may be briefly missing while an editor replaces it
        if let Err(err) = session.load_patch(patch_path) {
            log::warn!("Could not reload patch: {}", err);
            eprintln!("{}", err);
            continue;
        }
        if let Err(err) = recompute_and_show(&mut session) {
            eprintln!("{}", err);
        }
    }
    Ok(())
}

fn required_path<'a>(matches: &'a ArgMatches, name: &'static str) -> Result<&'a Path, CliError> {
    matches
        .get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .ok_or(CliError::MissingArgument(name))
}

fn recompute_and_show(session: &mut EditorSession) -> Result<(), CliError> {
    let computed = session.recompute()?;
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(computed.bytecode.as_bytes())?;
    if let Some(java) = &computed.java {
        writeln!(stdout)?;
        stdout.write_all(java.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}
