use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use taskboard_cli::cli::{Cli, Command, collect_config_overrides, join_words};
use taskboard_cli::event_loop::{Wake, next_wake, spawn_stdin_reader, timer_wait};
use taskboard_cli::logging::init_tracing;
use taskboard_cli::render;
use taskboard_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use taskboard_core::error::AppError;
use taskboard_core::model::Task;
use taskboard_core::storage::FileSlots;
use taskboard_core::{Completion, TaskBoard};
use time::OffsetDateTime;
use tracing::{debug, warn};

struct App {
    board: TaskBoard<FileSlots>,
    palette: Palette,
}

impl App {
    fn print_board(&self, json: bool) {
        let view = self.board.view();
        if json {
            println!("{}", render::view_json(&view));
        } else {
            print!("{}", render::render_board(&view, &self.palette));
        }
    }

    /// Fires due hides; redraws when something disappeared.
    fn tick(&mut self, json: bool) -> Result<(), AppError> {
        if self.board.tick(OffsetDateTime::now_utc())? > 0 {
            self.print_board(json);
        }
        Ok(())
    }
}

fn print_task_json(task: &Task) {
    println!("{}", serde_json::json!({ "task": task }));
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(app: &mut App, command: Command, json: bool) -> Result<(), AppError> {
    let now = OffsetDateTime::now_utc();
    match command {
        Command::Add { name } => {
            let task = match join_words(&name) {
                Some(name) => app.board.add(&name, now)?,
                None => app.board.submit_input(now)?,
            };
            if json {
                print_task_json(&task);
            } else {
                println!("Added task: {} ({})", task.name, task.id);
                app.print_board(false);
            }
        }
        Command::Type { text } => {
            app.board.set_input(&join_words(&text).unwrap_or_default());
            app.print_board(json);
        }
        Command::Complete { id } => {
            let outcome = match app.board.resolve_id(&id) {
                Some(task_id) => app.board.complete(&task_id, now)?,
                None => Completion::NotFound,
            };
            match outcome {
                Completion::Completed { task, hide_at } if json => {
                    let payload = serde_json::json!({
                        "task": task,
                        "hide_at": hide_at.unix_timestamp(),
                    });
                    println!("{payload}");
                }
                Completion::Completed { task, .. } => {
                    println!("Completed task: {} ({})", task.name, task.id);
                    app.print_board(false);
                }
                _ => app.print_board(json),
            }
        }
        Command::List => app.print_board(json),
        Command::Stats => {
            let stats = app.board.stats();
            if json {
                println!("{}", serde_json::json!(stats));
            } else {
                println!("{}", render::render_stats_line(&stats, &app.palette));
            }
        }
    }

    Ok(())
}

fn handle_line(app: &mut App, line: &str) -> Result<(), AppError> {
    let args = split_command_line(line)?;
    if args.is_empty() {
        return Ok(());
    }

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("taskboard".to_string());
    argv.extend(args);

    let cli = Cli::try_parse_from(argv).map_err(normalize_parse_error)?;
    match cli.command {
        Some(command) => run_command(app, command, cli.json),
        None => Ok(()),
    }
}

fn run_interactive(app: &mut App, json: bool) -> Result<(), AppError> {
    let receiver = spawn_stdin_reader();
    app.print_board(json);

    loop {
        if let Err(err) = app.tick(json) {
            eprintln!("ERROR: {}", err);
        }

        let wait = timer_wait(OffsetDateTime::now_utc(), app.board.next_hide_at());
        let line = match next_wake(&receiver, wait) {
            Wake::Timer => continue,
            Wake::Closed => break,
            Wake::Input(line) => line,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if let Err(err) = handle_line(app, line) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "using default configuration");
    }
    let overrides = collect_config_overrides(&cli.config_override)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn palette_for(config: &Config) -> Palette {
    if std::io::stdout().is_terminal() {
        palette_for_theme(config.theme.as_deref())
    } else {
        Palette::PLAIN
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let options = config.board_options()?;
    let slots = FileSlots::open_default()?;
    let dir = slots.dir().display().to_string();
    let board = TaskBoard::load(slots, options);
    debug!(%dir, source = ?board.load_source(), "opened task store");
    let mut app = App {
        board,
        palette: palette_for(&config),
    };
    app.board.tick(OffsetDateTime::now_utc())?;

    match cli.command {
        Some(Command::Type { .. }) => Err(AppError::invalid_input(
            "type only applies inside an interactive session; use add <NAME>",
        )),
        Some(command) => run_command(&mut app, command, cli.json),
        None => run_interactive(&mut app, cli.json),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
