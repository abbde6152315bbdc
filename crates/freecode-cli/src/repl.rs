//! Line-oriented prompt driving a [`SessionController`].
//!
//! Network requests run on spawned tasks. Their results come back over a
//! channel and go through the controller's fenced completion path, so the
//! prompt stays usable while a request is outstanding.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use freecode_report::json::JsonGenerator;
use freecode_report::{question_nav, render_summary, status_line, MarkdownGenerator};
use freecode_session::{
    Completion, PendingExecution, ResolvedExecution, ResolvedGeneration, SessionController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Commands:
  generate <topic>  generate a new question set
  list              list the questions
  select <n>        make question n active
  show              show the active question
  code              print the current code
  load <file>       replace the current code with a file's contents
  save <file>       write the current code to a file
  run               run the code against the sample tests
  submit            submit the code against all tests
  back              discard the question set and start over
  status            show the session status
  export <file>     write the last result as JSON
  help              show this help
  quit              exit";

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(String),
    List,
    /// 1-based question number.
    Select(usize),
    Show,
    Code,
    Load(PathBuf),
    Save(PathBuf),
    Run,
    Submit,
    Back,
    Status,
    Export(PathBuf),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        let command = match name {
            "generate" | "g" => {
                if rest.is_empty() {
                    anyhow::bail!("usage: generate <topic>");
                }
                Self::Generate(rest.to_string())
            }
            "list" | "ls" => Self::List,
            "select" | "s" => {
                let number: usize = rest
                    .parse()
                    .with_context(|| format!("usage: select <n> (got '{rest}')"))?;
                if number == 0 {
                    anyhow::bail!("question numbers start at 1");
                }
                Self::Select(number)
            }
            "show" => Self::Show,
            "code" => Self::Code,
            "load" => Self::Load(path_argument("load", rest)?),
            "save" => Self::Save(path_argument("save", rest)?),
            "run" | "r" => Self::Run,
            "submit" => Self::Submit,
            "back" => Self::Back,
            "status" => Self::Status,
            "export" => Self::Export(path_argument("export", rest)?),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => anyhow::bail!("unknown command '{other}' (type 'help' for a list)"),
        };
        Ok(Some(command))
    }
}

fn path_argument(command: &str, rest: &str) -> anyhow::Result<PathBuf> {
    if rest.is_empty() {
        anyhow::bail!("usage: {command} <file>");
    }
    Ok(PathBuf::from(rest))
}

/// Results delivered back from spawned requests.
#[derive(Debug)]
enum Event {
    Generated(ResolvedGeneration),
    Executed(ResolvedExecution),
}

/// Whether the prompt should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The interactive prompt.
pub struct Repl {
    session: SessionController,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl Repl {
    /// Creates a prompt around `session`.
    pub fn new(session: SessionController) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            events_tx,
            events_rx,
        }
    }

    /// Reads commands from stdin until `quit`, end of input or Ctrl+C.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("FreeCode - type 'help' for commands");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        prompt();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read from stdin")? else {
                        break;
                    };
                    if self.execute_line(&line).await == Flow::Quit {
                        break;
                    }
                    prompt();
                }
                Some(event) = self.events_rx.recv() => {
                    self.apply(event);
                    prompt();
                }
                Ok(()) = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl+C, exiting");
                    println!();
                    break;
                }
            }
        }

        Ok(())
    }

    /// Parses and executes one line, printing any error.
    pub async fn execute_line(&mut self, line: &str) -> Flow {
        match Command::parse(line) {
            Ok(Some(command)) => match self.execute(command).await {
                Ok(flow) => flow,
                Err(e) => {
                    println!("Error: {e:#}");
                    Flow::Continue
                }
            },
            Ok(None) => Flow::Continue,
            Err(e) => {
                println!("Error: {e:#}");
                Flow::Continue
            }
        }
    }

    async fn execute(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::Generate(topic) => {
                let pending = self.session.start_generate(&topic)?;
                println!("Generating questions for '{}'...", pending.ticket().topic());
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(Event::Generated(pending.resolve().await));
                });
            }
            Command::List => self.print_list(),
            Command::Select(number) => {
                self.session.select_question(number - 1)?;
                self.print_question();
            }
            Command::Show => self.print_question(),
            Command::Code => match self.session.state().current_code() {
                Some(code) => println!("{code}"),
                None => println!("No question is active"),
            },
            Command::Load(path) => {
                let code = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read '{}'", path.display()))?;
                self.session.edit_code(code)?;
                println!("Loaded {}", path.display());
            }
            Command::Save(path) => {
                let code = self
                    .session
                    .state()
                    .current_code()
                    .context("no question is active")?
                    .to_string();
                tokio::fs::write(&path, code)
                    .await
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                println!("Saved {}", path.display());
            }
            Command::Run => {
                let pending = self.session.start_run()?;
                println!("Running sample tests...");
                self.spawn_execution(pending);
            }
            Command::Submit => {
                let pending = self.session.start_submit()?;
                println!("Submitting...");
                self.spawn_execution(pending);
            }
            Command::Back => {
                self.session.back();
                println!("Session reset");
            }
            Command::Status => self.print_status(),
            Command::Export(path) => self.export(&path)?,
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn spawn_execution(&self, pending: PendingExecution) {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Event::Executed(pending.resolve().await));
        });
    }

    fn apply(&mut self, event: Event) {
        println!();
        match event {
            Event::Generated(resolved) => match self.session.complete_generate(resolved) {
                Completion::Applied => {
                    self.print_list();
                    self.print_question();
                }
                Completion::Failed => self.print_last_error(),
                Completion::Discarded => tracing::debug!("Generation result discarded"),
            },
            Event::Executed(resolved) => match self.session.complete_execution(resolved) {
                Completion::Applied => {
                    if let Some(summary) = self.session.state().last_summary() {
                        print!("{}", render_summary(summary));
                    }
                }
                Completion::Failed => self.print_last_error(),
                Completion::Discarded => tracing::debug!("Execution result discarded"),
            },
        }
    }

    fn export(&self, path: &Path) -> anyhow::Result<()> {
        let state = self.session.state();
        let summary = state.last_summary().context("no result to export")?;
        let question = state.active_question().context("no question is active")?;
        JsonGenerator::new(question.id, &question.title, summary).write_to_file(path, true)?;
        println!("Exported {}", path.display());
        Ok(())
    }

    fn print_list(&self) {
        let state = self.session.state();
        match state.questions() {
            Some(questions) => {
                for (i, question) in questions.iter().enumerate() {
                    let marker = if i == state.active_index() { '*' } else { ' ' };
                    println!(
                        "{marker} {}. {} [{}]",
                        i + 1,
                        question.title,
                        question.difficulty
                    );
                }
            }
            None => println!("No questions loaded; use 'generate <topic>'"),
        }
    }

    fn print_question(&self) {
        let state = self.session.state();
        if let (Some(questions), Some(question)) = (state.questions(), state.active_question()) {
            println!("{}", question_nav(questions, state.active_index()));
            println!();
            print!("{}", MarkdownGenerator::new(question).generate());
        } else {
            println!("No question is active");
        }
    }

    fn print_status(&self) {
        let state = self.session.state();
        println!("{}", status_line(state));
        if let Some(summary) = state.last_summary() {
            print!("{}", render_summary(summary));
        }
        if let Some(error) = state.last_error() {
            println!("Last error: {error}");
        }
    }

    fn print_last_error(&self) {
        if let Some(error) = self.session.state().last_error() {
            println!("Error: {error}");
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
