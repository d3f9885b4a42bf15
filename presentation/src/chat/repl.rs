//! REPL (Read-Eval-Print Loop) for chatting about an analyzed image

use crate::ConsoleFormatter;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use shoplens_application::AnalysisWorkflow;
use std::path::PathBuf;
use tracing::warn;

const HISTORY_CAPACITY: usize = 500;

/// Parsed REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Quit,
    Help,
    Objects,
    Report,
    Select(usize),
    Invalid(String),
    Ask(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(ReplInput::Ask(line.to_string()));
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        Some(match command {
            "/quit" | "/exit" | "/q" => ReplInput::Quit,
            "/help" | "/h" | "/?" => ReplInput::Help,
            "/objects" | "/o" => ReplInput::Objects,
            "/report" | "/r" => ReplInput::Report,
            "/select" | "/s" => match arg.parse() {
                Ok(index) => ReplInput::Select(index),
                Err(_) => ReplInput::Invalid(format!("Usage: /select <index> (got '{}')", arg)),
            },
            other => ReplInput::Invalid(format!("Unknown command: {}", other)),
        })
    }
}

/// Interactive chat about the current image
pub struct ChatRepl<'a> {
    workflow: &'a mut AnalysisWorkflow,
    history_path: Option<PathBuf>,
}

impl<'a> ChatRepl<'a> {
    pub fn new(workflow: &'a mut AnalysisWorkflow) -> Self {
        Self {
            workflow,
            history_path: dirs::data_dir().map(|p| p.join("shoplens").join("history.txt")),
        }
    }

    /// Override where input history is kept (`None` disables it)
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Chat history disabled: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("shoplens".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let Some(input) = ReplInput::parse(&line) else {
                        continue;
                    };
                    if input == ReplInput::Quit {
                        println!("Bye!");
                        break;
                    }
                    self.handle(input).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle(&mut self, input: ReplInput) {
        match input {
            ReplInput::Quit => {}
            ReplInput::Help => Self::print_help(),
            ReplInput::Objects => {
                if let Some(session) = self.workflow.session() {
                    println!("{}", ConsoleFormatter::format_detections(session));
                }
            }
            ReplInput::Report => match self.workflow.session() {
                Some(session) if session.report().is_some() => {
                    println!("{}", ConsoleFormatter::format_report(session));
                }
                _ => println!("{}", "No analysis yet. Select an object first.".dimmed()),
            },
            ReplInput::Select(index) => {
                println!();
                match self.workflow.select_region(index).await {
                    Ok(outcome) => {
                        if let Some(session) = self.workflow.session() {
                            println!("{}", ConsoleFormatter::format_selection(session, &outcome));
                        }
                    }
                    Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.user_message())),
                }
            }
            ReplInput::Invalid(message) => {
                println!("{}", message);
                println!("Type /help for available commands");
            }
            ReplInput::Ask(query) => {
                println!();
                let result = self.workflow.submit_chat(&query).await;
                match (result, self.workflow.session()) {
                    (Ok(outcome), Some(session)) => {
                        println!("{}", ConsoleFormatter::format_chat(session, &outcome));
                    }
                    (Ok(outcome), None) => println!("{}", outcome.reply),
                    (Err(e), session) => {
                        eprintln!("{}", ConsoleFormatter::format_error(&e.user_message()));
                        if let Some(reply) = session
                            .and_then(|s| s.conversation().last())
                            .map(|turn| turn.text())
                        {
                            println!("{}", reply.dimmed());
                        }
                    }
                }
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            shoplens - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if let Some(session) = self.workflow.session() {
            println!(
                "{} object(s) detected. Ask about the image or pick one with /select.",
                session.detected_objects().len()
            );
        }
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /select <n>, /s <n>  - Analyze detected object n");
        println!("  /objects, /o         - List detected objects");
        println!("  /report, /r          - Show the latest analysis");
        println!("  /help, /h, /?        - Show this help");
        println!("  /quit, /exit, /q     - Exit chat");
        println!();
        println!("Anything else is sent as a question about the image.");
        println!();
    }
}
