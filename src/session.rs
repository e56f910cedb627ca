//! Interactive print shell.
//!
//! A [`Session`] owns one gallery and drives it from a line-based command
//! loop. Each line is parsed with clap, so `help` and argument errors come
//! out the same way as on the command line:
//!
//! ```text
//! printify> add ~/Pictures/holiday
//! Added 3 images
//!     #1 beach.jpg
//!     ...
//! printify> rotate 2
//! #2 pier.jpg: 200x200, rotated 90°
//! printify> policy flow
//! printify> print
//! ```
//!
//! `reset` asks for confirmation on the same input stream and only a `y` or
//! `yes` answer empties the gallery. The loop ends on `quit` or end of input.

use crate::config::PrintConfig;
use crate::gallery::{ConfirmPrompt, EntryId, Gallery};
use crate::intake::drop_paths;
use crate::layout::{PolicyKind, plan, policy_for};
use crate::output;
use crate::print::{PrintReport, PrintSink, print_gallery};
use crate::render::RenderOptions;
use crate::resource::{DataUrlStore, ResourceStore};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

const PROMPT: &str = "printify> ";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "printify", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// One shell command.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Add image files or directories of images
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the selected images
    #[command(alias = "ls")]
    List,
    /// Remove an image
    #[command(alias = "rm")]
    Remove { id: EntryId },
    /// Make an image one step larger
    Grow { id: EntryId },
    /// Make an image one step smaller
    Shrink { id: EntryId },
    /// Change an image's width and height by DELTA pixels
    Resize {
        id: EntryId,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Turn an image 90° clockwise
    Rotate { id: EntryId },
    /// Remove every image (asks first)
    Reset,
    /// Switch between grid and flow pagination
    Policy { kind: PolicyKind },
    /// Render the print document and send it to the printer
    Print,
    /// Show how the images would be paginated
    Plan,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

/// A gallery plus the settings used to print it.
pub struct Session<S: ResourceStore = DataUrlStore, P: PrintSink = Box<dyn PrintSink>> {
    gallery: Gallery<S>,
    config: PrintConfig,
    policy: PolicyKind,
    sink: P,
    auto_print: bool,
}

impl<S: ResourceStore, P: PrintSink> Session<S, P> {
    /// Start a session with the policy from `config.print.policy`.
    pub fn new(gallery: Gallery<S>, config: PrintConfig, sink: P) -> Self {
        let policy = config.print.policy;
        Self {
            gallery,
            config,
            policy,
            sink,
            auto_print: false,
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Ask the browser to open its print dialog when a document loads.
    pub fn with_auto_print(mut self, auto_print: bool) -> Self {
        self.auto_print = auto_print;
        self
    }

    pub fn gallery(&self) -> &Gallery<S> {
        &self.gallery
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Offer paths to the gallery and report what happened.
    ///
    /// A missing path is reported on `out`; it does not end the session.
    pub fn add<W: Write>(&mut self, paths: &[PathBuf], out: &mut W) -> Result<(), SessionError> {
        match drop_paths(&mut self.gallery, paths) {
            Ok(report) => write_lines(
                out,
                &output::format_intake_report(&report, &self.gallery),
            )?,
            Err(e) => writeln!(out, "Error: {e}")?,
        }
        Ok(())
    }

    /// Render the gallery with the current policy and submit it to the sink.
    pub fn print(&mut self) -> PrintReport {
        let policy = policy_for(self.policy, &self.config);
        let options = RenderOptions {
            title: &self.config.print.title,
            auto_print: self.auto_print,
        };
        print_gallery(&self.gallery, policy.as_ref(), options, &mut self.sink)
    }

    /// Run a single command. `input` is only read by `reset`'s confirmation.
    pub fn execute<R: BufRead, W: Write>(
        &mut self,
        command: ShellCommand,
        input: &mut R,
        out: &mut W,
    ) -> Result<Step, SessionError> {
        match command {
            ShellCommand::Add { paths } => self.add(&paths, out)?,
            ShellCommand::List => write_lines(out, &output::format_listing(&self.gallery))?,
            ShellCommand::Remove { id } => {
                if self.gallery.remove(id) {
                    writeln!(out, "Removed #{id}")?;
                } else {
                    no_such_entry(out, id)?;
                }
            }
            ShellCommand::Grow { id } => self.transform(id, out, |g, id| g.grow(id))?,
            ShellCommand::Shrink { id } => self.transform(id, out, |g, id| g.shrink(id))?,
            ShellCommand::Resize { id, delta } => {
                self.transform(id, out, |g, id| g.resize(id, delta))?
            }
            ShellCommand::Rotate { id } => self.transform(id, out, |g, id| g.rotate(id))?,
            ShellCommand::Reset => self.reset(input, out)?,
            ShellCommand::Policy { kind } => {
                self.policy = kind;
                writeln!(out, "Policy set to {kind}")?;
            }
            ShellCommand::Print => {
                let report = self.print();
                write_lines(out, &output::format_print_report(&report))?;
            }
            ShellCommand::Plan => {
                let policy = policy_for(self.policy, &self.config);
                let plan = plan(policy.as_ref(), self.gallery.entries());
                write_lines(out, &output::format_plan_summary(&plan))?;
            }
            ShellCommand::Quit => return Ok(Step::Quit),
        }
        Ok(Step::Continue)
    }

    /// Read and execute commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<(), SessionError> {
        writeln!(out, "Type 'help' for a list of commands.")?;
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    write!(out, "{}", e.render())?;
                    continue;
                }
            };
            log::debug!("shell command: {command:?}");
            if self.execute(command, &mut input, &mut out)? == Step::Quit {
                break;
            }
        }
        Ok(())
    }

    fn transform<W: Write>(
        &mut self,
        id: EntryId,
        out: &mut W,
        apply: impl FnOnce(&mut Gallery<S>, EntryId) -> bool,
    ) -> io::Result<()> {
        if !apply(&mut self.gallery, id) {
            return no_such_entry(out, id);
        }
        match self.gallery.get(id) {
            Some(entry) => writeln!(out, "{}", output::format_entry(entry)),
            None => Ok(()),
        }
    }

    fn reset<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        let count = self.gallery.len();
        let mut failure = None;
        let confirmed = self
            .gallery
            .reset_all_confirmed(&mut |prompt: &ConfirmPrompt| match ask(input, out, prompt) {
                Ok(answer) => answer,
                Err(e) => {
                    failure = Some(e);
                    false
                }
            });
        if let Some(e) = failure {
            return Err(e);
        }
        write_lines(out, &output::format_reset(confirmed.then_some(count)))
    }
}

/// Show a confirmation prompt and read a yes/no answer. Defaults to no.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &ConfirmPrompt) -> io::Result<bool> {
    write!(out, "{} {} [y/N] ", prompt.title, prompt.description)?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn no_such_entry<W: Write>(out: &mut W, id: EntryId) -> io::Result<()> {
    writeln!(out, "No image #{id}")
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
