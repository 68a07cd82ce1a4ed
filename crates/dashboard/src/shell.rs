//! Interactive dashboard shell
//!
//! Each input line is one interaction against the same session. A failing
//! command prints its error and the shell keeps going.

use crate::app::{App, PredictRequest};
use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate};
use flight_core::features::DEFAULT_DURATION_MINUTES;
use std::io::{BufRead, Write};
use tracing::debug;

const HELP: &str = "\
Commands:
  insights                      Key insights about flight prices
  options                       Values accepted by predict
  predict airline=.. class=.. from=.. to=.. [duration=120] [date=YYYY-MM-DD]
  help                          Show this message
  quit | exit                   Leave the shell
Quote values containing spaces, e.g. airline=\"Air India\"";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Insights,
    Options,
    Predict(PredictRequest),
    Help,
    Quit,
    Empty,
}

/// Split a line on whitespace, keeping quoted runs together
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        bail!("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_line(line: &str) -> Result<ShellCommand> {
    let tokens = tokenize(line)?;
    let Some((command, args)) = tokens.split_first() else {
        return Ok(ShellCommand::Empty);
    };

    match command.to_lowercase().as_str() {
        "insights" => Ok(ShellCommand::Insights),
        "options" => Ok(ShellCommand::Options),
        "predict" => parse_predict(args).map(ShellCommand::Predict),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => bail!("unknown command '{}' (try 'help')", other),
    }
}

fn parse_predict(args: &[String]) -> Result<PredictRequest> {
    let mut airline = None;
    let mut class = None;
    let mut from = None;
    let mut to = None;
    let mut duration = None;
    let mut date = None;

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{}'", arg))?;
        let value = value.to_string();
        match key {
            "airline" => airline = Some(value),
            "class" => class = Some(value),
            "from" => from = Some(value),
            "to" => to = Some(value),
            "duration" => {
                duration = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| anyhow!("duration must be whole minutes, got '{}'", value))?,
                )
            }
            "date" => {
                date = Some(
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| anyhow!("date must be YYYY-MM-DD, got '{}'", value))?,
                )
            }
            other => bail!("unknown predict field '{}'", other),
        }
    }

    Ok(PredictRequest {
        airline: airline.ok_or_else(|| anyhow!("missing airline="))?,
        class: class.ok_or_else(|| anyhow!("missing class="))?,
        departure_city: from.ok_or_else(|| anyhow!("missing from="))?,
        arrival_city: to.ok_or_else(|| anyhow!("missing to="))?,
        duration_minutes: duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        journey_date: date,
    })
}

fn execute(app: &App, command: ShellCommand) -> Result<Option<String>> {
    let text = match command {
        ShellCommand::Insights => app.insights()?,
        ShellCommand::Options => app.options()?,
        ShellCommand::Predict(request) => app.predict(request, Local::now().date_naive())?,
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Empty => String::new(),
        ShellCommand::Quit => return Ok(None),
    };
    Ok(Some(text))
}

/// Read commands until EOF or `quit`
pub fn run<R: BufRead, W: Write>(app: &App, input: R, mut output: W) -> Result<()> {
    writeln!(output, "Flight Price Dashboard. Type 'help' for commands.")?;

    for line in input.lines() {
        let line = line?;
        debug!(line = %line, "Shell input");

        let outcome = parse_line(&line).and_then(|command| execute(app, command));
        match outcome {
            Ok(None) => break,
            Ok(Some(text)) => {
                if !text.is_empty() {
                    writeln!(output, "{}", text.trim_end())?;
                }
            }
            Err(e) => writeln!(output, "Error: {:#}", e)?,
        }
    }

    Ok(())
}
