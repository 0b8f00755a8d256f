use std::io::{BufRead, Write};

use maze_runners_core::{AudioService, Direction, InputSource};
use tracing::{info, warn};

/// Typed to leave the match at the next turn boundary.
const QUIT: &str = "q";

/// Parses a movement key or word (`w`/`a`/`s`/`d`, `up`/`down`/`left`/`right`).
pub(crate) fn parse_direction(answer: &str) -> Option<Direction> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => Some(Direction::Up),
        "s" | "down" => Some(Direction::Down),
        "a" | "left" => Some(Direction::Left),
        "d" | "right" => Some(Direction::Right),
        _ => None,
    }
}

/// Parses a yes/no answer; Spanish `si` is accepted too.
pub(crate) fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "si" | "sí" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// [`InputSource`] reading one answer per line.
///
/// Invalid answers are asked again locally. Once the reader is exhausted the
/// source requests an abort and keeps answering with harmless defaults until
/// the engine reaches a turn boundary.
#[derive(Debug)]
pub(crate) struct StdinInput<B, W> {
    reader: B,
    prompts: W,
    quit: bool,
    closed: bool,
    fallback: usize,
}

impl<B: BufRead, W: Write> StdinInput<B, W> {
    pub(crate) fn new(reader: B, prompts: W) -> Self {
        Self {
            reader,
            prompts,
            quit: false,
            closed: false,
            fallback: 0,
        }
    }

    /// Asks until `parse` accepts an answer. `None` once input is exhausted.
    fn ask<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        loop {
            if self.closed {
                return None;
            }
            if let Err(error) = write!(self.prompts, "{prompt} ").and_then(|()| self.prompts.flush()) {
                warn!(%error, "failed to write prompt");
            }

            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    warn!("input closed; leaving the match at the next turn boundary");
                    self.closed = true;
                }
                Ok(_) if line.trim().eq_ignore_ascii_case(QUIT) => {
                    info!("leaving the match at the next turn boundary");
                    self.quit = true;
                }
                Ok(_) => match parse(&line) {
                    Some(answer) => return Some(answer),
                    None => self.hint(&format!("'{}' is not a valid answer", line.trim())),
                },
                Err(error) => {
                    warn!(%error, "failed to read input");
                    self.closed = true;
                }
            }

            if self.quit && !self.closed {
                return None;
            }
        }
    }

    fn hint(&mut self, message: &str) {
        if let Err(error) = writeln!(self.prompts, "{message}") {
            warn!(%error, "failed to write hint");
        }
    }

    fn next_fallback_direction(&mut self) -> Direction {
        let direction = Direction::ALL[self.fallback % Direction::ALL.len()];
        self.fallback += 1;
        direction
    }
}

impl<B: BufRead, W: Write> InputSource for StdinInput<B, W> {
    fn ask_direction(&mut self) -> Direction {
        let prompt = "Move (w/a/s/d):";
        loop {
            if let Some(direction) = self.ask(prompt, parse_direction) {
                return direction;
            }
            if self.closed {
                return self.next_fallback_direction();
            }
            self.hint("the match ends after this turn; finish your moves");
        }
    }

    fn ask_yes_no(&mut self, prompt: &str) -> bool {
        self.ask(&format!("{prompt} (y/n)"), parse_yes_no)
            .unwrap_or(false)
    }

    fn ask_token_index(&mut self, max: usize) -> i64 {
        let prompt = format!("Choose a token [0-{}] or q to quit:", max.saturating_sub(1));
        self.ask(&prompt, |answer| answer.trim().parse::<i64>().ok())
            .unwrap_or(-1)
    }

    fn abort_requested(&mut self) -> bool {
        self.quit || self.closed
    }
}

/// [`AudioService`] that logs track changes instead of playing sound.
#[derive(Debug, Default)]
pub(crate) struct LoggingAudio {
    playing: Option<String>,
}

impl AudioService for LoggingAudio {
    fn play(&mut self, track_id: &str) {
        info!(track = track_id, "background music started");
        self.playing = Some(track_id.to_owned());
    }

    fn stop(&mut self) {
        if let Some(track) = self.playing.take() {
            info!(track = %track, "background music stopped");
        }
    }
}
