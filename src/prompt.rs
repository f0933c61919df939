//! Line-oriented operator input.
//!
//! The wizard only ever talks to a [`Prompter`]: [`TermPrompter`] backs it with
//! dialoguer on a real terminal, [`ScriptedPrompter`] replays canned answers.

use std::collections::VecDeque;

use dialoguer::{Input, Password};

use crate::{
    error::InstallerError,
    size::{parse_size, SIZE_HINT},
    ui,
};

pub trait Prompter {
    /// Reads one line of input. The prompt carries no trailing `: `.
    fn read_line(&mut self, prompt: &str) -> Result<String, InstallerError>;

    /// Like `read_line`, without echoing what is typed.
    fn read_secret(&mut self, prompt: &str) -> Result<String, InstallerError> {
        self.read_line(prompt)
    }

    fn say(&mut self, text: &str);

    /// Starts a new screen for a wizard section.
    fn section(&mut self, title: &str);
}

// ── Terminal ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InstallerError> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, InstallerError> {
        Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }

    fn say(&mut self, text: &str) {
        println!("{}", text);
    }

    fn section(&mut self, title: &str) {
        ui::print_section(title);
    }
}

// ── Scripted ──────────────────────────────────────────────────────────────────

/// Replays a fixed list of answers and records everything shown.
///
/// Running out of answers yields [`InstallerError::InputClosed`].
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts as `? <prompt>`, sections as `[<title>]`, messages verbatim.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn saw(&self, text: &str) -> bool {
        self.transcript.iter().any(|l| l.contains(text))
    }

    pub fn unused_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InstallerError> {
        self.transcript.push(format!("? {prompt}"));
        self.answers.pop_front().ok_or(InstallerError::InputClosed)
    }

    fn say(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn section(&mut self, title: &str) {
        self.transcript.push(format!("[{title}]"));
    }
}

// ── Validated questions ───────────────────────────────────────────────────────

/// Asks until `accept` returns a value, saying "Invalid input" after each miss.
pub fn ask<T, P: Prompter + ?Sized>(
    p: &mut P,
    prompt: &str,
    accept: impl Fn(&str) -> Option<T>,
) -> Result<T, InstallerError> {
    loop {
        let answer = p.read_line(prompt)?;
        match accept(&answer) {
            Some(value) => return Ok(value),
            None => p.say("Invalid input"),
        }
    }
}

/// Secret variant of [`ask`].
pub fn ask_secret<P: Prompter + ?Sized>(
    p: &mut P,
    prompt: &str,
    accept: impl Fn(&str) -> bool,
) -> Result<String, InstallerError> {
    loop {
        let answer = p.read_secret(prompt)?;
        if accept(&answer) {
            return Ok(answer);
        }
        p.say("Invalid input");
    }
}

/// Yes unless the answer starts with `n`; an empty answer is yes.
pub fn ask_yes_no<P: Prompter + ?Sized>(p: &mut P, prompt: &str) -> Result<bool, InstallerError> {
    let answer = p.read_line(prompt)?;
    Ok(!answer.trim().to_lowercase().starts_with('n'))
}

/// Asks for a size in megabytes until one parses.
pub fn ask_size<P: Prompter + ?Sized>(p: &mut P, prompt: &str) -> Result<u64, InstallerError> {
    loop {
        let answer = p.read_line(prompt)?;
        match parse_size(&answer) {
            Some(mb) => return Ok(mb),
            None => p.say(SIZE_HINT),
        }
    }
}
