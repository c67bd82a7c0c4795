//! The hidden command line overlay.
//!
//! Closed until the Konami sequence or Ctrl+Shift+T. While open, Enter runs
//! the typed line against a fixed command table; everything a command does is
//! append to (or clear) the output buffer, except `exit`.

use crate::config::Profile;
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::VecDeque;

pub(crate) const BANNER: &str = "AI Terminal v1.0 - Type \"help\" for commands";

pub(crate) const KONAMI: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

/// Sliding window over the most recent keys.
#[derive(Debug, Default)]
pub(crate) struct KonamiTracker {
    recent: VecDeque<KeyCode>,
}

impl KonamiTracker {
    /// Record a key; true when the last ten keys spell the sequence.
    /// A match empties the window.
    pub(crate) fn push(&mut self, key: KeyCode) -> bool {
        self.recent.push_back(key);
        if self.recent.len() > KONAMI.len() {
            self.recent.pop_front();
        }
        if self.recent.iter().eq(KONAMI.iter()) {
            self.recent.clear();
            return true;
        }
        false
    }

    pub(crate) fn reset(&mut self) {
        self.recent.clear();
    }
}

pub(crate) fn is_toggle_shortcut(key: KeyCode, mods: KeyModifiers) -> bool {
    matches!(key, KeyCode::Char('t') | KeyCode::Char('T'))
        && mods.contains(KeyModifiers::CONTROL | KeyModifiers::SHIFT)
}

fn is_quit_chord(key: KeyCode, mods: KeyModifiers) -> bool {
    matches!(key, KeyCode::Char('c') | KeyCode::Char('C')) && mods.contains(KeyModifiers::CONTROL)
}

type Handler = fn(&mut Shell, &[&str]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Clear,
    About,
    Skills,
    Projects,
    Contact,
    Whoami,
    Ls,
    Pwd,
    Echo,
    Date,
    Neofetch,
    Exit,
}

impl Command {
    pub(crate) const ALL: [Command; 13] = [
        Command::Help,
        Command::Clear,
        Command::About,
        Command::Skills,
        Command::Projects,
        Command::Contact,
        Command::Whoami,
        Command::Ls,
        Command::Pwd,
        Command::Echo,
        Command::Date,
        Command::Neofetch,
        Command::Exit,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Clear => "clear",
            Command::About => "about",
            Command::Skills => "skills",
            Command::Projects => "projects",
            Command::Contact => "contact",
            Command::Whoami => "whoami",
            Command::Ls => "ls",
            Command::Pwd => "pwd",
            Command::Echo => "echo",
            Command::Date => "date",
            Command::Neofetch => "neofetch",
            Command::Exit => "exit",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Command::Help => "Show this help message",
            Command::Clear => "Clear terminal",
            Command::About => "About me",
            Command::Skills => "Show technical skills",
            Command::Projects => "List projects",
            Command::Contact => "Contact information",
            Command::Whoami => "Who am I?",
            Command::Ls => "List directories",
            Command::Pwd => "Print working directory",
            Command::Echo => "Echo text",
            Command::Date => "Show current date",
            Command::Neofetch => "System information",
            Command::Exit => "Close terminal",
        }
    }

    /// Case-insensitive lookup.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn handler(self) -> Handler {
        match self {
            Command::Help => help,
            Command::Clear => |sh, _| sh.clear(),
            Command::About => about,
            Command::Skills => skills,
            Command::Projects => projects,
            Command::Contact => contact,
            Command::Whoami => whoami,
            Command::Ls => |sh, _| sh.print("projects/  skills/  experience/  contact/"),
            Command::Pwd => pwd,
            Command::Echo => |sh, args| sh.print(args.join(" ")),
            Command::Date => date,
            Command::Neofetch => neofetch,
            Command::Exit => |sh, _| sh.close(),
        }
    }
}

fn help(sh: &mut Shell, _: &[&str]) {
    sh.print("Available commands:");
    for c in Command::ALL {
        sh.print(format!("  {:<9} - {}", c.name(), c.summary()));
    }
}

fn about(sh: &mut Shell, _: &[&str]) {
    let mut lines = vec![sh.profile.name.clone()];
    lines.extend(sh.profile.about.iter().cloned());
    sh.extend(lines);
}

fn skills(sh: &mut Shell, _: &[&str]) {
    let lines = sh.profile.stack.clone();
    sh.extend(lines);
}

fn contact(sh: &mut Shell, _: &[&str]) {
    let lines = sh.profile.contact.clone();
    sh.extend(lines);
}

fn projects(sh: &mut Shell, _: &[&str]) {
    let lines: Vec<String> = sh
        .profile
        .projects
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {p}", i + 1))
        .collect();
    sh.extend(lines);
}

fn whoami(sh: &mut Shell, _: &[&str]) {
    let line = format!("{} - {}", sh.profile.name, sh.profile.title);
    sh.print(line);
}

fn pwd(sh: &mut Shell, _: &[&str]) {
    let line = format!("/home/{}/portfolio", sh.profile.handle);
    sh.print(line);
}

fn date(sh: &mut Shell, _: &[&str]) {
    let now = chrono::Local::now();
    sh.print(now.format("%a %b %d %Y %H:%M:%S GMT%z").to_string());
}

fn neofetch(sh: &mut Shell, _: &[&str]) {
    let lines = neofetch_box(&sh.profile);
    sh.extend(lines);
}

/// Double-line box with the profile's facts, padded to the widest row.
pub(crate) fn neofetch_box(p: &Profile) -> Vec<String> {
    let title = p.name.to_uppercase();
    let facts: Vec<String> = p
        .facts
        .iter()
        .map(|f| format!("{}: {}", f.label, f.value))
        .collect();
    let inner = std::iter::once(&title)
        .chain(facts.iter())
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        + 4;

    let pad = |s: &str| {
        let fill = inner - 2 - s.chars().count();
        format!("║  {s}{}║", " ".repeat(fill))
    };

    let mut out = vec![format!("╔{}╗", "═".repeat(inner))];
    out.push(pad(title.as_str()));
    out.push(format!("╠{}╣", "═".repeat(inner)));
    out.extend(facts.iter().map(|f| pad(f.as_str())));
    out.push(format!("╚{}╝", "═".repeat(inner)));
    out
}

pub(crate) struct Shell {
    open: bool,
    output: Vec<String>,
    input: String,
    konami: KonamiTracker,
    profile: Profile,
}

impl Shell {
    pub(crate) fn new(profile: Profile) -> Self {
        Self {
            open: false,
            output: Vec::new(),
            input: String::new(),
            konami: KonamiTracker::default(),
            profile,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn lines(&self) -> &[String] {
        &self.output
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
        self.input.clear();
        self.print(BANNER);
        tracing::info!("shell opened");
    }

    pub(crate) fn close(&mut self) {
        if self.open {
            tracing::info!("shell closed");
        }
        self.open = false;
        self.konami.reset();
    }

    pub(crate) fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn extend(&mut self, lines: Vec<String>) {
        self.output.extend(lines);
    }

    fn clear(&mut self) {
        self.output.clear();
    }

    /// Echo the line, then run it.
    pub(crate) fn dispatch(&mut self, line: &str) {
        self.print(format!("$ {line}"));

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match Command::parse(name) {
            Some(cmd) => {
                tracing::debug!(command = cmd.name(), args = args.len(), "shell dispatch");
                (cmd.handler())(self, &args);
            }
            None => {
                let name = name.to_lowercase();
                self.print(format!(
                    "Command not found: {name}. Type \"help\" for available commands."
                ));
            }
        }
    }

    /// Feed one key press. Returns true when the shell consumed it.
    pub(crate) fn handle_key(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
        if is_toggle_shortcut(key, mods) {
            self.toggle();
            return true;
        }

        if is_quit_chord(key, mods) {
            return false;
        }

        if !self.open {
            if self.konami.push(key) {
                self.open();
                return true;
            }
            return false;
        }

        match key {
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.dispatch(&line);
            }
            KeyCode::Esc => self.close(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) if !mods.contains(KeyModifiers::CONTROL) => self.input.push(ch),
            _ => {}
        }
        true
    }
}
