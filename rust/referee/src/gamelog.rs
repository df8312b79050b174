use std::fs;
use std::io;
use std::path::Path;

use triboard_engine::cards::Card;

/// The append-only prose transcript of a match. Only the driver pushes
/// lines; the file is written once, after the final round.
#[derive(Debug)]
pub struct GameLog {
    lines: Vec<String>,
}

impl GameLog {
    pub fn new(header: String) -> Self {
        Self {
            lines: vec![header],
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.lines.join("\n"))
    }
}

/// Bracketed card list for prose lines, e.g. `[Ah Kd 2c]`.
pub fn pretty_cards(cards: &[Card]) -> String {
    format!(
        "[{}]",
        cards
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    )
}

pub fn street_name(street: u8) -> &'static str {
    match street {
        3 => "Flop",
        4 => "Turn",
        _ => "River",
    }
}
