use std::io::{self, Write};

use serde::Serialize;

use crate::page::PageSnapshot;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesEntry {
    pub species: String,
    pub location: String,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_snapshot(snapshot: &PageSnapshot) -> io::Result<()> {
        Self::print_json(snapshot)
    }

    pub fn print_species(entries: &[SpeciesEntry]) -> io::Result<()> {
        Self::print_json(&entries)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
