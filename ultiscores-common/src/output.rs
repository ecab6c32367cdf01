//! Flat files read by the stream overlay. The file names are what the overlay
//! expects and must not change.

use crate::{
    game_snapshot::{GameSnapshot, Roster},
    scoring::LatestScoringState,
    side::Side,
};
use enum_iterator::{Sequence, all};
use log::trace;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum OutputFile {
    Clock,
    HomeScore,
    AwayScore,
    Scorer,
    Assist,
    HomeRoster,
    AwayRoster,
    HomeAbbreviation,
    AwayAbbreviation,
    HomeName,
    AwayName,
}

impl OutputFile {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Clock => "clock.txt",
            Self::HomeScore => "home_score.txt",
            Self::AwayScore => "away_score.txt",
            Self::Scorer => "scorer.txt",
            Self::Assist => "assist.txt",
            Self::HomeRoster => "home_roster.txt",
            Self::AwayRoster => "away_roster.txt",
            Self::HomeAbbreviation => "home_name.txt",
            Self::AwayAbbreviation => "away_name.txt",
            Self::HomeName => "home_name_full.txt",
            Self::AwayName => "away_name_full.txt",
        }
    }

    pub fn score(side: Side) -> Self {
        match side {
            Side::Home => Self::HomeScore,
            Side::Away => Self::AwayScore,
        }
    }

    pub fn roster(side: Side) -> Self {
        match side {
            Side::Home => Self::HomeRoster,
            Side::Away => Self::AwayRoster,
        }
    }

    pub fn abbreviation(side: Side) -> Self {
        match side {
            Side::Home => Self::HomeAbbreviation,
            Side::Away => Self::AwayAbbreviation,
        }
    }

    pub fn name(side: Side) -> Self {
        match side {
            Side::Home => Self::HomeName,
            Side::Away => Self::AwayName,
        }
    }
}

pub trait OutputSink {
    /// Replaces the content of `file`. Empty content leaves the file untouched,
    /// so a blank response never wipes the last good value.
    fn write_text(&mut self, file: OutputFile, content: &str) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn path_of(&self, file: OutputFile) -> PathBuf {
        self.directory.join(file.file_name())
    }
}

impl OutputSink for FileSink {
    fn write_text(&mut self, file: OutputFile, content: &str) -> io::Result<()> {
        if content.is_empty() {
            trace!("Not writing empty content to {}", file.file_name());
            return Ok(());
        }
        fs::create_dir_all(&self.directory)?;
        fs::write(self.path_of(file), content)
    }
}

/// Keeps every write in memory, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub history: Vec<(OutputFile, String)>,
}

impl MemorySink {
    pub fn latest(&self, file: OutputFile) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|(f, _)| *f == file)
            .map(|(_, content)| content.as_str())
    }

    pub fn all_of(&self, file: OutputFile) -> Vec<&str> {
        self.history
            .iter()
            .filter(|(f, _)| *f == file)
            .map(|(_, content)| content.as_str())
            .collect()
    }
}

impl OutputSink for MemorySink {
    fn write_text(&mut self, file: OutputFile, content: &str) -> io::Result<()> {
        if !content.is_empty() {
            self.history.push((file, content.to_string()));
        }
        Ok(())
    }
}

/// The overlay files, or only memory when writing is turned off
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Files(FileSink),
    DryRun(MemorySink),
}

impl OutputTarget {
    pub fn new(directory: impl AsRef<Path>, write_files: bool) -> Self {
        if write_files {
            Self::Files(FileSink::new(directory))
        } else {
            Self::DryRun(MemorySink::default())
        }
    }
}

impl OutputSink for OutputTarget {
    fn write_text(&mut self, file: OutputFile, content: &str) -> io::Result<()> {
        match self {
            Self::Files(sink) => sink.write_text(file, content),
            Self::DryRun(sink) => {
                trace!("Dry run, not writing {}", file.file_name());
                sink.write_text(file, content)
            }
        }
    }
}

fn write_line<S: OutputSink + ?Sized>(
    sink: &mut S,
    file: OutputFile,
    value: &str,
) -> io::Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    sink.write_text(file, &format!("{value}\n"))
}

pub fn roster_lines(roster: &Roster) -> String {
    roster
        .iter()
        .map(|(number, name)| format!("{number}: {name}\n"))
        .collect()
}

/// Writes everything one game update produces: rosters, team abbreviations and
/// names, the latest score, scorer and assist.
pub fn persist_snapshot<S: OutputSink + ?Sized>(
    sink: &mut S,
    snapshot: &GameSnapshot,
    latest: &LatestScoringState,
) -> io::Result<()> {
    for side in all::<Side>() {
        sink.write_text(OutputFile::roster(side), &roster_lines(&snapshot.rosters[side]))?;
        write_line(
            sink,
            OutputFile::abbreviation(side),
            snapshot.abbreviations[side].as_deref().unwrap_or_default(),
        )?;
        write_line(
            sink,
            OutputFile::name(side),
            snapshot.names[side].as_deref().unwrap_or_default(),
        )?;
    }

    for side in all::<Side>() {
        write_line(sink, OutputFile::score(side), &latest.scores[side])?;
    }
    write_line(sink, OutputFile::Scorer, &latest.scorer)?;
    write_line(sink, OutputFile::Assist, &latest.assist)
}
