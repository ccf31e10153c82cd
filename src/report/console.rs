use chrono::{DateTime, Local, Utc};
use crossterm::style::{Color, Stylize};
use std::io::{self, Write};
use tracing::warn;

use crate::listing::{ChangeSet, ListingEntry, Sex, Snapshot};
use crate::monitor::{DegradedReason, ShutdownOutcome};

use super::{BaselineOrigin, Reporter};

/// Plain or coloured text report written to a terminal (or any writer).
pub struct ConsoleReporter<W: Write> {
  out: W,
  color: bool,
}

impl ConsoleReporter<io::Stdout> {
  pub fn stdout(color: bool) -> Self {
    Self::new(io::stdout(), color)
  }
}

impl<W: Write> ConsoleReporter<W> {
  pub fn new(out: W, color: bool) -> Self {
    Self { out, color }
  }

  #[cfg(test)]
  fn into_inner(self) -> W {
    self.out
  }

  fn paint(&self, text: &str, color: Color) -> String {
    if self.color {
      text.with(color).to_string()
    } else {
      text.to_string()
    }
  }

  fn line(&mut self, text: &str, color: Color) -> io::Result<()> {
    let painted = self.paint(text, color);
    writeln!(self.out, "{}", painted)
  }

  fn sex_cell(&self, sex: Sex) -> String {
    let color = match sex {
      Sex::Male => Color::Blue,
      Sex::Female => Color::Magenta,
    };
    self.paint(sex.code(), color)
  }

  /// Aligned name/breed/age/sex table between dashed rules.
  fn table<'a>(&mut self, entries: impl IntoIterator<Item = &'a ListingEntry>) -> io::Result<()> {
    let entries: Vec<&ListingEntry> = entries.into_iter().collect();
    if entries.is_empty() {
      return Ok(());
    }

    let name_w = column_width(&entries, |e| e.identifier.as_str());
    let breed_w = column_width(&entries, |e| e.breed.as_str());
    let age_w = column_width(&entries, |e| e.age.as_str());
    let rule = format!(
      "{}  {}  {}  -",
      "-".repeat(name_w),
      "-".repeat(breed_w),
      "-".repeat(age_w)
    );

    writeln!(self.out, "{}", rule)?;
    for entry in &entries {
      let sex = self.sex_cell(entry.sex);
      writeln!(
        self.out,
        "{:<name_w$}  {:<breed_w$}  {:<age_w$}  {}",
        entry.identifier, entry.breed, entry.age, sex
      )?;
    }
    writeln!(self.out, "{}", rule)?;
    Ok(())
  }

  fn write_baseline(&mut self, snapshot: &Snapshot, origin: BaselineOrigin) -> io::Result<()> {
    match origin {
      BaselineOrigin::Cached { saved_at } => {
        let text = format!(
          "found cache from {} with {} available dogs",
          timestamp(saved_at),
          snapshot.len()
        );
        self.line(&text, Color::Green)?;
      }
      BaselineOrigin::Fresh => {
        let started = format!("monitoring loop started: {}", timestamp(snapshot.observed_at()));
        self.line(&started, Color::Green)?;
        let detected = format!("detected {} dogs available", snapshot.len());
        self.line(&detected, Color::Green)?;
        writeln!(self.out)?;
      }
    }
    self.table(snapshot.iter())?;
    self.out.flush()
  }

  fn write_changes(&mut self, changes: &ChangeSet, current: &Snapshot) -> io::Result<()> {
    let when = timestamp(current.observed_at());

    if !changes.added.is_empty() {
      writeln!(self.out)?;
      self.line(&"*".repeat(80), Color::Red)?;
      self.line(&when, Color::Red)?;
      let text = format!("{} new dog(s) added!!", changes.added.len());
      self.line(&text, Color::Red)?;
      self.table(&changes.added)?;
    }
    if !changes.removed.is_empty() {
      writeln!(self.out)?;
      self.line(&when, Color::Yellow)?;
      let text = format!("{} dog(s) adopted!!", changes.removed.len());
      self.line(&text, Color::Yellow)?;
      self.table(&changes.removed)?;
    }

    let available = format!("Available dogs: {}", current.len());
    self.line(&available, Color::Green)?;
    self.out.flush()
  }

  fn write_degraded(&mut self, reason: &DegradedReason) -> io::Result<()> {
    let text = format!(
      "{} listing unavailable ({}), keeping previous listing and retrying",
      timestamp(Utc::now()),
      reason
    );
    self.line(&text, Color::DarkYellow)?;
    self.out.flush()
  }

  fn write_shutdown(&mut self, outcome: &ShutdownOutcome) -> io::Result<()> {
    writeln!(self.out)?;
    match outcome {
      ShutdownOutcome::Saved { entries } => {
        self.line("saving cache...", Color::Green)?;
        self.line(&format!("cached {} dogs", entries), Color::Green)?;
      }
      ShutdownOutcome::NothingToSave => {
        self.line("no listing to cache", Color::DarkYellow)?;
      }
      ShutdownOutcome::SaveFailed(e) => {
        self.line("saving cache...", Color::Green)?;
        self.line(&format!("failed to save cache: {}", e), Color::Red)?;
      }
    }
    self.line("quitting...", Color::Green)?;
    self.out.flush()
  }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
  fn report_baseline(&mut self, snapshot: &Snapshot, origin: BaselineOrigin) {
    if let Err(e) = self.write_baseline(snapshot, origin) {
      warn!(error = %e, "failed to write baseline report");
    }
  }

  fn report_changes(&mut self, changes: &ChangeSet, current: &Snapshot) {
    if let Err(e) = self.write_changes(changes, current) {
      warn!(error = %e, "failed to write change report");
    }
  }

  fn report_degraded(&mut self, reason: &DegradedReason) {
    if let Err(e) = self.write_degraded(reason) {
      warn!(error = %e, "failed to write degraded notice");
    }
  }

  fn report_shutdown(&mut self, outcome: &ShutdownOutcome) {
    if let Err(e) = self.write_shutdown(outcome) {
      warn!(error = %e, "failed to write shutdown report");
    }
  }
}

fn column_width(entries: &[&ListingEntry], cell: impl Fn(&ListingEntry) -> &str) -> usize {
  entries
    .iter()
    .copied()
    .map(|e| cell(e).chars().count())
    .max()
    .unwrap_or(0)
}

fn timestamp(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CacheError;
  use crate::listing::build_snapshot;

  fn snapshot(blocks: &[&str]) -> Snapshot {
    build_snapshot(blocks.iter().copied(), Utc::now()).unwrap()
  }

  fn render(f: impl FnOnce(&mut ConsoleReporter<Vec<u8>>)) -> String {
    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    f(&mut reporter);
    String::from_utf8(reporter.into_inner()).unwrap()
  }

  const REX: &str = "Rex\nLab\n2 years - Male";
  const MIA: &str = "Mia\nStandard Poodle\n1 year - Female";
  const BRUNO: &str = "Bruno\nBeagle\n3 years - Male";

  #[test]
  fn test_fresh_baseline_lists_dogs() {
    let s = snapshot(&[REX, MIA]);
    let out = render(|r| r.report_baseline(&s, BaselineOrigin::Fresh));

    assert!(out.contains("monitoring loop started: "));
    assert!(out.contains("detected 2 dogs available"));
    // Identifier order, aligned columns
    assert!(out.contains("Mia  Standard Poodle  1 year   F\n"));
    assert!(out.contains("Rex  Lab              2 years  M\n"));
    assert!(out.contains("---  ---------------  -------  -\n"));
  }

  #[test]
  fn test_cached_baseline() {
    let s = snapshot(&[REX]);
    let out = render(|r| {
      r.report_baseline(
        &s,
        BaselineOrigin::Cached {
          saved_at: Utc::now(),
        },
      )
    });
    assert!(out.starts_with("found cache from "));
    assert!(out.contains("with 1 available dogs"));
  }

  #[test]
  fn test_changes_report() {
    let old = snapshot(&[REX, MIA]);
    let new = snapshot(&[REX, BRUNO]);
    let changes = new.changes_since(&old).unwrap();
    let out = render(|r| r.report_changes(&changes, &new));

    assert!(out.contains(&"*".repeat(80)));
    assert!(out.contains("1 new dog(s) added!!"));
    assert!(out.contains("Bruno  Beagle  3 years  M"));
    assert!(out.contains("1 dog(s) adopted!!"));
    assert!(out.contains("Mia  Standard Poodle  1 year  F"));
    assert!(out.trim_end().ends_with("Available dogs: 2"));
  }

  #[test]
  fn test_adoption_only_has_no_banner() {
    let old = snapshot(&[REX, MIA]);
    let new = snapshot(&[REX]);
    let changes = new.changes_since(&old).unwrap();
    let out = render(|r| r.report_changes(&changes, &new));

    assert!(!out.contains("added"));
    assert!(!out.contains('*'));
    assert!(out.contains("1 dog(s) adopted!!"));
  }

  #[test]
  fn test_degraded_notice() {
    let out = render(|r| r.report_degraded(&DegradedReason::EmptyListing));
    assert!(out.contains("listing unavailable"));
    assert!(out.contains("retrying"));
  }

  #[test]
  fn test_shutdown_messages() {
    let out = render(|r| r.report_shutdown(&ShutdownOutcome::Saved { entries: 3 }));
    assert!(out.contains("saving cache..."));
    assert!(out.contains("cached 3 dogs"));
    assert!(out.trim_end().ends_with("quitting..."));

    let out = render(|r| r.report_shutdown(&ShutdownOutcome::SaveFailed(CacheError::EmptySnapshot)));
    assert!(out.contains("failed to save cache"));
    assert!(out.trim_end().ends_with("quitting..."));
  }

  #[test]
  fn test_color_mode_keeps_text() {
    let s = snapshot(&[REX]);
    let mut reporter = ConsoleReporter::new(Vec::new(), true);
    reporter.report_baseline(&s, BaselineOrigin::Fresh);
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(out.contains("Rex"));
    assert!(out.contains("detected 1 dogs available"));
  }
}
