//! Parsing of raw listing blocks into a [`Snapshot`].
//!
//! Every block is the visible text of one listed dog:
//!
//! ```text
//! Rex
//! Labrador
//! 2-3 years - Female
//! ```
//!
//! The third line packs age and sex together, and the age itself may be a
//! range that contains a dash.

use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::ParseError;

use super::types::{ListingEntry, Sex, Snapshot};

/// Build a snapshot from raw text blocks, failing on the first malformed one.
pub fn build_snapshot<I, S>(blocks: I, observed_at: DateTime<Utc>) -> Result<Snapshot, ParseError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut entries = BTreeMap::new();

  for block in blocks {
    let entry = parse_entry(block.as_ref())?;
    match entries.entry(entry.identifier.clone()) {
      Entry::Vacant(slot) => {
        slot.insert(entry);
      }
      Entry::Occupied(_) => {
        return Err(ParseError::DuplicateIdentifier {
          identifier: entry.identifier,
        });
      }
    }
  }

  Ok(Snapshot::new(entries, observed_at))
}

/// Parse a single block into an entry.
fn parse_entry(block: &str) -> Result<ListingEntry, ParseError> {
  let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

  let identifier = lines.next().ok_or_else(|| ParseError::MissingField {
    identifier: String::new(),
    field: "name",
  })?;
  let missing = |field| ParseError::MissingField {
    identifier: identifier.to_string(),
    field,
  };
  let breed = lines.next().ok_or_else(|| missing("breed"))?;
  let composite = lines.next().ok_or_else(|| missing("age/sex"))?;

  let (age, sex) = split_age_sex(identifier, composite)?;

  Ok(ListingEntry {
    identifier: identifier.to_string(),
    breed: breed.to_string(),
    age,
    sex,
  })
}

fn split_age_sex(identifier: &str, composite: &str) -> Result<(String, Sex), ParseError> {
  let parts: Vec<&str> = composite.split('-').map(str::trim).collect();

  let (age, sex_token) = match parts.as_slice() {
    [age, sex] => (age.to_string(), *sex),
    // Age ranges such as "2-3 years - Female"
    [from, to, sex] => (format!("{}-{}", from, to), *sex),
    _ => {
      return Err(ParseError::MalformedAgeSex {
        identifier: identifier.to_string(),
        raw: composite.to_string(),
      })
    }
  };

  Ok((age, parse_sex(identifier, sex_token)?))
}

fn parse_sex(identifier: &str, token: &str) -> Result<Sex, ParseError> {
  if token.contains("Female") {
    Ok(Sex::Female)
  } else if token.contains("Male") {
    Ok(Sex::Male)
  } else {
    Err(ParseError::UnknownSex {
      identifier: identifier.to_string(),
      raw: token.to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn now() -> DateTime<Utc> {
    Utc::now()
  }

  #[test]
  fn test_baseline_listing() {
    let snapshot = build_snapshot(
      ["Rex\nLab\n2 years - Male", "Mia\nPoodle\n1 year - Female"],
      now(),
    )
    .unwrap();

    assert_eq!(snapshot.len(), 2);
    let rex = snapshot.entries().get("Rex").unwrap();
    assert_eq!(rex.breed, "Lab");
    assert_eq!(rex.age, "2 years");
    assert_eq!(rex.sex, Sex::Male);
    let mia = snapshot.entries().get("Mia").unwrap();
    assert_eq!(mia.breed, "Poodle");
    assert_eq!(mia.age, "1 year");
    assert_eq!(mia.sex, Sex::Female);
  }

  #[test]
  fn test_age_range_keeps_dash() {
    let entry = parse_entry("Luna\nShepherd mix\n2 - 3 years - Female").unwrap();
    assert_eq!(entry.age, "2-3 years");
    assert_eq!(entry.sex, Sex::Female);
  }

  #[test]
  fn test_missing_separator_names_entry() {
    let err = parse_entry("Duke\nMutt\nsenior").unwrap_err();
    assert_eq!(
      err,
      ParseError::MalformedAgeSex {
        identifier: "Duke".to_string(),
        raw: "senior".to_string(),
      }
    );
  }

  #[test]
  fn test_too_many_dashes() {
    let err = parse_entry("Duke\nMutt\n1 - 2 - 3 - Male").unwrap_err();
    assert_eq!(err.identifier(), "Duke");
  }

  #[test]
  fn test_sex_token_may_carry_extra_words() {
    assert_eq!(parse_sex("Mia", "Spayed Female"), Ok(Sex::Female));
    assert_eq!(parse_sex("Rex", "Neutered Male"), Ok(Sex::Male));
    assert!(parse_sex("Pip", "male").is_err());
  }

  #[test]
  fn test_unknown_sex() {
    let err = parse_entry("Pip\nTerrier\n4 years - Unknown").unwrap_err();
    assert!(matches!(err, ParseError::UnknownSex { ref identifier, .. } if identifier == "Pip"));
  }

  #[test]
  fn test_missing_lines() {
    assert_eq!(
      parse_entry("Pip\nTerrier").unwrap_err(),
      ParseError::MissingField {
        identifier: "Pip".to_string(),
        field: "age/sex",
      }
    );
    assert!(matches!(
      parse_entry("   \n").unwrap_err(),
      ParseError::MissingField { field: "name", .. }
    ));
  }

  #[test]
  fn test_whitespace_and_blank_lines_are_ignored() {
    let entry = parse_entry("\n  Bruno \n\n Beagle\n 3 years - Male \n").unwrap();
    assert_eq!(entry.identifier, "Bruno");
    assert_eq!(entry.breed, "Beagle");
    assert_eq!(entry.age, "3 years");
  }

  #[test]
  fn test_duplicate_identifier_rejected() {
    let err = build_snapshot(
      ["Rex\nLab\n2 years - Male", "Rex\nBoxer\n5 years - Male"],
      now(),
    )
    .unwrap_err();
    assert_eq!(
      err,
      ParseError::DuplicateIdentifier {
        identifier: "Rex".to_string()
      }
    );
  }

  #[test]
  fn test_fails_on_first_malformed_block() {
    let err = build_snapshot(
      [
        "Rex\nLab\n2 years - Male",
        "Duke\nMutt\nsenior",
        "Pip\nTerrier\n4 years - Unknown",
      ],
      now(),
    )
    .unwrap_err();
    assert_eq!(err.identifier(), "Duke");
  }

  #[test]
  fn test_empty_input_gives_empty_snapshot() {
    let snapshot = build_snapshot(Vec::<String>::new(), now()).unwrap();
    assert!(snapshot.is_empty());
  }
}
