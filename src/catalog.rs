//! Problem catalog: load-time validation and random selection.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::ProblemCfg;
use crate::domain::{Algorithm, Problem};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("problem {id}: unknown algorithm tag '{tag}'")]
  UnknownAlgorithm { id: String, tag: String },
  #[error("problem {id}: algorithm '{alg}' needs a non-empty input")]
  EmptyInput { id: String, alg: Algorithm },
  #[error("problem {id}: algorithm '{alg}' needs a target")]
  MissingTarget { id: String, alg: Algorithm },
  #[error("problem {id}: duplicate id")]
  DuplicateId { id: String },
}

/// Turn a raw entry into a `Problem`, or explain why it is unusable.
pub fn validate(entry: &ProblemCfg) -> Result<Problem, CatalogError> {
  let id = entry
    .id
    .clone()
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| Uuid::new_v4().to_string());
  let algorithm = Algorithm::from(entry.alg.as_str());

  if let Algorithm::Other(tag) = &algorithm {
    return Err(CatalogError::UnknownAlgorithm { id, tag: tag.clone() });
  }
  if algorithm.requires_input() && entry.input.is_empty() {
    return Err(CatalogError::EmptyInput { id, alg: algorithm });
  }
  if algorithm.requires_target() && entry.target.is_none() {
    return Err(CatalogError::MissingTarget { id, alg: algorithm });
  }

  Ok(Problem {
    id,
    algorithm,
    prompt: entry.prompt.clone(),
    input: entry.input.clone(),
    target: entry.target,
  })
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
  problems: Vec<Problem>,
}

impl Catalog {
  /// Build from configured entries first, then built-in seeds.
  /// Invalid entries are logged and skipped; the first occurrence of an id wins.
  pub fn load(configured: &[ProblemCfg], seeds: &[ProblemCfg]) -> Self {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();

    for (entry, source) in configured
      .iter()
      .map(|e| (e, "config"))
      .chain(seeds.iter().map(|e| (e, "seed")))
    {
      let checked = validate(entry).and_then(|p| {
        if seen.contains(&p.id) {
          Err(CatalogError::DuplicateId { id: p.id })
        } else {
          Ok(p)
        }
      });
      match checked {
        Ok(p) => {
          seen.insert(p.id.clone());
          problems.push(p);
        }
        Err(e) => error!(target: "catalog", %source, error = %e, "Skipping bank item"),
      }
    }

    info!(target: "catalog", count = problems.len(), "Problem catalog loaded");
    Self { problems }
  }

  pub fn all(&self) -> &[Problem] {
    &self.problems
  }

  pub fn get(&self, id: &str) -> Option<&Problem> {
    self.problems.iter().find(|p| p.id == id)
  }

  pub fn is_empty(&self) -> bool {
    self.problems.is_empty()
  }

  /// Random problem, avoiding `exclude` whenever another one exists.
  pub fn pick(&self, exclude: Option<&str>) -> Option<&Problem> {
    let pool: Vec<&Problem> = self
      .problems
      .iter()
      .filter(|p| Some(p.id.as_str()) != exclude)
      .collect();
    match pool.choose(&mut rand::thread_rng()) {
      Some(p) => Some(*p),
      None => self.problems.first(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_problems;

  fn cfg(id: Option<&str>, alg: &str, input: Vec<i64>, target: Option<i64>) -> ProblemCfg {
    ProblemCfg {
      id: id.map(Into::into),
      alg: alg.into(),
      prompt: "p".into(),
      input,
      target,
    }
  }

  #[test]
  fn seeds_are_all_valid() {
    let catalog = Catalog::load(&[], &seed_problems());
    assert_eq!(catalog.all().len(), 6);
    assert_eq!(catalog.get("xor_1").unwrap().target, Some(6));
  }

  #[test]
  fn malformed_entries_are_rejected() {
    assert!(matches!(
      validate(&cfg(Some("a"), "floyd", vec![1], None)),
      Err(CatalogError::UnknownAlgorithm { .. })
    ));
    assert!(matches!(
      validate(&cfg(Some("b"), "moore", vec![], None)),
      Err(CatalogError::EmptyInput { .. })
    ));
    assert!(matches!(
      validate(&cfg(Some("c"), "prefix_xor", vec![1], None)),
      Err(CatalogError::MissingTarget { .. })
    ));
    // Empty input is fine for maximum subarray.
    assert!(validate(&cfg(Some("d"), "kadane", vec![], None)).is_ok());
  }

  #[test]
  fn missing_id_gets_generated() {
    let p = validate(&cfg(None, "longcon", vec![1, 2], None)).unwrap();
    assert!(!p.id.is_empty());
  }

  #[test]
  fn configured_entries_win_over_seeds_and_bad_ones_are_skipped() {
    let configured = vec![
      cfg(Some("kadane_1"), "kadane", vec![5], None),
      cfg(Some("broken"), "nope", vec![1], None),
    ];
    let catalog = Catalog::load(&configured, &seed_problems());
    assert_eq!(catalog.all().len(), 6);
    assert_eq!(catalog.get("kadane_1").unwrap().input, vec![5]);
    assert!(catalog.get("broken").is_none());
  }

  #[test]
  fn pick_avoids_excluded_when_possible() {
    let catalog = Catalog::load(&[], &seed_problems());
    for _ in 0..50 {
      assert_ne!(catalog.pick(Some("moore_1")).unwrap().id, "moore_1");
    }

    let single = Catalog::load(&[cfg(Some("only"), "kadane", vec![1], None)], &[]);
    assert_eq!(single.pick(Some("only")).unwrap().id, "only");
    assert!(Catalog::default().pick(None).is_none());
  }
}
