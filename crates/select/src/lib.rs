//! File eligibility checks that run before a candidate ever reaches the
//! parser.
//!
//! Generated or minified templates are poor inputs: they are huge, they carry
//! no positions worth reporting, and they dominate processing time. This
//! stage weeds them out with two cheap heuristics (byte size and whitespace
//! density) plus a filesystem-access check, and reports the reason for every
//! skip so callers can log or count them.

use core::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

/// Thresholds for [`select`].
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
  /// Files larger than this are skipped without being read.
  pub max_bytes: u64,

  /// Files at least this large are subject to the whitespace check.
  /// Tiny files are exempt: a short one-liner is not "minified".
  pub minify_check_bytes: u64,

  /// Minimum fraction of whitespace bytes a checked file must contain.
  pub min_whitespace: f64,
}

impl Default for Criteria {
  fn default() -> Self {
    Criteria {
      max_bytes: 1024 * 1024,
      minify_check_bytes: 1024,
      min_whitespace: 0.05,
    }
  }
}

/// Why a candidate file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Too little whitespace for its size.
  Minified,

  /// Exceeds the maximum byte size.
  TooLarge,

  /// The file could not be stat'ed or read.
  NoAccess,
}

impl Display for SkipReason {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let s = match self {
      SkipReason::Minified => "too little whitespace for its size",
      SkipReason::TooLarge => "exceeds maximum byte size",
      SkipReason::NoAccess => "insufficient filesystem access",
    };

    f.write_str(s)
  }
}

/// The outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Accept,
  Skip(SkipReason),
}

impl Verdict {
  pub fn is_accepted(&self) -> bool {
    matches!(self, Verdict::Accept)
  }
}

/// Decides whether `path` is worth handing to the parser.
///
/// Size is checked from metadata first, so an oversized file is never read
/// into memory. Any filesystem error maps to [`SkipReason::NoAccess`]:
/// callers treat unreadable and ineligible files the same way.
pub fn select(path: &Path, criteria: &Criteria) -> Verdict {
  let len = match fs::metadata(path) {
    Ok(meta) => meta.len(),
    Err(err) => {
      log::debug!("skipping {}: {}", path.display(), err);
      return Verdict::Skip(SkipReason::NoAccess);
    }
  };

  if len > criteria.max_bytes {
    log::debug!("skipping {}: {} bytes", path.display(), len);
    return Verdict::Skip(SkipReason::TooLarge);
  }

  if len >= criteria.minify_check_bytes {
    let contents = match fs::read(path) {
      Ok(contents) => contents,
      Err(err) => {
        log::debug!("skipping {}: {}", path.display(), err);
        return Verdict::Skip(SkipReason::NoAccess);
      }
    };

    if whitespace_fraction(&contents) < criteria.min_whitespace {
      log::debug!("skipping {}: looks minified", path.display());
      return Verdict::Skip(SkipReason::Minified);
    }
  }

  Verdict::Accept
}

fn whitespace_fraction(contents: &[u8]) -> f64 {
  if contents.is_empty() {
    return 1.0;
  }

  let whitespace = contents.iter().filter(|b| b.is_ascii_whitespace()).count();

  whitespace as f64 / contents.len() as f64
}
