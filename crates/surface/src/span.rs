use core::{
  fmt,
  fmt::Debug,
  ops,
  sync::atomic::{AtomicU16, Ordering},
};

static NEXT_FILE_ID: AtomicU16 = AtomicU16::new(1);

/// An interned file.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FileId(u16);

impl FileId {
  pub const UNKNOWN: FileId = FileId(0);

  /// Creates a span for a byte range of this file.
  pub fn span(self, range: ops::Range<usize>) -> Span {
    Span::new(self, Pos(range.start as u32), Pos(range.end as u32))
  }

  pub fn next() -> Self {
    FileId(NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst))
  }
}

impl Default for FileId {
  #[inline]
  fn default() -> Self {
    FileId::UNKNOWN
  }
}

/// A byte offset into a file.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos(u32);

impl Pos {
  pub const ZERO: Pos = Pos(0);

  #[inline]
  pub const fn to_usize(self) -> usize {
    self.0 as usize
  }
}

impl Default for Pos {
  #[inline]
  fn default() -> Self {
    Pos::ZERO
  }
}

impl Debug for Pos {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    Debug::fmt(&self.0, f)
  }
}

/// A source region: file plus start/end byte offsets.
///
/// `Span::SYNTHETIC` marks nodes injected by a later stage rather than read
/// from a file; diagnostics must never attribute those to a real location.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Span {
  file: FileId,
  start: Pos,
  end: Pos,
}

impl Span {
  pub const SYNTHETIC: Span = Span {
    file: FileId::UNKNOWN,
    start: Pos::ZERO,
    end: Pos::ZERO,
  };

  #[inline]
  pub const fn new(file: FileId, start: Pos, end: Pos) -> Self {
    Span { file, start, end }
  }

  #[inline]
  pub const fn file(&self) -> FileId {
    self.file
  }

  #[inline]
  pub const fn start(&self) -> Pos {
    self.start
  }

  #[inline]
  pub const fn end(&self) -> Pos {
    self.end
  }

  #[inline]
  pub fn is_synthetic(&self) -> bool {
    self.file == FileId::UNKNOWN
  }
}

impl Default for Span {
  #[inline]
  fn default() -> Self {
    Span::SYNTHETIC
  }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_synthetic() {
      f.write_str("<synthetic>")
    } else {
      write!(
        f,
        "{}..{}",
        self.start.to_usize(),
        self.end.to_usize()
      )
    }
  }
}
