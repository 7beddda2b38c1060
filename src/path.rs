//! Output-document addresses derived from the schema nesting.
use std::fmt;
use std::str::FromStr;

/// `$.address.city` (rooted) or `.phones` (relative, for array element templates).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathExpr {
    rooted: bool,
    segments: Vec<String>,
}

impl PathExpr {
    pub fn root() -> Self {
        Self { rooted: true, segments: Vec::new() }
    }
    pub fn relative(segment: &str) -> Self {
        Self { rooted: false, segments: vec![segment.to_owned()] }
    }
    /// New path one level below `self`.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Self { rooted: self.rooted, segments }
    }
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
    /// Path with the last segment removed (the root stays the root).
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { rooted: self.rooted, segments }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            f.write_str("$")?;
        }
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathExpr {
    type Err = String;

    /// Parses the display form. Segments containing `.` cannot round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rooted, rest) = match s.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if rest.is_empty() {
            return if rooted { Ok(Self::root()) } else { Err("empty path".into()) };
        }
        let Some(rest) = rest.strip_prefix('.') else {
            return Err(format!("path `{s}` must start with `$.` or `.`"));
        };
        let segments = rest.split('.').map(str::to_owned).collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            return Err(format!("path `{s}` has an empty segment"));
        }
        Ok(Self { rooted, segments })
    }
}
