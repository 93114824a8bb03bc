// Remote path handling
use std::fmt;

/// A remote path held as a list of segments. Joining appends a segment and
/// rendering inserts exactly one `/` between segments, so a path rooted at
/// `/` can never produce a doubled separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    pub fn root() -> Self {
        RemotePath { segments: Vec::new() }
    }

    /// Splits on `/`, dropping empty segments; relative input is treated as
    /// rooted at `/`.
    pub fn parse(path: &str) -> Self {
        RemotePath {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        RemotePath { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final path segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("/")
        } else {
            for segment in &self.segments {
                write!(f, "/{}", segment)?;
            }
            Ok(())
        }
    }
}
