// Directory-listing line parsing

/// Classification of one remote listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Turns one raw listing line into a classified entry, or `None` when the
/// line does not match the expected format. Implementations must be pure so
/// a malformed line never poisons the rest of a listing.
pub trait ListingParser: Send + Sync {
    fn parse_line(&self, line: &str) -> Option<RemoteEntry>;
}

/// Parser for conventional Unix long-listing output
/// (`drwxr-xr-x  2 owner group 4096 Jan  1 00:00 name`).
///
/// Servers emitting other formats (e.g. MS-DOS style LIST output) need a
/// different `ListingParser` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixListingParser;

impl ListingParser for UnixListingParser {
    fn parse_line(&self, line: &str) -> Option<RemoteEntry> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 9 {
            return None;
        }
        let kind = if tokens[0].starts_with('d') {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        // the name starts at the ninth field and may itself contain spaces
        Some(RemoteEntry {
            name: tokens[8..].join(" "),
            kind,
        })
    }
}
