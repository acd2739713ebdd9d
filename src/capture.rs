//! Capture normalization: turns raw `(name, text, location)` tuples from a
//! CST query into validated `CaptureNode`s.
//!
//! CST parsing itself is an external collaborator; this module only
//! validates and categorizes what the embedder's parser already produced,
//! against a fixed capture vocabulary and the
//! `@[a-z_]+\.[a-z_]+(\.[a-z_]+)?` name grammar (max depth 3).

use crate::error::ScopeGraphError;
use crate::ids::Location;

/// The two mandatory segments of a capture name: `@category.entity`, plus an
/// optional third `.qualifier` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNode {
    pub category: String,
    pub entity: String,
    pub qualifier: Option<String>,
    pub location: Location,
    pub text: String,
}

impl CaptureNode {
    /// The dotted capture name this node was normalized from, e.g.
    /// `@scope.function` or `@reference.call`.
    pub fn name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("@{}.{}.{}", self.category, self.entity, q),
            None => format!("@{}.{}", self.category, self.entity),
        }
    }
}

fn is_lower_snake(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Validate a raw capture name against the schema grammar
/// `@[a-z_]+\.[a-z_]+(\.[a-z_]+)?`, max depth 3.
///
/// Returns `None` for malformed names: dropping the capture is non-fatal,
/// the caller never raises for it.
fn parse_capture_name(raw: &str) -> Option<(String, String, Option<String>)> {
    let rest = raw.strip_prefix('@')?;
    let segments: Vec<&str> = rest.split('.').collect();
    if segments.len() < 2 || segments.len() > 3 {
        return None;
    }
    if !segments.iter().all(|s| is_lower_snake(s)) {
        return None;
    }
    let category = segments[0].to_string();
    let entity = segments[1].to_string();
    let qualifier = segments.get(2).map(|s| s.to_string());
    Some((category, entity, qualifier))
}

/// Normalize one raw capture. Malformed captures are silently dropped
/// (returns `Ok(None)`); only truly fatal cases (handled by the caller's
/// empty-name check) produce an error.
pub fn normalize(raw_name: &str, text: &str, location: Location) -> Result<Option<CaptureNode>, ScopeGraphError> {
    let Some((category, entity, qualifier)) = parse_capture_name(raw_name) else {
        tracing::debug!(capture = raw_name, "dropping malformed capture name");
        return Ok(None);
    };
    Ok(Some(CaptureNode {
        category,
        entity,
        qualifier,
        location,
        text: text.to_string(),
    }))
}

/// Normalize a whole batch, dropping malformed entries and preserving
/// source order (captures must be processed in ascending position order).
pub fn normalize_all(
    raw: impl IntoIterator<Item = (String, String, Location)>,
) -> Result<Vec<CaptureNode>, ScopeGraphError> {
    let mut out = Vec::new();
    for (name, text, location) in raw {
        if let Some(node) = normalize(&name, &text, location)? {
            out.push(node);
        }
    }
    out.sort_by(|a, b| {
        (
            a.location.start_line,
            a.location.start_column,
            a.location.end_line,
            a.location.end_column,
        )
            .cmp(&(
                b.location.start_line,
                b.location.start_column,
                b.location.end_line,
                b.location.end_column,
            ))
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FilePath;

    fn loc() -> Location {
        Location::new(FilePath::new("t.ts"), 1, 0, 1, 10)
    }

    #[test]
    fn valid_two_segment_capture() {
        let node = normalize("@scope.function", "foo", loc()).unwrap().unwrap();
        assert_eq!(node.category, "scope");
        assert_eq!(node.entity, "function");
        assert_eq!(node.qualifier, None);
        assert_eq!(node.name(), "@scope.function");
    }

    #[test]
    fn valid_three_segment_capture() {
        let node = normalize("@reference.call.method", "x", loc()).unwrap().unwrap();
        assert_eq!(node.qualifier.as_deref(), Some("method"));
    }

    #[test]
    fn malformed_capture_is_dropped_not_errored() {
        let result = normalize("@Scope.Function", "foo", loc()).unwrap();
        assert!(result.is_none());

        let too_deep = normalize("@a.b.c.d", "foo", loc()).unwrap();
        assert!(too_deep.is_none());

        let no_prefix = normalize("scope.function", "foo", loc()).unwrap();
        assert!(no_prefix.is_none());
    }

    #[test]
    fn normalize_all_sorts_by_position() {
        let f = FilePath::new("t.ts");
        let later = Location::new(f.clone(), 5, 0, 5, 1);
        let earlier = Location::new(f, 1, 0, 1, 1);
        let nodes = normalize_all(vec![
            ("@scope.function".into(), "b".into(), later),
            ("@scope.function".into(), "a".into(), earlier),
        ])
        .unwrap();
        assert_eq!(nodes[0].text, "a");
        assert_eq!(nodes[1].text, "b");
    }
}
