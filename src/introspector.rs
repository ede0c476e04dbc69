use crate::error::Result;
use crate::handler_index::HandlerIndex;
use log::debug;

/// Title and body text recovered from a handler's doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescription {
    pub short: String,
    pub long: String,
}

/// Reads route descriptions from handler doc comments.
pub struct RouteIntrospector<'a> {
    index: &'a HandlerIndex,
}

impl<'a> RouteIntrospector<'a> {
    pub fn new(index: &'a HandlerIndex) -> Self {
        Self { index }
    }

    /// Describes the handler named by `handler`.
    ///
    /// An undocumented handler yields two empty strings; an unknown one is a
    /// [`crate::error::Error::HandlerResolution`].
    pub fn describe(&self, handler: &str) -> Result<RouteDescription> {
        let decl = self.index.resolve(handler)?;
        debug!("Describing handler {} from {}", handler, decl.file.display());
        Ok(split_doc(&decl.doc))
    }
}

/// Splits doc text into its summary and the remaining body.
///
/// The summary runs until the first blank line, or through the first line
/// that ends with a period, whichever comes first. Summary lines are joined
/// with spaces; the body keeps its line breaks.
pub fn split_doc(doc: &str) -> RouteDescription {
    let lines: Vec<&str> = doc.lines().skip_while(|l| l.trim().is_empty()).collect();

    let mut summary = Vec::new();
    let mut consumed = 0;
    for line in &lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        summary.push(trimmed);
        consumed += 1;
        if trimmed.ends_with('.') {
            break;
        }
    }

    RouteDescription {
        short: summary.join(" "),
        long: lines[consumed..].join("\n").trim().to_string(),
    }
}
