//! Bypass - the main entry point for markdown to styled text conversion.

use bypass_core::{
    render, render_iterative, DisplayMetrics, Document, RenderOptions, StyledText, StylePolicy,
    UnitScale,
};

use crate::Result;

/// The main service for rendering markdown into styled text runs.
///
/// A service is immutable once built and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Bypass {
    policy: StylePolicy,
    bounded_stack: bool,
}

impl Bypass {
    /// Create a service with default options on a baseline screen
    pub fn new() -> Self {
        Self::with_policy(StylePolicy::default())
    }

    /// Create a service with custom options, resolving indents with `scale`
    pub fn with_options(options: RenderOptions, scale: &impl UnitScale) -> Self {
        Self::with_policy(StylePolicy::new(options, scale))
    }

    /// Create a service from an already resolved policy
    pub fn with_policy(policy: StylePolicy) -> Self {
        Self {
            policy,
            bounded_stack: false,
        }
    }

    /// Render with an explicit stack so deeply nested input cannot
    /// exhaust the thread's stack
    pub fn with_bounded_stack(mut self) -> Self {
        self.bounded_stack = true;
        self
    }

    /// Get the resolved style policy
    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    /// Get the current options
    pub fn options(&self) -> &RenderOptions {
        self.policy.options()
    }

    /// Render an already parsed document
    pub fn render(&self, document: &Document) -> Result<StyledText> {
        if self.bounded_stack {
            render_iterative(document, &self.policy)
        } else {
            render(document, &self.policy)
        }
    }

    /// Parse markdown and render it
    #[cfg(feature = "markdown")]
    pub fn markdown_to_styled(&self, markdown: &str) -> Result<StyledText> {
        let document = crate::markdown::parse_markdown(markdown);
        self.render(&document)
    }
}

impl Default for Bypass {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DisplayMetrics> for Bypass {
    fn from(metrics: DisplayMetrics) -> Self {
        Self::with_options(RenderOptions::default(), &metrics)
    }
}
