//! Table styling for rich display surfaces.
//!
//! Notebook front-ends render result tables as HTML; the style directive
//! here left-aligns them as block elements. The surface the directive lands
//! on is passed in explicitly.

use crate::console::Console;
use crate::results_grid::ResultsGrid;
use std::io::Write;

/// CSS applied to result tables.
pub const TABLE_CSS: &str = "table {align:left;display:block}";

/// A CSS rule set to apply to subsequent renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDirective {
    css: String,
}

impl StyleDirective {
    pub fn new(css: impl Into<String>) -> Self {
        StyleDirective { css: css.into() }
    }

    /// The left-aligned, block-displayed table layout.
    pub fn table() -> Self {
        StyleDirective::new(TABLE_CSS)
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn to_html(&self) -> String {
        format!("<style>{}</style>", self.css)
    }
}

/// Anything that can take a rendering hint for later tabular output.
pub trait DisplaySurface {
    fn apply_style(&mut self, directive: &StyleDirective);
}

/// Applies the table style directive to `surface`.
pub fn apply_table_styling(surface: &mut dyn DisplaySurface) {
    surface.apply_style(&StyleDirective::table());
}

impl<W: Write> DisplaySurface for Console<W> {
    fn apply_style(&mut self, directive: &StyleDirective) {
        self.line(directive.to_html());
    }
}

/// Collects style directives and prefixes them to rendered HTML tables.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    directives: Vec<StyleDirective>,
}

impl HtmlSurface {
    pub fn new() -> Self {
        HtmlSurface::default()
    }

    pub fn directives(&self) -> &[StyleDirective] {
        &self.directives
    }

    /// Renders `grid` as HTML preceded by every applied directive.
    pub fn render(&self, grid: &ResultsGrid) -> String {
        let mut html: String = self.directives.iter().map(StyleDirective::to_html).collect();
        html.push_str(&grid.export_html());
        html
    }
}

impl DisplaySurface for HtmlSurface {
    fn apply_style(&mut self, directive: &StyleDirective) {
        // Re-applying the same rule is a no-op.
        if !self.directives.contains(directive) {
            self.directives.push(directive.clone());
        }
    }
}
