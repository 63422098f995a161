//! HTML parsing and sub-tree selection.
//!
//! This module provides the [`Document`] and [`Element`] types the content
//! narrower uses to parse a page and pick out its main content with a CSS
//! selector.
//!
//! # Example
//!
//! ```rust
//! use llms_txt_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <nav>Menu</nav>
//!             <main><h1>Title</h1></main>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let main = doc.select_first("main")?.unwrap();
//! assert_eq!(main.outer_html(), "<main><h1>Title</h1></main>");
//! # Ok::<(), llms_txt_core::LlmsTxtError>(())
//! ```

use scraper::{Html, Selector};

use crate::{LlmsTxtError, Result};

/// A parsed HTML document.
///
/// Parsing itself never fails: malformed markup is repaired by the HTML5
/// tree builder the way a browser would.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects the first element in document order matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmsTxtError::HtmlParseError`] if the selector is invalid.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| LlmsTxtError::HtmlParseError(format!("Invalid selector: {}", e)))?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Whether any node sits more than `limit` levels below the document root.
    ///
    /// Walks ancestor chains iteratively and stops counting at `limit + 1`,
    /// so arbitrarily deep trees are safe to inspect.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        self.html
            .root_element()
            .descendants()
            .any(|node| node.ancestors().take(limit + 1).count() > limit)
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the outer HTML of this element, including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }
}
