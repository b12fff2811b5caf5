use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};

pub const NO_HEADING: &str = "No heading found";
pub const NO_BODY: &str = "No body content found";

/// Where one site keeps its article heading and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteLayout {
    /// Substring matched against the lower-cased article link.
    pub host: &'static str,
    /// Attribution label shown to readers.
    pub label: &'static str,
    pub heading: &'static str,
    /// Container whose `<p>` descendants make up the article body.
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub heading: String,
    pub body: String,
}

impl ExtractedPage {
    pub fn has_heading(&self) -> bool {
        self.heading != NO_HEADING
    }

    pub fn has_body(&self) -> bool {
        self.body != NO_BODY
    }
}

impl SiteLayout {
    /// Pull heading and body out of a fetched page. A missing heading or
    /// body container yields its sentinel rather than an error.
    pub fn extract(&self, html: &str) -> Result<ExtractedPage> {
        let heading_sel = parse_selector(self.heading)?;
        let body_sel = parse_selector(self.body)?;
        let paragraph_sel = parse_selector("p")?;

        let document = Html::parse_document(html);

        let heading = document
            .select(&heading_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_HEADING.to_string());

        let body = match document.select(&body_sel).next() {
            Some(container) => container
                .select(&paragraph_sel)
                .map(element_text)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
            None => NO_BODY.to_string(),
        };

        Ok(ExtractedPage { heading, body })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// All text nodes under `el`, whitespace collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: SiteLayout = SiteLayout {
        host: "example.com",
        label: "Example",
        heading: "article > h1",
        body: "article > div.text",
    };

    #[test]
    fn joins_paragraphs_with_blank_lines() {
        let html = r#"<html><body><article>
            <h1>  Flood   warning </h1>
            <div class="text"><p>First <b>para</b>.</p><p>   </p><div><p>Second.</p></div></div>
        </article></body></html>"#;
        let page = LAYOUT.extract(html).unwrap();
        assert_eq!(page.heading, "Flood warning");
        assert_eq!(page.body, "First para.\n\nSecond.");
    }

    #[test]
    fn missing_elements_yield_sentinels() {
        let page = LAYOUT.extract("<html><body><p>nothing</p></body></html>").unwrap();
        assert_eq!(page.heading, NO_HEADING);
        assert_eq!(page.body, NO_BODY);
        assert!(!page.has_heading());
        assert!(!page.has_body());
    }

    #[test]
    fn container_without_paragraphs_is_empty_body() {
        let html = r#"<article><h1>T</h1><div class="text">loose text</div></article>"#;
        let page = LAYOUT.extract(html).unwrap();
        assert_eq!(page.body, "");
        assert!(page.has_body());
    }

    #[test]
    fn bad_selector_is_reported() {
        let broken = SiteLayout {
            heading: "h1[[",
            ..LAYOUT
        };
        assert!(matches!(
            broken.extract("<h1>x</h1>"),
            Err(ScrapeError::Selector { .. })
        ));
    }
}
