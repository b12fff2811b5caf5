use crate::layout::SiteLayout;

pub const LAYOUT: SiteLayout = SiteLayout {
    host: "english.onlinekhabar.com",
    label: "Online Khabar",
    heading: "#primary > div > div > div.ok-details-content-left > div.ok-post-header > h1",
    body: "#primary > div > div > div.ok-details-content-left > div.post-content-wrap",
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NO_HEADING;

    #[test]
    fn extracts_post_content() {
        let html = r#"<html><body><div id="primary"><div><div>
          <div class="ok-details-content-left">
            <div class="ok-post-header"><h1>NEPSE gains 30 points</h1></div>
            <div class="post-content-wrap">
              <p>The index closed at 2,731 points.</p>
              <div class="ok-ad"><p></p></div>
              <p>Turnover stood at Rs 5 billion.</p>
            </div>
          </div>
        </div></div></div></body></html>"#;

        let page = LAYOUT.extract(html).unwrap();
        assert_eq!(page.heading, "NEPSE gains 30 points");
        assert_eq!(
            page.body,
            "The index closed at 2,731 points.\n\nTurnover stood at Rs 5 billion."
        );
    }

    #[test]
    fn body_without_header_still_extracts() {
        let html = r#"<div id="primary"><div><div><div class="ok-details-content-left">
            <div class="post-content-wrap"><p>Only body.</p></div>
        </div></div></div></div>"#;

        let page = LAYOUT.extract(html).unwrap();
        assert_eq!(page.heading, NO_HEADING);
        assert_eq!(page.body, "Only body.");
    }
}
