use crate::layout::SiteLayout;

pub const LAYOUT: SiteLayout = SiteLayout {
    host: "kathmandupost.com",
    label: "The Kathmandu Post",
    heading: "#mainContent > main > div > div:nth-child(2) > div.col-sm-8 > h1",
    body: "#mainContent > main > div > div:nth-child(2) > div.col-sm-8 \
           > div > div > div.subscribe--wrapperx > section",
};

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<html><body>
<div id="mainContent">
  <main>
    <div>
      <div class="breadcrumb"><a href="/national">National</a></div>
      <div class="row">
        <div class="col-sm-8">
          <h1>Government extends school closure in valley</h1>
          <div><div>
            <div class="subscribe--wrapperx">
              <section class="story-section">
                <p>The closure has been extended by a week.</p>
                <p></p>
                <p>Private schools have objected to the decision.</p>
              </section>
            </div>
          </div></div>
        </div>
        <div class="col-sm-4"><h1>Most read</h1></div>
      </div>
    </div>
  </main>
</div>
</body></html>"#;

    #[test]
    fn extracts_story_section() {
        let page = LAYOUT.extract(FIXTURE).unwrap();
        assert_eq!(page.heading, "Government extends school closure in valley");
        assert_eq!(
            page.body,
            "The closure has been extended by a week.\n\nPrivate schools have objected to the decision."
        );
    }
}
