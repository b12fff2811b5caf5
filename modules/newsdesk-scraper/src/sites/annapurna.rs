use crate::layout::SiteLayout;

pub const LAYOUT: SiteLayout = SiteLayout {
    host: "theannapurnaexpress.com",
    label: "The Annapurna Express",
    heading: "body > main > section.section__wrapper.section__wrapper-detailPage \
              > div.background__overlay-top > div > div > div.single__column-info > h1",
    body: "body > main > section.section__wrapper.section__wrapper-detailPage \
           > div.custom-container > div > div > div.detail__left > div > div.content__description",
};

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<!doctype html>
<html><head><title>Annapurna Express</title></head>
<body>
<header><nav><a href="/">Home</a></nav></header>
<main>
  <section class="section__wrapper section__wrapper-detailPage">
    <div class="background__overlay-top">
      <div><div>
        <div class="single__column-info">
          <span class="category">National</span>
          <h1>Melamchi water supply resumes after repairs</h1>
        </div>
      </div></div>
    </div>
    <div class="custom-container">
      <div><div>
        <div class="detail__left">
          <div>
            <div class="content__description">
              <p>KATHMANDU: Water from Melamchi reached the valley on Monday.</p>
              <figure><img src="/pipe.jpg"><figcaption>Repaired tunnel</figcaption></figure>
              <p>Officials said supply would be regular from next week.</p>
            </div>
          </div>
        </div>
      </div></div>
    </div>
  </section>
</main>
</body></html>"#;

    #[test]
    fn extracts_heading_and_paragraphs() {
        let page = LAYOUT.extract(FIXTURE).unwrap();
        assert_eq!(page.heading, "Melamchi water supply resumes after repairs");
        assert_eq!(
            page.body,
            "KATHMANDU: Water from Melamchi reached the valley on Monday.\n\n\
             Officials said supply would be regular from next week."
        );
    }
}
