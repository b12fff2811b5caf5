use crate::layout::SiteLayout;

pub const LAYOUT: SiteLayout = SiteLayout {
    host: "thehimalayantimes.com",
    label: "The Himalayan Times",
    heading: "body > main > div:nth-child(4) > div > div.col-md-8.col-xs-12 \
              > div.ht-article-details > article > h1",
    body: "body > main > div:nth-child(4) > div > div.col-md-8.col-xs-12 \
           > div.ht-article-details > article > div.post-content",
};
