use crate::layout::SiteLayout;

pub const LAYOUT: SiteLayout = SiteLayout {
    host: "nepalitimes.com",
    label: "Nepali Times",
    heading: "#__next > div > main > div > div.mainCols.article > div.main--left > article > h1",
    body: "#__next > div > main > div > div.mainCols.article > div.main--left \
           > article > div.article__text",
};
