//! Layouts of the trusted news sources. Adding a source means adding a
//! module here and listing it in [`all`].

pub mod annapurna;
pub mod himalayan_times;
pub mod kathmandu_post;
pub mod nepali_times;
pub mod online_khabar;

use crate::layout::SiteLayout;

/// Every known site, in dispatch order.
pub fn all() -> [SiteLayout; 5] {
    [
        online_khabar::LAYOUT,
        kathmandu_post::LAYOUT,
        himalayan_times::LAYOUT,
        nepali_times::LAYOUT,
        annapurna::LAYOUT,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_layout_parses_against_empty_page() {
        for layout in all() {
            let page = layout.extract("<html></html>").unwrap();
            assert!(!page.has_heading(), "{}", layout.label);
            assert!(!page.has_body(), "{}", layout.label);
        }
    }

    #[test]
    fn hosts_do_not_shadow_each_other() {
        let layouts = all();
        let hosts: HashSet<_> = layouts.iter().map(|l| l.host).collect();
        assert_eq!(hosts.len(), layouts.len());
        for a in &layouts {
            for b in &layouts {
                if a.host != b.host {
                    assert!(!a.host.contains(b.host), "{} shadows {}", b.host, a.host);
                }
            }
        }
    }
}
