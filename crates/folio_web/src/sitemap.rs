use chrono::{DateTime, SecondsFormat, Utc};

struct Page {
    path: &'static str,
    change_frequency: &'static str,
    priority: f32,
}

const PAGES: &[Page] = &[
    Page { path: "", change_frequency: "monthly", priority: 1.0 },
    Page { path: "/projects", change_frequency: "weekly", priority: 0.8 },
    Page { path: "/articles", change_frequency: "weekly", priority: 0.8 },
];

pub fn render(site_url: &str, last_modified: DateTime<Utc>) -> String {
    let base = site_url.trim_end_matches('/');
    let lastmod = last_modified.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for page in PAGES {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            base, page.path, lastmod, page.change_frequency, page.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_sitemap() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let xml = render("https://example.dev/", when);

        assert!(xml.contains("<loc>https://example.dev</loc>"));
        assert!(xml.contains("<loc>https://example.dev/projects</loc>"));
        assert!(xml.contains("<loc>https://example.dev/articles</loc>"));
        assert!(xml.contains("<lastmod>2024-06-01T00:00:00Z</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), 3);
    }
}
