use std::borrow::Cow;

use crate::feed::{ChannelFields, ItemFields};
use crate::util::escape_html;

/// Output switches. The defaults reproduce the historical page layout
/// byte for byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape field text and href values before interpolation.
    pub escape_text: bool,
    /// Emit `<body>` in the index header; without it the index closes a
    /// body it never opened.
    pub open_index_body: bool,
}

impl RenderOptions {
    fn text<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.escape_text {
            escape_html(s)
        } else {
            Cow::Borrowed(s)
        }
    }
}

fn line(out: &mut String, s: &str) {
    out.push_str(s);
    out.push('\n');
}

/// Document shell, linked heading, description and the table header row.
pub fn render_header(channel: &ChannelFields, options: RenderOptions) -> String {
    let title = options.text(&channel.title);
    let link = options.text(&channel.link);
    let description = options.text(&channel.description);

    let mut out = String::with_capacity(256);
    line(&mut out, "<html>");
    line(&mut out, "<head>");
    line(&mut out, "<title>");
    line(&mut out, &title);
    line(&mut out, "</title>");
    line(&mut out, "</head>");
    line(&mut out, "<body>");
    line(&mut out, "<h1>");
    line(&mut out, &format!("<a href=\"{link}\"> {title}</a>"));
    line(&mut out, "</h1>");
    line(&mut out, "<p>");
    line(&mut out, &description);
    line(&mut out, "</p>");
    line(&mut out, "<table border=\"1\">");
    line(&mut out, "<tr>");
    for heading in ["Date", "Source", "News"] {
        line(&mut out, "<th>");
        line(&mut out, heading);
        line(&mut out, "</th>");
    }
    line(&mut out, "</tr>");
    out
}

/// Closes the table, body and document opened by [`render_header`].
pub fn render_footer() -> String {
    "</table>\n</body>\n</html>\n".to_string()
}

/// One `<tr>` with Date, Source and News cells.
pub fn render_item_row(item: &ItemFields, options: RenderOptions) -> String {
    let source_name = options.text(&item.source_name);
    let news = options.text(&item.news);

    let mut out = String::with_capacity(128);
    line(&mut out, "<tr>");

    line(&mut out, "<td>");
    line(&mut out, &options.text(&item.pub_date));
    line(&mut out, "</td>");

    line(&mut out, "<td>");
    if item.source_url.is_empty() {
        line(&mut out, &source_name);
    } else {
        let url = options.text(&item.source_url);
        line(&mut out, &format!("<a href=\"{url}\">{source_name}</a>"));
    }
    line(&mut out, "</td>");

    line(&mut out, "<td>");
    match &item.link {
        Some(link) => {
            let link = options.text(link);
            line(&mut out, &format!("<a href=\"{link}\">{news}</a>"));
        }
        None => line(&mut out, &news),
    }
    line(&mut out, "</td>");

    line(&mut out, "</tr>");
    out
}

/// Index document shell up to the opening `<ul>`.
pub fn render_index_header(title: &str, options: RenderOptions) -> String {
    let title = options.text(title);

    let mut out = String::with_capacity(96);
    line(&mut out, "<html>");
    line(&mut out, "<head>");
    line(&mut out, "<title>");
    line(&mut out, &title);
    line(&mut out, "</title>");
    line(&mut out, "</head>");
    if options.open_index_body {
        line(&mut out, "<body>");
    }
    line(&mut out, "<h1>");
    line(&mut out, &title);
    line(&mut out, "</h1>");
    line(&mut out, "<ul>");
    out
}

/// One list item linking `name` to the generated page `file`.
pub fn render_index_entry(name: &str, file: &str, options: RenderOptions) -> String {
    format!(
        "<li><a href=\"{}\">{}</a></li>\n",
        options.text(file),
        options.text(name)
    )
}

pub fn render_index_footer() -> String {
    "</ul>\n</body>\n</html>\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn channel() -> ChannelFields {
        ChannelFields {
            title: "World News".into(),
            link: "https://news.example".into(),
            description: "Top stories".into(),
        }
    }

    fn item() -> ItemFields {
        ItemFields {
            pub_date: "Mon, 13 Oct 2026 09:00:00 GMT".into(),
            source_name: "Wire".into(),
            source_url: "https://wire.example".into(),
            news: "Headline".into(),
            link: Some("https://news.example/1".into()),
        }
    }

    #[test]
    fn test_header_layout() {
        let expected = "<html>\n<head>\n<title>\nWorld News\n</title>\n</head>\n<body>\n\
<h1>\n<a href=\"https://news.example\"> World News</a>\n</h1>\n<p>\nTop stories\n</p>\n\
<table border=\"1\">\n<tr>\n<th>\nDate\n</th>\n<th>\nSource\n</th>\n<th>\nNews\n</th>\n</tr>\n";
        assert_eq!(render_header(&channel(), RenderOptions::default()), expected);
    }

    #[test]
    fn test_footer_layout() {
        assert_eq!(render_footer(), "</table>\n</body>\n</html>\n");
    }

    #[test]
    fn test_item_row_with_links() {
        let expected = "<tr>\n<td>\nMon, 13 Oct 2026 09:00:00 GMT\n</td>\n<td>\n\
<a href=\"https://wire.example\">Wire</a>\n</td>\n<td>\n\
<a href=\"https://news.example/1\">Headline</a>\n</td>\n</tr>\n";
        assert_eq!(render_item_row(&item(), RenderOptions::default()), expected);
    }

    #[test]
    fn test_item_row_without_links() {
        let mut fields = item();
        fields.source_url.clear();
        fields.link = None;
        let row = render_item_row(&fields, RenderOptions::default());
        assert!(row.contains("<td>\nWire\n</td>"));
        assert!(row.contains("<td>\nHeadline\n</td>"));
        assert!(!row.contains("<a "));
    }

    #[test]
    fn test_item_row_empty_link_still_anchors() {
        let mut fields = item();
        fields.link = Some(String::new());
        let row = render_item_row(&fields, RenderOptions::default());
        assert!(row.contains("<a href=\"\">Headline</a>"));
    }

    #[test]
    fn test_raw_text_by_default() {
        let mut fields = item();
        fields.news = "Tom & Jerry <3".into();
        let row = render_item_row(&fields, RenderOptions::default());
        assert!(row.contains("Tom & Jerry <3"));
    }

    #[test]
    fn test_escape_text_option() {
        let mut fields = item();
        fields.news = "Tom & Jerry <3".into();
        fields.link = Some("https://x.example/?a=1&b=\"2\"".into());
        let options = RenderOptions {
            escape_text: true,
            ..RenderOptions::default()
        };
        let row = render_item_row(&fields, options);
        assert!(row.contains(
            "<a href=\"https://x.example/?a=1&amp;b=&quot;2&quot;\">Tom &amp; Jerry &lt;3</a>"
        ));
    }

    #[test]
    fn test_index_layout_preserves_missing_body() {
        let mut page = render_index_header("My Feeds", RenderOptions::default());
        page.push_str(&render_index_entry("Feed One", "f1.html", RenderOptions::default()));
        page.push_str(&render_index_footer());

        let expected = "<html>\n<head>\n<title>\nMy Feeds\n</title>\n</head>\n<h1>\nMy Feeds\n</h1>\n\
<ul>\n<li><a href=\"f1.html\">Feed One</a></li>\n</ul>\n</body>\n</html>\n";
        assert_eq!(page, expected);
    }

    #[test]
    fn test_index_body_option() {
        let options = RenderOptions {
            open_index_body: true,
            ..RenderOptions::default()
        };
        let header = render_index_header("My Feeds", options);
        assert!(header.contains("</head>\n<body>\n<h1>"));
    }

    proptest! {
        #[test]
        fn prop_item_row_is_deterministic(
            date in ".{0,24}",
            source in ".{0,24}",
            url in ".{0,24}",
            news in ".{0,48}",
            link in proptest::option::of(".{0,24}"),
            escape_text in any::<bool>(),
        ) {
            let fields = ItemFields {
                pub_date: date,
                source_name: source,
                source_url: url,
                news,
                link,
            };
            let options = RenderOptions { escape_text, open_index_body: false };
            prop_assert_eq!(render_item_row(&fields, options), render_item_row(&fields, options));
        }

        #[test]
        fn prop_header_is_deterministic(title in ".{0,32}", link in ".{0,32}", description in ".{0,64}") {
            let fields = ChannelFields { title, link, description };
            let options = RenderOptions::default();
            prop_assert_eq!(render_header(&fields, options), render_header(&fields, options));
        }
    }
}
