//! Integration tests for the feed-list → pages → index pipeline.
//!
//! Each test works in its own directory under the system temp dir and
//! reads feeds from local files, so no network access is needed.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rssagg::config::Config;
use rssagg::feed::{ContractError, FeedSource, SourceError};
use rssagg::pipeline::{Aggregator, PipelineError};

const NEWS_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>World News</title>
    <link>https://news.example</link>
    <description>Top stories</description>
    <language>en-us</language>
    <item>
      <title>Markets rally</title>
      <link>https://news.example/markets</link>
      <pubDate>Tue, 14 Oct 2026 08:00:00 GMT</pubDate>
      <source url="https://wire.example/rss">Wire</source>
    </item>
    <item>
      <description>&lt;b&gt;Breaking&lt;/b&gt; storm warning</description>
    </item>
  </channel>
</rss>"#;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rssagg_pipeline_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn aggregator() -> Aggregator {
    Aggregator::new(&Config::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn html_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".html"))
        .collect();
    names.sort();
    names
}

// ============================================================================
// Successful runs
// ============================================================================

#[tokio::test]
async fn test_single_feed_writes_page_and_index() {
    let dir = test_dir("single");
    let rss = write(&dir, "news.xml", NEWS_RSS);
    let list = write(
        &dir,
        "feeds.xml",
        &format!(
            r#"<feeds title="My Feeds"><feed url="{}" file="f1.html" name="Feed One"/></feeds>"#,
            rss.display()
        ),
    );
    let index_path = dir.join("index.html");

    let report = aggregator()
        .run(list.to_str().unwrap(), &index_path)
        .await
        .unwrap();

    assert_eq!(report.index, index_path);
    assert_eq!(report.feeds.len(), 1);
    assert_eq!(report.feeds[0].file, dir.join("f1.html"));
    assert_eq!(report.feeds[0].items, 2);

    let index = std::fs::read_to_string(&index_path).unwrap();
    assert_eq!(
        index,
        "<html>\n<head>\n<title>\nMy Feeds\n</title>\n</head>\n<h1>\nMy Feeds\n</h1>\n<ul>\n\
<li><a href=\"f1.html\">Feed One</a></li>\n</ul>\n</body>\n</html>\n"
    );
    assert_eq!(
        index
            .matches("<li><a href=\"f1.html\">Feed One</a></li>")
            .count(),
        1
    );

    let page = std::fs::read_to_string(dir.join("f1.html")).unwrap();
    assert!(page.contains("<a href=\"https://news.example\"> World News</a>"));
    assert!(page.contains("<p>\nTop stories\n</p>"));
    assert!(page.contains("<a href=\"https://wire.example/rss\">Wire</a>"));
    assert!(page.contains("<a href=\"https://news.example/markets\">Markets rally</a>"));
    assert!(page.contains("<td>\nBreaking storm warning\n</td>"));
    assert!(page.contains("<td>\nNo date available\n</td>"));
    assert!(page.contains("<td>\nNo source available\n</td>"));
    assert!(!page.contains("en-us"));

    assert_eq!(html_files(&dir), vec!["f1.html", "index.html"]);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_entries_follow_document_order() {
    let dir = test_dir("order");
    let rss = write(&dir, "news.xml", NEWS_RSS);
    let list = write(
        &dir,
        "feeds.xml",
        &format!(
            r#"<feeds title="Ordered">
  <feed url="{0}" file="b.html" name="Bravo"/>
  <note>not a feed</note>
  <feed url="{0}" file="a.html" name="Alpha"/>
</feeds>"#,
            rss.display()
        ),
    );
    let index_path = dir.join("index.html");

    let report = aggregator()
        .run(list.to_str().unwrap(), &index_path)
        .await
        .unwrap();
    assert_eq!(report.feeds.len(), 2);

    let index = std::fs::read_to_string(&index_path).unwrap();
    let bravo = index.find("Bravo").unwrap();
    let alpha = index.find("Alpha").unwrap();
    assert!(bravo < alpha);
    assert!(!index.contains("not a feed"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_escape_and_body_options() {
    let dir = test_dir("options");
    let rss = write(
        &dir,
        "news.xml",
        r#"<rss><channel><title>Tom &amp; Jerry</title><link>https://t.example</link>
<item><title>1 &lt; 2</title></item></channel></rss>"#,
    );
    let list = write(
        &dir,
        "feeds.xml",
        &format!(
            r#"<feeds title="A &amp; B"><feed url="{}" file="t.html" name="T &amp; J"/></feeds>"#,
            rss.display()
        ),
    );
    let index_path = dir.join("index.html");

    let config = Config {
        escape_text: true,
        open_index_body: true,
        ..Config::default()
    };
    Aggregator::new(&config)
        .unwrap()
        .run(list.to_str().unwrap(), &index_path)
        .await
        .unwrap();

    let index = std::fs::read_to_string(&index_path).unwrap();
    assert!(index.contains("</head>\n<body>\n<h1>\nA &amp; B\n</h1>"));
    assert!(index.contains("<li><a href=\"t.html\">T &amp; J</a></li>"));

    let page = std::fs::read_to_string(dir.join("t.html")).unwrap();
    assert!(page.contains("<title>\nTom &amp; Jerry\n</title>"));
    assert!(page.contains("<td>\n1 &lt; 2\n</td>"));

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Contract violations
// ============================================================================

async fn assert_invalid_list(name: &str, content: &str) {
    let dir = test_dir(name);
    let list = write(&dir, "feeds.xml", content);
    let index_path = dir.join("index.html");

    let err = aggregator()
        .run(list.to_str().unwrap(), &index_path)
        .await
        .unwrap_err();

    assert!(err.is_contract_violation(), "Expected contract violation, got {:?}", err);
    assert!(err.to_string().starts_with("Invalid file"), "{}", err);
    assert!(html_files(&dir).is_empty(), "No HTML may be written");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_wrong_root_label_writes_nothing() {
    assert_invalid_list(
        "wrong_root",
        r#"<rss title="x"><feed url="u1" file="f1.html" name="One"/></rss>"#,
    )
    .await;
}

#[tokio::test]
async fn test_missing_title_writes_nothing() {
    assert_invalid_list(
        "missing_title",
        r#"<feeds><feed url="u1" file="f1.html" name="One"/></feeds>"#,
    )
    .await;
}

#[tokio::test]
async fn test_empty_list_writes_nothing() {
    assert_invalid_list("empty_list", r#"<feeds title="x"/>"#).await;
}

#[tokio::test]
async fn test_incomplete_entry_writes_nothing() {
    let dir = test_dir("incomplete_entry");
    let list = write(
        &dir,
        "feeds.xml",
        r#"<feeds title="x"><feed url="u1" name="One"/></feeds>"#,
    );

    let err = aggregator()
        .run(list.to_str().unwrap(), &dir.join("index.html"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Contract(ContractError::MissingAttribute {
            attribute: "file",
            ..
        })
    ));
    assert!(html_files(&dir).is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Fatal feed failures
// ============================================================================

#[tokio::test]
async fn test_feed_is_loaded_from_entry_url() {
    let dir = test_dir("entry_url");
    let list = write(
        &dir,
        "feeds.xml",
        r#"<feeds title="My Feeds"><feed url="u1" file="f1.html" name="Feed One"/></feeds>"#,
    );

    let err = aggregator()
        .run(list.to_str().unwrap(), &dir.join("index.html"))
        .await
        .unwrap_err();

    match err {
        PipelineError::Source(SourceError::Io { path, .. }) => {
            assert_eq!(path, PathBuf::from("u1"));
        }
        other => panic!("Expected Io error for u1, got {:?}", other),
    }
    // The index is discarded when a feed fails
    assert!(html_files(&dir).is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_feed_without_channel_aborts_run() {
    let dir = test_dir("no_channel");
    let rss = write(&dir, "bad.xml", "<rss><item><title>x</title></item></rss>");
    let list = write(
        &dir,
        "feeds.xml",
        &format!(
            r#"<feeds title="x"><feed url="{}" file="bad.html" name="Bad"/></feeds>"#,
            rss.display()
        ),
    );

    let err = aggregator()
        .run(list.to_str().unwrap(), &dir.join("index.html"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Contract(ContractError::MissingChannel { .. })
    ));
    assert!(html_files(&dir).is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_unsupported_scheme_in_later_entry_writes_nothing() {
    let dir = test_dir("late_bad_scheme");
    let rss = write(&dir, "news.xml", NEWS_RSS);
    let list = write(
        &dir,
        "feeds.xml",
        &format!(
            r#"<feeds title="x"><feed url="{}" file="a.html" name="A"/><feed url="ftp://x.example/rss" file="b.html" name="B"/></feeds>"#,
            rss.display()
        ),
    );

    let err = aggregator()
        .run(list.to_str().unwrap(), &dir.join("index.html"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Source(SourceError::UnsupportedScheme(ref scheme)) if scheme == "ftp"
    ));
    assert!(html_files(&dir).is_empty(), "No page may be written before the bad entry");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_process_feed_direct() {
    let dir = test_dir("direct");
    let rss = write(&dir, "news.xml", NEWS_RSS);
    let page = dir.join("news.html");

    let report = aggregator()
        .process_feed(&FeedSource::Local(rss), &page)
        .await
        .unwrap();
    assert_eq!(report.items, 2);
    assert_eq!(report.file, page);
    assert!(std::fs::read_to_string(&page)
        .unwrap()
        .ends_with("</table>\n</body>\n</html>\n"));

    std::fs::remove_dir_all(&dir).ok();
}
