//! Interactive search-and-download loop.
//!
//! Prompts for a title, lists the search hits, asks for a selection and a
//! confirmation, then downloads the novel and prints the result. Errors of
//! one round are reported and the loop prompts again.

use crate::console::Console;
use crate::crawler::{Crawler, FetchOutcome, ProgressSink};
use crate::error::CrawlError;
use crate::site::SearchHit;
use std::io::BufRead;

/// Word that leaves the loop at any prompt.
const EXIT_WORD: &str = "exit";

/// Parsed answer to the "which novel" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// 1-based index into the hit list.
    Pick(usize),
    Cancel,
    Quit,
    Invalid,
}

/// Interprets the selection input for a list of `count` hits.
pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case(EXIT_WORD) {
        return Selection::Quit;
    }

    match input.parse::<usize>() {
        Ok(0) => Selection::Cancel,
        Ok(n) if n <= count => Selection::Pick(n),
        _ => Selection::Invalid,
    }
}

/// Whether the session should keep prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Prints a line per finished chapter.
struct ConsoleProgress {
    console: Console,
}

impl ProgressSink for ConsoleProgress {
    fn chapter_finished(&self, outcome: &FetchOutcome, completed: usize, total: usize) {
        println!("{}", self.console.outcome_line(outcome, completed, total));
    }
}

/// Line-oriented front end over a [`Crawler`].
pub struct Session<R> {
    crawler: Crawler,
    console: Console,
    input: R,
}

impl<R: BufRead> Session<R> {
    pub fn new(crawler: Crawler, console: Console, input: R) -> Self {
        Self {
            crawler,
            console,
            input,
        }
    }

    /// Runs until the user types `exit` or input ends.
    ///
    /// `initial_search` is used as the first search term instead of prompting.
    pub async fn run(&mut self, initial_search: Option<String>) -> Result<(), CrawlError> {
        let mut pending = initial_search;

        loop {
            let term = match pending.take() {
                Some(term) => term,
                None => match self.ask("Novel title to search (type 'exit' to quit):")? {
                    Some(line) => line,
                    None => break,
                },
            };
            let term = term.trim();

            if term.eq_ignore_ascii_case(EXIT_WORD) {
                break;
            }
            if term.is_empty() {
                continue;
            }

            if self.search_and_download(term).await? == Flow::Quit {
                break;
            }
        }

        self.console.info("Exiting");
        Ok(())
    }

    async fn search_and_download(&mut self, term: &str) -> Result<Flow, CrawlError> {
        let hits = match self.crawler.site().search(term).await {
            Ok(hits) => hits,
            Err(e) => {
                self.console.error(&format!("Search failed: {}", e));
                return Ok(Flow::Continue);
            }
        };

        if hits.is_empty() {
            self.console.warning("No matching novels found");
            return Ok(Flow::Continue);
        }

        self.console.hits(&hits);

        let Some(answer) = self.ask("\nSelect a novel by number (0 to cancel):")? else {
            return Ok(Flow::Quit);
        };
        let index = match parse_selection(&answer, hits.len()) {
            Selection::Pick(index) => index,
            Selection::Cancel => {
                self.console.info("Cancelled");
                return Ok(Flow::Continue);
            }
            Selection::Quit => return Ok(Flow::Quit),
            Selection::Invalid => {
                self.console.warning("Invalid selection, cancelled");
                return Ok(Flow::Continue);
            }
        };
        let hit = &hits[index - 1];

        let question = format!("You selected: {} ({}). Proceed? (Y/N):", hit.title, hit.url);
        let Some(confirm) = self.ask(&question)? else {
            return Ok(Flow::Quit);
        };
        if !confirm.eq_ignore_ascii_case("y") {
            self.console.info("Cancelled");
            return Ok(Flow::Continue);
        }

        self.download(hit).await;
        println!("---------------------------------");
        Ok(Flow::Continue)
    }

    async fn download(&self, hit: &SearchHit) {
        if hit.url.is_empty() {
            self.console
                .error(&format!("'{}' has no catalog link", hit.title));
            return;
        }

        self.console
            .step(&format!("Downloading {} from {}", hit.title, hit.url));

        let progress = ConsoleProgress {
            console: self.console,
        };
        match self.crawler.crawl(&hit.title, &hit.url, &progress).await {
            Ok(report) => self.console.report(&report),
            Err(e) => self.console.error(&format!("Failed to download novel: {}", e)),
        }
    }

    /// Prompts and reads one trimmed line; `None` when input is exhausted.
    fn ask(&mut self, question: &str) -> Result<Option<String>, CrawlError> {
        self.console.prompt(question);

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DownloadConfig, SiteProfile};
    use crate::site::SiteClient;
    use crate::test_support::{FakeTransport, catalog_page, chapter_page, search_page};
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    const SEARCH_URL: &str = "http://novel.test/modules/article/waps.php";

    fn fixture() -> Arc<FakeTransport> {
        let transport = Arc::new(FakeTransport::new());
        transport.serve(
            SEARCH_URL,
            search_page(&[
                ("凡人修仙传", "http://novel.test/1/100/"),
                ("凡人修仙之仙界篇", "http://novel.test/1/200/"),
            ]),
        );
        transport.serve(
            "http://novel.test/1/100/",
            catalog_page(&[("/1/100/1.html", "第一章"), ("/1/100/2.html", "第二章")]),
        );
        transport.serve("http://novel.test/1/100/1.html", chapter_page("第一章正文"));
        transport.serve("http://novel.test/1/100/2.html", chapter_page("第二章正文"));
        transport
    }

    fn session(
        transport: Arc<FakeTransport>,
        root: &TempDir,
        input: &str,
    ) -> Session<Cursor<Vec<u8>>> {
        let site = SiteClient::new(transport, SiteProfile::with_origin("http://novel.test")).unwrap();
        let config = DownloadConfig {
            output_directory: root.path().join("Novel"),
            delay_after_write_ms: 0,
            request_timeout_sec: None,
        };
        Session::new(
            Crawler::new(Arc::new(site), config),
            Console::with_colors(false),
            Cursor::new(input.as_bytes().to_vec()),
        )
    }

    fn novel_dir(root: &TempDir) -> PathBuf {
        root.path().join("Novel").join("凡人修仙传")
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Selection::Pick(1));
        assert_eq!(parse_selection(" 3 ", 3), Selection::Pick(3));
        assert_eq!(parse_selection("0", 3), Selection::Cancel);
        assert_eq!(parse_selection("4", 3), Selection::Invalid);
        assert_eq!(parse_selection("-1", 3), Selection::Invalid);
        assert_eq!(parse_selection("abc", 3), Selection::Invalid);
        assert_eq!(parse_selection("", 3), Selection::Invalid);
        assert_eq!(parse_selection("EXIT", 3), Selection::Quit);
    }

    #[tokio::test]
    async fn test_exit_without_requests() {
        let root = TempDir::new().unwrap();
        let transport = fixture();

        session(Arc::clone(&transport), &root, "exit\n")
            .run(None)
            .await
            .unwrap();
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_end_of_input_stops() {
        let root = TempDir::new().unwrap();
        session(fixture(), &root, "").run(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_full_download() {
        let root = TempDir::new().unwrap();

        session(fixture(), &root, "凡人\n1\ny\nexit\n")
            .run(None)
            .await
            .unwrap();

        let dir = novel_dir(&root);
        assert_eq!(
            std::fs::read_to_string(dir.join("0001-第一章.txt")).unwrap(),
            "第一章正文"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("0002-第二章.txt")).unwrap(),
            "第二章正文"
        );
    }

    #[tokio::test]
    async fn test_initial_search_term() {
        let root = TempDir::new().unwrap();

        session(fixture(), &root, "1\nY\n")
            .run(Some("凡人".to_string()))
            .await
            .unwrap();

        assert!(novel_dir(&root).join("0002-第二章.txt").exists());
    }

    #[tokio::test]
    async fn test_cancel_and_decline_create_nothing() {
        let root = TempDir::new().unwrap();

        session(fixture(), &root, "凡人\n0\n凡人\n1\nn\n凡人\n7\nexit\n")
            .run(None)
            .await
            .unwrap();

        assert!(!root.path().join("Novel").exists());
    }

    #[tokio::test]
    async fn test_existing_directory_is_reported_and_loop_continues() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(novel_dir(&root)).unwrap();
        let transport = fixture();

        session(Arc::clone(&transport), &root, "凡人\n1\ny\nexit\n")
            .run(None)
            .await
            .unwrap();

        // Only the search request was made.
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(std::fs::read_dir(novel_dir(&root)).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_reprompts() {
        let root = TempDir::new().unwrap();
        let transport = fixture();
        transport.fail(SEARCH_URL, 502);

        session(Arc::clone(&transport), &root, "凡人\n凡人\nexit\n")
            .run(None)
            .await
            .unwrap();

        assert_eq!(transport.requests().len(), 2);
    }
}
