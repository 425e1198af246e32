//! Local news site used by worker and dispatcher tests.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const STORY_DATED_BODY: &str = "The city council voted on Friday to expand the bus network.\n\n\
     Opponents said the plan was rushed.";

pub const STORY_UNDATED_BODY: &str = "Farmers gathered outside the ministry for a second day.";

const STORY_DATED_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <title>Council votes</title>
    <script type="application/ld+json">
      {"@type": "NewsArticle", "datePublished": "2019-03-01T10:00:00Z"}
    </script>
  </head>
  <body>
    <nav><p>Home | World | Local</p></nav>
    <article>
      <h1>Council votes</h1>
      <p>The city council voted on Friday
         to expand the bus network.</p>
      <p>Opponents said the plan was rushed.</p>
    </article>
    <footer><p>Copyright 2019</p></footer>
  </body>
</html>
"#;

const STORY_UNDATED_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Farmers protest</title></head>
  <body>
    <article>
      <p>Farmers gathered outside the ministry for a second day.</p>
    </article>
  </body>
</html>
"#;

/// A `tiny_http` server on an ephemeral port, shut down on drop.
///
/// | Path | Response |
/// |------|----------|
/// | `/2019/03/01/story-a` | article with a JSON-LD publication date |
/// | `/news/story-b` | article without any date |
/// | `/whoami` | article whose body is the request's User-Agent |
/// | `/slow` | article after a one second delay |
/// | `/report.pdf` | `application/pdf` bytes |
/// | `/empty` | HTML page with a script and an empty body |
/// | anything else | 404 |
pub struct TestServer {
    base_url: String,
    shutdown: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn spawn_news_server() -> TestServer {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let base_url = format!("http://{}", server.server_addr());
    let (shutdown, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(_) => break,
            };

            let user_agent = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("User-Agent"))
                .map(|h| h.value.as_str().to_string())
                .unwrap_or_default();

            let (status, content_type, body) = match request.url() {
                "/2019/03/01/story-a" => (200, "text/html; charset=utf-8", STORY_DATED_HTML.to_string()),
                "/news/story-b" => (200, "text/html; charset=utf-8", STORY_UNDATED_HTML.to_string()),
                "/whoami" => (
                    200,
                    "text/html; charset=utf-8",
                    format!("<html><body><article><p>{user_agent}</p></article></body></html>"),
                ),
                "/slow" => {
                    thread::sleep(Duration::from_secs(1));
                    (200, "text/html; charset=utf-8", STORY_UNDATED_HTML.to_string())
                }
                "/report.pdf" => (200, "application/pdf", "%PDF-1.4 binary".to_string()),
                "/empty" => (
                    200,
                    "text/html; charset=utf-8",
                    "<html><head><script>x()</script></head><body></body></html>".to_string(),
                ),
                _ => (404, "text/plain", "not found".to_string()),
            };

            let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                .expect("build header");
            let response = tiny_http::Response::from_data(body.into_bytes())
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    TestServer {
        base_url,
        shutdown,
        handle: Some(handle),
    }
}
