//! Headless Chromium session implementing the crawl page driver.
//!
//! One session owns one browser process and one tab for the lifetime of a
//! run. Selector queries are evaluated as JavaScript inside the tab so that
//! they see the page exactly as the site's own scripts left it.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::js::EvaluationResult;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use url::Url;

use docpress_crawler::PageDriver;
use docpress_shared::{BrowserOptions, DocpressError, RenderOptions, ResolvedAssets, Result};

use crate::print::print_params;

fn cdp(error: CdpError) -> DocpressError {
    DocpressError::Browser(error.to_string())
}

/// Escape a value into a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("strings serialize to JSON")
}

/// Read an evaluated expression's result as an optional string. CDP reports
/// JS `null` (and `undefined`) as a remote object with no value payload, so
/// an absent payload means the expression produced nothing.
fn evaluation_string(result: EvaluationResult) -> Result<Option<String>> {
    match result.value() {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|error| DocpressError::Browser(format!("unexpected evaluation result: {error}"))),
    }
}

// ---------------------------------------------------------------------------
// BrowserSession
// ---------------------------------------------------------------------------

/// A scoped browser resource: launched once per run and torn down on every
/// exit path through [`BrowserSession::close`].
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch a headless Chromium and open the tab used for the whole run.
    #[instrument(skip_all)]
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut config = BrowserConfig::builder();
        if !options.sandbox {
            config = config.no_sandbox();
        }
        if let Some(executable) = &options.executable {
            config = config.chrome_executable(executable);
        }
        for arg in &options.args {
            config = config.arg(arg);
        }
        let config = config.build().map_err(DocpressError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp)?;

        // The CDP connection only makes progress while the handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(error) => {
                handler_task.abort();
                return Err(cdp(error));
            }
        };

        info!("browser session started");
        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    /// Tear the browser process down. Runs on every exit path, so failures
    /// here are secondary to whatever ended the run.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(error) = self.browser.wait().await {
            debug!(%error, "browser process did not report an exit status");
        }
        self.handler_task.abort();
        closed.map(|_| ()).map_err(cdp)
    }

    /// Evaluate an expression in the tab, resolving promises and returning
    /// the value by serialization.
    async fn evaluate_value(&self, expression: String) -> Result<Option<String>> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DocpressError::Browser)?;
        let result = self.page.evaluate(params).await.map_err(cdp)?;
        evaluation_string(result)
    }

    /// Inject a `<link>` or `<script>` loader and wait for it to finish
    /// loading before returning.
    async fn attach_resource(&self, expression: String, what: &str, url: &Url) -> Result<()> {
        debug!(%url, "attaching {what}");
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DocpressError::Browser)?;
        self.page
            .evaluate(params)
            .await
            .map_err(|error| DocpressError::Render(format!("could not attach {what} {url}: {error}")))?;
        Ok(())
    }
}

fn stylesheet_loader_js(url: &Url) -> String {
    format!(
        r#"new Promise((resolve, reject) => {{
  const link = document.createElement('link');
  link.rel = 'stylesheet';
  link.href = {href};
  link.onload = () => resolve(null);
  link.onerror = () => reject(new Error('stylesheet failed to load'));
  document.head.appendChild(link);
}})"#,
        href = js_string(url.as_str())
    )
}

fn script_loader_js(url: &Url) -> String {
    format!(
        r#"new Promise((resolve, reject) => {{
  const script = document.createElement('script');
  script.src = {src};
  script.onload = () => resolve(null);
  script.onerror = () => reject(new Error('script failed to load'));
  document.head.appendChild(script);
}})"#,
        src = js_string(url.as_str())
    )
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate_and_fetch(&self, url: &Url) -> Result<String> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|error| DocpressError::fetch(format!("navigation to {url} failed: {error}")))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|error| DocpressError::fetch(format!("page load for {url} did not settle: {error}")))?;
        self.page
            .content()
            .await
            .map_err(|error| DocpressError::fetch(format!("could not read markup for {url}: {error}")))
    }

    async fn query_selector_href(&self, selector: &str) -> Result<Option<String>> {
        // `el.href` is the resolved absolute URL; an empty one reads as
        // absent, matching how the crawl treats a hollow next link.
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? el.href || null : null; }})()",
            sel = js_string(selector)
        );
        self.evaluate_value(expression).await
    }

    async fn query_selector_outer_html(&self, selector: &str) -> Result<Option<String>> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? el.outerHTML : null; }})()",
            sel = js_string(selector)
        );
        self.evaluate_value(expression).await
    }

    async fn render_document(
        &self,
        html: &str,
        assets: &ResolvedAssets,
        options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        info!(
            format = %options.format,
            margin = %options.margin,
            print_background = options.print_background,
            "rendering assembled document"
        );

        // Replacing the tab content drops the originally linked resources,
        // so the site's stylesheet and script are re-attached by URL.
        self.page
            .set_content(html)
            .await
            .map_err(|error| DocpressError::Render(format!("could not set document content: {error}")))?;

        if let Some(stylesheet) = &assets.stylesheet_url {
            self.attach_resource(stylesheet_loader_js(stylesheet), "stylesheet", stylesheet)
                .await?;
        }
        if let Some(script) = &assets.script_url {
            self.attach_resource(script_loader_js(script), "script", script)
                .await?;
        }

        self.page
            .pdf(print_params(options))
            .await
            .map_err(|error| DocpressError::Render(format!("print to PDF failed: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use chromiumoxide::cdp::js_protocol::runtime::RemoteObject;

    use super::*;

    fn evaluation(json: &str) -> EvaluationResult {
        let remote: RemoteObject = serde_json::from_str(json).expect("remote object parses");
        EvaluationResult::new(remote)
    }

    #[test]
    fn null_evaluation_reads_as_absent() {
        // A missing next link or content element evaluates to JS `null`,
        // which must terminate the crawl rather than abort it.
        let result = evaluation(r#"{"type":"object","subtype":"null","value":null}"#);
        assert_eq!(evaluation_string(result).expect("null is not an error"), None);
    }

    #[test]
    fn string_evaluation_reads_back_the_string() {
        let result = evaluation(r#"{"type":"string","value":"http://127.0.0.1:3000/docs/next"}"#);
        assert_eq!(
            evaluation_string(result).expect("string value"),
            Some("http://127.0.0.1:3000/docs/next".to_string())
        );
    }

    #[test]
    fn loader_js_embeds_the_url_as_a_string_literal() {
        let url = Url::parse("http://127.0.0.1:3000/assets/css/styles.css").unwrap();
        let js = stylesheet_loader_js(&url);
        assert!(js.contains(r#"link.href = "http://127.0.0.1:3000/assets/css/styles.css";"#));

        let js = script_loader_js(&url);
        assert!(js.contains(r#"script.src = "http://127.0.0.1:3000/assets/css/styles.css";"#));
    }

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string("article"), r#""article""#);
    }
}
