//! Shared fixtures for the integration tests

use catalog_sync::config::{load_config, Config};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const START_PATH: &str = "/catalog/nasosnoe-oborudovanie/";

/// Renders a listing page in the catalog's markup
pub fn listing(products: &[(&str, &str)], next: Option<&str>) -> String {
    let blocks: String = products
        .iter()
        .map(|(name, price)| {
            format!(
                r#"<article class="l-product l-product__horizontal">
                    <span itemprop="name">{}</span>
                    <div class="l-product__price-base">{}</div>
                </article>"#,
                name, price
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a id="navigation_2_next_page" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        "<html><body><section>{}</section><nav>{}</nav></body></html>",
        blocks, next
    )
}

/// Mounts a GET handler returning `body` at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Writes a config pointing at the mock server and loads it back
pub fn config_for(server: &MockServer, database_path: &Path) -> (Config, NamedTempFile) {
    let content = format!(
        r#"
[crawler]
start-url = "{uri}{start}"
base-url = "{uri}"
interval-secs = 1
max-pages = 50

[http]
user-agent = "Mozilla/5.0"
timeout-secs = 5

[storage]
database-path = "{db}"
"#,
        uri = server.uri(),
        start = START_PATH,
        db = database_path.display()
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    (config, file)
}
