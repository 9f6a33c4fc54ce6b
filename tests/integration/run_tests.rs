use shutter_sweep::config::{
    Config, CrawlerConfig, InputConfig, OutputConfig, ResolverConfig, UserAgentConfig,
};
use shutter_sweep::crawler::{
    Coordinator, Emission, ExistenceProbe, RenderSession, Renderer, RequestStream,
};
use shutter_sweep::{CapabilityError, SweepError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "owner,item,resource_url";

/// Replays canned image requests per page path and records what it rendered
#[derive(Debug, Clone, Default)]
struct ScriptedRenderer {
    pages: Arc<HashMap<String, Vec<String>>>,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRenderer {
    fn new(pages: Vec<(&str, Vec<&str>)>) -> Self {
        let pages = pages
            .into_iter()
            .map(|(page, requests)| {
                (
                    page.to_string(),
                    requests.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect();
        Self {
            pages: Arc::new(pages),
            ..Default::default()
        }
    }

    fn rendered(&self) -> Vec<String> {
        let mut rendered = self.rendered.lock().unwrap().clone();
        rendered.sort();
        rendered
    }
}

struct ScriptedSession {
    renderer: ScriptedRenderer,
}

impl Renderer for ScriptedRenderer {
    type Session = ScriptedSession;

    async fn open_session(&self) -> Result<ScriptedSession, CapabilityError> {
        Ok(ScriptedSession {
            renderer: self.clone(),
        })
    }
}

impl RenderSession for ScriptedSession {
    async fn render(&mut self, address: &Url) -> Result<RequestStream, CapabilityError> {
        let page = address.path().to_string();
        self.renderer.rendered.lock().unwrap().push(page.clone());

        let requests = self.renderer.pages.get(&page).cloned().unwrap_or_default();
        let (emitter, stream) = RequestStream::channel(1);
        tokio::spawn(async move {
            for url in requests {
                if emitter.emit(url).await != Emission::Continued {
                    break;
                }
            }
        });
        Ok(stream)
    }

    async fn close(self) {}
}

/// Answers existence checks from a fixed set of URLs
#[derive(Debug, Clone, Default)]
struct SetProbe {
    existing: Arc<HashSet<String>>,
}

impl SetProbe {
    fn new(existing: &[&str]) -> Self {
        Self {
            existing: Arc::new(existing.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl ExistenceProbe for SetProbe {
    async fn exists(&self, url: &str) -> Result<bool, CapabilityError> {
        Ok(self.existing.contains(url))
    }
}

fn create_test_config(dir: &Path, page_template: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency: 4,
            flush_threshold: 10,
            item_timeout_secs: 10,
        },
        resolver: ResolverConfig {
            page_template: page_template.to_string(),
            image_extensions: vec!["jpg".to_string(), "png".to_string()],
            small_suffix: "_s".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestSweep".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        input: InputConfig {
            dataset_path: dir.join("dataset.csv").display().to_string(),
        },
        output: OutputConfig {
            store_path: dir.join("store.csv").display().to_string(),
            seed_path: None,
        },
    }
}

fn write_dataset(dir: &Path, content: &str) {
    std::fs::write(dir.join("dataset.csv"), content).unwrap();
}

/// Store rows below the header, sorted (completion order is unconstrained)
fn store_rows(dir: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(dir.join("store.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(HEADER));
    let mut rows: Vec<String> = lines.map(str::to_string).collect();
    rows.sort();
    rows
}

fn photo_pages() -> ScriptedRenderer {
    ScriptedRenderer::new(vec![
        (
            "/A/101",
            vec![
                "https://photos.test/static/sprite.css",
                "https://c.test/7/101_ab_s.jpg",
                "https://c.test/7/101_ab_m.jpg",
            ],
        ),
        ("/A/102", vec!["https://photos.test/static/logo.gif"]),
    ])
}

#[tokio::test]
async fn test_run_upgrades_and_records_unresolved() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user,title\n101,A,Bridge\n102,A,Tower\n");
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let coordinator = Coordinator::new(
        config,
        photo_pages(),
        SetProbe::new(&["https://c.test/7/101_ab.jpg"]),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.summary.attempted, 2);
    assert_eq!(report.summary.resolved, 1);
    assert_eq!(report.summary.unresolved, 1);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.flushes, 1);

    assert_eq!(
        store_rows(dir.path()),
        vec!["A,101,https://c.test/7/101_ab.jpg", "A,102,"]
    );
}

#[tokio::test]
async fn test_negative_probe_keeps_discovered_locator() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n");
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    Coordinator::new(config, photo_pages(), SetProbe::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        store_rows(dir.path()),
        vec!["A,101,https://c.test/7/101_ab_s.jpg"]
    );
}

#[tokio::test]
async fn test_resume_skips_completed_items() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n102,A\n");
    std::fs::write(
        dir.path().join("store.csv"),
        "owner,item,resource_url\nA,101,https://c.test/7/101_ab.jpg\n",
    )
    .unwrap();
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let renderer = photo_pages();
    let report = Coordinator::new(config, renderer.clone(), SetProbe::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.completed_before, 1);
    assert_eq!(report.summary.attempted, 1);
    assert_eq!(renderer.rendered(), vec!["/A/102"]);
    assert_eq!(
        store_rows(dir.path()),
        vec!["A,101,https://c.test/7/101_ab.jpg", "A,102,"]
    );
}

#[tokio::test]
async fn test_unresolved_items_are_retried_next_run() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n102,A\n");
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let renderer = photo_pages();
    for _ in 0..2 {
        Coordinator::new(config.clone(), renderer.clone(), SetProbe::default())
            .unwrap()
            .run()
            .await
            .unwrap();
    }

    assert_eq!(renderer.rendered(), vec!["/A/102", "/A/102"]);
    assert_eq!(store_rows(dir.path()), vec!["A,102,", "A,102,"]);
}

#[tokio::test]
async fn test_seed_from_cleaned_output() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n102,A\n");
    let seed = dir.path().join("cleaned.csv");
    std::fs::write(&seed, "user,id,photo_url\nA,101,https://c.test/7/101_ab.jpg\n").unwrap();

    let mut config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");
    config.output.seed_path = Some(seed.display().to_string());

    let renderer = photo_pages();
    let report = Coordinator::new(config, renderer.clone(), SetProbe::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.seeded);
    assert_eq!(renderer.rendered(), vec!["/A/102"]);

    let content = std::fs::read_to_string(dir.path().join("store.csv")).unwrap();
    assert_eq!(
        content,
        "user,id,photo_url\nA,101,https://c.test/7/101_ab.jpg\nA,102,\n"
    );
}

#[tokio::test]
async fn test_rows_missing_fields_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n,B\n103,\n");
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let renderer = photo_pages();
    let report = Coordinator::new(config, renderer.clone(), SetProbe::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.summary.attempted, 1);
    assert_eq!(renderer.rendered(), vec!["/A/101"]);
}

#[tokio::test]
async fn test_flushes_in_batches_plus_final() {
    let dir = TempDir::new().unwrap();
    let mut dataset = String::from("id,user\n");
    for id in 1001..=1020 {
        dataset.push_str(&format!("{},B\n", id));
    }
    write_dataset(dir.path(), &dataset);
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let report = Coordinator::new(config, ScriptedRenderer::default(), SetProbe::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records_written, 20);
    assert_eq!(report.flushes, 3);
    assert_eq!(store_rows(dir.path()).len(), 20);
}

#[tokio::test]
async fn test_missing_dataset_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");

    let renderer = photo_pages();
    let result = Coordinator::new(config, renderer.clone(), SetProbe::default())
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(SweepError::Dataset(_))));
    assert!(renderer.rendered().is_empty());
    assert!(!dir.path().join("store.csv").exists());
}

#[tokio::test]
async fn test_plan_does_not_write() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n102,A\n");
    let seed = dir.path().join("cleaned.csv");
    std::fs::write(&seed, "user,id,photo_url\nA,101,https://c.test/7/101_ab.jpg\n").unwrap();

    let mut config = create_test_config(dir.path(), "https://photos.test/{owner}/{item}");
    config.output.seed_path = Some(seed.display().to_string());

    let plan = Coordinator::new(config, photo_pages(), SetProbe::default())
        .unwrap()
        .plan()
        .unwrap();

    assert!(plan.from_seed);
    assert_eq!(plan.dataset_rows, 2);
    assert_eq!(plan.completed, 1);
    assert_eq!(plan.backlog.items.len(), 1);
    assert_eq!(plan.backlog.items[0].item_id, 102);
    assert!(!dir.path().join("store.csv").exists());
}

#[tokio::test]
async fn test_http_run_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/photos/A/101"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <img src="/static/spacer.gif">
            <img src="/c/101_ab_s.jpg">
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/c/101_ab.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photos/A/102"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "id,user\n101,A\n102,A\n");
    let template = format!("{}/photos/{{owner}}/{{item}}", server.uri());
    let config = create_test_config(dir.path(), &template);

    let report = Coordinator::with_http(config).unwrap().run().await.unwrap();

    assert_eq!(report.summary.resolved, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(
        store_rows(dir.path()),
        vec![format!("A,101,{}/c/101_ab.jpg", server.uri()), "A,102,".to_string()]
    );
}
