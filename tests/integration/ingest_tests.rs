//! Integration tests for the ingest pipeline
//!
//! These tests use wiremock to serve a small catalog site and run the
//! full walk end-to-end against an in-memory or temporary database.

use catalog_ingest::config::Config;
use catalog_ingest::crawler::{run_ingest, Coordinator, HttpFetcher};
use catalog_ingest::storage::{CatalogStore, RunStatus, SqliteCatalog};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, storage_root: &Path, db_path: &str) -> Config {
    let mut config = Config::default();
    config.source.entry_url = format!("{}/produse/", base_url);
    config.source.category_selector = "div.category".to_string();
    config.source.subcategory_selector = "div.subcategory".to_string();
    config.fetcher.pacing_delay_ms = 0;
    config.fetcher.timeout_secs = 5;
    config.images.storage_root = storage_root.to_string_lossy().into_owned();
    config.output.database_path = db_path.to_string();
    config
}

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([20, 120, 200, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    bytes.into_inner()
}

fn product_section(title: &str, image: &str, broken_image: &str) -> String {
    format!(
        r#"<section class="elementor-section">
            <h4 class="elementor-heading-title">{title}</h4>
            <div class="elementor-widget-text-editor"><p>Utilaj profesional {title}</p></div>
            <div class="elementor-widget-toggle">
                <div class="elementor-tab-content"><ul><li>Inox</li><li>220V</li></ul></div>
            </div>
            <div class="elementor-widget-image"><img src="{image}"></div>
            <div class="elementor-carousel-image" style="background-image: url('{broken_image}')"></div>
        </section>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Serves one category with two subcategories, each listing one product
/// with a valid image and a broken one
async fn mount_catalog(server: &MockServer) {
    mount_page(
        server,
        "/produse/",
        r#"<div class="category"><a href="/produse/utilaje/">Utilaje</a></div>"#.to_string(),
    )
    .await;

    mount_page(
        server,
        "/produse/utilaje/",
        r#"<div class="subcategory"><a href="/produse/utilaje/tocatoare/">Tocatoare</a></div>
           <div class="subcategory"><a href="/produse/utilaje/feliatoare/">Feliatoare</a></div>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/produse/utilaje/tocatoare/",
        product_section("TC-22", "/img/tc22.png", "/img/missing.jpg"),
    )
    .await;

    mount_page(
        server,
        "/produse/utilaje/feliatoare/",
        product_section("Feliator 300", "/img/feliator.png", "/img/missing.jpg"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/img/tc22.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encode_png(400, 200)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/feliator.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encode_png(200, 400)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_ingest_single_category() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let images_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), images_dir.path(), ":memory:");

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = SqliteCatalog::open_in_memory().expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(&config, fetcher, store).expect("Failed to create coordinator");

    let report = coordinator.run().await.expect("Ingest failed");

    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.categories, 1);
    assert_eq!(report.subcategories, 2);
    // Category page plus both subcategory pages
    assert_eq!(report.pages_scanned, 3);
    assert_eq!(report.products_created, 2);
    assert_eq!(report.images_attached, 2);
    assert_eq!(report.images_skipped, 2);

    let store = coordinator.store();
    assert_eq!(store.count_categories().unwrap(), 1);
    assert_eq!(store.count_subcategories().unwrap(), 2);
    assert_eq!(store.count_products().unwrap(), 2);
    assert_eq!(store.count_product_images().unwrap(), 2);

    let category = store
        .find_category_by_name("Utilaje")
        .unwrap()
        .expect("category should exist");
    assert_eq!(category.slug, "utilaje");

    let product = store
        .find_product_by_name("TC-22")
        .unwrap()
        .expect("product should exist");
    assert_eq!(product.description, "Utilaj profesional TC-22");
    assert_eq!(product.features, vec!["Inox".to_string(), "220V".to_string()]);
    assert_eq!(product.category_id, category.id);

    let subcategory = store
        .find_subcategory_by_name("Tocatoare")
        .unwrap()
        .expect("subcategory should exist");
    assert_eq!(product.subcategory_id, Some(subcategory.id));

    let images = store.list_product_images(product.id).unwrap();
    assert_eq!(images.len(), 1);
    let stored = Path::new(&images[0].image_path);
    assert!(stored.starts_with(images_dir.path().join(product.id.to_string())));
    assert!(stored
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("-1.png"));

    let saved = image::open(stored).expect("stored image should decode");
    assert_eq!(saved.width(), 580);
    assert_eq!(saved.height(), 760);
}

#[tokio::test]
async fn test_rerun_updates_products_and_appends_images() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let images_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), images_dir.path(), ":memory:");

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = SqliteCatalog::open_in_memory().expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(&config, fetcher, store).expect("Failed to create coordinator");

    coordinator.run().await.expect("First run failed");
    let report = coordinator.run().await.expect("Second run failed");

    assert_eq!(report.products_created, 0);
    assert_eq!(report.products_updated, 2);

    let store = coordinator.store();
    assert_eq!(store.count_categories().unwrap(), 1);
    assert_eq!(store.count_subcategories().unwrap(), 2);
    assert_eq!(store.count_products().unwrap(), 2);
    // Images are never deduplicated
    assert_eq!(store.count_product_images().unwrap(), 4);
}

#[tokio::test]
async fn test_run_ingest_persists_run_log() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("catalog.db");
    let images_dir = temp_dir.path().join("images");
    let config = create_test_config(
        &mock_server.uri(),
        &images_dir,
        db_path.to_str().expect("temp path should be UTF-8"),
    );

    let report = run_ingest(&config, "test-hash")
        .await
        .expect("Ingest failed");
    assert_eq!(report.products_created, 2);

    let store = SqliteCatalog::new(&db_path).expect("Failed to reopen database");
    assert_eq!(store.count_products().unwrap(), 2);

    let run = store
        .get_latest_run()
        .unwrap()
        .expect("run should be recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.totals.products_created, 2);
    assert_eq!(run.totals.images_attached, 2);
    assert_eq!(run.totals.images_skipped, 2);
}

#[tokio::test]
async fn test_failing_subcategory_page_is_recorded() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/produse/",
        r#"<div class="category"><a href="/produse/utilaje/">Utilaje</a></div>"#.to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/produse/utilaje/",
        r#"<div class="subcategory"><a href="/produse/utilaje/gone/">Gone</a></div>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/produse/utilaje/gone/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let images_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), images_dir.path(), ":memory:");

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = SqliteCatalog::open_in_memory().expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(&config, fetcher, store).expect("Failed to create coordinator");

    let report = coordinator.run_logged("hash").await.expect("Ingest failed");

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/produse/utilaje/gone/"));
    assert!(report.failures[0].message.contains("500"));

    let run = coordinator.store().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::CompletedWithErrors);
    assert_eq!(run.totals.failures, 1);
}

#[tokio::test]
async fn test_relative_links_resolve_against_redirected_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/produse/",
        r#"<div class="category"><a href="/produse/utilaje">Utilaje</a></div>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/produse/utilaje"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/produse/utilaje/"))
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/produse/utilaje/",
        r#"<div class="subcategory"><a href="tocatoare/">Tocatoare</a></div>"#.to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/produse/utilaje/tocatoare/",
        product_section("TC-22", "img/tc22.png", "/img/missing.jpg"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/produse/utilaje/tocatoare/img/tc22.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encode_png(300, 300)))
        .mount(&mock_server)
        .await;

    let images_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), images_dir.path(), ":memory:");

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = SqliteCatalog::open_in_memory().expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(&config, fetcher, store).expect("Failed to create coordinator");

    let report = coordinator.run().await.expect("Ingest failed");

    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.subcategories, 1);
    assert_eq!(report.products_created, 1);
    assert_eq!(report.images_attached, 1);

    let store = coordinator.store();
    let subcategory = store
        .find_subcategory_by_name("Tocatoare")
        .unwrap()
        .expect("subcategory should exist");
    let product = store
        .find_product_by_name("TC-22")
        .unwrap()
        .expect("product should exist");
    assert_eq!(product.subcategory_id, Some(subcategory.id));
}

#[tokio::test]
async fn test_unreachable_entry_page_fails_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/produse/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let images_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), images_dir.path(), ":memory:");

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = SqliteCatalog::open_in_memory().expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(&config, fetcher, store).expect("Failed to create coordinator");

    assert!(coordinator.run().await.is_err());
    assert_eq!(coordinator.store().count_categories().unwrap(), 0);
}
