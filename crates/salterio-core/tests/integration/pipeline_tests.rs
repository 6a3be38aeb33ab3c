use std::fs;

use salterio_core::api::page_url;
use salterio_core::models::Classification;
use salterio_core::testutil::MockFetcher;
use salterio_core::{AppError, CorpusStore, Discovery, FetchResponse, LedgerOutcome, load_retry_list};
use tempfile::TempDir;

use crate::integration::common::{BASE, api_post, contemplations, files_with_prefix, post_page, site};

#[tokio::test]
async fn api_discovery_classifies_and_persists() {
    let dir = TempDir::new().unwrap();
    let endpoint = site().discovery_endpoints[0].clone();
    let page = serde_json::json!([
        api_post(
            1,
            "el-buen-pastor",
            "El Buen Pastor",
            "<p>Jn 10, 11-18</p><p>Contemplación: el pastor da la vida por sus ovejas.</p>"
        ),
        api_post(
            2,
            "tentaciones",
            "Tentaciones",
            "<p>Lc 4, 1-13. Jesús en el desierto.</p>"
        ),
    ]);
    let fetcher = MockFetcher::new()
        .with_response(&endpoint, FetchResponse::ok("[]"))
        .with_response(
            &page_url(&endpoint, 1, 50).unwrap(),
            FetchResponse::ok(page.to_string()),
        );

    let report = contemplations(fetcher.clone(), dir.path()).run().await.unwrap();

    assert_eq!(
        report.discovery,
        Discovery::Api {
            endpoint: endpoint.clone(),
            posts: 2
        }
    );
    assert_eq!(report.added, 2);
    assert_eq!(report.ledger, LedgerOutcome::Empty);

    let store = CorpusStore::new(dir.path().join("contemplaciones.json"));
    let records = store.load().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "El Buen Pastor");
    assert_eq!(records[0].readings, "Jn 10, 11-18");
    assert_eq!(records[0].summary, ": el pastor da la vida por sus ovejas.");
    assert_eq!(records[0].link, format!("{BASE}/2024/03/02/el-buen-pastor/"));
    assert_eq!(
        records[1].classification,
        Classification::Liturgical {
            ciclo: "C".into(),
            tiempo_liturgico: "Cuaresma".into()
        }
    );

    // Unchanged site, unchanged corpus: nothing new on the second run.
    let before = fs::read_to_string(store.path()).unwrap();
    let again = contemplations(fetcher, dir.path()).run().await.unwrap();
    assert_eq!(again.new_candidates, 0);
    assert_eq!(again.added, 0);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn harvest_fallback_with_failures_and_incremental_reruns() {
    let dir = TempDir::new().unwrap();
    let buen_pastor = format!("{BASE}/2024/03/17/el-buen-pastor");
    let tentaciones = format!("{BASE}/2024/02/18/tentaciones");
    let nochebuena = format!("{BASE}/2023/12/24/nochebuena");

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{buen_pastor}/</loc></url>
  <url><loc>{buen_pastor}</loc></url>
  <url><loc>{nochebuena}/</loc></url>
</urlset>"#
    );
    let home = format!(r#"<article><a href="{tentaciones}/">Tentaciones</a></article>"#);

    let fetcher = MockFetcher::new()
        .with_response(&format!("{BASE}/sitemap.xml"), FetchResponse::ok(sitemap))
        .with_response(BASE, FetchResponse::ok(home))
        .with_response(
            &buen_pastor,
            FetchResponse::ok(post_page(
                "El Buen Pastor",
                "Jn 10, 11-18. Contemplación: Jesús conoce a sus ovejas.",
            )),
        )
        .with_response(
            &nochebuena,
            FetchResponse::ok(post_page("Nochebuena", "Lc 2, 1-14. Nace en Belén.")),
        )
        .with_failure(&tentaciones, AppError::Timeout(20));

    // First run: one post times out and lands in the ledger.
    let report = contemplations(fetcher.clone(), dir.path()).run().await.unwrap();
    assert!(matches!(
        report.discovery,
        Discovery::Harvested { candidates: 3, .. }
    ));
    assert_eq!(report.added, 2);
    assert_eq!(report.failed, 1);
    let LedgerOutcome::Written { path, count } = &report.ledger else {
        panic!("expected a ledger file, got {:?}", report.ledger);
    };
    assert_eq!(*count, 1);
    assert_eq!(load_retry_list(path).unwrap(), vec![tentaciones.clone()]);
    assert_eq!(files_with_prefix(dir.path(), "failed_urls_").len(), 1);

    let store = CorpusStore::new(dir.path().join("contemplaciones.json"));
    let records = store.load().unwrap();
    let links: Vec<&str> = records.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(links, vec![buen_pastor.as_str(), nochebuena.as_str()]);
    assert_eq!(records[1].classification.secondary(), "Navidad");

    // The failed post recovers: only it is fetched again.
    let fetcher = fetcher.with_response(
        &tentaciones,
        FetchResponse::ok(post_page("Tentaciones", "Mc 1, 12-15. Cuarenta días de ayuno.")),
    );
    let before = fs::read_to_string(store.path()).unwrap();
    let calls_before = fetcher.calls().len();

    let report = contemplations(fetcher.clone(), dir.path()).run().await.unwrap();
    assert_eq!(report.new_candidates, 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.total, 3);
    assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), before);
    let post_fetches = fetcher.calls()[calls_before..]
        .iter()
        .filter(|u| u.contains("/20") && !u.ends_with('/'))
        .count();
    assert_eq!(post_fetches, 1);

    // Nothing left to do.
    let report = contemplations(fetcher, dir.path()).run().await.unwrap();
    assert_eq!(report.new_candidates, 0);
    assert_eq!(report.added, 0);
    assert_eq!(report.ledger, LedgerOutcome::Empty);
}

#[tokio::test]
async fn retry_skips_known_urls() {
    let dir = TempDir::new().unwrap();
    let known = format!("{BASE}/2024/03/17/el-buen-pastor");
    let pending = format!("{BASE}/2024/02/18/tentaciones");

    let ledger = dir.path().join("failed_urls_20240318_101500.log");
    fs::write(
        &ledger,
        format!("# Failed URLs - 2024-03-18 10:15:00\n# Total failed URLs: 2\n\n1. {known}/\n2. {pending}\n"),
    )
    .unwrap();

    let fetcher = MockFetcher::new()
        .with_response(&known, FetchResponse::ok(post_page("El Buen Pastor", "Jn 10, 11-18")))
        .with_response(&pending, FetchResponse::ok(post_page("Tentaciones", "Mc 1, 12-15")));

    // Seed the corpus with the known post.
    contemplations(fetcher.clone(), dir.path())
        .retry(&[known.clone()])
        .await
        .unwrap();

    let urls = load_retry_list(&ledger).unwrap();
    let report = contemplations(fetcher.clone(), dir.path())
        .retry(&urls)
        .await
        .unwrap();

    assert_eq!(report.discovery, Discovery::Retry { urls: 2 });
    assert_eq!(report.new_candidates, 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.total, 2);
    assert_eq!(fetcher.calls().iter().filter(|u| **u == known).count(), 1);
}
