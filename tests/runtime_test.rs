//! Runtime integration tests
//!
//! Brings a simulated host page online, then runs queries and list
//! operations through the public surface.

use parking_lot::Mutex;
use serde_json::json;
use spext::collections::SliceCursor;
use spext::loader::LoadedCallback;
use spext::{
    fields, CamlQuery, ClientRuntime, CollectionExt, Config, Enumerable, FailureCallback,
    FieldValue, ListExt, ListSource, ModuleStatus, QueryError, QueryResponse, RequestFailed,
    RequestSucceeded, Runtime, ScriptRegistry, SpextError, SuccessCallback,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Script registry that finishes every load as soon as it is executed
#[derive(Default)]
struct Page {
    registered: Mutex<HashMap<String, String>>,
    loaded: Mutex<HashSet<String>>,
    waiting: Mutex<HashMap<String, Vec<LoadedCallback>>>,
    executions: AtomicUsize,
}

impl ScriptRegistry for Page {
    fn is_registered(&self, module: &str) -> bool {
        self.registered.lock().contains_key(module)
    }

    fn is_loaded(&self, module: &str) -> bool {
        self.loaded.lock().contains(module)
    }

    fn module_url(&self, module: &str) -> Option<String> {
        self.registered.lock().get(module).cloned()
    }

    fn script_sources(&self) -> Vec<String> {
        vec!["/sites/dev/_layouts/15/sp.js".to_string()]
    }

    fn register(&self, module: &str, url: &str) {
        self.registered.lock().insert(module.into(), url.into());
    }

    fn register_dependency(&self, _module: &str, _dependency: &str) {}

    fn execute_or_delay_until_loaded(&self, module: &str, callback: LoadedCallback) {
        if self.is_loaded(module) {
            callback();
        } else {
            self.waiting.lock().entry(module.into()).or_default().push(callback);
        }
    }

    fn execute(&self, module: &str) {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.loaded.lock().insert(module.to_string());
        let callbacks = self.waiting.lock().remove(module).unwrap_or_default();
        for callback in callbacks {
            callback();
        }
    }
}

/// What the simulated server does with the next batch
#[derive(Clone)]
enum Outcome {
    Succeed(serde_json::Value),
    Fail(RequestFailed),
    Drop,
}

struct HostContext {
    outcome: Mutex<Outcome>,
    batches: AtomicUsize,
}

impl HostContext {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(outcome),
            batches: AtomicUsize::new(0),
        })
    }
}

impl ClientRuntime for HostContext {
    fn execute_query_async(&self, on_success: SuccessCallback, on_failure: FailureCallback) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.lock().clone();
        // Reply from another thread, like a network completion would.
        std::thread::spawn(move || match outcome {
            Outcome::Succeed(payload) => on_success(RequestSucceeded { payload }),
            Outcome::Fail(failed) => on_failure(failed),
            Outcome::Drop => {}
        });
    }
}

type Row = HashMap<String, FieldValue>;

fn row(pairs: &[(&str, FieldValue)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Host list; `get_items` hands back the rows matching nothing in particular
struct DocumentLibrary {
    rows: Arc<Vec<Row>>,
}

/// Host item collection, reachable only through its cursor
struct ListItemCollection {
    rows: Arc<Vec<Row>>,
    query: CamlQuery,
}

impl Enumerable for ListItemCollection {
    type Item = Row;
    type Cursor<'a>
        = SliceCursor<'a, Row>
    where
        Self: 'a;

    fn get_enumerator(&self) -> SliceCursor<'_, Row> {
        SliceCursor::new(self.rows.as_slice())
    }
}

impl ListSource for DocumentLibrary {
    type Items = ListItemCollection;

    fn get_items(&self, query: CamlQuery) -> ListItemCollection {
        ListItemCollection {
            rows: Arc::clone(&self.rows),
            query,
        }
    }
}

fn documents() -> DocumentLibrary {
    DocumentLibrary {
        rows: Arc::new(vec![
            row(&[("Title", "Budget".into()), ("ContentType", "Document".into()), ("Total", 120.into())]),
            row(&[("Title", "Roadmap".into()), ("ContentType", "Folder".into()), ("Total", 0.into())]),
            row(&[("Title", "".into()), ("ContentType", "Document".into()), ("Total", 30.into())]),
        ]),
    }
}

async fn online_runtime() -> (Arc<Page>, Runtime<Page>) {
    let page = Arc::new(Page::default());
    let runtime = Runtime::new(Arc::clone(&page), Config::default()).unwrap();
    runtime.bring_online().await.unwrap();
    (page, runtime)
}

#[tokio::test]
async fn test_context_requires_online_runtime() {
    let page = Arc::new(Page::default());
    let runtime = Runtime::new(Arc::clone(&page), Config::default()).unwrap();
    let host = HostContext::new(Outcome::Succeed(json!(null)));

    assert!(matches!(
        runtime.client_context(Arc::clone(&host)),
        Err(SpextError::NotOnline)
    ));

    runtime.bring_online().await.unwrap();
    assert!(runtime.is_online());
    assert!(runtime.client_context(host).is_ok());
}

#[tokio::test]
async fn test_bring_online_registers_and_runs_hooks_once() {
    let page = Arc::new(Page::default());
    let runtime = Runtime::new(Arc::clone(&page), Config::default()).unwrap();
    let online = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&online);
    runtime.on_online(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let (a, b) = tokio::join!(runtime.bring_online(), runtime.bring_online());
    a.unwrap();
    b.unwrap();
    runtime.bring_online().await.unwrap();

    assert_eq!(online.load(Ordering::SeqCst), 1);
    assert_eq!(page.executions.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.status("SP.js"), ModuleStatus::Loaded);
    assert_eq!(
        page.module_url("sp.js").as_deref(),
        Some("/sites/dev/_layouts/15/sp.js")
    );
}

#[tokio::test]
async fn test_import_loads_dependent_modules() {
    let (page, runtime) = online_runtime().await;
    runtime.register_dependency("SP.Taxonomy.js", "sp.js").unwrap();

    runtime.import(["sp.taxonomy.js", "sp.js"]).await.unwrap();
    assert_eq!(runtime.status("sp.taxonomy.js"), ModuleStatus::Loaded);
    assert_eq!(
        page.module_url("sp.taxonomy.js").as_deref(),
        Some("/sites/dev/_layouts/15/sp.taxonomy.js")
    );
}

#[tokio::test]
async fn test_execute_query_success() {
    let (_page, runtime) = online_runtime().await;
    let host = HostContext::new(Outcome::Succeed(json!({ "items": 3 })));
    let context = runtime.client_context(Arc::clone(&host)).unwrap();

    let response = context.execute_query().await.unwrap();
    assert_eq!(
        response,
        QueryResponse::Succeeded(RequestSucceeded { payload: json!({ "items": 3 }) })
    );
    assert!(response.is_success());
    assert_eq!(host.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_query_failure_without_handler() {
    let (_page, runtime) = online_runtime().await;
    let context = runtime
        .client_context(HostContext::new(Outcome::Fail(RequestFailed::new("Access denied."))))
        .unwrap();

    let error = context.execute_query().await.unwrap_err();
    assert_eq!(error, QueryError::Failed(RequestFailed::new("Access denied.")));
    assert_eq!(error.to_string(), "Query failed: Access denied.");
}

#[tokio::test]
async fn test_unhandled_error_handler_recovers() {
    let (_page, runtime) = online_runtime().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    runtime.register_unhandled_error_handler(move |failed: RequestFailed| {
        log.lock().push(failed.message.clone());
        async move { Ok(json!({ "fallback": failed.message })) }
    });

    let context = runtime
        .client_context(HostContext::new(Outcome::Fail(RequestFailed::new("Throttled"))))
        .unwrap();
    let response = context.execute_query().await.unwrap();

    assert_eq!(response, QueryResponse::Recovered(json!({ "fallback": "Throttled" })));
    assert!(!response.is_success());
    assert_eq!(*seen.lock(), vec!["Throttled".to_string()]);
}

#[tokio::test]
async fn test_handler_can_reject_and_be_replaced() {
    let (_page, runtime) = online_runtime().await;
    runtime.register_unhandled_error_handler(|failed: RequestFailed| async move {
        Err(RequestFailed {
            error_code: Some(-1),
            ..failed
        })
    });

    let host = HostContext::new(Outcome::Fail(RequestFailed::new("Item not found")));
    let context = runtime.client_context(Arc::clone(&host)).unwrap();
    match context.execute_query().await {
        Err(QueryError::Failed(failed)) => {
            assert_eq!(failed.message, "Item not found");
            assert_eq!(failed.error_code, Some(-1));
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    runtime.register_unhandled_error_handler(|_failed: RequestFailed| async { Ok(json!(true)) });
    assert_eq!(
        context.execute_query().await,
        Ok(QueryResponse::Recovered(json!(true)))
    );
}

#[tokio::test]
async fn test_abandoned_query() {
    let (_page, runtime) = online_runtime().await;
    let context = runtime.client_context(HostContext::new(Outcome::Drop)).unwrap();
    assert_eq!(context.execute_query().await, Err(QueryError::Abandoned));
}

#[tokio::test]
async fn test_query_result_then_collection_operations() {
    let (_page, runtime) = online_runtime().await;
    let context = runtime
        .client_context(HostContext::new(Outcome::Succeed(json!(null))))
        .unwrap();

    let items = documents().query_result(None);
    assert_eq!(items.query.view_xml(), "<View><Query></Query></View>");
    context.execute_query().await.unwrap();

    let titled = items.filter_by("Title");
    assert_eq!(titled.len(), 2);

    let documents_only = items.filter_by(fields! { "ContentType" => "Document" });
    assert_eq!(documents_only.len(), 2);

    let groups = items.group_by(|item| item["ContentType"].to_string());
    assert_eq!(groups.get("Document").map(<[Row]>::len), Some(2));
    assert_eq!(groups.get("Folder").map(<[Row]>::len), Some(1));

    let total = items.reduce(
        |sum, item, _, _| match item["Total"] {
            FieldValue::Number(n) => sum + n,
            _ => sum,
        },
        0.0,
    );
    assert_eq!(total, 150.0);

    assert!(!items.every(|item, _, _| item["Title"].is_truthy()));
    assert!(items.some(|item, _, _| item["Title"] == FieldValue::from("Roadmap")));
    assert_eq!(
        items.find(|item, _, _| item["Total"] == FieldValue::from(30)).map(|item| item["Title"].clone()),
        Some(FieldValue::from(""))
    );
}

#[tokio::test]
async fn test_runtime_config_from_environment_pairs() {
    let mut config = Config::default();
    config
        .apply_vars([("SPEXT_BOOTSTRAP_MODULE", "SP.Core.js"), ("SPEXT_ANNOUNCE", "false")])
        .unwrap();

    let page = Arc::new(Page::default());
    let runtime = Runtime::new(Arc::clone(&page), config).unwrap();
    runtime.bring_online().await.unwrap();

    assert_eq!(runtime.loader().bootstrap_module(), "sp.core.js");
    assert_eq!(runtime.status("sp.core.js"), ModuleStatus::Loaded);
    assert!(runtime.is_online());
}
