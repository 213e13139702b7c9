//! End-to-end sync runs against a mocked remote service.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use rangesync::api::{ApiError, Connectivity, RemoteApi};
use rangesync::config::AutoSyncConfig;
use rangesync::model::plan::{Plan, PlanStatus};
use rangesync::model::reference::{LivestockType, PlanStatusRow, ReferenceBundle, ReferenceTable};
use rangesync::model::pasture::Pasture;
use rangesync::store::Store;
use rangesync::sync::{SyncError, Synchronizer};

struct MockConnectivity {
    online: AtomicBool,
}

#[async_trait]
impl Connectivity for MockConnectivity {
    async fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Calls {
    get_reference: AtomicUsize,
    get_agreements: AtomicUsize,
    get_plan: AtomicUsize,
    add_plan: AtomicUsize,
    add_pasture: AtomicUsize,
    add_schedule: AtomicUsize,
    add_issue: AtomicUsize,
}

struct MockApi {
    reference: Value,
    agreements: Mutex<Result<Value, ApiError>>,
    plan_payload: Value,
    fail_next_add_plan: AtomicBool,
    next_id: AtomicI64,
    calls: Calls,
}

impl MockApi {
    fn new(reference: Value, agreements: Value) -> MockApi {
        MockApi {
            reference,
            agreements: Mutex::new(Ok(agreements)),
            plan_payload: json!({}),
            fail_next_add_plan: AtomicBool::new(false),
            next_id: AtomicI64::new(100),
            calls: Calls::default(),
        }
    }

    fn fail_agreements(self, message: &str) -> MockApi {
        *self.agreements.lock().unwrap() = Err(ApiError::Remote(message.to_string()));
        self
    }

    fn fail_next_plan_upload(self) -> MockApi {
        self.fail_next_add_plan.store(true, Ordering::SeqCst);
        self
    }

    fn assigned_id(&self) -> Value {
        json!({ "id": self.next_id.fetch_add(1, Ordering::SeqCst) })
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn get_reference_data(&self) -> Result<Value, ApiError> {
        self.calls.get_reference.fetch_add(1, Ordering::SeqCst);
        Ok(self.reference.clone())
    }

    async fn get_agreements(&self) -> Result<Value, ApiError> {
        self.calls.get_agreements.fetch_add(1, Ordering::SeqCst);
        self.agreements.lock().unwrap().clone()
    }

    async fn get_plan(&self, _remote_id: i64) -> Result<Value, ApiError> {
        self.calls.get_plan.fetch_add(1, Ordering::SeqCst);
        Ok(self.plan_payload.clone())
    }

    async fn add_plan(&self, _params: Value) -> Result<Value, ApiError> {
        self.calls.add_plan.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_add_plan.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Remote("plan rejected".to_string()));
        }
        Ok(self.assigned_id())
    }

    async fn add_pasture(&self, _plan_id: i64, _params: Value) -> Result<Value, ApiError> {
        self.calls.add_pasture.fetch_add(1, Ordering::SeqCst);
        Ok(self.assigned_id())
    }

    async fn add_issue(&self, _plan_id: i64, _params: Value) -> Result<Value, ApiError> {
        self.calls.add_issue.fetch_add(1, Ordering::SeqCst);
        Ok(self.assigned_id())
    }

    async fn add_issue_action(
        &self,
        _plan_id: i64,
        _issue_id: i64,
        _params: Value,
    ) -> Result<Value, ApiError> {
        Ok(self.assigned_id())
    }

    async fn add_schedule(&self, _plan_id: i64, _params: Value) -> Result<Value, ApiError> {
        self.calls.add_schedule.fetch_add(1, Ordering::SeqCst);
        Ok(self.assigned_id())
    }
}

fn reference_payload() -> Value {
    json!({
        "LIVESTOCK_TYPE": [
            { "id": 2, "name": "Cattle", "auFactor": 1.0 },
            { "id": 1, "name": "Horse", "auFactor": 1.25 }
        ],
        "PLAN_STATUS": [
            { "id": 1, "name": "Created", "code": "C" },
            { "id": 2, "name": "Submitted", "code": "S" }
        ]
    })
}

fn agreements_payload() -> Value {
    json!([
        {
            "id": "RAN123",
            "agreementStartDate": "2018-03-01T00:00:00.000Z",
            "agreementEndDate": "2023-02-28T00:00:00.000Z",
            "agreementTypeId": 1,
            "zone": { "id": 4, "code": "CHWK", "districtId": 1 },
            "clients": [],
            "usage": [],
            "plans": []
        }
    ])
}

fn synchronizer(store: Arc<Store>, api: Arc<MockApi>, online: bool) -> (Arc<Synchronizer>, Arc<MockConnectivity>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let connectivity = Arc::new(MockConnectivity {
        online: AtomicBool::new(online),
    });
    let synchronizer = Arc::new(Synchronizer::new(
        store,
        api,
        connectivity.clone(),
        &AutoSyncConfig::default(),
    ));
    (synchronizer, connectivity)
}

#[tokio::test]
async fn offline_sync_touches_nothing() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let api = Arc::new(MockApi::new(reference_payload(), agreements_payload()));
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), false);

    let progress = Mutex::new(Vec::new());
    let result = synchronizer
        .sync(&|text| progress.lock().unwrap().push(text.to_string()))
        .await;

    assert!(matches!(result, Err(SyncError::NoConnectivity)));
    assert_eq!(
        progress.lock().unwrap().as_slice(),
        ["Failed while verifying connection"]
    );
    assert_eq!(api.calls.get_reference.load(Ordering::SeqCst), 0);
    assert_eq!(api.calls.get_agreements.load(Ordering::SeqCst), 0);
    assert!(store.last_sync().unwrap().is_none());
}

#[tokio::test]
async fn agreement_failure_is_final_but_reference_still_lands() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let api = Arc::new(
        MockApi::new(reference_payload(), json!([])).fail_agreements("token expired"),
    );
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    let result = synchronizer.sync(&|_| {}).await;

    match result {
        Err(SyncError::Remote(message)) => assert_eq!(message, "token expired"),
        other => panic!("expected remote error, got {:?}", other),
    }

    // The reference stage soft-fails independently and already committed.
    let rows: Vec<LivestockType> = store.reference_rows(ReferenceTable::LivestockType).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Horse");

    // A failed run records no sync date.
    assert!(store.last_sync().unwrap().is_none());
}

#[tokio::test]
async fn full_sync_uploads_outbox_and_records_the_run() {
    let store = Arc::new(Store::open_in_memory().unwrap());

    let mut draft = Plan::new("RAN123");
    draft.range_name = "Upper Meadow".to_string();
    draft.pastures.push(Pasture::new());
    store.save_plan(&draft).unwrap();

    let api = Arc::new(MockApi::new(reference_payload(), agreements_payload()));
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    synchronizer.sync(&|_| {}).await.unwrap();

    // The draft was uploaded and linked to its remote ids.
    assert_eq!(api.calls.add_plan.load(Ordering::SeqCst), 1);
    assert_eq!(api.calls.add_pasture.load(Ordering::SeqCst), 1);
    let uploaded = store.plan(&draft.local_id).unwrap().unwrap();
    assert!(uploaded.remote_id.is_some());
    assert!(uploaded.pastures[0].remote_id.is_some());
    assert!(store.outbox_plans().unwrap().is_empty());

    // The downloaded agreement landed, with the draft still attached.
    let agreement = store.agreement("RAN123").unwrap().unwrap();
    assert_eq!(agreement.zone.code, "CHWK");
    let attached = agreement.plan.unwrap();
    assert_eq!(attached.local_id, draft.local_id);
    assert_eq!(attached.status, PlanStatus::LocalDraft);

    let sync_date = store.last_sync().unwrap().unwrap();
    assert!(sync_date.ref_download.is_some());
}

#[tokio::test]
async fn second_sync_uploads_nothing_and_keeps_one_agreement() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let mut draft = Plan::new("RAN123");
    draft.pastures.push(Pasture::new());
    store.save_plan(&draft).unwrap();

    let api = Arc::new(MockApi::new(reference_payload(), agreements_payload()));
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    synchronizer.sync(&|_| {}).await.unwrap();
    synchronizer.sync(&|_| {}).await.unwrap();

    assert_eq!(api.calls.add_plan.load(Ordering::SeqCst), 1);
    assert_eq!(api.calls.get_agreements.load(Ordering::SeqCst), 2);
    assert_eq!(store.agreements().unwrap().len(), 1);
}

#[tokio::test]
async fn one_failed_upload_does_not_strand_other_drafts() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let first = Plan::new("RAN123");
    let second = Plan::new("RAN123");
    store.save_plan(&first).unwrap();
    store.save_plan(&second).unwrap();

    let api = Arc::new(
        MockApi::new(reference_payload(), json!([])).fail_next_plan_upload(),
    );
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    synchronizer.sync(&|_| {}).await.unwrap();

    // Both drafts were attempted; the rejected one stays queued.
    assert_eq!(api.calls.add_plan.load(Ordering::SeqCst), 2);
    assert_eq!(store.outbox_plans().unwrap().len(), 1);

    // Next run picks the leftover up.
    synchronizer.sync(&|_| {}).await.unwrap();
    assert!(store.outbox_plans().unwrap().is_empty());
}

#[tokio::test]
async fn downloaded_plan_status_resolves_during_merge() {
    let store = Arc::new(Store::open_in_memory().unwrap());

    let mut agreements = agreements_payload();
    agreements[0]["plans"] = json!([{
        "id": 31,
        "statusId": 2,
        "rangeName": "Bar K home range"
    }]);
    let api = Arc::new(MockApi::new(reference_payload(), agreements));
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    synchronizer.sync(&|_| {}).await.unwrap();

    let agreement = store.agreement("RAN123").unwrap().unwrap();
    let plan = agreement.plan.unwrap();
    assert_eq!(plan.remote_id, Some(31));
    assert_eq!(plan.status, PlanStatus::Submitted);
}

#[tokio::test]
async fn submitted_plan_status_is_refreshed_from_the_service() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    store
        .replace_reference(&ReferenceBundle {
            plan_statuses: vec![
                PlanStatusRow {
                    id: 1,
                    name: "Created".to_string(),
                    code: "C".to_string(),
                },
                PlanStatusRow {
                    id: 2,
                    name: "Submitted".to_string(),
                    code: "S".to_string(),
                },
            ],
            ..Default::default()
        })
        .unwrap();

    let mut plan = Plan::new("RAN123");
    plan.remote_id = Some(55);
    plan.status = PlanStatus::Created;
    store.save_plan(&plan).unwrap();

    let mut api = MockApi::new(reference_payload(), json!([]));
    api.plan_payload = json!({ "id": 55, "statusId": 2 });
    let api = Arc::new(api);
    let (synchronizer, _) = synchronizer(store.clone(), api.clone(), true);

    synchronizer.sync(&|_| {}).await.unwrap();

    assert_eq!(api.calls.get_plan.load(Ordering::SeqCst), 1);
    let refreshed = store.plan(&plan.local_id).unwrap().unwrap();
    assert_eq!(refreshed.status, PlanStatus::Submitted);
}
