use courier_http::{
    Continuations, Dispatcher, Failure, FailureKind, Handling, Payload, Resolution,
    StubTransport, TransportError, TransportErrorKind,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TARGET: &str = "https://api.example.test/items/1";

#[derive(Default)]
struct Recorder {
    success: Mutex<Vec<Value>>,
    custom: Mutex<Vec<Option<String>>>,
    default: Mutex<Vec<(FailureKind, Option<String>)>>,
    order: Mutex<Vec<&'static str>>,
    success_calls: AtomicUsize,
}

impl Recorder {
    fn dispatcher(recorder: &Arc<Self>, stub: StubTransport) -> Dispatcher<StubTransport> {
        let recorder = recorder.clone();
        Dispatcher::new(stub).with_default_handler(Arc::new(move |failure: &Failure| {
            recorder.order.lock().unwrap().push("default");
            recorder
                .default
                .lock()
                .unwrap()
                .push((failure.kind(), failure.payload().map(Payload::text)));
        }))
    }

    fn continuations(recorder: &Arc<Self>, on_error: Option<bool>) -> Continuations {
        let seen = recorder.clone();
        let mut continuations = Continuations::new().on_success(move |payload: Payload| {
            seen.success_calls.fetch_add(1, Ordering::SeqCst);
            seen.order.lock().unwrap().push("success");
            seen
                .success
                .lock()
                .unwrap()
                .push(payload.json().expect("success payload should be json"));
        });
        if let Some(handled) = on_error {
            let recorder = recorder.clone();
            continuations = continuations.on_error(move |failure: &Failure| {
                recorder.order.lock().unwrap().push("custom");
                recorder
                    .custom
                    .lock()
                    .unwrap()
                    .push(failure.payload().map(Payload::text));
                handled
            });
        }
        continuations
    }

    fn order(&self) -> Vec<&'static str> {
        self.order.lock().unwrap().clone()
    }
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_a_success_with_payload_expected_on_success_once() {
    let stub = StubTransport::new();
    stub.push_json(TARGET, 200, r#"{"a":1}"#);
    let recorder = Arc::new(Recorder::default());

    let resolution = Recorder::dispatcher(&recorder, stub)
        .send(TARGET, Recorder::continuations(&recorder, Some(false)))
        .await
        .expect("send should run");

    assert_eq!(resolution, Resolution::Succeeded);
    assert_eq!(recorder.success_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*recorder.success.lock().unwrap(), vec![json!({"a": 1})]);
    assert_eq!(recorder.order(), vec!["success"]);
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_b_empty_success_without_custom_expected_default_with_no_payload() {
    let stub = StubTransport::new();
    stub.push_status(TARGET, 200, None);
    let recorder = Arc::new(Recorder::default());

    let resolution = Recorder::dispatcher(&recorder, stub)
        .send(TARGET, Recorder::continuations(&recorder, None))
        .await
        .expect("send should run");

    assert_eq!(resolution, Resolution::HandledByDefault);
    assert_eq!(
        *recorder.default.lock().unwrap(),
        vec![(FailureKind::EmptySuccess(200), None)]
    );
    assert_eq!(recorder.order(), vec!["default"]);
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_c_failure_status_custom_handled_expected_default_skipped() {
    let stub = StubTransport::new();
    stub.push_json(TARGET, 400, r#"{"code":"X"}"#);
    let recorder = Arc::new(Recorder::default());

    let resolution = Recorder::dispatcher(&recorder, stub)
        .send(TARGET, Recorder::continuations(&recorder, Some(true)))
        .await
        .expect("send should run");

    assert_eq!(resolution, Resolution::HandledByCaller);
    assert_eq!(
        *recorder.custom.lock().unwrap(),
        vec![Some(r#"{"code":"X"}"#.to_string())]
    );
    assert!(recorder.default.lock().unwrap().is_empty());
    assert_eq!(recorder.order(), vec!["custom"]);
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_d_failure_status_custom_declined_expected_default_after_custom() {
    let stub = StubTransport::new();
    stub.push_json(TARGET, 400, r#"{"code":"X"}"#);
    let recorder = Arc::new(Recorder::default());

    let resolution = Recorder::dispatcher(&recorder, stub)
        .send(TARGET, Recorder::continuations(&recorder, Some(false)))
        .await
        .expect("send should run");

    assert_eq!(resolution, Resolution::DeclinedToDefault);
    assert_eq!(recorder.order(), vec!["custom", "default"]);
    assert_eq!(
        *recorder.default.lock().unwrap(),
        vec![(FailureKind::Status(400), Some(r#"{"code":"X"}"#.to_string()))]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_e_transport_failure_expected_same_selection_rule() {
    for (on_error, expected, order) in [
        (None, Resolution::HandledByDefault, vec!["default"]),
        (Some(true), Resolution::HandledByCaller, vec!["custom"]),
        (Some(false), Resolution::DeclinedToDefault, vec!["custom", "default"]),
    ] {
        let stub = StubTransport::new();
        stub.push_error(
            TARGET,
            TransportError::new(TransportErrorKind::Connect, "connection refused"),
        );
        let recorder = Arc::new(Recorder::default());

        let resolution = Recorder::dispatcher(&recorder, stub)
            .send(TARGET, Recorder::continuations(&recorder, on_error))
            .await
            .expect("send should run");

        assert_eq!(resolution, expected, "on_error={on_error:?}");
        assert_eq!(recorder.order(), order, "on_error={on_error:?}");
        assert_eq!(recorder.success_calls.load(Ordering::SeqCst), 0);
        if let Some(custom) = recorder.custom.lock().unwrap().first() {
            assert!(custom.is_none());
        }
    }
}

#[tokio::test(flavor = "current_thread")]
async fn every_outcome_fires_exactly_one_terminal_path() {
    let scripted: Vec<Box<dyn Fn(&StubTransport)>> = vec![
        Box::new(|stub: &StubTransport| stub.push_json(TARGET, 200, r#"{"ok":true}"#)),
        Box::new(|stub: &StubTransport| stub.push_status(TARGET, 200, None)),
        Box::new(|stub: &StubTransport| stub.push_json(TARGET, 500, r#"{"code":"E"}"#)),
        Box::new(|stub: &StubTransport| stub.push_status(TARGET, 404, None)),
        Box::new(|stub: &StubTransport| {
            stub.push_error(TARGET, TransportError::new(TransportErrorKind::Timeout, "slow"))
        }),
    ];

    for script in &scripted {
        for on_error in [None, Some(true), Some(false)] {
            let stub = StubTransport::new();
            script(&stub);
            let recorder = Arc::new(Recorder::default());

            let resolution = Recorder::dispatcher(&recorder, stub)
                .send(TARGET, Recorder::continuations(&recorder, on_error))
                .await
                .expect("send should run");

            let order = recorder.order();
            let success = order.iter().filter(|step| **step == "success").count();
            let custom = order.iter().filter(|step| **step == "custom").count();
            let default = order.iter().filter(|step| **step == "default").count();

            if resolution == Resolution::Succeeded {
                assert_eq!((success, custom, default), (1, 0, 0));
                continue;
            }
            assert_eq!(success, 0);
            assert_eq!(custom, usize::from(on_error.is_some()));
            assert_eq!(default, usize::from(on_error != Some(true)));
            assert_eq!(resolution.reached_default(), default == 1);
        }
    }
}

#[tokio::test(flavor = "current_thread")]
async fn custom_handler_can_branch_on_failure_kind() {
    let stub = StubTransport::new();
    stub.push_json(TARGET, 401, r#"{"code":"AUTH"}"#);
    stub.push_json(TARGET, 500, r#"{"code":"BOOM"}"#);
    let recorder = Arc::new(Recorder::default());
    let dispatcher = Recorder::dispatcher(&recorder, stub);

    let only_auth = |failure: &Failure| {
        if failure.status() == Some(401) {
            Handling::Handled
        } else {
            Handling::Declined
        }
    };

    let first = dispatcher
        .send(TARGET, Continuations::new().on_error(only_auth))
        .await
        .expect("send should run");
    let second = dispatcher
        .send(TARGET, Continuations::new().on_error(only_auth))
        .await
        .expect("send should run");

    assert_eq!(first, Resolution::HandledByCaller);
    assert_eq!(second, Resolution::DeclinedToDefault);
    assert_eq!(recorder.default.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispatch_fire_and_forget_runs_continuation_after_return() {
    let stub = StubTransport::new();
    stub.push_json(TARGET, 200, r#"{"a":1}"#);
    let recorder = Arc::new(Recorder::default());
    let (tx, rx) = tokio::sync::oneshot::channel();

    let handle = Recorder::dispatcher(&recorder, stub)
        .dispatch(
            TARGET,
            Some(Box::new(move |payload: Payload| {
                let _ = tx.send(payload.text());
            })),
            None,
        )
        .expect("dispatch should spawn");
    drop(handle);

    let body = rx.await.expect("success continuation should fire");
    assert_eq!(body, r#"{"a":1}"#);
    assert!(recorder.default.lock().unwrap().is_empty());
}
