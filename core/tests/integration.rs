//! Full document lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every `Crocodoc`
//! operation over real HTTP. The mock rejects parameters outside each
//! endpoint's allow-list, so any leaked option fails these tests.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crocodoc_core::{
    ApiError, Config, ConversionStatus, Crocodoc, FileUpload, Options, UploadSource,
};
use mock_server::{MockState, ANNOTATION_MARKER};

const TOKEN: &str = "integration-token";

/// Start the mock server on a random port and return its address.
fn start_server(state: MockState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn crocodoc(addr: SocketAddr, token: &str) -> Crocodoc {
    Crocodoc::new(
        Config::new(token)
            .with_base_url(&format!("http://{addr}/api/v1"))
            .with_timeout(Duration::from_secs(10)),
    )
}

/// Accept connections and hold them open without ever answering.
fn start_silent_server() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });
    addr
}

/// Read the mock's store from a synchronous test.
fn inspect<T>(state: &MockState, f: impl FnOnce(&mock_server::Store) -> T) -> T {
    f(&state.store.blocking_read())
}

#[test]
fn document_lifecycle() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state.clone());
    let client = crocodoc(addr, TOKEN);

    // Step 1: upload by URL with every option set; only upload's own
    // parameters may reach the server.
    let options = Options::new()
        .title("Quarterly")
        .private(true)
        .async_(true)
        .annotated(true)
        .editable(false)
        .downloadable(false)
        .name("ignored");
    let by_url = client
        .upload(&UploadSource::url("http://example.com/q.pdf"), &options)
        .unwrap();
    assert_eq!(by_url.short_id.len(), 5);
    inspect(&state, |store| {
        let doc = &store.documents[&by_url.uuid];
        assert_eq!(doc.title.as_deref(), Some("Quarterly"));
        assert_eq!(doc.source_url.as_deref(), Some("http://example.com/q.pdf"));
        assert!(doc.private);
        assert!(doc.async_);
    });

    // Step 2: upload file content as multipart.
    let by_file = client
        .upload(
            &UploadSource::File(FileUpload::new("notes.pdf", b"%PDF-1.7 notes".to_vec())),
            &Options::new().title("Notes"),
        )
        .unwrap();
    inspect(&state, |store| {
        let doc = &store.documents[&by_file.uuid];
        assert_eq!(doc.content, b"%PDF-1.7 notes");
        assert_eq!(doc.title.as_deref(), Some("Notes"));
        assert!(!doc.private);
    });

    // Step 3: status for both documents in one call.
    let statuses = client
        .status(&[by_url.uuid.as_str(), by_file.uuid.as_str()], &options)
        .unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].uuid, by_url.uuid);
    assert_eq!(statuses[1].uuid, by_file.uuid);
    assert!(statuses.iter().all(|s| s.status == ConversionStatus::Done && s.viewable));

    // Step 4: download, plain and annotated.
    let plain = client.download(&by_file.uuid, &Options::new()).unwrap();
    assert_eq!(plain, b"%PDF-1.7 notes");
    let annotated = client
        .download(&by_file.uuid, &Options::new().annotated(true))
        .unwrap();
    assert!(annotated.ends_with(ANNOTATION_MARKER));

    // Step 5: share, then build the embed URL.
    let shared = client.share(&by_file.uuid, &options).unwrap();
    assert_eq!(
        client.embeddable_viewer_url(&shared.short_id),
        format!("http://crocodoc.com/{}?embedded=true", shared.short_id)
    );

    // Step 6: session with defaults from config, name from options.
    let session = client
        .get_session(&by_file.uuid, &Options::new().name("Jeremy"))
        .unwrap();
    inspect(&state, |store| {
        let issued = store.sessions.last().unwrap();
        assert_eq!(issued.session_id, session.session_id);
        assert_eq!(issued.name.as_deref(), Some("Jeremy"));
        assert!(issued.editable);
        assert!(issued.downloadable);
    });
    assert!(client
        .session_based_viewer_url(&session.session_id)
        .ends_with(&session.session_id));

    // Step 7: delete both; the mock answers with a bare `true`.
    assert!(client.delete(&by_url.uuid, &Options::new()).unwrap());
    assert!(client.delete(&by_file.uuid, &Options::new()).unwrap());
    inspect(&state, |store| assert!(store.documents.is_empty()));

    // Step 8: deleting again is a request failure, not `false`.
    let err = client.delete(&by_file.uuid, &Options::new()).unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 400, .. }));
    assert!(err.is_request_failure());

    // Step 9: status for a deleted document reports the error inline.
    let statuses = client.status(&[by_file.uuid.as_str()], &Options::new()).unwrap();
    assert_eq!(statuses[0].status, ConversionStatus::Error);
    assert_eq!(statuses[0].error.as_deref(), Some("invalid uuid"));
}

#[test]
fn wrong_token_is_request_failure_for_every_operation() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state);
    let client = crocodoc(addr, "wrong");
    let opts = Options::new();

    let errors = vec![
        client
            .upload(&UploadSource::url("http://example.com/a.pdf"), &opts)
            .unwrap_err(),
        client.status(&["a"], &opts).unwrap_err(),
        client.delete("a", &opts).unwrap_err(),
        client.download("a", &opts).unwrap_err(),
        client.share("a", &opts).unwrap_err(),
        client.get_session("a", &opts).unwrap_err(),
    ];
    for err in errors {
        assert!(
            matches!(err, ApiError::HttpStatus { status: 401, .. }),
            "unexpected error: {err:?}"
        );
    }
}

#[test]
fn per_call_token_overrides_config() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state);
    let client = crocodoc(addr, "wrong");

    let doc = client
        .upload(
            &UploadSource::url("http://example.com/a.pdf"),
            &Options::new().token(TOKEN),
        )
        .unwrap();
    assert!(client.delete(&doc.uuid, &Options::new().token(TOKEN)).unwrap());
}

#[test]
fn concurrent_calls_share_one_client() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state.clone());
    let client = crocodoc(addr, TOKEN);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || {
                let doc = client
                    .upload(
                        &UploadSource::url(format!("http://example.com/{i}.pdf")),
                        &Options::new(),
                    )
                    .unwrap();
                let statuses = client.status(&[doc.uuid.as_str()], &Options::new()).unwrap();
                assert_eq!(statuses[0].uuid, doc.uuid);
                doc.uuid
            })
        })
        .collect();

    let uuids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(uuids.len(), 8);
    inspect(&state, |store| assert_eq!(store.documents.len(), 8));
}

#[test]
fn sub_second_timeout_still_completes_calls() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state.clone());
    let client = Crocodoc::new(
        Config::new(TOKEN)
            .with_base_url(&format!("http://{addr}/api/v1"))
            .with_timeout(Duration::from_millis(750)),
    );

    let doc = client
        .upload(&UploadSource::url("http://example.com/fast.pdf"), &Options::new())
        .unwrap();
    assert!(client.delete(&doc.uuid, &Options::new()).unwrap());
}

#[test]
fn unresponsive_server_hits_configured_timeout() {
    let addr = start_silent_server();
    let client = Crocodoc::new(
        Config::new(TOKEN)
            .with_base_url(&format!("http://{addr}/api/v1"))
            .with_timeout(Duration::from_millis(200)),
    );

    let started = Instant::now();
    let err = client.delete("u-1", &Options::new()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "unexpected error: {err:?}");
    assert!(err.is_request_failure());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn empty_file_reaches_the_server() {
    let state = MockState::new(TOKEN);
    let addr = start_server(state.clone());
    let client = crocodoc(addr, TOKEN);

    let doc = client
        .upload(
            &UploadSource::File(FileUpload::new("blank.pdf", Vec::new())),
            &Options::new(),
        )
        .unwrap();
    inspect(&state, |store| assert!(store.documents[&doc.uuid].content.is_empty()));
}
