//! Six concrete end-to-end scenarios, driven through `RpcHandler`
//! against a `HeadlessEditorHost` the way a real transport would call
//! in: accept, reject, a new-file diff, a refused unsaved-changes open,
//! replacing a still-pending diff under the same tab name, and the
//! inline layout.

use std::sync::Arc;

use diffbridge::config::Config;
use diffbridge::controller::DiffController;
use diffbridge::headless::HeadlessEditorHost;
use diffbridge::proto::OpenDiffRequest;
use diffbridge::registry::DiffRegistry;
use diffbridge::rpc::RpcHandler;
use diffbridge::DiffError;

fn rig(config: Config) -> (RpcHandler<HeadlessEditorHost>, Arc<HeadlessEditorHost>, Arc<DiffRegistry>) {
    let host = Arc::new(HeadlessEditorHost::new());
    let registry = Arc::new(DiffRegistry::new());
    let controller = Arc::new(DiffController::new(host.clone(), registry.clone(), config.diff_opts));
    (RpcHandler::new(controller), host, registry)
}

fn open(path: &str, new_path: &str, contents: &str, tab: &str) -> OpenDiffRequest {
    OpenDiffRequest {
        old_file_path: path.into(),
        new_file_path: new_path.into(),
        new_file_contents: contents.to_string(),
        tab_name: tab.to_string(),
    }
}

#[tokio::test]
async fn scenario_1_accept() {
    let (handler, host, registry) = rig(Config::default());
    host.seed_file("/t/a.txt", "one\ntwo\n");

    let call = handler.open_diff(open("/t/a.txt", "/t/a.txt", "one\ntwo_x\n", "tab1"));
    let resolve = async {
        while !registry.contains("tab1") {
            tokio::task::yield_now().await;
        }
        let buffer = host.buffer_for_tab_name("tab1").unwrap();
        host.fire_write_intercept(buffer);
    };
    let (reply, _) = tokio::join!(call, resolve);
    let reply = reply.unwrap();
    assert_eq!(reply.content[0].text, "FILE_SAVED");
    assert_eq!(reply.content[1].text, "one\ntwo_x\n");
}

#[tokio::test]
async fn scenario_2_reject() {
    let (handler, host, registry) = rig(Config::default());
    host.seed_file("/t/a.txt", "one\ntwo\n");

    let call = handler.open_diff(open("/t/a.txt", "/t/a.txt", "one\ntwo_x\n", "tab1"));
    let resolve = async {
        while !registry.contains("tab1") {
            tokio::task::yield_now().await;
        }
        let buffer = host.buffer_for_tab_name("tab1").unwrap();
        host.fire_close_hook(buffer);
    };
    let (reply, _) = tokio::join!(call, resolve);
    let reply = reply.unwrap();
    assert_eq!(reply.content[0].text, "DIFF_REJECTED");
    assert_eq!(reply.content[1].text, "tab1");
}

#[tokio::test]
async fn scenario_3_new_file_accept() {
    let (handler, host, registry) = rig(Config::default());

    let call = handler.open_diff(open("/t/new.txt", "/t/new.txt", "hello\n", "tab2"));
    let resolve = async {
        while !registry.contains("tab2") {
            tokio::task::yield_now().await;
        }
        let buffer = host.buffer_for_tab_name("tab2").unwrap();
        host.write_buffer(buffer, "hello world\n");
        host.fire_write_intercept(buffer);
    };
    let (reply, _) = tokio::join!(call, resolve);
    let reply = reply.unwrap();
    assert_eq!(reply.content[0].text, "FILE_SAVED");
    assert_eq!(reply.content[1].text, "hello world\n");
}

#[tokio::test]
async fn scenario_4_unsaved_changes() {
    let (handler, host, registry) = rig(Config::default());
    host.seed_file("/t/a.txt", "one\n");
    host.seed_open_unsaved("/t/a.txt");

    let err = handler
        .open_diff(open("/t/a.txt", "/t/a.txt", "two\n", "tab1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, 1);
    assert!(!registry.contains("tab1"));
}

#[tokio::test]
async fn scenario_5_replacement() {
    let (handler, host, registry) = rig(Config::default());
    host.seed_file("/t/a.txt", "one\n");
    let handler = Arc::new(handler);

    let first = {
        let handler = handler.clone();
        tokio::spawn(async move { handler.open_diff(open("/t/a.txt", "/t/a.txt", "first\n", "dup")).await })
    };

    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    let resolve_second = async {
        while registry.pending_tab_names().is_empty() {
            tokio::task::yield_now().await;
        }
        let buffer = host.buffer_for_tab_name("dup").unwrap();
        host.fire_write_intercept(buffer);
    };
    let (second_reply, _) =
        tokio::join!(handler.open_diff(open("/t/a.txt", "/t/a.txt", "second\n", "dup")), resolve_second);

    let first_reply = first.await.unwrap().unwrap();
    assert_eq!(first_reply.content[0].text, "DIFF_REJECTED");
    let second_reply = second_reply.unwrap();
    assert_eq!(second_reply.content[0].text, "FILE_SAVED");
}

#[tokio::test]
async fn scenario_6_inline_layout() {
    let mut config = Config::default();
    config.diff_opts.layout = "inline".to_string();
    let (handler, host, registry) = rig(config);
    host.seed_file("/t/a.txt", "a\nb\nc\n");

    let call = handler.open_diff(open("/t/a.txt", "/t/a.txt", "a\nB\nc\n", "tab3"));
    let resolve = async {
        while !registry.contains("tab3") {
            tokio::task::yield_now().await;
        }
        let buffer = host.buffer_for_tab_name("tab3").unwrap();
        host.fire_write_intercept(buffer);
    };
    let (reply, _) = tokio::join!(call, resolve);
    let reply = reply.unwrap();
    assert_eq!(reply.content[0].text, "FILE_SAVED");
    assert_eq!(reply.content[1].text, "a\nB\nc\n");
}

#[tokio::test]
async fn internal_error_outside_a_runtime_is_unreachable_from_tokio_test() {
    // open_diff_blocking's runtime guard can only be exercised from a
    // thread with no Tokio runtime bound; this crate's own tests always
    // run inside one. Document the guard's error variant directly.
    let err = DiffError::InternalError;
    assert_eq!(err.to_string(), "internal error: must run inside a suspendable execution context");
}
