//! Browser tests for the WebGL backend, run with `wasm-pack test --headless`
#![cfg(target_arch = "wasm32")]

use shaderlink_core::prelude::*;
use shaderlink_web::{ShaderLinker, WebGlHost};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const VERTEX: &str = "void main(){gl_Position=vec4(0.0,0.0,0.0,1.0);}";
const FRAGMENT: &str = "precision mediump float;\nvoid main(){gl_FragColor=vec4(1.0);}";

fn mount_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    if document.get_element_by_id(id).is_some() {
        return;
    }
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
}

#[wasm_bindgen_test]
fn test_links_program_on_canvas() {
    mount_canvas("shaderlink-test");
    let host = WebGlHost::new();
    let context = host.acquire_context("shaderlink-test").unwrap();

    let program = create_shader_program(&host, context, VERTEX, FRAGMENT).unwrap();

    assert!(!program.is_null());
    assert!(host.program(program).is_some());
    assert_eq!(
        host.program_parameter(context, program, shaderlink_core::gl::LINK_STATUS),
        1
    );
}

#[wasm_bindgen_test]
fn test_same_canvas_reuses_context() {
    mount_canvas("shaderlink-reuse");
    let host = WebGlHost::new();
    let first = host.acquire_context("shaderlink-reuse").unwrap();
    let second = host.acquire_context("shaderlink-reuse").unwrap();
    assert_eq!(first, second);
}

#[wasm_bindgen_test]
fn test_missing_canvas_is_unavailable() {
    let host = WebGlHost::new();
    let err = host.acquire_context("no-such-canvas").unwrap_err();
    assert!(matches!(err, ShaderlinkError::ContextUnavailable(_)));
}

#[wasm_bindgen_test]
fn test_vertex_error_carries_driver_log() {
    mount_canvas("shaderlink-errors");
    let host = WebGlHost::new();
    let context = host.acquire_context("shaderlink-errors").unwrap();

    let err = create_shader_program(&host, context, "not valid glsl", FRAGMENT).unwrap_err();

    assert_eq!(err.stage(), Some(ShaderStage::Vertex));
    assert!(!err.log().is_empty());
}

#[wasm_bindgen_test]
fn test_linker_rejects_unknown_policy() {
    mount_canvas("shaderlink-linker");
    let mut linker = ShaderLinker::new("shaderlink-linker").unwrap();
    assert!(linker.set_cleanup_policy("delete_after_link").is_ok());
    assert!(linker.set_cleanup_policy("sometimes").is_err());

    let handle = linker.create_shader_program(VERTEX, FRAGMENT).unwrap();
    assert!(linker.program(handle).is_some());
}

#[wasm_bindgen_test]
fn test_delete_with_unknown_context_keeps_object() {
    mount_canvas("shaderlink-delete");
    let host = WebGlHost::new();
    let context = host.acquire_context("shaderlink-delete").unwrap();
    let program = create_shader_program(&host, context, VERTEX, FRAGMENT).unwrap();

    host.delete_program(ContextHandle::from_raw(context.raw() + 100), program);
    assert!(host.program(program).is_some());

    host.delete_program(context, program);
    assert!(host.program(program).is_none());
}
