#![cfg(not(target_arch = "wasm32"))]

use std::fs;

use bot_lcmgl::{LcmglWriter, PrimitiveKind, TextureFormat};
use tempfile::tempdir;

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn prints_calls_for_each_buffer() {
    let dir = tempdir().unwrap();

    let mut w = LcmglWriter::new();
    w.tex_image_2d(4, 2, 1, TextureFormat::Rgb, &[0; 6]);
    let first = dir.path().join("0001.lcmgl");
    fs::write(&first, w.finish()).unwrap();

    let mut w = LcmglWriter::new();
    w.begin(PrimitiveKind::Points);
    w.vertex3f(1.0, 2.0, 3.0);
    w.end();
    w.bind_texture(4);
    let second = dir.path().join("0002.lcmgl");
    fs::write(&second, w.finish()).unwrap();

    let assert = assert_cmd::cargo::cargo_bin_cmd!("lcmgl-replay")
        .arg(&first)
        .arg(&second)
        .assert()
        .success();
    let out = stdout_of(&assert);

    let headers: Vec<&str> = out.lines().filter(|l| l.starts_with("# ")).collect();
    assert_eq!(headers.len(), 2);
    assert!(headers[0].ends_with("0001.lcmgl: ok, 24 bytes, 1 records, 0 primitives, 0 vertices"));
    assert!(headers[1].contains("0002.lcmgl: ok"));
    assert!(out.contains("Begin(Points)"));
    assert!(out.contains("Vertex([1.0, 2.0, 3.0])"));
    assert!(out.contains("BindTexture(TextureHandle(1))"));
}

#[test]
fn independent_sessions_do_not_share_textures() {
    let dir = tempdir().unwrap();

    let mut w = LcmglWriter::new();
    w.tex_image_2d(4, 1, 1, TextureFormat::Luminance, &[1]);
    let first = dir.path().join("create.lcmgl");
    fs::write(&first, w.finish()).unwrap();

    let mut w = LcmglWriter::new();
    w.bind_texture(4);
    let second = dir.path().join("bind.lcmgl");
    fs::write(&second, w.finish()).unwrap();

    let assert = assert_cmd::cargo::cargo_bin_cmd!("lcmgl-replay")
        .arg("--independent")
        .arg(&first)
        .arg(&second)
        .assert()
        .failure();
    let out = stdout_of(&assert);
    assert!(out.contains("bind.lcmgl: error:"));
    assert!(out.contains("unknown texture id 4"));
}

#[test]
fn json_output_continues_past_a_failing_buffer() {
    let dir = tempdir().unwrap();

    let bad = dir.path().join("bad.lcmgl");
    fs::write(&bad, [0x05]).unwrap();

    let mut w = LcmglWriter::new();
    w.line_width(3.0);
    let good = dir.path().join("good.lcmgl");
    fs::write(&good, w.finish()).unwrap();

    let assert = assert_cmd::cargo::cargo_bin_cmd!("lcmgl-replay")
        .arg("--json")
        .arg(&bad)
        .arg(&good)
        .assert()
        .failure();
    let out = stdout_of(&assert);

    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0]["buffer"].as_str().unwrap().ends_with("bad.lcmgl"));
    assert!(lines[0]["error"].is_string());
    assert_eq!(lines[1]["call"], "line_width");
    assert_eq!(lines[1]["args"], 3.0);
    assert_eq!(lines[2]["summary"]["records"], 1);

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("1 of 2 buffers failed to decode"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert_cmd::cargo::cargo_bin_cmd!("lcmgl-replay")
        .arg(dir.path().join("nope.lcmgl"))
        .assert()
        .failure();
}
