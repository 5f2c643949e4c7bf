use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use bot_lcmgl::{
    DecodeError, DecodeQueue, DecoderConfig, ErrorKind, LcmglWriter, OpenState, PrimitiveKind,
    RecordingSink, SinkCall, TextureFormat, TextureHandle,
};

fn triangle(z: f32) -> Vec<u8> {
    let mut w = LcmglWriter::new();
    w.begin(PrimitiveKind::Triangles);
    w.vertex3f(0.0, 0.0, z);
    w.vertex3f(1.0, 0.0, z);
    w.vertex3f(0.0, 1.0, z);
    w.end();
    w.finish()
}

#[test]
fn buffers_from_many_threads_all_decode() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let producers: Vec<_> = (0..4)
        .map(|i| {
            let submitter = submitter.clone();
            thread::spawn(move || {
                for n in 0..8 {
                    submitter
                        .submit(format!("LCMGL_{i}"), triangle(n as f32))
                        .unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.decoded, 32);
    assert!(report.failures.is_empty());
    assert_eq!(report.buffers(), 32);

    // Buffers never interleave: every Begin is followed by its three vertices and End.
    let calls = sink.into_calls();
    assert_eq!(calls.len(), 32 * 5);
    for chunk in calls.chunks(5) {
        assert_eq!(chunk[0], SinkCall::Begin(PrimitiveKind::Triangles));
        assert!(matches!(&chunk[1..4], [SinkCall::Vertex(_), SinkCall::Vertex(_), SinkCall::Vertex(_)]));
        assert_eq!(chunk[4], SinkCall::End);
    }
    assert_eq!(queue.channels().count(), 4);
}

#[test]
fn failing_buffer_does_not_stop_the_rest() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let mut bad = LcmglWriter::new();
    bad.pop_matrix();
    submitter.submit("LCMGL_bad", bad.finish()).unwrap();
    submitter.submit("LCMGL_good", triangle(0.0)).unwrap();

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.decoded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].channel, "LCMGL_bad");
    assert_eq!(report.failures[0].error.kind(), ErrorKind::ProtocolViolation);
    assert_eq!(sink.calls().len(), 5);
}

#[test]
fn texture_ids_are_scoped_per_channel() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let mut create = LcmglWriter::new();
    create.tex_image_2d(3, 1, 1, TextureFormat::Luminance, &[0x80]);
    submitter.submit("a", create.finish()).unwrap();

    let mut bind = LcmglWriter::new();
    bind.bind_texture(3);
    let bind = bind.finish();
    submitter.submit("a", bind.clone()).unwrap();
    submitter.submit("b", bind).unwrap();

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.decoded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].channel, "b");
    assert!(matches!(
        report.failures[0].error,
        DecodeError::UnknownHandle { id: 3, .. }
    ));

    assert_eq!(
        queue.decoder("a").unwrap().state().texture(3),
        Some(TextureHandle(1))
    );
    assert_eq!(queue.decoder("b").unwrap().state().texture(3), None);
}

#[test]
fn state_carries_across_buffers_of_one_channel() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let mut first = LcmglWriter::new();
    first.new_list(9);
    first.line_width(2.0);
    first.end_list();
    submitter.submit("LCMGL", first.finish()).unwrap();

    let mut second = LcmglWriter::new();
    second.call_list(9);
    submitter.submit("LCMGL", second.finish()).unwrap();

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.decoded, 2);
    assert!(report.failures.is_empty());
    assert!(sink
        .calls()
        .iter()
        .any(|c| matches!(c, SinkCall::CallList(_))));

    sink.clear();
    queue.release_all(&mut sink);
    assert_eq!(sink.calls().len(), 1);
    assert!(matches!(sink.calls()[0], SinkCall::DeleteList(_)));
    assert_eq!(queue.channels().count(), 0);
}

#[test]
fn open_primitive_from_a_failed_channel_is_closed_before_the_next() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let mut a = LcmglWriter::new();
    a.begin(PrimitiveKind::Lines);
    submitter.submit("A", a.finish()).unwrap();

    let mut b = LcmglWriter::new();
    b.push_matrix();
    b.pop_matrix();
    submitter.submit("B", b.finish()).unwrap();

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.decoded, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        DecodeError::UnbalancedStream {
            open_primitive: Some(PrimitiveKind::Lines),
            ..
        }
    ));
    assert_eq!(
        sink.calls(),
        &[
            SinkCall::Begin(PrimitiveKind::Lines),
            SinkCall::End,
            SinkCall::PushMatrix,
            SinkCall::PopMatrix,
        ]
    );
    assert_eq!(queue.decoder("A").unwrap().left_open(), OpenState::default());
}

#[test]
fn stacks_and_lists_from_a_mid_stream_failure_are_unwound() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());

    let mut a = LcmglWriter::new();
    a.new_list(1);
    a.push_attrib(0x4000);
    a.push_matrix();
    a.pop_matrix();
    a.pop_matrix();
    submitter.submit("A", a.finish()).unwrap();

    let mut b = LcmglWriter::new();
    b.line_width(1.5);
    submitter.submit("B", b.finish()).unwrap();

    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error.kind(), ErrorKind::ProtocolViolation);

    let calls = sink.calls();
    assert_eq!(
        &calls[1..],
        &[
            SinkCall::PushAttrib(0x4000),
            SinkCall::PushMatrix,
            SinkCall::PopMatrix,
            SinkCall::PopAttrib,
            SinkCall::EndList,
            SinkCall::LineWidth(1.5),
        ]
    );
    assert!(matches!(calls[0], SinkCall::NewList(_)));
}

#[test]
fn drain_returns_while_producers_keep_submitting() {
    let (mut queue, submitter) = DecodeQueue::new(DecoderConfig::default());
    let stop = Arc::new(AtomicBool::new(false));

    let producer = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if submitter.submit("LCMGL", triangle(0.0)).is_err() {
                    break;
                }
            }
        })
    };

    while queue.pending() == 0 {
        thread::yield_now();
    }
    let mut sink = RecordingSink::new();
    let report = queue.drain(&mut sink);
    assert!(report.decoded >= 1);
    assert!(report.failures.is_empty());

    stop.store(true, Ordering::Relaxed);
    producer.join().unwrap();
}
