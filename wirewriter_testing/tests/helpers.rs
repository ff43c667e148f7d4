//! Behaviour of the shared test doubles.

use std::io;

use rstest::rstest;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use wirewriter::{OutputSink, websocket::Opcode};
use wirewriter_testing::{
    ChunkedReader,
    FlushBehaviour,
    RecordingSink,
    decode_frames,
    recording_sink,
};

fn put(sink: &mut RecordingSink, bytes: &[u8]) {
    let region = sink.reserve(bytes.len());
    region[..bytes.len()].copy_from_slice(bytes);
    sink.commit(bytes.len());
}

#[rstest]
#[tokio::test]
async fn each_flush_becomes_one_batch(mut recording_sink: RecordingSink) {
    let cancel = CancellationToken::new();
    put(&mut recording_sink, b"ab");
    put(&mut recording_sink, b"c");
    recording_sink.flush(&cancel).await.expect("flush");
    put(&mut recording_sink, b"d");
    recording_sink.flush(&cancel).await.expect("flush");
    recording_sink.flush(&cancel).await.expect("empty flush");

    assert_eq!(recording_sink.batches(), [b"abc".to_vec(), b"d".to_vec()]);
    assert_eq!(recording_sink.flush_attempts(), 3);
}

#[tokio::test]
async fn failing_sink_keeps_pending_bytes() {
    let mut sink = RecordingSink::with_behaviour(FlushBehaviour::FailAfter(0));
    put(&mut sink, b"xyz");

    let err = sink
        .flush(&CancellationToken::new())
        .await
        .expect_err("flush should fail");

    assert!(matches!(err, wirewriter::WireError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert_eq!(sink.pending(), b"xyz");
}

#[tokio::test]
async fn stalled_sink_waits_for_cancellation() {
    let mut sink = RecordingSink::with_behaviour(FlushBehaviour::Stall);
    put(&mut sink, b"x");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move { trigger.cancel() });

    let err = sink.flush(&cancel).await.expect_err("flush should stall");
    assert!(err.is_cancelled());
    assert!(sink.batches().is_empty());
}

#[tokio::test]
async fn chunked_reader_follows_script() {
    let mut reader = ChunkedReader::new(b"abcdefgh".to_vec(), [3, 1]);
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).await.expect("read"), 3);
    assert_eq!(reader.read(&mut buf).await.expect("read"), 1);
    assert_eq!(reader.read(&mut buf).await.expect("read"), 4);
    assert_eq!(reader.read(&mut buf).await.expect("read"), 0);
    assert_eq!(reader.polls(), 4);
}

#[tokio::test]
async fn chunked_reader_raises_scripted_error() {
    let mut reader = ChunkedReader::new(b"a".to_vec(), []).failing_with(io::ErrorKind::ConnectionReset);
    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf).await.expect("read"), 1);
    let err = reader.read(&mut buf).await.expect_err("read should fail");
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
}

#[rstest]
#[case(&[0x81, 0x00][..], 1)]
#[case(&[0x01, 0x01, b'a', 0x80, 0x00][..], 2)]
fn decodes_concatenated_frames(#[case] wire: &[u8], #[case] count: usize) {
    let frames = decode_frames(wire).expect("frames");
    assert_eq!(frames.len(), count);
    assert!(frames.last().is_some_and(|frame| frame.fin));
    assert!(matches!(frames[0].opcode, Opcode::Text));
}

#[test]
fn truncated_frames_are_reported() {
    let err = decode_frames(&[0x82, 0x05, 1, 2]).expect_err("truncated");
    assert!(err.contains("truncated"));
}
