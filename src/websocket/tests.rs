//! Unit tests for frame header encoding and the message writer.

use async_trait::async_trait;
use proptest::{prelude::*, test_runner::Config};
use rstest::{fixture, rstest};
use tokio_util::sync::CancellationToken;

use super::{header::MAX_PAYLOAD_LENGTH, *};
use crate::{
    error::{Result, WireError},
    sink::BufferedSink,
};

type VecWriter = WebSocketWriter<BufferedSink<Vec<u8>>>;

#[fixture]
fn writer() -> VecWriter { WebSocketWriter::new(BufferedSink::new(Vec::new())) }

#[fixture]
fn cancel() -> CancellationToken { CancellationToken::new() }

/// Split `wire` into `(header, payload)` pairs.
fn frames(wire: &[u8]) -> Vec<(FrameInfo, &[u8])> {
    let mut out = Vec::new();
    let mut rest = wire;
    while !rest.is_empty() {
        let info = decode_frame_info(rest).expect("valid frame header");
        let end = info.header_length + usize::try_from(info.payload_length).expect("fits");
        out.push((info, &rest[info.header_length..end]));
        rest = &rest[end..];
    }
    out
}

#[rstest]
#[case(0, 2)]
#[case(1, 2)]
#[case(125, 2)]
#[case(126, 4)]
#[case(127, 4)]
#[case(65_535, 4)]
#[case(65_536, 10)]
#[case(1 << 32, 10)]
#[case(MAX_PAYLOAD_LENGTH, 10)]
fn header_length_follows_length_class(#[case] length: u64, #[case] expected: usize) {
    assert_eq!(frame_info_length(length), expected);
}

#[rstest]
#[case(0, &[0x82, 0x00])]
#[case(125, &[0x82, 0x7D])]
#[case(126, &[0x82, 0x7E, 0x00, 0x7E])]
#[case(300, &[0x82, 0x7E, 0x01, 0x2C])]
#[case(65_535, &[0x82, 0x7E, 0xFF, 0xFF])]
#[case(65_536, &[0x82, 0x7F, 0, 0, 0, 0, 0, 0x01, 0x00, 0x00])]
fn extended_lengths_are_big_endian(#[case] length: u64, #[case] expected: &[u8]) {
    let mut buf = [0u8; 10];
    let written = write_frame_info(true, Opcode::Binary, length, &mut buf);
    assert_eq!(&buf[..written], expected);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(125)]
#[case(126)]
#[case(127)]
#[case(65_535)]
#[case(65_536)]
#[case(1 << 32)]
#[case(MAX_PAYLOAD_LENGTH)]
fn header_round_trips(#[case] length: u64) {
    let mut buf = [0u8; 10];
    let written = write_frame_info(false, Opcode::Text, length, &mut buf);
    let info = decode_frame_info(&buf[..written]).expect("decodable header");
    assert_eq!(info.payload_length, length);
    assert_eq!(info.header_length, written);
    assert_eq!(info.opcode, Opcode::Text);
    assert!(!info.fin);
}

#[test]
fn first_byte_carries_fin_and_opcode() {
    let mut buf = [0u8; 2];
    write_frame_info(true, Opcode::Pong, 0, &mut buf);
    assert_eq!(buf[0], 0x8A);
    write_frame_info(false, Opcode::Continuation, 0, &mut buf);
    assert_eq!(buf[0], 0x00);
}

#[rstest]
#[case(&[0x81])]
#[case(&[0x81, 0x7E, 0x00])]
#[case(&[0x83, 0x00])]
#[case(&[0x81, 0x80])]
fn decode_rejects_truncated_reserved_or_masked(#[case] bytes: &[u8]) {
    assert!(decode_frame_info(bytes).is_none());
}

#[test]
fn opcodes_round_trip_through_wire_values() {
    for opcode in [
        Opcode::Continuation,
        Opcode::Text,
        Opcode::Binary,
        Opcode::Close,
        Opcode::Ping,
        Opcode::Pong,
    ] {
        assert_eq!(Opcode::from_u8(opcode.as_u8()), Some(opcode));
    }
    assert!(Opcode::Ping.is_control());
    assert!(!Opcode::Continuation.is_control());
}

proptest! {
    #![proptest_config(Config { cases: 256, ..Config::default() })]

    #[test]
    fn generated_lengths_round_trip(length in 0..=MAX_PAYLOAD_LENGTH, fin in any::<bool>()) {
        let mut buf = [0u8; 10];
        let written = write_frame_info(fin, Opcode::Binary, length, &mut buf);
        prop_assert_eq!(written, frame_info_length(length));
        let info = decode_frame_info(&buf[..written]).expect("decodable header");
        prop_assert_eq!(info.payload_length, length);
        prop_assert_eq!(info.fin, fin);
    }
}

#[rstest]
#[case(0)]
#[case(5)]
#[case(200)]
#[case(70_000)]
#[tokio::test]
async fn memory_message_is_one_fin_frame(
    mut writer: VecWriter,
    cancel: CancellationToken,
    #[case] len: usize,
) {
    let payload = vec![0x5A; len];
    writer
        .write_memory_message(Opcode::Binary, &payload, &cancel)
        .await
        .expect("send");

    let wire = writer.get_ref().get_ref();
    let frames = frames(wire);
    assert_eq!(frames.len(), 1);
    let (info, body) = frames[0];
    assert!(info.fin);
    assert_eq!(info.opcode, Opcode::Binary);
    assert_eq!(body, payload.as_slice());
}

#[rstest]
#[case(None, None, &[0x88, 0x00][..])]
#[case(Some(1000), None, &[0x88, 0x02, 0x03, 0xE8][..])]
#[case(Some(1000), Some("bye"), &[0x88, 0x05, 0x03, 0xE8, b'b', b'y', b'e'][..])]
#[case(None, Some("ignored"), &[0x88, 0x00][..])]
#[tokio::test]
async fn close_message_variants(
    mut writer: VecWriter,
    cancel: CancellationToken,
    #[case] code: Option<u16>,
    #[case] reason: Option<&str>,
    #[case] expected: &[u8],
) {
    writer
        .write_close_message(code, reason, &cancel)
        .await
        .expect("send close");
    assert_eq!(writer.get_ref().get_ref(), expected);
}

#[rstest]
#[tokio::test]
async fn long_close_reason_uses_extended_length(mut writer: VecWriter, cancel: CancellationToken) {
    let reason = "x".repeat(200);
    writer
        .write_close_message(Some(1001), Some(&reason), &cancel)
        .await
        .expect("send close");

    let frames = frames(writer.get_ref().get_ref());
    let (info, body) = frames[0];
    assert_eq!(info.header_length, 4);
    assert_eq!(info.payload_length, 202);
    assert_eq!(&body[..2], &[0x03, 0xE9]);
}

#[rstest]
#[tokio::test]
async fn sized_message_streams_body_after_header(mut writer: VecWriter, cancel: CancellationToken) {
    let body = vec![1u8; 300];
    writer
        .write_sized_message(Opcode::Binary, body.as_slice(), 300, &cancel)
        .await
        .expect("send");

    let wire = writer.get_ref().get_ref();
    assert_eq!(&wire[..4], &[0x82, 0x7E, 0x01, 0x2C]);
    assert_eq!(&wire[4..], body.as_slice());
}

#[rstest]
#[tokio::test]
async fn sized_message_takes_only_declared_bytes(mut writer: VecWriter, cancel: CancellationToken) {
    writer
        .write_sized_message(Opcode::Text, &b"hello world"[..], 5, &cancel)
        .await
        .expect("send");
    assert_eq!(writer.get_ref().get_ref(), b"\x81\x05hello");
}

#[rstest]
#[tokio::test]
async fn sized_message_reports_short_body(mut writer: VecWriter, cancel: CancellationToken) {
    let err = writer
        .write_sized_message(Opcode::Text, &b"abc"[..], 10, &cancel)
        .await
        .expect_err("short body should fail");
    assert!(matches!(
        err,
        WireError::BodyTooShort {
            expected: 10,
            actual: 3
        }
    ));
    assert!(writer.get_ref().get_ref().is_empty());
}

#[rstest]
#[tokio::test]
async fn sized_message_rejects_unrepresentable_length(
    mut writer: VecWriter,
    cancel: CancellationToken,
) {
    let err = writer
        .write_sized_message(Opcode::Binary, &b""[..], MAX_PAYLOAD_LENGTH + 1, &cancel)
        .await
        .expect_err("length should be rejected");
    assert!(matches!(err, WireError::InvalidLength { .. }));
    assert_eq!(writer.get_ref().pending(), 0);
}

#[rstest]
#[case(Opcode::Text, 0x81)]
#[case(Opcode::Binary, 0x82)]
#[tokio::test]
async fn empty_unsized_message_is_single_empty_fin_frame(
    mut writer: VecWriter,
    cancel: CancellationToken,
    #[case] opcode: Opcode,
    #[case] first: u8,
) {
    let frames = writer
        .write_unsized_message(opcode, &b""[..], &cancel)
        .await
        .expect("send");
    assert_eq!(frames, 1);
    assert_eq!(writer.get_ref().get_ref(), &[first, 0x00]);
}

#[rstest]
#[case(0, 4)]
#[case(1, 5)]
#[tokio::test]
async fn unsized_message_fragments_by_max_frame_length(
    cancel: CancellationToken,
    #[case] extra: usize,
    #[case] expected_frames: usize,
) {
    let config = WebSocketWriterConfig::try_new(64).expect("valid length");
    let mut writer = WebSocketWriter::with_config(BufferedSink::new(Vec::new()), config);
    let chunk = config.max_payload_per_frame();
    let body: Vec<u8> = (0..3 * chunk + extra).map(|i| (i % 251) as u8).collect();

    let sent = writer
        .write_unsized_message(Opcode::Text, body.as_slice(), &cancel)
        .await
        .expect("send");
    assert_eq!(sent, expected_frames);

    let frames = frames(writer.get_ref().get_ref());
    assert_eq!(frames.len(), expected_frames);
    assert_eq!(frames[0].0.opcode, Opcode::Text);
    for (info, _) in &frames[1..] {
        assert_eq!(info.opcode, Opcode::Continuation);
    }
    for (info, _) in &frames[..expected_frames - 1] {
        assert!(!info.fin);
        assert!(info.header_length + usize::try_from(info.payload_length).expect("fits") <= 64);
    }
    let (last, last_body) = frames[expected_frames - 1];
    assert!(last.fin);
    assert!(last_body.is_empty());

    let reassembled: Vec<u8> = frames.iter().flat_map(|(_, b)| b.iter().copied()).collect();
    assert_eq!(reassembled, body);
}

#[rstest]
#[tokio::test]
async fn short_fragment_is_shifted_against_shorter_header(cancel: CancellationToken) {
    // 200-byte frames reserve a 4-byte header; a 10-byte chunk needs only 2.
    let config = WebSocketWriterConfig::try_new(200).expect("valid length");
    let mut writer = WebSocketWriter::with_config(BufferedSink::new(Vec::new()), config);

    writer
        .write_unsized_message(Opcode::Binary, &b"0123456789"[..], &cancel)
        .await
        .expect("send");

    assert_eq!(
        writer.get_ref().get_ref(),
        b"\x02\x0a0123456789\x80\x00"
    );
}

struct StopAfter(usize);

#[async_trait]
impl Interleaver<BufferedSink<Vec<u8>>> for StopAfter {
    async fn between_fragments(
        &mut self,
        _writer: &mut VecWriter,
        _cancel: &CancellationToken,
    ) -> Result<Interleave> {
        self.0 -= 1;
        Ok(if self.0 == 0 {
            Interleave::Stop
        } else {
            Interleave::Continue
        })
    }
}

struct PingBetween;

#[async_trait]
impl Interleaver<BufferedSink<Vec<u8>>> for PingBetween {
    async fn between_fragments(
        &mut self,
        writer: &mut VecWriter,
        cancel: &CancellationToken,
    ) -> Result<Interleave> {
        writer.write_memory_message(Opcode::Ping, b"p", cancel).await?;
        Ok(Interleave::Continue)
    }
}

#[rstest]
#[tokio::test]
async fn interleaver_stop_leaves_message_unterminated(cancel: CancellationToken) {
    let config = WebSocketWriterConfig::try_new(16).expect("valid length");
    let mut writer = WebSocketWriter::with_config(BufferedSink::new(Vec::new()), config);

    let sent = writer
        .write_unsized_message_with(Opcode::Text, &[7u8; 40][..], &mut StopAfter(1), &cancel)
        .await
        .expect("send");

    assert_eq!(sent, 1);
    let frames = frames(writer.get_ref().get_ref());
    assert_eq!(frames.len(), 1);
    assert!(!frames[0].0.fin);
    assert_eq!(frames[0].1.len(), 14);
}

#[rstest]
#[tokio::test]
async fn interleaved_frames_sit_between_fragments(cancel: CancellationToken) {
    let config = WebSocketWriterConfig::try_new(16).expect("valid length");
    let mut writer = WebSocketWriter::with_config(BufferedSink::new(Vec::new()), config);

    writer
        .write_unsized_message_with(Opcode::Binary, &[1u8; 20][..], &mut PingBetween, &cancel)
        .await
        .expect("send");

    let opcodes: Vec<_> = frames(writer.get_ref().get_ref())
        .iter()
        .map(|(info, _)| (info.opcode, info.fin))
        .collect();
    assert_eq!(
        opcodes,
        [
            (Opcode::Binary, false),
            (Opcode::Ping, true),
            (Opcode::Continuation, false),
            (Opcode::Ping, true),
            (Opcode::Continuation, true),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn cancelled_send_writes_nothing(mut writer: VecWriter) {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = writer
        .write_memory_message(Opcode::Text, b"late", &cancel)
        .await
        .expect_err("send should be cancelled");

    assert!(err.is_cancelled());
    assert!(writer.get_ref().get_ref().is_empty());
    assert_eq!(writer.get_ref().pending(), 6);
}

#[rstest]
fn setter_rejects_invalid_length_and_keeps_config(mut writer: VecWriter) {
    assert!(writer.set_max_frame_length(1).is_err());
    assert_eq!(writer.config().max_frame_length(), DEFAULT_MAX_FRAME_LENGTH);
    writer.set_max_frame_length(1024).expect("valid length");
    assert_eq!(writer.config().max_frame_length(), 1024);
}
