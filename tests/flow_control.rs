//! Property-style checks for the §8 invariants and boundary behaviors, run
//! through the public `SessionHandler` API rather than internal state
//! (the table and its entries are crate-private; every check below is
//! stated purely in terms of frames observed on the two sinks).

use spdy_mux::{
    DataFrame, HttpSetting, SessionConfig, SessionHandler, SettingId, SettingsFrame, SpdyFrame,
    StreamStatus, SynStreamFrame, WindowUpdateFrame,
};

fn server() -> SessionHandler {
    let _ = env_logger::try_init();
    SessionHandler::new(SessionConfig::new(3, true))
}

fn syn_stream(id: u32, last: bool) -> SpdyFrame {
    let mut f = SynStreamFrame::new(id, Vec::new());
    f.last = last;
    SpdyFrame::SynStream(f)
}

fn data(id: u32, len: usize, last: bool) -> SpdyFrame {
    let mut f = DataFrame::new(id, vec![0u8; len]);
    f.last = last;
    SpdyFrame::Data(f)
}

#[test]
fn no_new_stream_is_admitted_after_goaway_is_received() {
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_inbound_batch(
            vec![SpdyFrame::GoAway(spdy_mux::GoawayFrame::new(
                0,
                spdy_mux::SessionStatus::Ok,
            ))],
            &mut upstream,
            &mut downstream,
        )
        .unwrap();
    assert!(handler.received_goaway());

    downstream.clear();
    handler
        .handle_inbound_batch(vec![syn_stream(1, false)], &mut upstream, &mut downstream)
        .unwrap();

    assert_eq!(handler.active_count(), 0);
    match &downstream[0] {
        SpdyFrame::RstStream(f) => assert_eq!(f.status, StreamStatus::RefusedStream),
        other => panic!("expected RST_STREAM, got {other:?}"),
    }
}

#[test]
fn no_new_stream_is_admitted_after_goaway_is_sent() {
    let mut handler = server();
    let mut downstream: Vec<SpdyFrame> = Vec::new();
    handler.close_gracefully(&mut downstream, || {});
    assert!(handler.sent_goaway());

    downstream.clear();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    handler
        .handle_inbound_batch(vec![syn_stream(1, false)], &mut upstream, &mut downstream)
        .unwrap();
    assert_eq!(handler.active_count(), 0);
    assert!(matches!(downstream[0], SpdyFrame::RstStream(_)));
}

#[test]
fn window_update_overflowing_int32_max_raises_flow_control_error() {
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_inbound_batch(vec![syn_stream(1, false)], &mut upstream, &mut downstream)
        .unwrap();
    downstream.clear();

    handler
        .handle_inbound_batch(
            vec![SpdyFrame::WindowUpdate(WindowUpdateFrame::new(
                1,
                i32::MAX as u32,
            ))],
            &mut upstream,
            &mut downstream,
        )
        .unwrap();

    assert_eq!(handler.active_count(), 0, "overflowing stream is torn down");
    match &downstream[0] {
        SpdyFrame::RstStream(f) => {
            assert_eq!(f.stream_id, 1);
            assert_eq!(f.status, StreamStatus::FlowControlError);
        }
        other => panic!("expected RST_STREAM, got {other:?}"),
    }
}

#[test]
fn window_update_with_zero_delta_is_a_no_op() {
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_inbound_batch(vec![syn_stream(1, false)], &mut upstream, &mut downstream)
        .unwrap();
    downstream.clear();

    handler
        .handle_inbound_batch(
            vec![SpdyFrame::WindowUpdate(WindowUpdateFrame::new(1, 0))],
            &mut upstream,
            &mut downstream,
        )
        .unwrap();

    assert!(downstream.is_empty());
    assert_eq!(handler.active_count(), 1);
}

#[test]
fn outbound_data_under_full_credit_is_never_queued() {
    let mut handler = server();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_outbound(syn_stream(2, false), &mut downstream)
        .unwrap();
    downstream.clear();

    // Two writes, well under the 65536-byte default credit: both must
    // reach the wire immediately, back to back, with no fragmentation.
    handler
        .handle_outbound(data(2, 1_000, false), &mut downstream)
        .unwrap();
    handler
        .handle_outbound(data(2, 2_000, false), &mut downstream)
        .unwrap();

    let payload_lens: Vec<usize> = downstream
        .iter()
        .map(|f| match f {
            SpdyFrame::Data(d) => d.payload.len(),
            other => panic!("expected DATA, got {other:?}"),
        })
        .collect();
    assert_eq!(payload_lens, vec![1_000, 2_000]);
}

#[test]
fn stalled_write_fragments_reconstruct_the_original_payload_with_no_overlap() {
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_outbound(syn_stream(2, false), &mut downstream)
        .unwrap();
    downstream.clear();

    let mut shrink = SettingsFrame::new();
    shrink.settings.push(HttpSetting {
        id: SettingId::InitialWindowSize,
        value: 0,
        flags: 0,
    });
    handler
        .handle_inbound_batch(
            vec![SpdyFrame::Settings(shrink)],
            &mut upstream,
            &mut downstream,
        )
        .unwrap();
    downstream.clear();

    let original: Vec<u8> = (0u8..=255).collect();
    handler
        .handle_outbound(
            SpdyFrame::Data(DataFrame::new(2, original.clone())),
            &mut downstream,
        )
        .unwrap();
    assert!(downstream.is_empty());

    let mut reassembled = Vec::new();
    for credit in [50u32, 50, 50, 106] {
        handler
            .handle_inbound_batch(
                vec![SpdyFrame::WindowUpdate(WindowUpdateFrame::new(2, credit))],
                &mut upstream,
                &mut downstream,
            )
            .unwrap();
    }
    for frame in &downstream {
        if let SpdyFrame::Data(d) = frame {
            reassembled.extend_from_slice(&d.payload);
        }
    }
    assert_eq!(reassembled, original);
}

#[test]
fn shrinking_initial_receive_window_does_not_spuriously_flag_in_flight_data() {
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_inbound_batch(vec![syn_stream(1, false)], &mut upstream, &mut downstream)
        .unwrap();

    let mut shrink = SettingsFrame::new();
    shrink.settings.push(HttpSetting {
        id: SettingId::InitialWindowSize,
        value: 1_000,
        flags: 0,
    });
    handler
        .handle_outbound(SpdyFrame::Settings(shrink), &mut downstream)
        .unwrap();

    // In-flight data sent under the old, larger window: up to
    // (old - new) = 64536 extra bytes must not trigger FLOW_CONTROL_ERROR.
    downstream.clear();
    handler
        .handle_inbound_batch(
            vec![data(1, 64_536, false)],
            &mut upstream,
            &mut downstream,
        )
        .unwrap();
    assert!(
        downstream.iter().all(|f| !matches!(f, SpdyFrame::RstStream(_))),
        "in-flight data within the lower bound must not be torn down"
    );
    assert_eq!(handler.active_count(), 1);
}

#[test]
fn graceful_close_fires_once_last_stream_half_closes_normally() {
    // A stream closing via ordinary last-frame half-close (not RST_STREAM)
    // must still make `active_count()` reach zero and fire the armed
    // close_promise -- the removal path is shared, not just the RST one.
    let mut handler = server();
    let mut upstream: Vec<SpdyFrame> = Vec::new();
    let mut downstream: Vec<SpdyFrame> = Vec::new();

    handler
        .handle_inbound_batch(vec![syn_stream(1, true)], &mut upstream, &mut downstream)
        .unwrap();
    assert_eq!(handler.active_count(), 1);

    downstream.clear();
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    let fired = Arc::new(AtomicBool::new(false));
    let fired_clone = Arc::clone(&fired);
    handler.close_gracefully(&mut downstream, move || {
        fired_clone.store(true, Ordering::SeqCst);
    });
    assert!(!fired.load(Ordering::SeqCst), "stream still active, must not fire yet");

    handler
        .handle_outbound(
            SpdyFrame::Data({
                let mut f = DataFrame::new(1, vec![0u8; 4]);
                f.last = true;
                f
            }),
            &mut downstream,
        )
        .unwrap();

    assert_eq!(handler.active_count(), 0);
    assert!(
        fired.load(Ordering::SeqCst),
        "close_promise must fire once the last stream half-closes normally"
    );
}
