use crate::EventFrameDecoder;

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use parley_relay::RelayEvent;

const BODY: &str = "data: {\"content\":\"Hi\"}\n\ndata: {\"content\":\" there\"}\n\ndata: {\"finish\":true}\n\n";

#[test]
fn given_whole_body_when_pushed_then_three_events_in_order() {
    let mut decoder = EventFrameDecoder::new();

    let events = decoder.push(BODY.as_bytes());

    assert_that!(
        events,
        eq(&vec![
            RelayEvent::content("Hi"),
            RelayEvent::content(" there"),
            RelayEvent::finish(),
        ])
    );
}

#[test]
fn given_body_split_at_every_byte_when_pushed_then_same_events() {
    let mut decoder = EventFrameDecoder::new();

    let events: Vec<RelayEvent> = BODY
        .as_bytes()
        .chunks(1)
        .flat_map(|chunk| decoder.push(chunk))
        .collect();

    assert_that!(events.len(), eq(3));
    assert_that!(events[2], eq(&RelayEvent::finish()));
}

#[test]
fn given_multibyte_text_split_inside_character_when_pushed_then_text_intact() {
    let frame = "data: {\"content\":\"héllo ✓\"}\n\n".as_bytes();
    let split = frame.iter().position(|b| *b == 0xC3).unwrap() + 1;
    let mut decoder = EventFrameDecoder::new();

    let mut events = decoder.push(&frame[..split]);
    events.extend(decoder.push(&frame[split..]));

    assert_that!(events, eq(&vec![RelayEvent::content("héllo ✓")]));
}

#[test]
fn given_error_frame_when_pushed_then_error_event() {
    let mut decoder = EventFrameDecoder::new();

    let events = decoder.push(b"data: {\"error\":\"Rate limit exceeded\"}\n\n");

    assert_that!(events, eq(&vec![RelayEvent::error("Rate limit exceeded")]));
}

#[test]
fn given_garbage_and_comment_lines_when_pushed_then_skipped() {
    let mut decoder = EventFrameDecoder::new();

    let events = decoder.push(b": keep-alive\n\ndata: not json\n\ndata: {\"content\":\"ok\"}\n\n");

    assert_that!(events, eq(&vec![RelayEvent::content("ok")]));
}

#[test]
fn given_final_frame_without_newline_when_finished_then_decoded() {
    let mut decoder = EventFrameDecoder::new();

    assert_that!(decoder.push(b"data: {\"finish\":true}").is_empty(), eq(true));
    assert_that!(decoder.finish(), some(eq(&RelayEvent::finish())));
    assert_that!(decoder.finish(), none());
}
