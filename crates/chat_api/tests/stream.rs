use chat_api::{decode_stream, ChatApiError, ProtocolEvent};
use futures_util::stream::{self, StreamExt};

fn chunk(text: &str) -> Result<Vec<u8>, ChatApiError> {
    Ok(text.as_bytes().to_vec())
}

#[tokio::test]
async fn decode_stream_yields_events_lazily_across_chunks() {
    let bytes = stream::iter(vec![
        chunk("data: {\"event_type\":\"chu"),
        chunk("nk\",\"text\":\"hi\"}\ndata: {\"event_"),
        chunk("type\":\"complete\"}\n"),
    ]);

    let events: Vec<_> = decode_stream(bytes).collect().await;
    let events: Vec<ProtocolEvent> = events
        .into_iter()
        .map(|event| event.expect("no read failure"))
        .collect();

    assert_eq!(
        events,
        vec![
            ProtocolEvent::Chunk {
                text: "hi".to_owned()
            },
            ProtocolEvent::Complete,
        ]
    );
}

#[tokio::test]
async fn read_failure_is_yielded_once_after_decoded_events() {
    let bytes = stream::iter(vec![
        chunk("data: {\"event_type\":\"chunk\",\"text\":\"hi\"}\n"),
        Err(ChatApiError::StreamRead("connection reset".to_owned())),
        chunk("data: {\"event_type\":\"complete\"}\n"),
    ]);

    let events: Vec<_> = decode_stream(bytes).collect().await;

    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        Ok(ProtocolEvent::Chunk { text }) if text == "hi"
    ));
    assert!(matches!(
        &events[1],
        Err(ChatApiError::StreamRead(message)) if message == "connection reset"
    ));
}

#[tokio::test]
async fn stream_end_without_newline_produces_no_partial_event() {
    let bytes = stream::iter(vec![chunk("data: {\"event_type\":\"complete\"}")]);

    let events: Vec<_> = decode_stream(bytes).collect().await;
    assert!(events.is_empty());
}
