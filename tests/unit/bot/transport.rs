use super::*;

fn event(id: &str, quoted: Option<&str>) -> ReplayEvent {
    ReplayEvent {
        message: IncomingMessage {
            id: id.to_string(),
            chat_id: "chat-1".to_string(),
            body: "!quote".to_string(),
            has_quoted_msg: quoted.is_some(),
        },
        quoted: quoted.map(|body| QuotedMessage {
            id: String::new(),
            body: body.to_string(),
            author: None,
        }),
        contact: Contact {
            pushname: Some(format!("sender of {id}")),
            ..Contact::default()
        },
        chat: ChatInfo::default(),
    }
}

#[tokio::test]
async fn messages_replay_in_order_then_end() {
    let t = ReplayTransport::new(vec![event("a", None), event("b", Some("x"))]);
    assert_eq!(t.next_message().await.unwrap().unwrap().id, "a");
    assert_eq!(t.next_message().await.unwrap().unwrap().id, "b");
    assert!(t.next_message().await.unwrap().is_none());
}

#[tokio::test]
async fn metadata_is_looked_up_per_message() {
    let t = ReplayTransport::new(vec![event("a", Some("first")), event("b", Some("second"))]);
    let msg_b = event("b", Some("second")).message;
    let quoted = t.quoted_message(&msg_b).await.unwrap().unwrap();
    assert_eq!(quoted.body, "second");
    let contact = t.contact(&quoted).await.unwrap();
    assert_eq!(contact.pushname.as_deref(), Some("sender of b"));
}

#[tokio::test]
async fn identical_quotes_keep_their_own_contacts() {
    let mut first = event("a", Some("hi"));
    first.contact.pushname = Some("Alice".to_string());
    let mut second = event("b", Some("hi"));
    second.contact.pushname = Some("Bob".to_string());
    let t = ReplayTransport::new(vec![first, second]);

    for _ in 0..20 {
        let msg_b = event("b", Some("hi")).message;
        let quoted = t.quoted_message(&msg_b).await.unwrap().unwrap();
        assert_eq!(quoted.id, "b:quoted");
        let contact = t.contact(&quoted).await.unwrap();
        assert_eq!(contact.pushname.as_deref(), Some("Bob"));
    }
    let msg_a = event("a", Some("hi")).message;
    let quoted = t.quoted_message(&msg_a).await.unwrap().unwrap();
    let contact = t.contact(&quoted).await.unwrap();
    assert_eq!(contact.pushname.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn quote_without_recorded_contact_is_a_transport_error() {
    let t = ReplayTransport::new(vec![event("a", Some("hi"))]);
    let stray = QuotedMessage {
        id: "elsewhere".to_string(),
        body: "hi".to_string(),
        author: None,
    };
    let err = t.contact(&stray).await.unwrap_err();
    assert!(matches!(err, QuoteError::Transport(_)));
}

#[tokio::test]
async fn unknown_message_is_a_transport_error() {
    let t = ReplayTransport::new(Vec::new());
    let err = t.chat(&event("zzz", None).message).await.unwrap_err();
    assert!(matches!(err, QuoteError::Transport(_)));
}

#[tokio::test]
async fn outbox_records_replies_and_stickers() {
    let t = ReplayTransport::new(vec![event("a", None)]);
    let msg = event("a", None).message;
    t.reply(&msg, "hello").await.unwrap();
    let sticker = StickerArtifact {
        bytes: vec![1, 2, 3],
        width: 512,
        height: 512,
        path: None,
        raster_path: None,
    };
    t.send_sticker("chat-1", &sticker).await.unwrap();

    assert_eq!(
        t.outbox().unwrap(),
        vec![
            Outbound::Reply {
                message_id: "a".to_string(),
                text: "hello".to_string()
            },
            Outbound::Sticker {
                chat_id: "chat-1".to_string(),
                mime_type: "image/webp",
                bytes: vec![1, 2, 3]
            },
        ]
    );
}

#[test]
fn events_load_from_json() {
    let path = std::env::temp_dir().join(format!("quotestick_events_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[{"message":{"id":"m1","chat_id":"c1","body":"!quote","has_quoted_msg":true},
            "quoted":{"body":"hello"},
            "contact":{"pushname":"Alice"}}]"#,
    )
    .unwrap();
    let t = ReplayTransport::from_json_file(&path).unwrap();
    assert_eq!(t.events.len(), 1);
    assert!(t.events["m1"].chat.participants.is_empty());
    let _ = std::fs::remove_file(path);
}
