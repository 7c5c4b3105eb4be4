use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use voicechain_agents::{
    AssistantSession, FlowStep, ProcessingDelay, RecordingSink, SessionConfig, SessionError,
    SinkEvent, TransactionDesk, TransactionRequest,
};
use voicechain_core::{
    Directive, Language, Page, ResponseCategory, Sender, TemplateCatalog, TransactionKind, Wallet,
};
use voicechain_observability::AppMetrics;

fn session_with_delay(
    delay: ProcessingDelay,
) -> (AssistantSession<RecordingSink>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let config = SessionConfig {
        delay,
        seed: Some(2024),
        ..SessionConfig::default()
    };
    (
        AssistantSession::new(config, sink.clone(), AppMetrics::shared()),
        sink,
    )
}

#[tokio::test]
async fn duplicate_input_in_flight_is_rejected() {
    let (session, _) = session_with_delay(ProcessingDelay::fixed(Duration::from_millis(50)));

    let (first, second) = tokio::join!(session.submit("hello"), session.submit("hello"));

    assert!(first.unwrap().is_some());
    assert!(matches!(
        second,
        Err(SessionError::DuplicateSubmission(ref text)) if text == "hello"
    ));
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.metrics().snapshot().rejected_total, 1);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn different_inputs_may_overlap() {
    let (session, _) = session_with_delay(ProcessingDelay::fixed(Duration::from_millis(20)));

    let (first, second) = tokio::join!(session.submit("hello"), session.submit("asdkjashd"));

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_some());
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn transcript_keeps_send_order() {
    let (session, _) = session_with_delay(ProcessingDelay::none());
    let inputs = ["hello", "explain ICP", "market update", "asdkjashd", "transfer funds"];

    for input in inputs {
        session.submit(input).await.unwrap();
    }

    let user_texts = session
        .transcript()
        .into_iter()
        .filter(|message| message.sender == Sender::User)
        .map(|message| message.text)
        .collect::<Vec<_>>();
    assert_eq!(user_texts, inputs);
}

#[tokio::test]
async fn documented_examples_hold() {
    let (session, sink) = session_with_delay(ProcessingDelay::none());
    let catalog = TemplateCatalog::builtin();

    let hello = session.submit("Hello").await.unwrap().unwrap();
    assert_eq!(hello.category, ResponseCategory::Greeting);
    assert_eq!(hello.directive, None);

    let buy = session
        .submit("Buy $50 worth of Bitcoin now")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        buy.directive,
        Some(Directive::ExecuteTransaction(TransactionKind::Buy))
    );
    assert!(!catalog
        .templates(Language::En, ResponseCategory::Buy)
        .contains(&buy.text));

    let portfolio = session.submit("Show me my portfolio").await.unwrap().unwrap();
    assert_eq!(
        portfolio.directive,
        Some(Directive::NavigateTo(Page::Portfolio))
    );

    let gibberish = session.submit("asdkjashd").await.unwrap().unwrap();
    assert_eq!(gibberish.directive, None);
    assert!(catalog
        .templates(Language::En, ResponseCategory::Default)
        .contains(&gibberish.text));

    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::Transaction {
                kind: TransactionKind::Buy,
                payload: json!({ "message": "Buy $50 worth of Bitcoin now" }),
            },
            SinkEvent::Navigated {
                page: Page::Portfolio
            },
        ]
    );
}

#[tokio::test]
async fn unsupported_language_degrades_to_english() {
    let (session, _) = session_with_delay(ProcessingDelay::none());
    session.set_language(Language::De);
    let catalog = TemplateCatalog::builtin();

    let reply = session.submit("asdkjashd").await.unwrap().unwrap();
    assert_eq!(reply.language, Language::De);
    assert!(catalog
        .templates(Language::En, ResponseCategory::Default)
        .contains(&reply.text));
}

#[tokio::test]
async fn french_greeting_uses_french_table() {
    let (session, _) = session_with_delay(ProcessingDelay::none());
    session.set_language(Language::Fr);

    let reply = session.submit("Bonjour").await.unwrap().unwrap();
    assert!(reply.text.starts_with("Salut! Je suis Nova"));
}

#[tokio::test]
async fn execute_directive_routes_into_mock_flow() {
    let (session, sink) = session_with_delay(ProcessingDelay::none());
    let desk = TransactionDesk::new(
        Wallet::default(),
        ProcessingDelay::none(),
        AppMetrics::shared(),
    );

    session.submit("swap ICP now").await.unwrap();
    let kind = match sink.take().as_slice() {
        [SinkEvent::Transaction { kind, .. }] => *kind,
        other => panic!("unexpected sink events: {other:?}"),
    };
    assert_eq!(kind, TransactionKind::Swap);

    let outcome = desk
        .execute(TransactionRequest::Swap {
            from: "ICP".to_string(),
            to: "ckBTC".to_string(),
            amount: 100.0,
        })
        .await
        .unwrap();

    assert_eq!(outcome.steps.last(), Some(&FlowStep::Success));
    let icp = desk.with_wallet(|wallet| wallet.balance("ICP").unwrap());
    assert!((icp - 145.67).abs() < 1e-9);
}

#[tokio::test]
async fn session_contacts_survive_between_messages() -> anyhow::Result<()> {
    let (session, _) = session_with_delay(ProcessingDelay::none());

    let id = session.with_address_book(|book| {
        book.add(voicechain_core::NewContact {
            name: "Eve Adams".to_string(),
            voice_handle: None,
            address: Some("aaaaa-aa".to_string()),
        })
        .map(|contact| contact.id.clone())
    })?;

    session.submit("send to eve").await?;
    let contact = session.choose_contact(&id)?;
    assert_eq!(contact.voice_handle, "eveadams.voice");
    Ok(())
}
