use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::warn;
use voicechain_agents::{
    AssistantSession, ProcessingDelay, RecordingSink, SessionConfig, SessionError,
    TransactionDesk, TransactionRequest, DEFAULT_ASSISTANT_NAME,
};
use voicechain_core::{
    default_voice_handle, AssistantReply, ConversationContext, IntentResponder, Language,
    MarketCatalog, NewContact, SeededPicker, TemplateCatalog, Wallet,
};
use voicechain_observability::{init_tracing, AppMetrics, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "voicechain")]
#[command(about = "VoiceChain assistant CLI")]
struct Cli {
    #[arg(long, env = "VOICECHAIN_LANGUAGE", default_value = "en")]
    language: String,

    #[arg(long, env = "VOICECHAIN_ASSISTANT_NAME", default_value = DEFAULT_ASSISTANT_NAME)]
    assistant_name: String,

    #[arg(long, env = "VOICECHAIN_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "VOICECHAIN_DELAY_MS", default_value_t = 800)]
    delay_ms: u64,

    #[arg(long, env = "VOICECHAIN_DELAY_JITTER_MS", default_value_t = 1200)]
    delay_jitter_ms: u64,

    #[arg(long, env = "VOICECHAIN_LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Respond {
        text: String,
    },
    Languages,
    Portfolio,
    Quote {
        #[command(subcommand)]
        command: QuoteCommand,
    },
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
    Transact {
        #[command(subcommand)]
        command: TransactCommand,
    },
}

#[derive(Debug, Subcommand)]
enum QuoteCommand {
    Buy {
        symbol: String,
        amount_usd: f64,
        #[arg(long, default_value = "card")]
        method: String,
    },
    Swap {
        from: String,
        to: String,
        amount: f64,
    },
}

#[derive(Debug, Subcommand)]
enum ContactsCommand {
    List,
    Search { term: String },
}

#[derive(Debug, Subcommand)]
enum TransactCommand {
    Buy {
        symbol: String,
        amount_usd: f64,
        #[arg(long, default_value = "card")]
        method: String,
    },
    Swap {
        from: String,
        to: String,
        amount: f64,
    },
    Send {
        symbol: String,
        amount: f64,
        recipient: String,
    },
    Stake {
        symbol: String,
        amount: f64,
        #[arg(long, default_value = "staking")]
        product: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("voicechain_cli", cli.log_format);

    let language = resolve_language(&cli.language);
    let delay = ProcessingDelay::new(
        Duration::from_millis(cli.delay_ms),
        Duration::from_millis(cli.delay_jitter_ms),
    );

    match cli.command {
        Command::Chat => {
            let config = SessionConfig {
                assistant_name: cli.assistant_name,
                language,
                delay,
                seed: cli.seed,
            };
            run_chat(config).await?;
        }
        Command::Respond { text } => {
            let picker = cli
                .seed
                .map(SeededPicker::new)
                .unwrap_or_else(SeededPicker::from_os_rng);
            let mut responder =
                IntentResponder::new(TemplateCatalog::builtin(), cli.assistant_name, picker);

            match responder.respond(&text, language, &ConversationContext::new()) {
                Some(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                None => println!("{}", json!({ "reply": null })),
            }
        }
        Command::Languages => {
            let catalog = TemplateCatalog::builtin();
            let languages = Language::ALL
                .into_iter()
                .map(|language| {
                    json!({
                        "code": language.as_code(),
                        "name": language.display_name(),
                        "region": language.region(),
                        "speech_locale": language.speech_locale(),
                        "has_templates": catalog.has_language(language),
                    })
                })
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&languages)?);
        }
        Command::Portfolio => {
            let summary = MarketCatalog::demo().portfolio();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Quote { command } => {
            let market = MarketCatalog::demo();
            let quote = match command {
                QuoteCommand::Buy {
                    symbol,
                    amount_usd,
                    method,
                } => serde_json::to_value(
                    market
                        .buy_quote(&symbol, &method, amount_usd)
                        .context("buy quote failed")?,
                )?,
                QuoteCommand::Swap { from, to, amount } => serde_json::to_value(
                    market
                        .swap_quote(&from, &to, amount)
                        .context("swap quote failed")?,
                )?,
            };
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::Contacts { command } => {
            let book = voicechain_core::AddressBook::with_demo_contacts();
            let contacts = match command {
                ContactsCommand::List => book.contacts().iter().collect::<Vec<_>>(),
                ContactsCommand::Search { term } => book.search(&term),
            };
            println!("{}", serde_json::to_string_pretty(&contacts)?);
        }
        Command::Transact { command } => {
            let desk = TransactionDesk::new(
                Wallet::new(MarketCatalog::demo()),
                ProcessingDelay::transaction(),
                AppMetrics::shared(),
            );
            let request = match command {
                TransactCommand::Buy {
                    symbol,
                    amount_usd,
                    method,
                } => TransactionRequest::Buy {
                    symbol,
                    payment_method: method,
                    amount_usd,
                },
                TransactCommand::Swap { from, to, amount } => {
                    TransactionRequest::Swap { from, to, amount }
                }
                TransactCommand::Send {
                    symbol,
                    amount,
                    recipient,
                } => TransactionRequest::Send {
                    symbol,
                    amount,
                    recipient,
                },
                TransactCommand::Stake {
                    symbol,
                    amount,
                    product,
                } => TransactionRequest::Stake {
                    product,
                    symbol,
                    amount,
                },
            };

            let outcome = desk.execute(request).await.context("mock transaction failed")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "outcome": outcome,
                    "portfolio": desk.portfolio(),
                }))?
            );
        }
    }

    Ok(())
}

async fn run_chat(config: SessionConfig) -> Result<()> {
    let sink = Arc::new(RecordingSink::new());
    let session = AssistantSession::new(config, sink.clone(), AppMetrics::shared());

    if let Some(welcome) = session.open() {
        println!("\n{}\n", welcome.text);
    }
    println!(
        "Commands: /voice, /lang <code>, /contacts, /pick <id>, \
         /add <name> [--handle <handle>] [--address <address>], exit"
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let handled = match message.strip_prefix('/') {
            Some(command) => run_chat_command(&session, command).await,
            None => session
                .submit(message)
                .await
                .map(|reply| print_reply(reply.as_ref())),
        };
        if let Err(err) = handled {
            warn!(error = %err, "chat input rejected");
            println!("! {err}");
        }

        for event in sink.take() {
            println!("[directive] {}", serde_json::to_string(&event)?);
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&session.metrics().snapshot())?
    );
    session.close();
    Ok(())
}

async fn run_chat_command(
    session: &AssistantSession<RecordingSink>,
    command: &str,
) -> Result<(), SessionError> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();

    match name {
        "voice" => {
            let (heard, reply) = session.simulate_voice_command().await?;
            println!("(heard) {heard}");
            print_reply(reply.as_ref());
        }
        "lang" => {
            let language = resolve_language(rest);
            session.set_language(language);
            println!("Language set to {}", language.display_name());
        }
        "contacts" => session.with_address_book(|book| {
            for contact in book.contacts() {
                let star = if contact.favorite { " *" } else { "" };
                println!(
                    "{:>3}  [{}] {} <{}> {}{star}",
                    contact.id,
                    contact.initials(),
                    contact.name,
                    contact.voice_handle,
                    contact.short_address()
                );
            }
        }),
        "pick" => {
            let contact = session.choose_contact(rest)?;
            println!("Sending to {} ({})", contact.name, contact.voice_handle);
        }
        "add" => {
            let new_contact = parse_new_contact(rest);
            let added = session.with_address_book(|book| book.add(new_contact).cloned())?;
            println!("Added {} as {}", added.name, added.voice_handle);
        }
        other => println!("Unknown command /{other}"),
    }

    Ok(())
}

fn print_reply(reply: Option<&AssistantReply>) {
    if let Some(reply) = reply {
        println!("\n{}\n", reply.text);
    }
}

/// Parses `<name words> [--handle <handle>] [--address <address>]`. A contact
/// without either flag gets a handle derived from its name.
fn parse_new_contact(args: &str) -> NewContact {
    let mut name = Vec::new();
    let mut voice_handle = None;
    let mut address = None;
    let mut words = args.split_whitespace();

    while let Some(word) = words.next() {
        match word {
            "--handle" => voice_handle = words.next().map(str::to_string),
            "--address" => address = words.next().map(str::to_string),
            _ => name.push(word),
        }
    }

    if voice_handle.is_none() && address.is_none() {
        voice_handle = Some(default_voice_handle(&name.join(" ")));
    }

    NewContact {
        name: name.join(" "),
        voice_handle,
        address,
    }
}

fn resolve_language(code: &str) -> Language {
    Language::from_code(code).unwrap_or_else(|| {
        warn!(code = %code, "unsupported language code, using default");
        Language::DEFAULT
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_multi_word_names() {
        let contact = parse_new_contact("Eve Adams");
        assert_eq!(contact.name, "Eve Adams");
        assert_eq!(contact.voice_handle.as_deref(), Some("eveadams.voice"));
        assert_eq!(contact.address, None);
    }

    #[test]
    fn add_reads_handle_and_address_flags() {
        let contact = parse_new_contact("Zed Shaw --handle zed.voice --address aaaaa-aa");
        assert_eq!(contact.name, "Zed Shaw");
        assert_eq!(contact.voice_handle.as_deref(), Some("zed.voice"));
        assert_eq!(contact.address.as_deref(), Some("aaaaa-aa"));

        let address_only = parse_new_contact("Zed --address bbbbb-bb");
        assert_eq!(address_only.voice_handle, None);
    }

    #[tokio::test]
    async fn chat_command_errors_are_returned_not_fatal() {
        let config = SessionConfig {
            delay: ProcessingDelay::none(),
            seed: Some(5),
            ..SessionConfig::default()
        };
        let session =
            AssistantSession::new(config, Arc::new(RecordingSink::new()), AppMetrics::shared());

        assert!(matches!(
            run_chat_command(&session, "pick 99").await,
            Err(SessionError::AddressBook(_))
        ));
        assert!(run_chat_command(&session, "add Eve Adams").await.is_ok());
        assert!(session.submit("hello").await.unwrap().is_some());
    }
}
