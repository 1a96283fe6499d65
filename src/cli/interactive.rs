use super::{convert, currencies, ui};
use crate::core::{
    ConversionController, ConversionInputs, CurrencyCode, InputEvent, RateProvider, Snapshot,
    ViewState,
};
use anyhow::{Result, bail};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Comandos:
  <valor>        altera o valor (ex.: 10 ou 10,50)
  de <MOEDA>     altera a moeda de origem (from <CODE>)
  para <MOEDA>   altera a moeda de destino (to <CODE>)
  inverter       troca as moedas (swap)
  moedas         lista as moedas suportadas (list)
  ajuda          mostra esta ajuda (help)
  sair           encerra (quit)
Uma linha vazia limpa o valor.";

#[derive(Debug, PartialEq)]
pub enum Command {
    Input(InputEvent),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Input(InputEvent::SetAmount(String::new())));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word.to_lowercase().as_str(), rest.is_empty()) {
        ("quit" | "exit" | "sair" | "q", true) => Command::Quit,
        ("swap" | "inverter" | "s", true) => Command::Input(InputEvent::Swap),
        ("list" | "moedas", true) => Command::List,
        ("help" | "ajuda" | "?", true) => Command::Help,
        ("from" | "de", false) => Command::Input(InputEvent::SetSource(rest.parse()?)),
        ("to" | "para", false) => Command::Input(InputEvent::SetTarget(rest.parse()?)),
        ("amount" | "valor", false) => Command::Input(InputEvent::SetAmount(rest.to_string())),
        _ if looks_like_amount(line) => Command::Input(InputEvent::SetAmount(line.to_string())),
        _ => bail!("Unknown command: {}", line),
    };
    Ok(command)
}

fn looks_like_amount(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
}

/// Text to print for a published snapshot. Loading is shown by the spinner;
/// idle only needs output when the typed amount was rejected.
pub fn describe(snapshot: &Snapshot) -> Option<String> {
    match &snapshot.state {
        ViewState::Loading => None,
        ViewState::Idle => {
            let amount = snapshot.inputs.amount.trim();
            (!amount.is_empty() && snapshot.inputs.request().is_none()).then(|| {
                ui::style_text(
                    &format!("Valor inválido: '{amount}'"),
                    ui::StyleType::Subtle,
                )
            })
        }
        ViewState::Success(conversion) => Some(convert::format_result(conversion)),
        ViewState::Failure { message } => Some(ui::style_text(message, ui::StyleType::Error)),
    }
}

fn describe_inputs(inputs: &ConversionInputs) -> String {
    let name = |c: CurrencyCode| format!("{} - {}", c.code(), c.display_name());
    format!(
        "{} | {} -> {}",
        inputs.amount,
        name(inputs.source),
        name(inputs.target)
    )
}

#[derive(Default)]
struct Renderer {
    spinner: Option<ProgressBar>,
    last: Option<Snapshot>,
}

impl Renderer {
    fn render(&mut self, snapshot: Snapshot) {
        if self.last.as_ref() == Some(&snapshot) {
            return;
        }

        if snapshot.state.is_loading() {
            if self.spinner.is_none() {
                self.spinner = Some(ui::new_spinner("Convertendo..."));
            }
        } else {
            self.stop_spinner();
            if let Some(text) = describe(&snapshot) {
                println!(
                    "{}\n{}",
                    ui::style_text(&describe_inputs(&snapshot.inputs), ui::StyleType::Subtle),
                    text
                );
            }
        }
        self.last = Some(snapshot);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Reads commands from stdin and feeds them to a conversion controller until
/// the user quits or stdin closes.
pub async fn run(provider: Arc<dyn RateProvider>, inputs: ConversionInputs) -> Result<()> {
    println!("{}", ui::style_text("Conversor de Moedas", ui::StyleType::Title));
    println!(
        "{}",
        ui::style_text("Digite 'ajuda' para ver os comandos.", ui::StyleType::Subtle)
    );

    let handle = ConversionController::spawn(provider, inputs);
    let mut states = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::default();

    let initial = states.borrow_and_update().clone();
    renderer.render(initial);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = states.borrow_and_update().clone();
                renderer.render(snapshot);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Input(event)) => {
                        handle.send(event).await?;
                    }
                    Ok(Command::List) => currencies::run(),
                    Ok(Command::Help) => println!("{HELP}"),
                    Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                }
            }
        }
    }

    renderer.stop_spinner();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversion::CONVERSION_FAILED_MESSAGE;

    #[test]
    fn test_parse_amounts() {
        assert_eq!(
            parse_command("100").unwrap(),
            Command::Input(InputEvent::SetAmount("100".to_string()))
        );
        assert_eq!(
            parse_command(" 10,50 ").unwrap(),
            Command::Input(InputEvent::SetAmount("10,50".to_string()))
        );
        assert_eq!(
            parse_command("valor 3").unwrap(),
            Command::Input(InputEvent::SetAmount("3".to_string()))
        );
        assert_eq!(
            parse_command("").unwrap(),
            Command::Input(InputEvent::SetAmount(String::new()))
        );
    }

    #[test]
    fn test_parse_currency_commands() {
        assert_eq!(
            parse_command("from eur").unwrap(),
            Command::Input(InputEvent::SetSource(CurrencyCode::Eur))
        );
        assert_eq!(
            parse_command("para JPY").unwrap(),
            Command::Input(InputEvent::SetTarget(CurrencyCode::Jpy))
        );
        assert_eq!(
            parse_command("inverter").unwrap(),
            Command::Input(InputEvent::Swap)
        );
        assert!(parse_command("to XYZ").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("sair").unwrap(), Command::Quit);
        assert_eq!(parse_command("QUIT").unwrap(), Command::Quit);
        assert_eq!(parse_command("moedas").unwrap(), Command::List);
        assert_eq!(parse_command("?").unwrap(), Command::Help);
        assert_eq!(
            parse_command("hello").unwrap_err().to_string(),
            "Unknown command: hello"
        );
        // Keywords that need an argument are not accepted bare
        assert!(parse_command("from").is_err());
    }

    #[test]
    fn test_describe_states() {
        let snapshot = |state| Snapshot {
            inputs: ConversionInputs::default(),
            state,
            revision: 0,
        };
        assert!(describe(&snapshot(ViewState::Idle)).is_none());
        assert!(
            describe(&Snapshot {
                inputs: ConversionInputs {
                    amount: "  ".to_string(),
                    ..Default::default()
                },
                state: ViewState::Idle,
                revision: 1,
            })
            .is_none()
        );
        assert!(describe(&snapshot(ViewState::Loading)).is_none());

        let failure = describe(&snapshot(ViewState::Failure {
            message: CONVERSION_FAILED_MESSAGE.to_string(),
        }))
        .unwrap();
        assert!(failure.contains(CONVERSION_FAILED_MESSAGE));
    }

    #[test]
    fn test_describe_rejected_amount() {
        let snapshot = Snapshot {
            inputs: ConversionInputs {
                amount: "abc".to_string(),
                ..Default::default()
            },
            state: ViewState::Idle,
            revision: 1,
        };
        let text = describe(&snapshot).expect("rejected amount should be reported");
        assert!(text.contains("Valor inválido: 'abc'"));
    }

    #[test]
    fn test_describe_inputs_uses_display_names() {
        assert_eq!(
            describe_inputs(&ConversionInputs::default()),
            "1 | BRL - Real Brasileiro -> USD - Dólar Americano"
        );
    }
}
